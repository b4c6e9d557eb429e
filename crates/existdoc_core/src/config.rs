//! Configuration for database clients and documents.

use crate::client::ClientSlot;
use crate::connection::MOUNT;
use std::time::Duration;

/// Configuration for connecting to a database server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Whether to use HTTPS.
    pub secure: bool,
    /// Server host name.
    pub host: String,
    /// Server port; the scheme's default if unset.
    pub port: Option<u16>,
    /// User name for basic authentication.
    pub user: Option<String>,
    /// Password for basic authentication.
    pub password: Option<String>,
    /// Web application mount point of the database.
    pub mount: String,
    /// Collection that relative targets are resolved against.
    pub root_collection: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Creates a configuration for `host` with default settings.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            secure: false,
            host: host.into(),
            port: None,
            user: None,
            password: None,
            mount: MOUNT.to_string(),
            root_collection: "/".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets whether to use HTTPS.
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the credentials. An empty password is treated as none.
    pub fn with_credentials(mut self, user: impl Into<String>, password: Option<String>) -> Self {
        self.user = Some(user.into());
        self.password = password.filter(|p| !p.is_empty());
        self
    }

    /// Sets the mount point.
    pub fn with_mount(mut self, mount: impl Into<String>) -> Self {
        self.mount = mount.into();
        self
    }

    /// Sets the root collection.
    pub fn with_root_collection(mut self, collection: impl Into<String>) -> Self {
        self.root_collection = collection.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the HTTP base URL, e.g. `http://localhost:8080`.
    pub fn base_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        match self.port {
            Some(port) => format!("{}://{}:{}", scheme, self.host, port),
            None => format!("{}://{}", scheme, self.host),
        }
    }

    /// Returns the identity under which clients are shared.
    pub fn connection_key(&self) -> ConnectionKey {
        ConnectionKey {
            secure: self.secure,
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.password.clone(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("localhost").with_port(8080)
    }
}

/// Identity of a connection: host and credentials.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionKey {
    /// Whether HTTPS is used.
    pub secure: bool,
    /// Server host name.
    pub host: String,
    /// Server port.
    pub port: Option<u16>,
    /// User name.
    pub user: Option<String>,
    /// Password.
    pub password: Option<String>,
}

/// Per-document configuration.
///
/// The client slot is public and may be reassigned at any time; it is
/// validated again before every client-dependent operation.
#[derive(Debug, Clone, Default)]
pub struct DocumentConfig {
    /// The database client bound to the document.
    pub client: ClientSlot,
    /// Connection settings derived from the URL the document was loaded
    /// from, if any.
    pub connection: Option<ClientConfig>,
}

impl DocumentConfig {
    /// Creates a configuration bound to `client`.
    pub fn new(client: ClientSlot) -> Self {
        Self {
            client,
            connection: None,
        }
    }

    /// Records the connection settings the client was derived from.
    pub fn with_connection(mut self, connection: ClientConfig) -> Self {
        self.connection = Some(connection);
        self
    }
}

/// Arguments of a store call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreOptions {
    /// Target collection.
    pub collection: Option<String>,
    /// Combined target path; overrides `collection` and `filename`.
    pub filepath: Option<String>,
    /// Target filename.
    pub filename: Option<String>,
    /// Whether the document's own synced address may be overwritten.
    pub replace_existing: bool,
}

impl StoreOptions {
    /// Creates options that store to the document's default target.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the target collection.
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    /// Sets the combined target path.
    pub fn with_filepath(mut self, filepath: impl Into<String>) -> Self {
        self.filepath = Some(filepath.into());
        self
    }

    /// Sets the target filename.
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Allows overwriting the document's own synced address.
    pub fn replace_existing(mut self, replace: bool) -> Self {
        self.replace_existing = replace;
        self
    }
}
