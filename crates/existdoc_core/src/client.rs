//! The database client capability and its binding to documents.

use crate::config::{ClientConfig, ConnectionKey, DocumentConfig};
use crate::error::{ExistError, ExistResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Operations a document needs from the database.
///
/// Paths passed to `get`, `put` and `delete` are absolute database paths
/// such as `/db/apps/a.xml`. Any status the database answers with is
/// returned as a [`RemoteResponse`]; `Err` is reserved for requests that
/// never produced a status.
///
/// Clients may be shared by many documents and must support concurrent
/// requests. The root collection is expected to be set during setup, before
/// the client is used concurrently.
///
/// # Implementors
///
/// - [`crate::HttpDatabaseClient`] - the eXist REST interface
/// - [`crate::InMemoryDatabase`] - for tests
pub trait DatabaseClient: Send + Sync + fmt::Debug {
    /// Returns the collection that relative targets are resolved against.
    fn root_collection(&self) -> String;

    /// Sets the root collection.
    fn set_root_collection(&self, collection: &str);

    /// Fetches the document at `path`.
    fn get(&self, path: &str) -> ExistResult<RemoteResponse>;

    /// Writes `body` to `path`, creating or replacing the document.
    fn put(&self, path: &str, body: &[u8]) -> ExistResult<RemoteResponse>;

    /// Removes the document at `path`.
    fn delete(&self, path: &str) -> ExistResult<RemoteResponse>;
}

/// Status and body of a database response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

impl RemoteResponse {
    /// Creates a response.
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self { status, body }
    }

    /// Creates a response without a body.
    pub fn with_status(status: u16) -> Self {
        Self::new(status, Vec::new())
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns true for 404.
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

/// The client slot of a [`DocumentConfig`].
///
/// The slot may hold something that is not a usable client: nothing at all,
/// or a value of the wrong kind that was assigned from dynamic
/// configuration. Such values are rejected with [`ExistError::Config`]
/// whenever a client is needed.
#[derive(Debug, Clone, Default)]
pub enum ClientSlot {
    /// No client bound.
    #[default]
    Empty,
    /// A client.
    Bound(Arc<dyn DatabaseClient>),
    /// A value that does not implement the client capability.
    Foreign(String),
}

impl ClientSlot {
    /// Binds `client`.
    pub fn bound(client: Arc<dyn DatabaseClient>) -> Self {
        Self::Bound(client)
    }

    /// Records a value that is not a client.
    pub fn foreign(value: impl fmt::Debug) -> Self {
        Self::Foreign(format!("{:?}", value))
    }

    /// Returns true if the slot holds a client, valid or not.
    pub fn is_bound(&self) -> bool {
        matches!(self, ClientSlot::Bound(_))
    }
}

impl From<Arc<dyn DatabaseClient>> for ClientSlot {
    fn from(client: Arc<dyn DatabaseClient>) -> Self {
        Self::Bound(client)
    }
}

/// Checks that `slot` holds a usable client and returns it.
///
/// # Errors
///
/// Returns [`ExistError::Config`] if the slot is empty, holds a foreign
/// value, or holds a client whose root collection is not absolute.
pub fn validate(slot: &ClientSlot) -> ExistResult<Arc<dyn DatabaseClient>> {
    let result = match slot {
        ClientSlot::Empty => Err(ExistError::Config("no database client is bound".into())),
        ClientSlot::Foreign(value) => Err(ExistError::Config(format!(
            "{} is not a database client",
            value
        ))),
        ClientSlot::Bound(client) => {
            let root = client.root_collection();
            if root.starts_with('/') {
                Ok(Arc::clone(client))
            } else {
                Err(ExistError::Config(format!(
                    "root collection {:?} is not an absolute path",
                    root
                )))
            }
        }
    };
    if let Err(e) = &result {
        warn!(error = %e, "rejected database client");
    }
    result
}

/// Returns the client currently bound in `config`.
///
/// The slot is validated on every call, so a client that was swapped for
/// an invalid value after construction is caught before any request.
pub fn resolve(config: &DocumentConfig) -> ExistResult<Arc<dyn DatabaseClient>> {
    validate(&config.client)
}

/// Creates database clients from connection settings.
pub trait Connector: Send + Sync {
    /// Returns a client for `config`.
    fn connect(&self, config: &ClientConfig) -> ExistResult<Arc<dyn DatabaseClient>>;
}

/// Shares one client per connection identity.
///
/// Documents loaded from URLs with the same host and credentials end up
/// bound to the same client instance.
pub struct ClientRegistry<C: Connector> {
    connector: C,
    clients: Mutex<HashMap<ConnectionKey, Arc<dyn DatabaseClient>>>,
}

impl<C: Connector> ClientRegistry<C> {
    /// Creates an empty registry backed by `connector`.
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the number of registered clients.
    pub fn len(&self) -> usize {
        self.clients.lock().len()
    }

    /// Returns true if no client has been created yet.
    pub fn is_empty(&self) -> bool {
        self.clients.lock().is_empty()
    }

    /// Drops all registered clients.
    pub fn clear(&self) {
        self.clients.lock().clear();
    }
}

impl<C: Connector> Connector for ClientRegistry<C> {
    fn connect(&self, config: &ClientConfig) -> ExistResult<Arc<dyn DatabaseClient>> {
        let key = config.connection_key();
        let mut clients = self.clients.lock();
        if let Some(client) = clients.get(&key) {
            return Ok(Arc::clone(client));
        }
        debug!(host = %config.host, port = ?config.port, "creating database client");
        let client = self.connector.connect(config)?;
        clients.insert(key, Arc::clone(&client));
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryDatabase;

    #[test]
    fn response_status() {
        assert!(RemoteResponse::with_status(201).is_success());
        assert!(!RemoteResponse::with_status(404).is_success());
        assert!(RemoteResponse::with_status(404).is_not_found());
        assert!(!RemoteResponse::with_status(500).is_not_found());
    }

    #[test]
    fn validate_accepts_client() {
        let slot = ClientSlot::bound(Arc::new(InMemoryDatabase::new()));
        assert!(slot.is_bound());
        assert!(validate(&slot).is_ok());
    }

    #[test]
    fn validate_rejects_empty_and_foreign() {
        assert!(matches!(
            validate(&ClientSlot::Empty),
            Err(ExistError::Config(_))
        ));

        let err = validate(&ClientSlot::foreign(0)).unwrap_err();
        assert!(matches!(err, ExistError::Config(_)));
        assert!(err.to_string().contains('0'));
    }

    #[test]
    fn validate_rejects_relative_root_collection() {
        let db = InMemoryDatabase::new();
        db.set_root_collection("db/apps");
        let slot = ClientSlot::bound(Arc::new(db));
        assert!(matches!(validate(&slot), Err(ExistError::Config(_))));
    }

    #[test]
    fn resolve_sees_reassigned_slot() {
        let mut config = DocumentConfig::new(ClientSlot::bound(Arc::new(InMemoryDatabase::new())));
        assert!(resolve(&config).is_ok());

        config.client = ClientSlot::foreign(0);
        assert!(matches!(resolve(&config), Err(ExistError::Config(_))));
    }

    #[test]
    fn registry_shares_clients_per_connection() {
        let registry = ClientRegistry::new(InMemoryDatabase::new());
        assert!(registry.is_empty());

        let a = registry.connect(&ClientConfig::default()).unwrap();
        let b = registry
            .connect(&ClientConfig::default().with_root_collection("/db"))
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len(), 1);

        registry
            .connect(&ClientConfig::default().with_credentials("admin", None))
            .unwrap();
        assert_eq!(registry.len(), 2);

        registry.clear();
        assert!(registry.is_empty());
    }
}
