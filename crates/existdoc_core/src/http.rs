//! HTTP client for the eXist REST interface.
//!
//! The HTTP library is abstracted via the [`HttpClient`] trait so that
//! [`HttpDatabaseClient`] can be driven by `reqwest` in production and by a
//! scripted client in tests.

use crate::client::{Connector, DatabaseClient, RemoteResponse};
use crate::config::ClientConfig;
use crate::connection::strip_mount;
use crate::error::{ExistError, ExistResult};
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Content type sent with stored documents.
pub const XML_CONTENT_TYPE: &str = "application/xml";

/// HTTP request methods used by the database client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET.
    Get,
    /// PUT.
    Put,
    /// DELETE.
    Delete,
}

/// A request handed to an [`HttpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Request method.
    pub method: HttpMethod,
    /// Absolute URL.
    pub url: String,
    /// Request body.
    pub body: Option<Vec<u8>>,
    /// Value of the `Content-Type` header.
    pub content_type: Option<&'static str>,
    /// User name and password for basic authentication.
    pub basic_auth: Option<(String, Option<String>)>,
}

/// A response returned by an [`HttpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Response body.
    pub body: Vec<u8>,
}

/// HTTP client abstraction.
///
/// Implement this trait to plug in a different HTTP library. An `Err` means
/// no status was received at all, e.g. the connection was refused.
pub trait HttpClient: Send + Sync {
    /// Sends a request and returns the response.
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, String>;
}

/// A [`DatabaseClient`] speaking to the eXist REST servlet.
///
/// A database path is addressed as
/// `<base url>/<mount>/rest<path>`. A leading `/<mount>` segment in the
/// path is dropped first, so the URL-derived collection `/exist/db/apps` and
/// the collection `/db/apps` address the same resource.
pub struct HttpDatabaseClient<C: HttpClient> {
    config: ClientConfig,
    client: C,
    root_collection: RwLock<String>,
}

impl<C: HttpClient> HttpDatabaseClient<C> {
    /// Creates a client for `config`, using its root collection.
    pub fn new(config: ClientConfig, client: C) -> Self {
        let root_collection = RwLock::new(config.root_collection.clone());
        Self {
            config,
            client,
            root_collection,
        }
    }

    /// Returns the connection settings.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the REST URL for a database path.
    pub fn rest_url(&self, path: &str) -> String {
        let path = strip_mount(path, &self.config.mount);
        let encoded: Vec<String> = path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!(
            "{}/{}/rest{}",
            self.config.base_url(),
            self.config.mount,
            encoded.join("/")
        )
    }

    fn dispatch(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> ExistResult<RemoteResponse> {
        let url = self.rest_url(path);
        let content_type = body.as_ref().map(|_| XML_CONTENT_TYPE);
        let basic_auth = self
            .config
            .user
            .clone()
            .map(|user| (user, self.config.password.clone()));
        let request = HttpRequest {
            method,
            url,
            body,
            content_type,
            basic_auth,
        };

        debug!(?method, url = %request.url, "sending request");
        let response = self.client.send(request).map_err(ExistError::Transport)?;
        debug!(?method, status = response.status, "received response");
        Ok(RemoteResponse::new(response.status, response.body))
    }
}

impl<C: HttpClient> fmt::Debug for HttpDatabaseClient<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpDatabaseClient")
            .field("base_url", &self.config.base_url())
            .field("user", &self.config.user)
            .field("root_collection", &*self.root_collection.read())
            .finish()
    }
}

impl<C: HttpClient> DatabaseClient for HttpDatabaseClient<C> {
    fn root_collection(&self) -> String {
        self.root_collection.read().clone()
    }

    fn set_root_collection(&self, collection: &str) {
        *self.root_collection.write() = collection.to_string();
    }

    fn get(&self, path: &str) -> ExistResult<RemoteResponse> {
        self.dispatch(HttpMethod::Get, path, None)
    }

    fn put(&self, path: &str, body: &[u8]) -> ExistResult<RemoteResponse> {
        self.dispatch(HttpMethod::Put, path, Some(body.to_vec()))
    }

    fn delete(&self, path: &str) -> ExistResult<RemoteResponse> {
        self.dispatch(HttpMethod::Delete, path, None)
    }
}

/// [`HttpClient`] backed by a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
}

impl ReqwestClient {
    /// Creates a client with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ExistError::Transport`] if the TLS backend cannot be
    /// initialized.
    pub fn new(timeout: Duration) -> ExistResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExistError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, String> {
        let mut builder = match request.method {
            HttpMethod::Get => self.client.get(&request.url),
            HttpMethod::Put => self.client.put(&request.url),
            HttpMethod::Delete => self.client.delete(&request.url),
        };
        if let Some((user, password)) = request.basic_auth {
            builder = builder.basic_auth(user, password);
        }
        if let Some(content_type) = request.content_type {
            builder = builder.header(reqwest::header::CONTENT_TYPE, content_type);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().map_err(|e| e.to_string())?;
        let status = response.status().as_u16();
        let body = response.bytes().map_err(|e| e.to_string())?.to_vec();
        Ok(HttpResponse { status, body })
    }
}

/// [`Connector`] that creates [`HttpDatabaseClient`]s over `reqwest`.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpConnector;

impl Connector for HttpConnector {
    fn connect(&self, config: &ClientConfig) -> ExistResult<Arc<dyn DatabaseClient>> {
        let client = ReqwestClient::new(config.timeout)?;
        Ok(Arc::new(HttpDatabaseClient::new(config.clone(), client)))
    }
}
