//! Loading, storing and deleting documents.
//!
//! ## State machine
//!
//! ```text
//!            load / store
//! Unbound ──────────────────▶ Bound ◀──┐ store
//!    ▲                          │ ─────┘
//!    └────────── delete ────────┘
//! ```
//!
//! ## Key Invariants
//!
//! - The client is validated on every operation, never cached as valid
//! - Store never silently overwrites the address the document is already
//!   synced to; `replace_existing` must be set for that
//! - A failed store or delete leaves the tracked address untouched
//! - No request is retried

use crate::address::{resolve_collection, AddressRequest, AddressResolver, RemoteAddress};
use crate::client::{resolve, validate, ClientSlot, Connector};
use crate::config::{ClientConfig, DocumentConfig, StoreOptions};
use crate::connection::{strip_mount, ConnectionUrl, MOUNT};
use crate::document::{Document, Tracked};
use crate::error::{ExistError, ExistResult, LoadFailure};
use crate::http::HttpConnector;
use tracing::{info, warn};

impl Document {
    /// Loads a document from a connection URL over HTTP.
    ///
    /// A client is created from the host and credentials in the URL.
    ///
    /// # Errors
    ///
    /// - [`ExistError::InvalidUrl`] if `url` is malformed
    /// - [`ExistError::Load`] if the document cannot be fetched
    pub fn load(url: &str) -> ExistResult<Self> {
        Self::load_with_connector(url, &HttpConnector)
    }

    /// Loads a document from a connection URL, creating the client with
    /// `connector`.
    ///
    /// Pass a [`crate::ClientRegistry`] to share clients between documents
    /// that live on the same server.
    ///
    /// # Errors
    ///
    /// - [`ExistError::InvalidUrl`] if `url` is malformed
    /// - [`ExistError::Load`] if no client can be created or the document
    ///   cannot be fetched
    pub fn load_with_connector(url: &str, connector: &dyn Connector) -> ExistResult<Self> {
        let (config, address) = ConnectionUrl::parse(url)?.into_parts();
        let client = connector
            .connect(&config)
            .map_err(|e| ExistError::load(url, LoadFailure::Other(e)))?;
        Self::fetch(url, ClientSlot::bound(client), Some(config), address)
    }

    /// Loads a document from a connection URL using an existing client.
    ///
    /// # Errors
    ///
    /// - [`ExistError::InvalidUrl`] if `url` is malformed
    /// - [`ExistError::Load`] if `client` is not usable or the document
    ///   cannot be fetched
    pub fn load_with_client(url: &str, client: ClientSlot) -> ExistResult<Self> {
        let (config, address) = ConnectionUrl::parse(url)?.into_parts();
        Self::fetch(url, client, Some(config), address)
    }

    /// Loads the document at `path` through `client`.
    ///
    /// A relative `path` is resolved against the client's root collection.
    ///
    /// # Errors
    ///
    /// - [`ExistError::InvalidPath`] if `path` has no filename
    /// - [`ExistError::Load`] if `client` is not usable or the document
    ///   cannot be fetched
    pub fn open(client: ClientSlot, path: &str) -> ExistResult<Self> {
        let database =
            validate(&client).map_err(|e| ExistError::load(path, LoadFailure::Other(e)))?;
        let absolute = resolve_collection(&database.root_collection(), path);
        let address = RemoteAddress::from_path(&absolute)?;
        Self::fetch(path, client, None, address)
    }

    fn fetch(
        location: &str,
        client: ClientSlot,
        connection: Option<ClientConfig>,
        address: RemoteAddress,
    ) -> ExistResult<Self> {
        let database =
            validate(&client).map_err(|e| ExistError::load(location, LoadFailure::Other(e)))?;
        let path = address.filepath();
        let response = database
            .get(&path)
            .map_err(|e| ExistError::load(location, LoadFailure::Other(e)))?;

        if response.is_not_found() {
            warn!(path = %path, "document not found");
            return Err(ExistError::load(location, LoadFailure::NotFound { path }));
        }
        if !response.is_success() {
            warn!(path = %path, status = response.status, "failed to load document");
            return Err(ExistError::load(
                location,
                LoadFailure::Status {
                    path,
                    status: response.status,
                },
            ));
        }
        info!(path = %path, bytes = response.body.len(), "loaded document");

        let mut config = DocumentConfig::new(client);
        config.connection = connection;
        let source_url = config.connection.as_ref().map(|_| location.to_string());
        Ok(Self {
            source: response.body,
            source_url,
            origin: None,
            config,
            tracked: Some(Tracked {
                address,
                synced: true,
            }),
        })
    }

    /// Stores the document in the database.
    ///
    /// The target is resolved from `options`, then the tracked address,
    /// then the client's root collection and the document's origin. On
    /// success the document tracks the target.
    ///
    /// # Errors
    ///
    /// - [`ExistError::Config`] if the bound client is not usable
    /// - [`ExistError::AmbiguousTarget`] if no filename can be determined
    /// - [`ExistError::WriteConflict`] if the target is the address the
    ///   document is already synced to and `replace_existing` is unset
    /// - [`ExistError::RemoteWrite`] if the database rejects the write
    /// - [`ExistError::Transport`] if the request cannot be sent
    pub fn store(&mut self, options: &StoreOptions) -> ExistResult<()> {
        let client = resolve(&self.config)?;
        let root = client.root_collection();
        let request = AddressRequest {
            collection: options.collection.as_deref(),
            filepath: options.filepath.as_deref(),
            filename: options.filename.as_deref(),
        };
        let target =
            AddressResolver::new(&root, self.remote_address(), self.origin()).resolve(&request)?;

        if let Some(tracked) = &self.tracked {
            if tracked.synced
                && self.same_document(&tracked.address, &target)
                && !options.replace_existing
            {
                warn!(address = %target, "refusing to overwrite synced document");
                return Err(ExistError::WriteConflict { address: target });
            }
        }

        let path = target.filepath();
        let response = client.put(&path, &self.source)?;
        if !response.is_success() {
            warn!(path = %path, status = response.status, "store rejected");
            return Err(ExistError::RemoteWrite {
                path,
                status: response.status,
            });
        }
        info!(path = %path, "stored document");

        self.tracked = Some(Tracked {
            address: target,
            synced: true,
        });
        Ok(())
    }

    /// Deletes the document from the database.
    ///
    /// On success the document becomes unbound.
    ///
    /// # Errors
    ///
    /// - [`ExistError::NoRemoteAddress`] if the document is unbound
    /// - [`ExistError::Config`] if the bound client is not usable
    /// - [`ExistError::RemoteDelete`] if the database rejects the delete,
    ///   including when the document does not exist
    /// - [`ExistError::Transport`] if the request cannot be sent
    pub fn delete(&mut self) -> ExistResult<()> {
        let path = self
            .remote_address()
            .map(RemoteAddress::filepath)
            .ok_or(ExistError::NoRemoteAddress)?;
        let client = resolve(&self.config)?;

        let response = client.delete(&path)?;
        if !response.is_success() {
            warn!(path = %path, status = response.status, "delete rejected");
            return Err(ExistError::RemoteDelete {
                path,
                status: response.status,
            });
        }
        info!(path = %path, "deleted document");

        self.tracked = None;
        Ok(())
    }

    /// Returns true if `a` and `b` reach the same remote document, with or
    /// without a leading mount segment.
    fn same_document(&self, a: &RemoteAddress, b: &RemoteAddress) -> bool {
        let mount = self
            .config
            .connection
            .as_ref()
            .map_or(MOUNT, |c| c.mount.as_str());
        strip_mount(&a.filepath(), mount) == strip_mount(&b.filepath(), mount)
    }
}
