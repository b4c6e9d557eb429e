//! # existdoc core
//!
//! Keeps in-memory XML documents in sync with an eXist-db database.
//!
//! This crate provides:
//! - Remote addresses and a tiered store-target resolver
//! - Connection URL parsing (`existdb://` and `existdbs://`)
//! - The [`DatabaseClient`] capability, validated on every use
//! - Load, store and delete with conflict detection
//! - An HTTP client for the REST interface and an in-memory database
//!
//! ## Example
//!
//! ```rust
//! use existdoc_core::{ClientSlot, Document, InMemoryDatabase, StoreOptions};
//! use std::sync::Arc;
//!
//! let db = InMemoryDatabase::new();
//! let mut document = Document::with_client("<test/>", ClientSlot::bound(Arc::new(db.clone())))
//!     .unwrap();
//!
//! document
//!     .store(&StoreOptions::new().with_collection("/db/tests/").with_filename("a.xml"))
//!     .unwrap();
//! assert_eq!(document.collection(), Some("/db/tests"));
//! assert!(db.contains("/db/tests/a.xml"));
//!
//! // storing again to the same address needs replace_existing
//! assert!(document.store(&StoreOptions::new()).is_err());
//! document.store(&StoreOptions::new().replace_existing(true)).unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod address;
mod client;
mod config;
mod connection;
mod document;
mod error;
mod http;
mod memory;
mod sync;

pub use address::{
    join_path, normalize_collection, normalize_filename, resolve_collection, AddressRequest,
    AddressResolver, RemoteAddress, ResolutionTier,
};
pub use client::{
    resolve, validate, ClientRegistry, ClientSlot, Connector, DatabaseClient, RemoteResponse,
};
pub use config::{ClientConfig, ConnectionKey, DocumentConfig, StoreOptions};
pub use connection::{ConnectionUrl, MOUNT, SCHEME, SECURE_SCHEME};
pub use document::{Document, SyncStatus};
pub use error::{ExistError, ExistResult, LoadFailure};
pub use http::{
    HttpClient, HttpConnector, HttpDatabaseClient, HttpMethod, HttpRequest, HttpResponse,
    ReqwestClient, XML_CONTENT_TYPE,
};
pub use memory::InMemoryDatabase;
