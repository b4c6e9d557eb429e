//! Documents and their tracked remote address.

use crate::address::RemoteAddress;
use crate::client::{validate, ClientSlot};
use crate::config::DocumentConfig;
use crate::error::{ExistError, ExistResult};
use std::borrow::Cow;
use std::fs;
use std::path::Path;

/// Whether a document has a remote counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// The document exists only locally.
    Unbound,
    /// The document tracks a remote address.
    Bound,
}

/// The address a document tracks and whether it is known to exist there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Tracked {
    pub(crate) address: RemoteAddress,
    pub(crate) synced: bool,
}

/// An XML document that can be synchronized with the database.
///
/// The document content is treated as opaque bytes. A document starts out
/// [`SyncStatus::Unbound`] when built from content and
/// [`SyncStatus::Bound`] when loaded; see [`Document::store`] and
/// [`Document::delete`] for the transitions.
///
/// A document is not internally synchronized. Calls that mutate it must be
/// serialized by its owner; the bound client may be shared freely.
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) source: Vec<u8>,
    pub(crate) source_url: Option<String>,
    pub(crate) origin: Option<String>,
    pub(crate) config: DocumentConfig,
    pub(crate) tracked: Option<Tracked>,
}

impl Document {
    /// Creates an unbound document without a client.
    pub fn new(source: impl Into<Vec<u8>>) -> Self {
        Self {
            source: source.into(),
            source_url: None,
            origin: None,
            config: DocumentConfig::default(),
            tracked: None,
        }
    }

    /// Creates an unbound document bound to a client.
    ///
    /// # Errors
    ///
    /// Returns [`ExistError::Config`] if `client` is not a usable client.
    pub fn with_client(source: impl Into<Vec<u8>>, client: ClientSlot) -> ExistResult<Self> {
        validate(&client)?;
        let mut document = Self::new(source);
        document.config = DocumentConfig::new(client);
        Ok(document)
    }

    /// Reads a document from a local file.
    ///
    /// The file name becomes the document's origin, which a store without
    /// an explicit filename falls back to.
    ///
    /// # Errors
    ///
    /// Returns [`ExistError::Io`] if the file cannot be read and
    /// [`ExistError::Config`] if `client` is not a usable client.
    pub fn from_file(path: impl AsRef<Path>, client: ClientSlot) -> ExistResult<Self> {
        let path = path.as_ref();
        let source = fs::read(path)?;
        let origin = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned());
        let mut document = Self::with_client(source, client)?;
        document.origin = origin;
        Ok(document)
    }

    /// Sets the local origin filename.
    pub fn with_origin(mut self, filename: impl Into<String>) -> Self {
        self.origin = Some(filename.into());
        self
    }

    /// Returns the serialized content.
    pub fn source(&self) -> &[u8] {
        &self.source
    }

    /// Returns the content as text, replacing invalid UTF-8.
    pub fn source_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.source)
    }

    /// Replaces the content. The tracked address is unaffected.
    pub fn set_source(&mut self, source: impl Into<Vec<u8>>) {
        self.source = source.into();
    }

    /// Returns the URL the document was loaded from.
    pub fn source_url(&self) -> Option<&str> {
        self.source_url.as_deref()
    }

    /// Returns the local origin filename.
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    /// Returns the configuration.
    pub fn config(&self) -> &DocumentConfig {
        &self.config
    }

    /// Returns the configuration for modification.
    pub fn config_mut(&mut self) -> &mut DocumentConfig {
        &mut self.config
    }

    /// Returns the sync status.
    pub fn status(&self) -> SyncStatus {
        match self.tracked {
            Some(_) => SyncStatus::Bound,
            None => SyncStatus::Unbound,
        }
    }

    /// Returns the tracked address.
    pub fn remote_address(&self) -> Option<&RemoteAddress> {
        self.tracked.as_ref().map(|t| &t.address)
    }

    /// Returns true if the document is known to exist at its tracked
    /// address.
    pub fn is_synced(&self) -> bool {
        self.tracked.as_ref().is_some_and(|t| t.synced)
    }

    /// Returns the tracked collection.
    pub fn collection(&self) -> Option<&str> {
        self.remote_address().map(RemoteAddress::collection)
    }

    /// Returns the tracked filename.
    pub fn filename(&self) -> Option<&str> {
        self.remote_address().map(RemoteAddress::filename)
    }

    /// Returns the tracked absolute path.
    pub fn filepath(&self) -> Option<String> {
        self.remote_address().map(RemoteAddress::filepath)
    }

    /// Rebases the document onto another filename in the same collection.
    ///
    /// The document is not known to exist at the new address, so the next
    /// store to it does not need `replace_existing`.
    ///
    /// # Errors
    ///
    /// - [`ExistError::NoRemoteAddress`] if the document is unbound
    /// - [`ExistError::InvalidPath`] if `filename` is malformed
    pub fn set_filename(&mut self, filename: &str) -> ExistResult<()> {
        let tracked = self.tracked.as_mut().ok_or(ExistError::NoRemoteAddress)?;
        let address = tracked.address.with_filename(filename)?;
        if address != tracked.address {
            tracked.address = address;
            tracked.synced = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryDatabase;
    use std::io::Write;
    use std::sync::Arc;

    fn bound(collection: &str, filename: &str) -> Document {
        let mut document = Document::new("<a/>");
        document.tracked = Some(Tracked {
            address: RemoteAddress::new(collection, filename).unwrap(),
            synced: true,
        });
        document
    }

    #[test]
    fn new_document_is_unbound() {
        let document = Document::new("<foo/>");
        assert_eq!(document.status(), SyncStatus::Unbound);
        assert_eq!(document.collection(), None);
        assert_eq!(document.filename(), None);
        assert_eq!(document.source_text(), "<foo/>");
        assert!(!document.is_synced());
    }

    #[test]
    fn with_client_validates() {
        let db = Arc::new(InMemoryDatabase::new());
        assert!(Document::with_client("<foo/>", ClientSlot::bound(db)).is_ok());

        let err = Document::with_client("<foo/>", ClientSlot::foreign(0)).unwrap_err();
        assert!(matches!(err, ExistError::Config(_)));
        assert!(matches!(
            Document::with_client("<foo/>", ClientSlot::Empty),
            Err(ExistError::Config(_))
        ));
    }

    #[test]
    fn set_filename_keeps_collection() {
        let mut document = bound("/db/apps", "sample.xml");
        assert_eq!(document.filename(), Some("sample.xml"));

        document.set_filename("test.xml").unwrap();
        assert_eq!(document.filename(), Some("test.xml"));
        assert_eq!(document.collection(), Some("/db/apps"));
        assert_eq!(document.filepath().as_deref(), Some("/db/apps/test.xml"));
        assert!(!document.is_synced());
    }

    #[test]
    fn set_filename_to_same_name_stays_synced() {
        let mut document = bound("/db", "sample.xml");
        document.set_filename("sample.xml").unwrap();
        assert!(document.is_synced());
    }

    #[test]
    fn set_filename_requires_address() {
        let mut document = Document::new("<a/>");
        assert!(matches!(
            document.set_filename("a.xml"),
            Err(ExistError::NoRemoteAddress)
        ));

        let mut document = bound("/db", "a.xml");
        assert!(matches!(
            document.set_filename("sub/a.xml"),
            Err(ExistError::InvalidPath { .. })
        ));
        assert_eq!(document.filename(), Some("a.xml"));
    }

    #[test]
    fn from_file_records_origin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.xml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"<local/>").unwrap();

        let db = Arc::new(InMemoryDatabase::new());
        let document = Document::from_file(&path, ClientSlot::bound(db)).unwrap();
        assert_eq!(document.origin(), Some("local.xml"));
        assert_eq!(document.source(), b"<local/>");
        assert_eq!(document.status(), SyncStatus::Unbound);
    }

    #[test]
    fn from_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Document::from_file(dir.path().join("missing.xml"), ClientSlot::Empty)
            .unwrap_err();
        assert!(matches!(err, ExistError::Io(_)));
    }
}
