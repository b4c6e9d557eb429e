//! In-memory database for testing.

use crate::client::{Connector, DatabaseClient, RemoteResponse};
use crate::config::ClientConfig;
use crate::connection::{strip_mount, MOUNT};
use crate::error::{ExistError, ExistResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// An in-memory document database.
///
/// Documents are kept in a map from absolute path to content. Paths are
/// addressed the way the REST interface addresses them: a leading mount
/// segment (`/exist`) is ignored, so `/exist/db/a.xml` and `/db/a.xml`
/// name the same document.
///
/// Clones share the same documents and root collection.
///
/// # Example
///
/// ```rust
/// use existdoc_core::{DatabaseClient, InMemoryDatabase};
///
/// let db = InMemoryDatabase::new().with_document("/db/a.xml", b"<a/>");
/// assert!(db.get("/exist/db/a.xml").unwrap().is_success());
/// assert!(db.get("/db/b.xml").unwrap().is_not_found());
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryDatabase {
    documents: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
    root_collection: Arc<RwLock<String>>,
    read_only: Arc<AtomicBool>,
    offline: Arc<AtomicBool>,
}

impl InMemoryDatabase {
    /// Creates an empty database with root collection `/`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(BTreeMap::new())),
            root_collection: Arc::new(RwLock::new("/".to_string())),
            read_only: Arc::new(AtomicBool::new(false)),
            offline: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Adds a document.
    #[must_use]
    pub fn with_document(self, path: &str, content: &[u8]) -> Self {
        self.documents
            .write()
            .insert(storage_key(path), content.to_vec());
        self
    }

    /// Returns the content stored at `path`.
    pub fn document(&self, path: &str) -> Option<Vec<u8>> {
        self.documents.read().get(&storage_key(path)).cloned()
    }

    /// Returns true if a document is stored at `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.documents.read().contains_key(&storage_key(path))
    }

    /// Returns the paths of all stored documents, sorted.
    pub fn paths(&self) -> Vec<String> {
        self.documents.read().keys().cloned().collect()
    }

    /// Returns the number of stored documents.
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Returns true if no documents are stored.
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Makes writes and deletes answer `403 Forbidden`.
    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }

    /// Makes every request fail without a status.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> ExistResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(ExistError::Transport("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

impl Default for InMemoryDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl DatabaseClient for InMemoryDatabase {
    fn root_collection(&self) -> String {
        self.root_collection.read().clone()
    }

    fn set_root_collection(&self, collection: &str) {
        *self.root_collection.write() = collection.to_string();
    }

    fn get(&self, path: &str) -> ExistResult<RemoteResponse> {
        self.check_online()?;
        Ok(match self.document(path) {
            Some(content) => RemoteResponse::new(200, content),
            None => RemoteResponse::with_status(404),
        })
    }

    fn put(&self, path: &str, body: &[u8]) -> ExistResult<RemoteResponse> {
        self.check_online()?;
        if self.read_only.load(Ordering::SeqCst) {
            return Ok(RemoteResponse::with_status(403));
        }
        self.documents.write().insert(storage_key(path), body.to_vec());
        Ok(RemoteResponse::with_status(201))
    }

    fn delete(&self, path: &str) -> ExistResult<RemoteResponse> {
        self.check_online()?;
        if self.read_only.load(Ordering::SeqCst) {
            return Ok(RemoteResponse::with_status(403));
        }
        Ok(match self.documents.write().remove(&storage_key(path)) {
            Some(_) => RemoteResponse::with_status(200),
            None => RemoteResponse::with_status(404),
        })
    }
}

impl Connector for InMemoryDatabase {
    fn connect(&self, _config: &ClientConfig) -> ExistResult<Arc<dyn DatabaseClient>> {
        Ok(Arc::new(self.clone()))
    }
}

fn storage_key(path: &str) -> String {
    strip_mount(path, MOUNT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_new_is_empty() {
        let db = InMemoryDatabase::new();
        assert!(db.is_empty());
        assert_eq!(db.root_collection(), "/");
    }

    #[test]
    fn memory_put_get_delete() {
        let db = InMemoryDatabase::new();
        assert!(db.put("/db/a.xml", b"<a/>").unwrap().is_success());
        assert_eq!(db.get("/db/a.xml").unwrap().body, b"<a/>");
        assert!(db.delete("/db/a.xml").unwrap().is_success());
        assert!(db.get("/db/a.xml").unwrap().is_not_found());
        assert!(db.delete("/db/a.xml").unwrap().is_not_found());
    }

    #[test]
    fn mount_prefix_is_ignored() {
        let db = InMemoryDatabase::new().with_document("/exist/db/a.xml", b"<a/>");
        assert!(db.contains("/db/a.xml"));
        assert_eq!(db.paths(), vec!["/db/a.xml".to_string()]);

        // a collection merely starting with the mount name is left alone
        let db = db.with_document("/existing/b.xml", b"<b/>");
        assert!(db.contains("/existing/b.xml"));
    }

    #[test]
    fn clones_share_state() {
        let db = InMemoryDatabase::new();
        let other = db.clone();
        other.set_root_collection("/db/apps");
        other.put("/db/a.xml", b"<a/>").unwrap();
        assert_eq!(db.root_collection(), "/db/apps");
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn read_only_rejects_writes() {
        let db = InMemoryDatabase::new().with_document("/db/a.xml", b"<a/>");
        db.set_read_only(true);
        assert_eq!(db.put("/db/b.xml", b"<b/>").unwrap().status, 403);
        assert_eq!(db.delete("/db/a.xml").unwrap().status, 403);
        assert!(db.get("/db/a.xml").unwrap().is_success());
    }

    #[test]
    fn offline_fails_without_status() {
        let db = InMemoryDatabase::new();
        db.set_offline(true);
        assert!(matches!(db.get("/db/a.xml"), Err(ExistError::Transport(_))));
    }
}
