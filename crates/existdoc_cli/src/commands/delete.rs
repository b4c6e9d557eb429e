//! Delete command implementation.

use super::CommandResult;
use existdoc_core::{Connector, Document, HttpConnector};
use tracing::info;

/// Runs the delete command.
pub fn run(url: &str) -> CommandResult<()> {
    run_with(&HttpConnector, url)
}

/// Runs the delete command, creating the client with `connector`.
pub fn run_with(connector: &dyn Connector, url: &str) -> CommandResult<()> {
    let mut document = Document::load_with_connector(url, connector)?;
    let path = document.filepath().unwrap_or_default();
    document.delete()?;

    info!("Deleted {}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use existdoc_core::InMemoryDatabase;

    #[test]
    fn delete_removes_document() {
        let db = InMemoryDatabase::new()
            .with_document("/db/a.xml", b"<a/>")
            .with_document("/db/b.xml", b"<b/>");

        run_with(&db, "existdb://localhost/exist/db/a.xml").unwrap();
        assert!(!db.contains("/db/a.xml"));
        assert!(db.contains("/db/b.xml"));
    }

    #[test]
    fn delete_missing_document_fails() {
        let db = InMemoryDatabase::new();
        assert!(run_with(&db, "existdb://localhost/exist/db/a.xml").is_err());
    }
}
