//! Put command implementation.

use super::CommandResult;
use existdoc_core::{ClientSlot, ConnectionUrl, Connector, Document, HttpConnector, StoreOptions};
use std::path::Path;
use tracing::info;

/// Runs the put command.
///
/// The document is stored at the exact address named by `url`; an
/// existing document there is replaced.
pub fn run(file: &Path, url: &str) -> CommandResult<()> {
    run_with(&HttpConnector, file, url)
}

/// Runs the put command, creating the client with `connector`.
pub fn run_with(connector: &dyn Connector, file: &Path, url: &str) -> CommandResult<()> {
    let (config, address) = ConnectionUrl::parse(url)?.into_parts();
    let client = connector.connect(&config)?;

    let mut document = Document::from_file(file, ClientSlot::bound(client))?;
    document.store(&StoreOptions::new().with_filepath(address.filepath()))?;

    info!("Stored {:?} at {}", file, address);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::CommandError;
    use existdoc_core::{ExistError, InMemoryDatabase};

    #[test]
    fn put_stores_file_at_url_address() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("local.xml");
        std::fs::write(&file, b"<local/>").unwrap();

        let db = InMemoryDatabase::new().with_document("/db/apps/a.xml", b"<old/>");
        run_with(&db, &file, "existdb://admin:@localhost/exist/db/apps/a.xml").unwrap();
        assert_eq!(db.document("/db/apps/a.xml").unwrap(), b"<local/>");
        assert!(!db.contains("/db/apps/local.xml"));
    }

    #[test]
    fn put_missing_file_fails_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let db = InMemoryDatabase::new();
        let result = run_with(
            &db,
            &dir.path().join("missing.xml"),
            "existdb://localhost/exist/db/a.xml",
        );
        assert!(matches!(result, Err(CommandError::Exist(ExistError::Io(_)))));
        assert!(db.is_empty());
    }
}
