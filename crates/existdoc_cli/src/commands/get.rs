//! Get command implementation.

use super::CommandResult;
use existdoc_core::{Connector, Document, HttpConnector};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Runs the get command.
pub fn run(url: &str, output: Option<&Path>) -> CommandResult<()> {
    run_with(&HttpConnector, url, output)
}

/// Runs the get command, creating the client with `connector`.
pub fn run_with(
    connector: &dyn Connector,
    url: &str,
    output: Option<&Path>,
) -> CommandResult<()> {
    let document = Document::load_with_connector(url, connector)?;

    match output {
        Some(path) => {
            std::fs::write(path, document.source())?;
            info!("Wrote {} bytes to {:?}", document.source().len(), path);
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(document.source())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
