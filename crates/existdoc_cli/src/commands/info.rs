//! Info command implementation.

use super::{CommandError, CommandResult};
use existdoc_core::ConnectionUrl;
use serde::Serialize;

/// What a connection URL resolves to.
#[derive(Debug, Serialize)]
pub struct UrlInfo {
    /// HTTP base URL of the server.
    pub base_url: String,
    /// User name, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Whether a password was given.
    pub has_password: bool,
    /// Collection of the document.
    pub collection: String,
    /// Filename of the document.
    pub filename: String,
}

impl UrlInfo {
    /// Builds the info for a parsed URL.
    pub fn from_url(url: &ConnectionUrl) -> Self {
        let config = url.client_config();
        Self {
            base_url: config.base_url(),
            user: config.user.clone(),
            has_password: config.password.is_some(),
            collection: url.address().collection().to_string(),
            filename: url.address().filename().to_string(),
        }
    }
}

/// Runs the info command.
pub fn run(url: &str, format: &str) -> CommandResult<()> {
    let info = UrlInfo::from_url(&ConnectionUrl::parse(url)?);

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&info)?),
        "text" => {
            println!("Server:     {}", info.base_url);
            if let Some(user) = &info.user {
                println!("User:       {}", user);
            }
            println!("Collection: {}", info.collection);
            println!("Filename:   {}", info.filename);
        }
        other => return Err(CommandError::UnsupportedFormat(other.to_string())),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_from_url() {
        let url =
            ConnectionUrl::parse("existdb://admin:@localhost:8080/exist/db/apps/a.xml").unwrap();
        let info = UrlInfo::from_url(&url);
        assert_eq!(info.base_url, "http://localhost:8080");
        assert_eq!(info.user.as_deref(), Some("admin"));
        assert!(!info.has_password);
        assert_eq!(info.collection, "/exist/db/apps");
        assert_eq!(info.filename, "a.xml");
    }

    #[test]
    fn unknown_format_is_rejected() {
        let result = run("existdb://localhost/exist/db/a.xml", "yaml");
        assert!(matches!(result, Err(CommandError::UnsupportedFormat(_))));
    }
}
