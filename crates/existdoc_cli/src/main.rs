//! existdoc CLI
//!
//! Command-line access to documents stored in eXist-db.
//!
//! # Commands
//!
//! - `get` - Fetch a document
//! - `put` - Store a local file
//! - `delete` - Delete a document
//! - `info` - Show what a connection URL resolves to

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Command-line access to documents stored in eXist-db.
#[derive(Parser)]
#[command(name = "existdoc")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a document and print it
    Get {
        /// Connection URL, e.g. existdb://admin:@localhost:8080/exist/db/a.xml
        url: String,

        /// Write the document to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Store a local file at a connection URL
    Put {
        /// File to upload
        file: PathBuf,

        /// Connection URL of the target document
        url: String,
    },

    /// Delete the document at a connection URL
    Delete {
        /// Connection URL of the document
        url: String,
    },

    /// Show the client settings and address a connection URL resolves to
    Info {
        /// Connection URL
        url: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Get { url, output } => commands::get::run(&url, output.as_deref())?,
        Commands::Put { file, url } => commands::put::run(&file, &url)?,
        Commands::Delete { url } => commands::delete::run(&url)?,
        Commands::Info { url, format } => commands::info::run(&url, &format)?,
    }

    Ok(())
}
