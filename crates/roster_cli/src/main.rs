//! Roster CLI
//!
//! Command-line front end for the offline roster editor.
//!
//! # Commands
//!
//! - `inspect` - Display store contents and sync status
//! - `search` - Search the local roster
//! - `edit` - Queue an edit to a person's editable fields
//! - `pending` - List edits waiting for upload
//! - `login` / `logout` - Manage the stored login
//! - `sync` - Run one sync attempt now
//! - `watch` - Run scheduled syncs until interrupted

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Offline roster editor tools.
#[derive(Parser)]
#[command(name = "roster")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the data directory
    #[arg(global = true, short, long)]
    path: Option<PathBuf>,

    /// Sync endpoint URL
    #[arg(global = true, short, long, env = "ROSTER_SYNC_URL")]
    endpoint: Option<String>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display store contents and sync status
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Search by identity, name, row or seat
    Search {
        /// Query text
        query: String,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Queue an edit to a person's editable fields
    Edit {
        /// Identity of the person
        id: u64,

        /// Credential level
        #[arg(short, long)]
        credential: String,

        /// Training (only kept for the "No Sanad" level)
        #[arg(short, long, default_value = "")]
        training: String,

        /// Contact number
        #[arg(long)]
        contact: String,
    },

    /// List edits waiting for upload
    Pending {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Log in as an allowed identity
    Login {
        /// Identity to log in as
        id: u64,
    },

    /// Clear the stored login
    Logout,

    /// Run one sync attempt now
    Sync,

    /// Run scheduled syncs until interrupted
    Watch,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let endpoint = cli.endpoint.unwrap_or_default();

    match cli.command {
        Commands::Inspect { format } => {
            let path = cli.path.ok_or("Data directory required for inspect")?;
            commands::inspect::run(&path, &format)?;
        }
        Commands::Search { query, format } => {
            let path = cli.path.ok_or("Data directory required for search")?;
            commands::search::run(&path, &query, &format)?;
        }
        Commands::Edit {
            id,
            credential,
            training,
            contact,
        } => {
            let path = cli.path.ok_or("Data directory required for edit")?;
            commands::edit::run(&path, id, credential, training, contact)?;
        }
        Commands::Pending { format } => {
            let path = cli.path.ok_or("Data directory required for pending")?;
            commands::pending::run(&path, &format)?;
        }
        Commands::Login { id } => {
            let path = cli.path.ok_or("Data directory required for login")?;
            commands::session::login(&path, &endpoint, id).await?;
        }
        Commands::Logout => {
            let path = cli.path.ok_or("Data directory required for logout")?;
            commands::session::logout(&path)?;
        }
        Commands::Sync => {
            let path = cli.path.ok_or("Data directory required for sync")?;
            commands::sync::run(&path, &endpoint).await?;
        }
        Commands::Watch => {
            let path = cli.path.ok_or("Data directory required for watch")?;
            commands::watch::run(&path, &endpoint).await?;
        }
        Commands::Version => {
            println!("Roster CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Roster Core v{}", roster_core::VERSION);
        }
    }

    Ok(())
}
