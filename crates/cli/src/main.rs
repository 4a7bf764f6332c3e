//! KnowRoute CLI: the main entry point.
//!
//! Commands:
//! - `route`: Route a conversation payload and print the result
//! - `candidates`: List the collections a user may read
//! - `parse`: Run the response parser on a completion offline
//! - `init`: Write a default config and an empty catalog
//! - `doctor`: Diagnose configuration, catalog, and provider

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "knowroute",
    about = "KnowRoute: pick the knowledge base a conversation needs",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Route one conversation turn
    Route {
        /// Payload JSON file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        payload: String,

        /// Requesting user id
        #[arg(short, long, env = "KNOWROUTE_USER")]
        user: String,

        /// Catalog file (defaults to `storage.catalog_path`)
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Suppress status events
        #[arg(long)]
        no_status: bool,
    },

    /// List collections readable by a user
    Candidates {
        #[arg(short, long, env = "KNOWROUTE_USER")]
        user: String,

        #[arg(short, long)]
        catalog: Option<PathBuf>,
    },

    /// Parse a classifier completion into a selection
    Parse {
        /// Completion text, or `-` for stdin
        #[arg(default_value = "-")]
        text: String,
    },

    /// Initialize configuration and catalog
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Diagnose system health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries command output
    let filter = if cli.verbose { "debug" } else { "warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if cli.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }

    match cli.command {
        Commands::Route {
            payload,
            user,
            catalog,
            no_status,
        } => commands::route::run(&payload, &user, catalog, no_status).await?,
        Commands::Candidates { user, catalog } => {
            commands::candidates::run(&user, catalog).await?
        }
        Commands::Parse { text } => commands::parse::run(&text)?,
        Commands::Init { force } => commands::init::run(force)?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
