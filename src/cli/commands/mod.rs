//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod helpers;
mod init;
mod list;
mod purge;
mod scrape;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use jobcrawl::config::{load_settings_with_options, LoadOptions};

#[derive(Parser)]
#[command(name = "jobcrawl")]
#[command(about = "Crawl job listings and keep new postings")]
#[command(version)]
pub struct Cli {
    /// Data directory (overrides config file and JOBCRAWL_DATA_DIR).
    #[arg(long, short = 't', global = true)]
    target: Option<PathBuf>,

    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory and database
    Init,

    /// Crawl the listing pages once and store new jobs
    Scrape,

    /// List stored jobs
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete all stored jobs
    Purge,

    /// Start the HTTP API and the daily scheduler
    Serve {
        /// Address to bind (port, host, or host:port)
        #[arg(long, default_value = "127.0.0.1:3000")]
        bind: String,

        /// Do not run the scheduled scrape
        #[arg(long)]
        no_schedule: bool,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config,
        data: cli.target,
    };
    let (settings, _config) = load_settings_with_options(options).await;

    match cli.command {
        Commands::Init => init::cmd_init(&settings).await,
        Commands::Scrape => scrape::cmd_scrape(&settings).await,
        Commands::List { json } => list::cmd_list(&settings, json).await,
        Commands::Purge => purge::cmd_purge(&settings).await,
        Commands::Serve { bind, no_schedule } => {
            serve::cmd_serve(&settings, &bind, !no_schedule).await
        }
    }
}
