//! Quiver command-line host
//!
//! Drives the asset panel engine headlessly: sync the remote catalog, list
//! folders, browse a folder/search view page by page, and resolve download
//! locations.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quiver_logging::{init_logging, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

use cli::context::GlobalArgs;

#[derive(Parser, Debug)]
#[command(name = "quiver", about = "Browse and sync a remote asset catalog", version)]
struct Cli {
    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Config file (default: <quiver home>/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// API key sent as a bearer token
    #[arg(long, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download the full catalog and report what was found
    Sync {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List folders under a parent (roots by default)
    Folders {
        /// Parent folder id
        #[arg(long)]
        parent: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the asset grid for a folder and search query
    Browse {
        /// `all`, `favorites`, or a folder id (default: last viewed folder)
        #[arg(short, long)]
        folder: Option<String>,

        /// Case-insensitive name filter
        #[arg(short, long)]
        search: Option<String>,

        /// Number of "load more" increments to show
        #[arg(short, long, default_value = "1")]
        pages: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark or unmark an asset as favorite
    Favorite {
        /// Asset id
        asset_id: String,
    },

    /// Resolve the download URL of an asset
    Locate {
        /// Asset id
        asset_id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Commands {
    fn wants_json(&self) -> bool {
        match self {
            Commands::Sync { json }
            | Commands::Folders { json, .. }
            | Commands::Browse { json, .. }
            | Commands::Locate { json, .. } => *json,
            Commands::Favorite { .. } => false,
        }
    }
}

fn run_command(cli: Cli) -> Result<()> {
    let globals = GlobalArgs {
        config: cli.config,
        api_url: cli.api_url,
        api_key: cli.api_key,
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(async move {
        match cli.command {
            Commands::Sync { json } => cli::sync::run(&globals, json).await,
            Commands::Folders { parent, json } => cli::folders::run(&globals, parent, json).await,
            Commands::Browse {
                folder,
                search,
                pages,
                json,
            } => {
                let args = cli::browse::BrowseArgs {
                    folder,
                    search,
                    pages,
                    json,
                };
                cli::browse::run(&globals, args).await
            }
            Commands::Favorite { asset_id } => cli::favorite::run(&asset_id),
            Commands::Locate { asset_id, json } => {
                cli::locate::run(&globals, &asset_id, json).await
            }
        }
    })
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_mode = cli.command.wants_json();

    if let Err(err) = init_logging(LogConfig {
        app_name: "quiver",
        verbose: cli.verbose,
    }) {
        eprintln!("Warning: failed to initialize logging: {:#}", err);
    }

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if json_mode {
                cli::output::print_json_error(&err);
            } else {
                eprintln!("Error: {:?}", err);
            }
            ExitCode::from(1)
        }
    }
}
