//! Job Test Run Server Entrypoint
//!
//! Usage: testrun-server rpc --catalog <FILE> [--config <FILE>]
//!
//! Reads a single JSON page request from stdin, handles it against the
//! catalog, and writes the JSON envelope to stdout.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use testrun_server::{logging, Catalog, InMemoryStore, PageHandler, ServerConfig};

#[derive(Parser)]
#[command(name = "testrun-server")]
#[command(about = "Job test run page handler", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Handle one request from stdin
    Rpc {
        /// Catalog of jobs, environments, examples and recent runs
        #[arg(long)]
        catalog: PathBuf,

        /// Server config file (TOML)
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,

        /// Write the updated catalog back after the request
        #[arg(long)]
        persist: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Rpc { catalog, config, persist } => run_rpc(catalog, config, persist),
    }
}

fn run_rpc(catalog_path: PathBuf, config_path: Option<PathBuf>, persist: bool) -> ExitCode {
    let config = match config_path {
        Some(path) => match ServerConfig::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading config {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => ServerConfig::default(),
    };
    logging::init(&config.log_level);

    let catalog = match Catalog::from_file(&catalog_path) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("Error loading catalog {}: {}", catalog_path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let store = InMemoryStore::new(catalog, &config);
    let handler = PageHandler::new(store.clone(), store.clone());

    if let Err(e) = handler.run() {
        eprintln!("RPC handler error: {}", e);
        return ExitCode::FAILURE;
    }

    if persist {
        let json = match serde_json::to_string_pretty(&store.catalog()) {
            Ok(json) => json,
            Err(e) => {
                eprintln!("Error serializing catalog: {}", e);
                return ExitCode::FAILURE;
            }
        };
        if let Err(e) = std::fs::write(&catalog_path, json) {
            eprintln!("Error writing catalog {}: {}", catalog_path.display(), e);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
