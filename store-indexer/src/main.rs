//! Store Indexer - command line entry point.
//!
//! Loads `.env`, reads the configuration from the environment, applies
//! command line overrides, initializes dependencies and runs one
//! administrative or search command.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, warn};

use store_indexer::commands::{self, AdminCommand, SearchCommand};
use store_indexer::{logging, Dependencies, IndexerConfig, IndexingError};

#[derive(Parser)]
#[command(name = "store-indexer")]
#[command(about = "Keeps the store search index in sync and queries it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// OpenSearch URL (overrides OPENSEARCH_URL)
    #[arg(long, global = true)]
    opensearch_url: Option<String>,

    /// Index alias (overrides STORE_INDEX_ALIAS)
    #[arg(long, global = true)]
    index_alias: Option<String>,

    /// System-of-record export file (overrides STORE_EXPORT_PATH)
    #[arg(long, global = true)]
    export_path: Option<PathBuf>,

    /// Stores per reindex batch (overrides REINDEX_BATCH_SIZE)
    #[arg(long, global = true)]
    batch_size: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    #[command(flatten)]
    Admin(AdminCommand),
    /// Query the index
    #[command(subcommand)]
    Search(SearchCommand),
}

impl Cli {
    fn apply_overrides(&self, config: &mut IndexerConfig) {
        if let Some(url) = &self.opensearch_url {
            config.opensearch_url = url.clone();
        }
        if let Some(alias) = &self.index_alias {
            config.index.alias = alias.clone();
        }
        if let Some(path) = &self.export_path {
            config.export_path = path.clone();
        }
        if let Some(batch_size) = self.batch_size {
            config.reindex.batch_size = batch_size;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = match IndexerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    cli.apply_overrides(&mut config);
    logging::init(config.log_format);

    let result = tokio::select! {
        result = run(&config, cli.command) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, stopping");
            return ExitCode::from(130);
        }
    };

    match result {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("Error: {}", e);

            let mut source = e.source();
            while let Some(err) = source {
                eprintln!("  Caused by: {}", err);
                source = err.source();
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &IndexerConfig, command: Command) -> Result<String, IndexingError> {
    let deps = Dependencies::new(config).await?;
    match command {
        Command::Admin(command) => commands::run_admin(&deps, command).await,
        Command::Search(command) => commands::run_search(&deps, command).await,
    }
}
