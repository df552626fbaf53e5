//! fetch-cache CLI entrypoint.

use clap::Parser;
use fetch_cache::{CacheStorage, StorageConfig};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod handlers;

#[cfg(test)]
mod handlers_tests;

use commands::{Commands, ConfigCommands};
use config::CliConfig;

#[derive(Parser)]
#[command(name = "fetch-cache")]
#[command(author, version, about = "Inspect and populate fetch-cache storage", long_about = None)]
struct Cli {
    /// Cache root directory (overrides config and FETCH_CACHE_DIR)
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load_or_default();
    let storage = CacheStorage::new(StorageConfig::resolve(
        cli.cache_dir.or_else(|| config.cache_dir.clone()),
    ));
    let format = config.output_format;
    tracing::debug!(root = %storage.root().display(), "Using cache root");

    match cli.command {
        Commands::List => handlers::list_caches(&storage, format).await?,
        Commands::Has { name } => {
            if !handlers::has_cache(&storage, &name).await? {
                std::process::exit(1);
            }
        }
        Commands::Delete { name } => {
            handlers::delete_cache(&storage, &name).await?;
        }
        Commands::Keys { cache, url, query } => {
            handlers::list_keys(&storage, &cache, url.as_deref(), &query, format).await?;
        }
        Commands::Match { url, cache, query } => {
            if handlers::match_url(&storage, &url, cache.as_deref(), &query, format)
                .await?
                .is_none()
            {
                std::process::exit(1);
            }
        }
        Commands::Add { cache, urls } => handlers::add_urls(&storage, &cache, &urls).await?,
        Commands::Remove { cache, url, query } => {
            handlers::remove_entry(&storage, &cache, &url, &query).await?;
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => handlers::show_config(&config, &storage)?,
            ConfigCommands::Set { key, value } => handlers::set_config(&key, &value)?,
        },
    }

    Ok(())
}
