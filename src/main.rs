// src/main.rs

use anyhow::Result;
use clap::{Parser, Subcommand};
use ladle::server::config::LadleConfig;
use ladle::server::run_server;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ladle")]
#[command(author, version, about = "Recipe-sharing REST backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the Ladle database
    Init {
        /// Database path
        #[arg(short, long, default_value = "ladle.db")]
        db_path: PathBuf,
    },
    /// Run the HTTP server
    Serve {
        /// Optional TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ladle=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve { config: None }) {
        Commands::Init { db_path } => {
            ladle::db::open(&db_path)?;
            info!("Database initialized at {:?}", db_path);
        }
        Commands::Serve { config } => {
            let config = LadleConfig::load(config.as_deref())?.into_server_config()?;
            run_server(config).await?;
        }
    }

    Ok(())
}
