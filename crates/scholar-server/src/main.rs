//! Scholar server binary
//!
//! Serves the research, annotation and citation endpoints over HTTP.

use anyhow::Context;
use clap::Parser;
use scholar_server::{config::ServerConfig, start_server};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "scholar-server")]
#[command(version, about = "Research assistant HTTP service", long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "SCHOLAR_CONFIG")]
    config: Option<PathBuf>,

    /// Override the configured port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log to stderr; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => {
            tracing::warn!("No config file specified, using default test configuration");
            ServerConfig::default_test_config()
        }
    };

    if let Some(port) = args.port {
        config.bind_port = port;
    }

    start_server(config).await.context("Server exited")?;
    Ok(())
}
