use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use keyhttpd::config::Config;
use keyhttpd::server;

/// Serves static files and forwards `?key=` lookups to a UDP backend.
#[derive(Debug, Parser)]
#[command(name = "keyhttpd", version)]
struct Cli {
    /// TCP port to accept HTTP connections on
    server_port: u16,

    /// UDP port of the lookup backend
    db_port: u16,

    /// Optional YAML file overriding defaults
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .with_level(true)
        .init();

    let mut cfg = Config::load(cli.server_port, cli.db_port);
    if let Some(path) = &cli.config {
        cfg = cfg.merge_file(path)?;
    }
    cfg.validate()?;

    tokio::select! {
        res = server::listener::run(&cfg) => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
