//! Binary entry point: parse CLI, init logging, build config, run the
//! server (spec §10.1-§10.3 ambient stack).

use anyhow::Context;
use clap::Parser;
use webserver_core::{Cli, ServerConfig};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(
            |_| tracing_subscriber::EnvFilter::new("info"),
        ))
        .init();

    let cli = Cli::parse();
    let config = ServerConfig::from_cli(cli).context("invalid configuration")?;

    webserver_core::server::run(config).context("server exited with an error")?;
    Ok(())
}
