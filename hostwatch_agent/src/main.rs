//! hostwatch_agent entry point: config, logging, bind, serve.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use hostwatch_agent::config::{AgentConfig, Cli};
use hostwatch_agent::metrics::SysinfoSource;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match AgentConfig::from_env_and_args() {
        Ok(Cli::Run(c)) => c,
        Ok(Cli::Help(text)) => {
            println!("{text}");
            return Ok(());
        }
        Err(msg) => anyhow::bail!(msg),
    };

    let source = Arc::new(SysinfoSource::new(config.disk_path.clone()));
    info!("reporting disk usage for {}", source.disk_path().display());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("hostwatch_agent listening on {}", listener.local_addr()?);

    hostwatch_agent::serve(listener, &config, source, shutdown_signal()).await?;
    info!("hostwatch_agent stopped");
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown requested");
}
