//! Sync proxy entry point.

use anyhow::Context;
use deploynotes_core::{default_log_level, init_logging};
use deploynotes_proxy::{app, ProxyConfig};
use log::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let level = std::env::var("PROXY_LOG_LEVEL").unwrap_or_else(|_| default_log_level().into());
    let log_dir = std::env::var("PROXY_LOG_DIR").ok();
    init_logging(&level, log_dir.as_deref()).map_err(anyhow::Error::msg)?;

    let config = ProxyConfig::from_env().context("invalid proxy configuration")?;
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(
        "event=proxy_start module=proxy status=ok bind_addr={} file={}",
        config.bind_addr, config.file_name
    );

    axum::serve(listener, app(&config))
        .await
        .context("proxy server stopped")?;
    Ok(())
}
