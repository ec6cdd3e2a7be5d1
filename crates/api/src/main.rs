//! Chorale API server entry point

use anyhow::{Context, Result};
use chorale_api::{app, AppContext};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = chorale_infra::config::load().context("failed to load configuration")?;
    let ctx = AppContext::new(&config).context("failed to initialise application context")?;

    let addr = config.server.bind_addr.clone();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "chorale-api listening");

    axum::serve(listener, app(ctx)).await.context("server error")?;

    Ok(())
}
