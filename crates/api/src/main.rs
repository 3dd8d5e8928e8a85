use std::sync::Arc;

use anyhow::Context;

use gemcart_api::app::{build_app, AppServices};
use gemcart_infra::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    gemcart_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let services = AppServices::from_config(&config).await?;
    let app = build_app(Arc::new(services));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
