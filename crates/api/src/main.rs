use anyhow::Context;

use cashbook_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env()?;
    cashbook_observability::init(config.log_format);

    let app = cashbook_api::app::build_app(config.service);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        utc_offset = %config.service.business_offset,
        "listening"
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
