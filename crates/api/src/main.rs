use std::sync::Arc;

use anyhow::Context;

use shopfloor_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env().context("invalid configuration")?;
    shopfloor_observability::init(config.log_format);

    if config.dev_token {
        tracing::warn!("SHOPFLOOR_API_TOKENS not set; accepting insecure dev token 'dev-token'");
    }

    let app = shopfloor_api::app::build_app(Arc::new(config.tokens));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
