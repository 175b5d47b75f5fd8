use anyhow::Context;

use apigate_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    apigate_observability::init();

    let config = AppConfig::from_env()?;
    let auth_config = config
        .authenticator_config()
        .await
        .context("cannot set up authentication")?;

    let app = apigate_api::app::build_app(auth_config, apigate_api::app::routes::router());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
