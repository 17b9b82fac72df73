use std::sync::Arc;

use imarch::api::{AppState, create_router};
use imarch::config::Config;
use imarch::inline::InlineService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Bridge log crate -> tracing (so log::info! etc. work)
    tracing_log::LogTracer::init()?;

    let config = Config::load();
    let client = Arc::new(config.search_client()?);
    tracing::info!(
        engine_id = client.engine_id(),
        timeout_secs = config.search_timeout_secs,
        "search client ready"
    );

    let inline = InlineService::new(client.clone()).with_safe_search(config.safe_search);
    let state = Arc::new(AppState {
        inline,
        bot_username: config.bot_username.clone(),
    });

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!("listening on {}", config.bind);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("received ctrl-c, shutting down");
        })
        .await?;

    client.close();
    Ok(())
}
