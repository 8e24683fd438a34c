use intraday_marketdata::config::AppConfig;
use intraday_marketdata::db::Database;
use intraday_marketdata::logging;
use intraday_marketdata::persistence;
use intraday_marketdata::scheduler;
use intraday_marketdata::upstream::{TokenManager, UpstreamClient};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    let _log_guard = logging::init_logging(&config);

    tracing::info!(
        git_hash = env!("GIT_HASH"),
        areas = ?config.areas,
        "starting intraday-marketdata"
    );

    let db = Database::connect(&config.database_url).await?;
    db.health_check().await?;
    persistence::init_schema(db.pool()).await?;

    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(45))
        .build()?;
    let tokens = Arc::new(TokenManager::new(
        config.upstream_token_url.clone(),
        config.credentials.clone(),
        http.clone(),
    ));
    let client = Arc::new(UpstreamClient::new(config.upstream_base_url.clone(), http, tokens));

    let config = Arc::new(config);
    scheduler::spawn_all(db.pool().clone(), client, config);

    tracing::info!("scheduler started, entering idle wait");
    std::future::pending::<()>().await;
    Ok(())
}
