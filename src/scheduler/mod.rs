//! Process-local periodic dispatcher (§4.J).
//!
//! Each job owns its own loop task and its own DB pool handle (the pool
//! is already a shared connection pool, so "own session" means "own
//! `PgPool` reference", never a session borrowed from a request path).
//! Looping `run-then-sleep` rather than a free-running interval gives a
//! serial instance limit of 1 for free: the next tick can't start before
//! the previous one finishes.

use crate::config::AppConfig;
use crate::live_runner::LiveRunner;
use crate::upstream::UpstreamClient;
use crate::{candles, ingestion};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

const TRADE_SYNC_CADENCE: Duration = Duration::from_secs(60 * 60);
const CANDLE_GEN_CADENCE: Duration = Duration::from_secs(15 * 60);
const ORDER_FLOW_CADENCE: Duration = Duration::from_secs(60 * 60);
const LIVE_TICK_CADENCE: Duration = Duration::from_secs(5 * 60);

/// Spawn all four recurring jobs. Returns immediately; jobs run for the
/// life of the process.
pub fn spawn_all(pool: PgPool, client: Arc<UpstreamClient>, config: Arc<AppConfig>) {
    spawn_trade_sync(pool.clone(), client.clone(), config.clone());
    spawn_candle_gen(pool.clone(), config.clone());
    spawn_order_flow_sync(pool.clone(), client, config.clone());
    spawn_live_tick(pool, config);
}

fn spawn_trade_sync(pool: PgPool, client: Arc<UpstreamClient>, config: Arc<AppConfig>) {
    tokio::spawn(async move {
        loop {
            for area in &config.areas {
                ingestion::run_trade_area(&pool, &client, &config, area).await;
            }
            tokio::time::sleep(TRADE_SYNC_CADENCE).await;
        }
    });
}

fn spawn_candle_gen(pool: PgPool, config: Arc<AppConfig>) {
    tokio::spawn(async move {
        loop {
            for area in &config.areas {
                candles::run_area(&pool, &config, area).await;
            }
            tokio::time::sleep(CANDLE_GEN_CADENCE).await;
        }
    });
}

fn spawn_order_flow_sync(pool: PgPool, client: Arc<UpstreamClient>, config: Arc<AppConfig>) {
    tokio::spawn(async move {
        loop {
            for area in &config.areas {
                // Historical then realtime, sequentially, per area (§4.F).
                ingestion::run_historical_area(&pool, &client, &config, area).await;
                ingestion::run_realtime_area(&pool, &client, &config, area).await;
            }
            tokio::time::sleep(ORDER_FLOW_CADENCE).await;
        }
    });
}

fn spawn_live_tick(pool: PgPool, config: Arc<AppConfig>) {
    tokio::spawn(async move {
        let mut runners: Vec<LiveRunner> = config
            .areas
            .iter()
            .map(|area| LiveRunner::new(area.clone(), config.live_state_dir.clone()))
            .collect();

        loop {
            for runner in runners.iter_mut() {
                if let Err(e) = runner.tick(&pool).await {
                    tracing::error!(area = %runner.area(), error = %e, "live-runner tick failed");
                }
            }
            tokio::time::sleep(LIVE_TICK_CADENCE).await;
        }
    });
}
