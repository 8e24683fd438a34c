//! Minute-bucketed OHLCV derivation from the trade stream.
//!
//! Gated behind the trade ingester's own checkpoint: a minute is only
//! materialized once trades for it are believed complete, so the
//! aggregate is never locked in early.

use crate::config::AppConfig;
use crate::persistence::{candles, checkpoints};
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

const CHUNK: Duration = Duration::hours(6);

/// Run one area's candle-pipeline tick.
pub async fn run_area(pool: &PgPool, config: &AppConfig, area: &str) {
    let trade_checkpoint = match checkpoints::get_trade_fetch_state(pool, area).await {
        Ok(Some(state)) => match state.last_fetched_time {
            Some(t) => t,
            None => {
                tracing::debug!(area, "trade checkpoint not yet set, skipping candle gen");
                return;
            }
        },
        Ok(None) => {
            tracing::debug!(area, "no trade checkpoint row yet, skipping candle gen");
            return;
        }
        Err(e) => {
            tracing::error!(area, error = %e, "failed to load trade checkpoint for candle gen");
            return;
        }
    };

    let existing = match checkpoints::get_candle_gen_state(pool, area).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(area, error = %e, "failed to load candle checkpoint");
            return;
        }
    };

    let mut candle_checkpoint = existing
        .as_ref()
        .and_then(|s| s.last_generated_time)
        .unwrap_or_else(|| config.cold_start_instant());

    let now = Utc::now();
    let safe_end = now.min(trade_checkpoint);

    if candle_checkpoint + Duration::minutes(1) >= safe_end {
        return;
    }

    while candle_checkpoint + Duration::minutes(1) < safe_end {
        let chunk_from = candle_checkpoint + Duration::minutes(1);
        let chunk_to: DateTime<Utc> = (chunk_from + CHUNK).min(safe_end);

        match candles::aggregate_minute_candles(pool, area, chunk_from, chunk_to).await {
            Ok(batch) => {
                if let Err(e) = candles::upsert_candles(pool, &batch).await {
                    tracing::error!(area, error = %e, "failed to upsert candles, stopping this run");
                    return;
                }
            }
            Err(e) => {
                tracing::error!(area, error = %e, "candle aggregation query failed, stopping this run");
                return;
            }
        }

        candle_checkpoint = chunk_to;

        if let Err(e) = checkpoints::set_candle_gen_state(
            pool,
            area,
            candle_checkpoint,
        )
        .await
        {
            tracing::error!(area, error = %e, "failed to persist candle checkpoint");
            return;
        }
    }
}
