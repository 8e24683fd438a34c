use crate::config::AppConfig;
use crate::error::IngestError;
use crate::models::{IngestStatus, TradeFetchState};
use crate::parsers::flatten_trades;
use crate::persistence::{checkpoints, trades};
use crate::upstream::{fetchers, UpstreamClient};
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

/// How far behind "now" a trade's delivery window must be before it's
/// considered settled and eligible for backfill archival.
const SAFE_LINE_LAG: Duration = Duration::hours(2);

async fn fetch_and_store(
    pool: &PgPool,
    client: &UpstreamClient,
    area: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<(), IngestError> {
    let response = fetchers::trades_by_delivery_start(client, area, from, to).await?;
    let (batch, issues) = flatten_trades(&response, area);
    for issue in &issues {
        tracing::warn!(area, %issue, "dropped malformed trade record");
    }
    trades::upsert_trades(pool, &batch).await?;
    Ok(())
}

/// Run one area's trade-ingester tick: backfill to `safe_line`, advancing
/// the checkpoint, then a non-advancing active-window refresh out to
/// `now + active_window_length` (§4.E).
pub async fn run_area(pool: &PgPool, client: &UpstreamClient, config: &AppConfig, area: &str) {
    let now = Utc::now();
    let safe_line = now - SAFE_LINE_LAG;

    let existing = match checkpoints::get_trade_fetch_state(pool, area).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(area, error = %e, "failed to load trade checkpoint");
            return;
        }
    };

    let mut checkpoint = existing
        .as_ref()
        .and_then(|s| s.last_fetched_time)
        .unwrap_or_else(|| config.cold_start_instant());

    // Backfill: advances the checkpoint. Any chunk failure stops this
    // area's run entirely; the next tick retries from the same checkpoint.
    while checkpoint < safe_line {
        let chunk_end = (checkpoint + config.trade_chunk_size_as_duration()).min(safe_line);

        match fetch_and_store(pool, client, area, checkpoint, chunk_end).await {
            Ok(()) => {
                checkpoint = chunk_end;
                persist(
                    pool,
                    area,
                    TradeFetchState {
                        area: area.to_string(),
                        last_fetched_time: Some(checkpoint),
                        status: IngestStatus::Running,
                        last_error: None,
                    },
                )
                .await;
            }
            Err(e) => {
                tracing::error!(area, error = %e, "trade backfill chunk failed");
                persist(
                    pool,
                    area,
                    TradeFetchState {
                        area: area.to_string(),
                        last_fetched_time: Some(checkpoint),
                        status: IngestStatus::Error,
                        last_error: Some(e.truncated_message()),
                    },
                )
                .await;
                return;
            }
        }
    }

    // Active window: re-scanned every run, checkpoint MUST NOT move.
    let window_end = now + config.active_window_length_as_duration();
    let mut cursor = safe_line;
    let mut had_failure = false;

    while cursor < window_end {
        let chunk_end = (cursor + config.trade_chunk_size_as_duration()).min(window_end);

        if let Err(e) = fetch_and_store(pool, client, area, cursor, chunk_end).await {
            tracing::warn!(area, error = %e, "active-window chunk failed, will re-scan next run");
            had_failure = true;
        }
        cursor = chunk_end;
    }

    let (status, last_error) = if had_failure {
        (IngestStatus::Warning, Some("active-window refresh had chunk errors".to_string()))
    } else {
        (IngestStatus::Ok, None)
    };

    persist(
        pool,
        area,
        TradeFetchState {
            area: area.to_string(),
            last_fetched_time: Some(checkpoint),
            status,
            last_error,
        },
    )
    .await;
}

async fn persist(pool: &PgPool, area: &str, state: TradeFetchState) {
    if let Err(e) = checkpoints::set_trade_fetch_state(pool, &state).await {
        tracing::error!(area, error = %e, "failed to persist trade checkpoint");
    }
}
