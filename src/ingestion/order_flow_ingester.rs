use crate::config::AppConfig;
use crate::models::{OrderContract, OrderFlowSyncState};
use crate::parsers::{normalize_contracts, normalize_historical};
use crate::persistence::{checkpoints, cold_store, contracts, snapshots, ticks};
use crate::upstream::{fetchers, UpstreamClient};
use chrono::{Duration, NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use sqlx::PgPool;

/// Historical archival driven by `last_archived_time`: one day at a time,
/// up to `order_flow_workers` contracts archived concurrently. The day
/// pointer only advances once every contract for that day is archived.
pub async fn run_historical_area(pool: &PgPool, client: &UpstreamClient, config: &AppConfig, area: &str) {
    let now = Utc::now();
    let archive_limit = now - config.archive_safety_delay_as_duration();

    let existing = match checkpoints::get_order_flow_sync_state(pool, area).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(area, error = %e, "failed to load order-flow checkpoint");
            return;
        }
    };

    let mut day_pointer: NaiveDate = existing
        .as_ref()
        .and_then(|s| s.last_archived_time)
        .map(|t| t.date_naive())
        .unwrap_or(config.cold_start_date);

    loop {
        let day_start = match day_pointer.and_hms_opt(0, 0, 0) {
            Some(t) => t.and_utc(),
            None => break,
        };
        if day_start >= archive_limit {
            break;
        }

        let contracts_resp = match fetchers::contracts_by_area(client, area, day_pointer).await {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!(area, day = %day_pointer, error = %e, "failed to fetch contract list for day");
                break;
            }
        };

        let (normalized, issues) = normalize_contracts(&contracts_resp, area, now);
        for issue in &issues {
            tracing::warn!(area, %issue, "dropped malformed contract");
        }
        if let Err(e) = contracts::upsert_contracts(pool, &normalized).await {
            tracing::error!(area, day = %day_pointer, error = %e, "failed to upsert contract metadata");
            break;
        }

        let unarchived = match contracts::unarchived_contracts_on_day(pool, area, day_pointer).await {
            Ok(list) => list,
            Err(e) => {
                tracing::error!(area, day = %day_pointer, error = %e, "failed to query unarchived contracts");
                break;
            }
        };

        let hot_cold_threshold = now - config.hot_cold_retention_as_duration();
        let is_cold_day = day_start < hot_cold_threshold;

        let all_archived = if unarchived.is_empty() {
            true
        } else {
            let results = stream::iter(unarchived.into_iter().map(|contract| {
                archive_one_contract(pool, client, config, area, day_pointer, contract, is_cold_day)
            }))
            .buffer_unordered(config.order_flow_workers)
            .collect::<Vec<_>>()
            .await;

            results.into_iter().all(|ok| ok)
        };

        if !all_archived {
            // Leave the day pointer where it is; next trigger retries only
            // the contracts still marked unarchived.
            break;
        }

        day_pointer = match day_pointer.succ_opt() {
            Some(d) => d,
            None => break,
        };
        let new_checkpoint = day_pointer.and_hms_opt(0, 0, 0).unwrap().and_utc();

        if let Err(e) = checkpoints::set_order_flow_sync_state(
            pool,
            &OrderFlowSyncState {
                area: area.to_string(),
                last_archived_time: Some(new_checkpoint),
                last_realtime_time: existing.as_ref().and_then(|s| s.last_realtime_time),
            },
        )
        .await
        {
            tracing::error!(area, error = %e, "failed to persist order-flow archival checkpoint");
        }
    }
}

/// Archive one contract's full historical revisions payload: fetch,
/// normalize into ticks + snapshots, route ticks to hot or cold storage
/// by day age, mark the contract archived. Returns `false` on any
/// failure; the contract is left unarchived and retried next trigger.
async fn archive_one_contract(
    pool: &PgPool,
    client: &UpstreamClient,
    config: &AppConfig,
    area: &str,
    day: NaiveDate,
    contract: OrderContract,
    is_cold_day: bool,
) -> bool {
    let book = match fetchers::order_book_by_contract_id(client, area, &contract.contract_id, day).await {
        Ok(book) => book,
        Err(e) => {
            tracing::error!(area, contract_id = %contract.contract_id, error = %e, "order-book fetch failed");
            return false;
        }
    };

    let (result, issues) = normalize_historical(&book);
    for issue in &issues {
        tracing::warn!(area, contract_id = %contract.contract_id, %issue, "dropped malformed revision");
    }

    if !result.snapshots.is_empty() {
        if let Err(e) = snapshots::insert_snapshots(pool, &result.snapshots).await {
            tracing::error!(area, contract_id = %contract.contract_id, error = %e, "snapshot insert failed");
            return false;
        }
    }

    let store_result = if is_cold_day {
        cold_store::write_tick_file(&config.cold_store_root, area, day, &contract.contract_id, &result.ticks)
            .map_err(|e| e.to_string())
    } else {
        ticks::insert_ticks_ignore_conflict(pool, &result.ticks)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    };

    if let Err(e) = store_result {
        tracing::error!(area, contract_id = %contract.contract_id, error = %e, "tick store write failed");
        return false;
    }

    if let Err(e) = contracts::mark_contract_archived(pool, &contract.contract_id, area).await {
        tracing::error!(area, contract_id = %contract.contract_id, error = %e, "failed to mark contract archived");
        return false;
    }

    true
}

/// Revision stream driven by `last_realtime_time`, with a 1-minute
/// overlap and clock-skew guards (§4.F). Checkpoint advances only when
/// the whole window was consumed without error.
pub async fn run_realtime_area(pool: &PgPool, client: &UpstreamClient, config: &AppConfig, area: &str) {
    let now = Utc::now();

    let existing = match checkpoints::get_order_flow_sync_state(pool, area).await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(area, error = %e, "failed to load order-flow checkpoint");
            return;
        }
    };

    let last_realtime = existing.as_ref().and_then(|s| s.last_realtime_time);
    let mut start = last_realtime.unwrap_or(now - Duration::hours(1)) - Duration::minutes(1);

    let floor = now - Duration::hours(48);
    if start < floor {
        start = floor;
    }
    if start > now {
        start = now - Duration::hours(2);
    }

    let mut had_failure = false;
    let mut total_ticks = 0usize;
    let stream = fetchers::order_revisions_by_updated_time(
        client,
        area.to_string(),
        start,
        now,
        config.revision_chunk_size_as_duration(),
    );
    futures::pin_mut!(stream);

    while let Some(response) = stream.next().await {
        let (normalized, issues) = crate::parsers::normalize_realtime(&response, area);
        for issue in &issues {
            tracing::warn!(area, %issue, "dropped malformed realtime revision");
        }

        let batch: Vec<_> = normalized.into_iter().map(|n| n.tick).collect();
        match ticks::insert_ticks_ignore_conflict(pool, &batch).await {
            Ok(inserted) => total_ticks += inserted as usize,
            Err(e) => {
                tracing::error!(area, error = %e, "failed to store realtime ticks");
                had_failure = true;
            }
        }
    }

    if had_failure {
        tracing::warn!(area, "realtime sync had errors; checkpoint not advanced, overlap covers retry");
        return;
    }

    tracing::info!(area, ticks = total_ticks, "realtime order-flow sync complete");

    if let Err(e) = checkpoints::set_order_flow_sync_state(
        pool,
        &OrderFlowSyncState {
            area: area.to_string(),
            last_archived_time: existing.as_ref().and_then(|s| s.last_archived_time),
            last_realtime_time: Some(now),
        },
    )
    .await
    {
        tracing::error!(area, error = %e, "failed to persist realtime checkpoint");
    }
}
