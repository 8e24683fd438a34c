use crate::models::{CandleGenState, IngestStatus, OrderFlowSyncState, TradeFetchState};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

pub async fn get_trade_fetch_state(
    pool: &PgPool,
    area: &str,
) -> Result<Option<TradeFetchState>, sqlx::Error> {
    let row = sqlx::query(
        "SELECT area, last_fetched_time, status, last_error FROM trade_fetch_state WHERE area = $1",
    )
    .bind(area)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| {
        let status_str: String = row.get("status");
        TradeFetchState {
            area: row.get("area"),
            last_fetched_time: row.get("last_fetched_time"),
            status: IngestStatus::from_str_or_running(&status_str),
            last_error: row.get("last_error"),
        }
    }))
}

pub async fn set_trade_fetch_state(pool: &PgPool, state: &TradeFetchState) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO trade_fetch_state (area, last_fetched_time, status, last_error)
        VALUES ($1,$2,$3,$4)
        ON CONFLICT (area) DO UPDATE SET
            last_fetched_time = EXCLUDED.last_fetched_time,
            status = EXCLUDED.status,
            last_error = EXCLUDED.last_error
        "#,
    )
    .bind(&state.area)
    .bind(state.last_fetched_time)
    .bind(state.status.as_str())
    .bind(&state.last_error)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_candle_gen_state(
    pool: &PgPool,
    area: &str,
) -> Result<Option<CandleGenState>, sqlx::Error> {
    let row = sqlx::query("SELECT area, last_generated_time FROM candle_gen_state WHERE area = $1")
        .bind(area)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(|row| CandleGenState {
        area: row.get("area"),
        last_generated_time: row.get("last_generated_time"),
    }))
}

pub async fn set_candle_gen_state(
    pool: &PgPool,
    area: &str,
    last_generated_time: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO candle_gen_state (area, last_generated_time)
        VALUES ($1,$2)
        ON CONFLICT (area) DO UPDATE SET last_generated_time = EXCLUDED.last_generated_time
        "#,
    )
    .bind(area)
    .bind(last_generated_time)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_order_flow_sync_state(
    pool: &PgPool,
    area: &str,
) -> Result<Option<OrderFlowSyncState>, sqlx::Error> {
    let row = sqlx::query(
        "SELECT area, last_archived_time, last_realtime_time FROM order_flow_sync_state WHERE area = $1",
    )
    .bind(area)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| OrderFlowSyncState {
        area: row.get("area"),
        last_archived_time: row.get("last_archived_time"),
        last_realtime_time: row.get("last_realtime_time"),
    }))
}

pub async fn set_order_flow_sync_state(
    pool: &PgPool,
    state: &OrderFlowSyncState,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO order_flow_sync_state (area, last_archived_time, last_realtime_time)
        VALUES ($1,$2,$3)
        ON CONFLICT (area) DO UPDATE SET
            last_archived_time = EXCLUDED.last_archived_time,
            last_realtime_time = EXCLUDED.last_realtime_time
        "#,
    )
    .bind(&state.area)
    .bind(state.last_archived_time)
    .bind(state.last_realtime_time)
    .execute(pool)
    .await?;
    Ok(())
}
