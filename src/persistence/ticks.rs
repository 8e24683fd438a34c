use crate::core_types::Side;
use crate::models::OrderFlowTick;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

/// Insert on `tick_id`; on conflict do nothing. The deterministic
/// `tick_id` makes at-least-once upstream delivery produce at-most-once
/// storage.
pub async fn insert_ticks_ignore_conflict(
    pool: &PgPool,
    batch: &[OrderFlowTick],
) -> Result<u64, sqlx::Error> {
    if batch.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;
    let mut inserted = 0u64;
    for tick in batch {
        let result = sqlx::query(
            r#"
            INSERT INTO order_flow_ticks (
                tick_id, contract_id, delivery_area, order_id, side, price,
                volume, updated_time, priority_time, is_snapshot, is_deleted,
                revision_number, root_updated_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13)
            ON CONFLICT (tick_id) DO NOTHING
            "#,
        )
        .bind(&tick.tick_id)
        .bind(&tick.contract_id)
        .bind(&tick.delivery_area)
        .bind(&tick.order_id)
        .bind(tick.side.as_str())
        .bind(tick.price)
        .bind(tick.volume)
        .bind(tick.updated_time)
        .bind(tick.priority_time)
        .bind(tick.is_snapshot)
        .bind(tick.is_deleted)
        .bind(tick.revision_number)
        .bind(tick.root_updated_at)
        .execute(&mut *tx)
        .await?;
        inserted += result.rows_affected();
    }
    tx.commit().await?;
    Ok(inserted)
}

/// All ticks for a contract with `updated_time <= target_time`, sorted by
/// `(updated_time asc, revision_number asc)` — the replayer's load order.
pub async fn ticks_up_to(
    pool: &PgPool,
    contract_id: &str,
    target_time: DateTime<Utc>,
) -> Result<Vec<OrderFlowTick>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT tick_id, contract_id, delivery_area, order_id, side, price,
               volume, updated_time, priority_time, is_snapshot, is_deleted,
               revision_number, root_updated_at
        FROM order_flow_ticks
        WHERE contract_id = $1 AND updated_time <= $2
        ORDER BY updated_time ASC, revision_number ASC
        "#,
    )
    .bind(contract_id)
    .bind(target_time)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(row_to_tick).collect())
}

/// Hot-store fallback for `read_ticks`, used when no cold-store file
/// covers the requested window.
pub async fn read_ticks_in_window(
    pool: &PgPool,
    contract_id: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<OrderFlowTick>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT tick_id, contract_id, delivery_area, order_id, side, price,
               volume, updated_time, priority_time, is_snapshot, is_deleted,
               revision_number, root_updated_at
        FROM order_flow_ticks
        WHERE contract_id = $1 AND updated_time >= $2 AND updated_time <= $3
        ORDER BY updated_time ASC, revision_number ASC
        "#,
    )
    .bind(contract_id)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(row_to_tick).collect())
}

/// Hot-store ticks for an entire delivery area in a time window, across
/// whatever contract(s) were active — the live runner's execution-step
/// feed (§4.K), since a runner is scoped per area, not per contract.
pub async fn read_ticks_in_window_for_area(
    pool: &PgPool,
    area: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<OrderFlowTick>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT tick_id, contract_id, delivery_area, order_id, side, price,
               volume, updated_time, priority_time, is_snapshot, is_deleted,
               revision_number, root_updated_at
        FROM order_flow_ticks
        WHERE delivery_area = $1 AND updated_time >= $2 AND updated_time <= $3
        ORDER BY updated_time ASC, revision_number ASC
        "#,
    )
    .bind(area)
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(row_to_tick).collect())
}

fn row_to_tick(row: &sqlx::postgres::PgRow) -> OrderFlowTick {
    let side_str: String = row.get("side");
    OrderFlowTick {
        tick_id: row.get("tick_id"),
        contract_id: row.get("contract_id"),
        delivery_area: row.get("delivery_area"),
        order_id: row.get("order_id"),
        side: side_str.parse().unwrap_or(Side::Buy),
        price: row.get("price"),
        volume: row.get("volume"),
        updated_time: row.get("updated_time"),
        priority_time: row.get("priority_time"),
        is_snapshot: row.get("is_snapshot"),
        is_deleted: row.get("is_deleted"),
        revision_number: row.get("revision_number"),
        root_updated_at: row.get("root_updated_at"),
    }
}
