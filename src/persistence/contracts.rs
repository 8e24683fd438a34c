use crate::core_types::ContractType;
use crate::models::OrderContract;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};

/// Insert-or-update on `(contract_id, delivery_area)`. Mutable fields
/// (name, open/close times, `updated_at`) are replaced on conflict;
/// `is_archived` is left untouched here — it is only ever flipped by
/// [`mark_contract_archived`].
pub async fn upsert_contracts(pool: &PgPool, batch: &[OrderContract]) -> Result<(), sqlx::Error> {
    if batch.is_empty() {
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for contract in batch {
        sqlx::query(
            r#"
            INSERT INTO order_contracts (
                contract_id, delivery_area, contract_name, delivery_start,
                delivery_end, contract_type, volume_unit, price_unit,
                open_ts, close_ts, is_archived, updated_at
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,FALSE,$11)
            ON CONFLICT (contract_id, delivery_area) DO UPDATE SET
                contract_name = EXCLUDED.contract_name,
                open_ts = EXCLUDED.open_ts,
                close_ts = EXCLUDED.close_ts,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&contract.contract_id)
        .bind(&contract.delivery_area)
        .bind(&contract.contract_name)
        .bind(contract.delivery_start)
        .bind(contract.delivery_end)
        .bind(contract.contract_type.as_str())
        .bind(&contract.volume_unit)
        .bind(&contract.price_unit)
        .bind(contract.open_ts)
        .bind(contract.close_ts)
        .bind(contract.updated_at)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

pub async fn mark_contract_archived(pool: &PgPool, contract_id: &str, area: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE order_contracts SET is_archived = TRUE WHERE contract_id = $1 AND delivery_area = $2",
    )
    .bind(contract_id)
    .bind(area)
    .execute(pool)
    .await?;
    Ok(())
}

/// Contracts for `(area, day)` still awaiting historical archival — the
/// worklist the historical order-flow phase's worker pool consumes.
pub async fn unarchived_contracts_on_day(
    pool: &PgPool,
    area: &str,
    day: NaiveDate,
) -> Result<Vec<OrderContract>, sqlx::Error> {
    let day_start = day.and_hms_opt(0, 0, 0).unwrap().and_utc();
    let day_end = day_start + chrono::Duration::days(1);

    let rows = sqlx::query(
        r#"
        SELECT contract_id, delivery_area, contract_name, delivery_start, delivery_end,
               contract_type, volume_unit, price_unit, open_ts, close_ts, is_archived, updated_at
        FROM order_contracts
        WHERE delivery_area = $1 AND delivery_start >= $2 AND delivery_start < $3 AND is_archived = FALSE
        "#,
    )
    .bind(area)
    .bind(day_start)
    .bind(day_end)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(row_to_contract).collect())
}

fn row_to_contract(row: &sqlx::postgres::PgRow) -> OrderContract {
    let contract_type_str: String = row.get("contract_type");
    OrderContract {
        contract_id: row.get("contract_id"),
        delivery_area: row.get("delivery_area"),
        contract_name: row.get("contract_name"),
        delivery_start: row.get("delivery_start"),
        delivery_end: row.get("delivery_end"),
        contract_type: contract_type_str.parse().unwrap_or(ContractType::Other),
        volume_unit: row.get("volume_unit"),
        price_unit: row.get("price_unit"),
        open_ts: row.get("open_ts"),
        close_ts: row.get("close_ts"),
        is_archived: row.get("is_archived"),
        updated_at: row.get("updated_at"),
    }
}
