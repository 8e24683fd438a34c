use crate::core_types::ContractType;
use crate::models::Trade;
use chrono::Utc;
use sqlx::{PgPool, Row};

/// Insert-or-update on `(trade_id, delivery_area, trade_side)`. Immutable
/// attributes (contract linkage, delivery window) are written once;
/// mutable attributes (`trade_updated_at`, `state`, `revision_number`,
/// `price`, `volume`) are replaced on conflict.
pub async fn upsert_trades(pool: &PgPool, batch: &[Trade]) -> Result<(), sqlx::Error> {
    if batch.is_empty() {
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for trade in batch {
        sqlx::query(
            r#"
            INSERT INTO trades (
                trade_id, delivery_area, trade_side, contract_id, contract_name,
                delivery_start, delivery_end, duration_minutes, contract_type,
                price, volume, trade_time, trade_updated_at, state,
                revision_number, phase, cross_exchange, reference_order_id
            ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17,$18)
            ON CONFLICT (trade_id, delivery_area, trade_side) DO UPDATE SET
                trade_updated_at = EXCLUDED.trade_updated_at,
                state = EXCLUDED.state,
                revision_number = EXCLUDED.revision_number,
                price = EXCLUDED.price,
                volume = EXCLUDED.volume
            "#,
        )
        .bind(&trade.trade_id)
        .bind(&trade.delivery_area)
        .bind(&trade.trade_side)
        .bind(&trade.contract_id)
        .bind(&trade.contract_name)
        .bind(trade.delivery_start)
        .bind(trade.delivery_end)
        .bind(trade.duration_minutes)
        .bind(trade.contract_type.as_str())
        .bind(trade.price)
        .bind(trade.volume)
        .bind(trade.trade_time)
        .bind(trade.trade_updated_at)
        .bind(&trade.state)
        .bind(trade.revision_number)
        .bind(&trade.phase)
        .bind(trade.cross_exchange)
        .bind(&trade.reference_order_id)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

/// Raw trade rows for one `(area, contract_id)` — used by the read API's
/// diagnostic `trades_for_contract` operation.
pub async fn trades_for_contract(
    pool: &PgPool,
    area: &str,
    contract_id: &str,
) -> Result<Vec<Trade>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT trade_id, delivery_area, trade_side, contract_id, contract_name,
               delivery_start, delivery_end, duration_minutes, contract_type,
               price, volume, trade_time, trade_updated_at, state,
               revision_number, phase, cross_exchange, reference_order_id
        FROM trades
        WHERE delivery_area = $1 AND contract_id = $2
        ORDER BY trade_time ASC
        "#,
    )
    .bind(area)
    .bind(contract_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(row_to_trade).collect())
}

/// Distinct contracts traded on `(area, date)`, filtered to PH/QH
/// durations — the read API's `list_contracts_on_date` source query.
pub async fn distinct_contracts_on_date(
    pool: &PgPool,
    area: &str,
    date: chrono::NaiveDate,
) -> Result<Vec<ContractSummaryRow>, sqlx::Error> {
    let day_start = date.and_hms_opt(0, 0, 0).unwrap().and_utc();
    let day_end = day_start + chrono::Duration::days(1);

    let rows = sqlx::query(
        r#"
        SELECT DISTINCT ON (contract_id)
            contract_id, contract_name, delivery_start, delivery_end, contract_type
        FROM trades
        WHERE delivery_area = $1 AND delivery_start >= $2 AND delivery_start < $3
              AND contract_type IN ('PH', 'QH')
        ORDER BY contract_id, delivery_start ASC
        "#,
    )
    .bind(area)
    .bind(day_start)
    .bind(day_end)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| {
            let contract_type_str: String = row.get("contract_type");
            ContractSummaryRow {
                contract_id: row.get("contract_id"),
                contract_name: row.get("contract_name"),
                delivery_start: row.get("delivery_start"),
                delivery_end: row.get("delivery_end"),
                contract_type: contract_type_str.parse().unwrap_or(ContractType::Other),
            }
        })
        .collect())
}

/// Row shape for [`distinct_contracts_on_date`] — the raw projection the
/// read API enriches with a computed trading window.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractSummaryRow {
    pub contract_id: String,
    pub contract_name: String,
    pub delivery_start: chrono::DateTime<Utc>,
    pub delivery_end: chrono::DateTime<Utc>,
    pub contract_type: ContractType,
}

fn row_to_trade(row: &sqlx::postgres::PgRow) -> Trade {
    let contract_type_str: String = row.get("contract_type");
    Trade {
        trade_id: row.get("trade_id"),
        delivery_area: row.get("delivery_area"),
        trade_side: row.get("trade_side"),
        contract_id: row.get("contract_id"),
        contract_name: row.get("contract_name"),
        delivery_start: row.get("delivery_start"),
        delivery_end: row.get("delivery_end"),
        duration_minutes: row.get("duration_minutes"),
        contract_type: contract_type_str.parse().unwrap_or(ContractType::Other),
        price: row.get("price"),
        volume: row.get("volume"),
        trade_time: row.get("trade_time"),
        trade_updated_at: row.get("trade_updated_at"),
        state: row.get("state"),
        revision_number: row.get("revision_number"),
        phase: row.get("phase"),
        cross_exchange: row.get("cross_exchange"),
        reference_order_id: row.get("reference_order_id"),
    }
}
