//! Read-only query surface for external callers: contract listing,
//! candle/trade series, and tick lookup with cold-store-first routing.
//!
//! Every operation here is a pure read — no table owned by this module,
//! no checkpoint touched.

use crate::core_types::ContractType;
use crate::models::{MarketCandle, OrderFlowTick, Trade};
use crate::persistence::{candles, cold_store, ticks, trades};
use crate::time_util::{self, TradingWindow};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

/// One contract summary enriched with its computed trading window —
/// `list_contracts_on_date`'s result shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ContractSummary {
    pub contract_id: String,
    pub contract_name: String,
    pub contract_type: ContractType,
    pub delivery_start: DateTime<Utc>,
    pub delivery_end: DateTime<Utc>,
    pub trading_window: TradingWindow,
}

/// Contracts traded on `(area, date)`, classified PH/QH, each carrying its
/// computed open/close trading window (§6).
pub async fn list_contracts_on_date(
    pool: &PgPool,
    area: &str,
    date: NaiveDate,
) -> Result<Vec<ContractSummary>, sqlx::Error> {
    let rows = trades::distinct_contracts_on_date(pool, area, date).await?;

    Ok(rows
        .into_iter()
        .map(|row| ContractSummary {
            trading_window: time_util::trading_window(row.delivery_start),
            contract_id: row.contract_id,
            contract_name: row.contract_name,
            contract_type: row.contract_type,
            delivery_start: row.delivery_start,
            delivery_end: row.delivery_end,
        })
        .collect())
}

/// Full candle series for a contract, timestamp ascending.
pub async fn candles_for_contract(
    pool: &PgPool,
    area: &str,
    contract_id: &str,
) -> Result<Vec<MarketCandle>, sqlx::Error> {
    candles::candles_for_contract(pool, area, contract_id).await
}

/// Diagnostic raw trade rows for a contract.
pub async fn trades_for_contract(
    pool: &PgPool,
    area: &str,
    contract_id: &str,
) -> Result<Vec<Trade>, sqlx::Error> {
    trades::trades_for_contract(pool, area, contract_id).await
}

/// Ticks for `contract_id` in `[from, to]`: cold-store file first (one
/// file per `(area, date)`, so a multi-day window reads one file per
/// day), hot store for whatever the cold store doesn't cover.
pub async fn read_ticks(
    pool: &PgPool,
    cold_store_root: &str,
    area: &str,
    contract_id: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> anyhow::Result<Vec<OrderFlowTick>> {
    let mut out = Vec::new();
    let mut day = from.date_naive();
    let last_day = to.date_naive();

    while day <= last_day {
        let day_start = day.and_hms_opt(0, 0, 0).unwrap().and_utc().max(from);
        let next_day_start = (day + chrono::Duration::days(1)).and_hms_opt(0, 0, 0).unwrap().and_utc();
        let day_end = to.min(next_day_start);

        if let Some(file_ticks) = cold_store::read_tick_file(cold_store_root, area, day, contract_id)? {
            out.extend(
                file_ticks
                    .into_iter()
                    .filter(|t| t.updated_time >= from && t.updated_time <= to),
            );
        } else {
            out.extend(ticks::read_ticks_in_window(pool, contract_id, day_start, day_end).await?);
        }

        day = match day.succ_opt() {
            Some(d) => d,
            None => break,
        };
    }

    out.sort_by(|a, b| a.updated_time.cmp(&b.updated_time).then(a.revision_number.cmp(&b.revision_number)));
    Ok(out)
}
