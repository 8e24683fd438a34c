use crate::core_types::ContractType;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// One minute of OHLCV aggregation for `(contract_id, timestamp, area)`.
///
/// Re-derivation is idempotent: an upsert on conflict replaces every
/// derived field below, so re-running the pipeline over an already-covered
/// minute produces the same row.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketCandle {
    pub contract_id: String,
    pub area: String,
    pub timestamp: DateTime<Utc>,
    pub contract_type: ContractType,

    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub vwap: Decimal,
    pub trade_count: i64,
}
