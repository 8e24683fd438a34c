use crate::core_types::ContractType;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// One leg of an executed trade in one delivery area.
///
/// Identity is `(trade_id, delivery_area, trade_side)` — the same
/// `trade_id` recurs across areas and sides for a single logical cross.
/// `contract_id`, `delivery_start`, `delivery_end` and `contract_type` are
/// immutable once ingested; `trade_updated_at`, `state`, `revision_number`,
/// `price` and `volume` are replaced by whichever ingest saw them latest.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub trade_id: String,
    pub delivery_area: String,
    pub trade_side: String,

    pub contract_id: String,
    pub contract_name: String,
    pub delivery_start: DateTime<Utc>,
    pub delivery_end: DateTime<Utc>,
    pub duration_minutes: f64,
    pub contract_type: ContractType,

    pub price: Decimal,
    pub volume: Decimal,
    pub trade_time: DateTime<Utc>,
    pub trade_updated_at: DateTime<Utc>,
    pub state: String,
    pub revision_number: i64,
    pub phase: Option<String>,
    pub cross_exchange: bool,
    pub reference_order_id: Option<String>,
}

impl Trade {
    /// `trade_side = "Unknown"` placeholder used by the flattener when a
    /// contract/trade pair carries no legs.
    pub const UNKNOWN_SIDE: &'static str = "Unknown";
}
