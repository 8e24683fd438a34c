use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// One resting order as it appears in an [`OrderBookSnapshot`] level.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OrderBookLevel {
    pub order_id: String,
    pub price: Decimal,
    pub volume: Decimal,
    pub priority_time: DateTime<Utc>,
}

/// A full order book at one instant, either native (carried verbatim from
/// an upstream snapshot revision) or synthesized by the replayer.
///
/// `bids` are sorted by price descending then `priority_time` ascending;
/// `asks` ascending price then `priority_time` ascending. Both orderings
/// are strict — ties are broken by `priority_time` alone.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBookSnapshot {
    pub snapshot_id: Uuid,
    pub contract_id: String,
    pub area: String,
    pub timestamp: DateTime<Utc>,
    pub revision_number: i64,
    pub bids: Vec<OrderBookLevel>,
    pub asks: Vec<OrderBookLevel>,
    pub is_native: bool,
}
