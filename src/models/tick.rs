use crate::core_types::Side;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// A single order revision: the atomic event of the order-flow stream.
///
/// `tick_id` is a deterministic hash of `(contract_id, delivery_area,
/// revision_number, order_id, updated_time)` (see [`crate::parsers::tick_id`]),
/// which makes at-least-once ingestion produce at-most-once storage.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderFlowTick {
    pub tick_id: String,
    pub contract_id: String,
    pub delivery_area: String,

    pub order_id: String,
    pub side: Side,
    pub price: Decimal,
    pub volume: Decimal,
    pub updated_time: DateTime<Utc>,
    pub priority_time: DateTime<Utc>,
    pub is_snapshot: bool,
    pub is_deleted: bool,
    pub revision_number: i64,
    pub root_updated_at: DateTime<Utc>,
}

impl OrderFlowTick {
    /// `true` when this tick removes the order from the live book: either
    /// an explicit deletion or a zero/negative remaining volume.
    pub fn clears_order(&self) -> bool {
        self.is_deleted || self.volume <= Decimal::ZERO
    }
}
