use crate::core_types::ContractType;
use chrono::{DateTime, Utc};

/// Static metadata for one `(contract_id, delivery_area)` pair.
///
/// `is_archived` flips to `true` once the order-flow ingester has
/// persisted the full historical revisions payload for this contract; it
/// is the unit the historical archival day-pointer waits on.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderContract {
    pub contract_id: String,
    pub delivery_area: String,
    pub contract_name: String,
    pub delivery_start: DateTime<Utc>,
    pub delivery_end: DateTime<Utc>,
    pub contract_type: ContractType,
    pub volume_unit: String,
    pub price_unit: String,
    pub open_ts: DateTime<Utc>,
    pub close_ts: DateTime<Utc>,
    pub is_archived: bool,
    pub updated_at: DateTime<Utc>,
}
