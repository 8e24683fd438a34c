//! Raw JSON → canonical record conversion: trade flattening, order-flow
//! normalization (realtime delta-volume/aggressor recovery and historical
//! snapshot/tick splitting), and deterministic tick identity.

pub mod contract_normalizer;
pub mod order_flow_normalizer;
pub mod tick_id;
pub mod trade_flattener;

pub use contract_normalizer::normalize_contracts;
pub use order_flow_normalizer::{normalize_historical, normalize_realtime, NormalizedTick, RevisionAction};
pub use tick_id::compute_tick_id;
pub use trade_flattener::flatten_trades;
