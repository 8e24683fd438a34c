//! Upstream data acquisition: trade backfill/active-window refresh and
//! order-flow historical archival + realtime revision sync, one
//! checkpoint row per delivery area per ingester.

pub mod order_flow_ingester;
pub mod trade_ingester;

pub use order_flow_ingester::{run_historical_area, run_realtime_area};
pub use trade_ingester::run_area as run_trade_area;
