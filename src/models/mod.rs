//! Canonical record types for the data plane: trades, candles, order-flow
//! ticks, snapshots, contracts and the three checkpoint records.

mod candle;
mod checkpoint;
mod contract;
mod snapshot;
mod tick;
mod trade;

pub use candle::MarketCandle;
pub use checkpoint::{CandleGenState, IngestStatus, OrderFlowSyncState, TradeFetchState};
pub use contract::OrderContract;
pub use snapshot::{OrderBookLevel, OrderBookSnapshot};
pub use tick::OrderFlowTick;
pub use trade::Trade;
