//! Typed records and idempotent upsert primitives for trades, candles,
//! ticks, snapshots, contracts and checkpoints, plus the cold (columnar
//! file) tier for archived order-flow ticks.

pub mod candles;
pub mod checkpoints;
pub mod cold_store;
pub mod contracts;
pub mod schema;
pub mod snapshots;
pub mod ticks;
pub mod trades;

pub use schema::init_schema;
