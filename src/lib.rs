//! Ingestion, archival and replay platform for intraday electricity
//! exchange market data.
//!
//! Data flow: upstream HTTP (`upstream`) → normalizers (`parsers`) →
//! persistence (`persistence`). Persistence in turn feeds the candle
//! pipeline (`candles`), the order-book replayer (`replay`), and the
//! read API (`read_api`). The `scheduler` hosts the trade/order-flow/
//! candle/live-tick jobs on independent timers; `live_runner` is the
//! stateful per-area object those jobs drive.

pub mod candles;
pub mod config;
pub mod core_types;
pub mod db;
pub mod error;
pub mod ingestion;
pub mod live_runner;
pub mod logging;
pub mod models;
pub mod parsers;
pub mod persistence;
pub mod read_api;
pub mod replay;
pub mod scheduler;
pub mod time_util;
pub mod upstream;
