use chrono::{DateTime, Utc};

/// Status carried alongside a checkpoint's progress pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestStatus {
    /// No run has completed yet for this area.
    Running,
    /// Most recent run, including its active-window phase, completed
    /// cleanly.
    Ok,
    /// Backfill succeeded but the active-window refresh hit an error.
    Warning,
    /// Backfill itself failed; the area's run stopped short.
    Error,
}

impl IngestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestStatus::Running => "running",
            IngestStatus::Ok => "ok",
            IngestStatus::Warning => "warning",
            IngestStatus::Error => "error",
        }
    }

    pub fn from_str_or_running(s: &str) -> Self {
        match s {
            "ok" => IngestStatus::Ok,
            "warning" => IngestStatus::Warning,
            "error" => IngestStatus::Error,
            _ => IngestStatus::Running,
        }
    }
}

/// Per-area trade-ingester checkpoint.
///
/// `last_fetched_time` advances only for the backfill phase (§4.E); the
/// active-window refresh deliberately leaves it untouched so the same
/// future-leaning window is re-scanned on the next run.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeFetchState {
    pub area: String,
    pub last_fetched_time: Option<DateTime<Utc>>,
    pub status: IngestStatus,
    pub last_error: Option<String>,
}

/// Per-area candle-pipeline checkpoint.
///
/// `last_generated_time` means "minutes at or before this instant have
/// been considered" — it advances whether or not a minute produced a row.
#[derive(Debug, Clone, PartialEq)]
pub struct CandleGenState {
    pub area: String,
    pub last_generated_time: Option<DateTime<Utc>>,
}

/// Per-area order-flow-ingester checkpoint: one pointer per cooperating
/// flow (historical archival, realtime revision stream).
#[derive(Debug, Clone, PartialEq)]
pub struct OrderFlowSyncState {
    pub area: String,
    pub last_archived_time: Option<DateTime<Utc>>,
    pub last_realtime_time: Option<DateTime<Utc>>,
}
