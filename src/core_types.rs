//! Core type aliases used throughout the system.

use chrono::{DateTime, Utc};

/// Delivery area code, e.g. "SE3", "DK1".
pub type Area = String;

/// Upstream contract identifier (opaque string assigned by the exchange).
pub type ContractId = String;

/// Deterministic tick identity — an MD5 hex digest, see `parsers::tick_id`.
pub type TickId = String;

/// An instant in UTC. All timestamps in this system are UTC; callers must
/// never assume a local zone unless explicitly converting at the edge
/// (see `time_util::trading_window`).
pub type Instant = DateTime<Utc>;

/// Delivery contract classification, derived from delivery duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContractType {
    /// ~60 minute delivery window.
    Ph,
    /// ~15 minute delivery window.
    Qh,
    /// Anything that doesn't fit the PH/QH tolerance bands.
    Other,
}

impl ContractType {
    /// Classify from a delivery duration, tolerant to +/-1 minute.
    pub fn classify(duration_minutes: f64) -> ContractType {
        if (duration_minutes - 60.0).abs() <= 1.0 {
            ContractType::Ph
        } else if (duration_minutes - 15.0).abs() <= 1.0 {
            ContractType::Qh
        } else {
            ContractType::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContractType::Ph => "PH",
            ContractType::Qh => "QH",
            ContractType::Other => "Other",
        }
    }
}

impl std::fmt::Display for ContractType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContractType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "PH" => ContractType::Ph,
            "QH" => ContractType::Qh,
            _ => ContractType::Other,
        })
    }
}

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn opposite(&self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        }
    }
}

impl std::str::FromStr for Side {
    type Err = crate::error::ParseIssue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "BUY" => Ok(Side::Buy),
            "SELL" => Ok(Side::Sell),
            other => Err(crate::error::ParseIssue::new(format!(
                "unrecognized side: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_boundaries() {
        assert_eq!(ContractType::classify(59.2), ContractType::Ph);
        assert_eq!(ContractType::classify(60.8), ContractType::Ph);
        assert_eq!(ContractType::classify(14.2), ContractType::Qh);
        assert_eq!(ContractType::classify(15.8), ContractType::Qh);
        assert_eq!(ContractType::classify(45.0), ContractType::Other);
    }

    #[test]
    fn side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }
}
