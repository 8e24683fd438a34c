use crate::core_types::ContractType;
use crate::error::ParseIssue;
use crate::models::OrderContract;
use crate::time_util::trading_window;
use crate::upstream::dto::ContractsResponse;
use chrono::{DateTime, Utc};

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, ParseIssue> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ParseIssue::new(format!("bad timestamp '{raw}': {e}")))
}

/// Upstream's contract-listing payload carries no unit metadata; the
/// exchange's intraday power contracts are uniformly quoted this way.
const VOLUME_UNIT: &str = "MWh";
const PRICE_UNIT: &str = "EUR/MWh";

/// Normalize `ContractsIds/ByArea` into [`OrderContract`] rows, with the
/// trading window (§6) computed from `delivery_start`.
pub fn normalize_contracts(
    response: &ContractsResponse,
    area: &str,
    now: DateTime<Utc>,
) -> (Vec<OrderContract>, Vec<ParseIssue>) {
    let mut contracts = Vec::new();
    let mut issues = Vec::new();

    for dto in &response.contracts {
        let delivery_start = match parse_instant(&dto.delivery_start) {
            Ok(v) => v,
            Err(e) => {
                issues.push(e);
                continue;
            }
        };
        let delivery_end = match parse_instant(&dto.delivery_end) {
            Ok(v) => v,
            Err(e) => {
                issues.push(e);
                continue;
            }
        };
        let duration_minutes = (delivery_end - delivery_start).num_seconds() as f64 / 60.0;
        let window = trading_window(delivery_start);

        contracts.push(OrderContract {
            contract_id: dto.contract_id.clone(),
            delivery_area: area.to_string(),
            contract_name: dto.contract_name.clone(),
            delivery_start,
            delivery_end,
            contract_type: ContractType::classify(duration_minutes),
            volume_unit: VOLUME_UNIT.to_string(),
            price_unit: PRICE_UNIT.to_string(),
            open_ts: window.open_utc,
            close_ts: window.close_utc,
            is_archived: false,
            updated_at: now,
        });
    }

    (contracts, issues)
}
