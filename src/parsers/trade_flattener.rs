use crate::core_types::ContractType;
use crate::error::ParseIssue;
use crate::models::Trade;
use crate::upstream::dto::TradesResponse;
use chrono::{DateTime, Utc};

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, ParseIssue> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ParseIssue::new(format!("bad timestamp '{raw}': {e}")))
}

/// Flatten one trades response into one [`Trade`] record per (trade, leg)
/// pair, so per-area storage is lossless. `requested_area` is used when a
/// contract/trade pair carries no legs at all, with `trade_side` set to
/// `"Unknown"`. Malformed contracts/trades are skipped and reported as
/// issues rather than failing the whole batch.
pub fn flatten_trades(response: &TradesResponse, requested_area: &str) -> (Vec<Trade>, Vec<ParseIssue>) {
    let mut trades = Vec::new();
    let mut issues = Vec::new();

    for contract in &response.contracts {
        let delivery_start = match parse_instant(&contract.delivery_start) {
            Ok(v) => v,
            Err(e) => {
                issues.push(e);
                continue;
            }
        };
        let delivery_end = match parse_instant(&contract.delivery_end) {
            Ok(v) => v,
            Err(e) => {
                issues.push(e);
                continue;
            }
        };
        let duration_minutes = (delivery_end - delivery_start).num_seconds() as f64 / 60.0;
        let contract_type = ContractType::classify(duration_minutes);

        for trade in &contract.trades {
            let trade_time = match parse_instant(&trade.trade_time) {
                Ok(v) => v,
                Err(e) => {
                    issues.push(e);
                    continue;
                }
            };
            let trade_updated_at = match parse_instant(&trade.trade_updated_at) {
                Ok(v) => v,
                Err(e) => {
                    issues.push(e);
                    continue;
                }
            };

            if trade.legs.is_empty() {
                trades.push(Trade {
                    trade_id: trade.trade_id.clone(),
                    delivery_area: requested_area.to_string(),
                    trade_side: Trade::UNKNOWN_SIDE.to_string(),
                    contract_id: contract.contract_id.clone(),
                    contract_name: contract.contract_name.clone(),
                    delivery_start,
                    delivery_end,
                    duration_minutes,
                    contract_type,
                    price: trade.price,
                    volume: trade.volume,
                    trade_time,
                    trade_updated_at,
                    state: trade.trade_state.clone(),
                    revision_number: trade.revision_number,
                    phase: trade.trade_phase.clone(),
                    cross_exchange: trade.cross_px.unwrap_or(false),
                    reference_order_id: None,
                });
                continue;
            }

            for leg in &trade.legs {
                trades.push(Trade {
                    trade_id: trade.trade_id.clone(),
                    delivery_area: leg.delivery_area.clone(),
                    trade_side: leg.trade_side.clone(),
                    contract_id: contract.contract_id.clone(),
                    contract_name: contract.contract_name.clone(),
                    delivery_start,
                    delivery_end,
                    duration_minutes,
                    contract_type,
                    price: trade.price,
                    volume: trade.volume,
                    trade_time,
                    trade_updated_at,
                    state: trade.trade_state.clone(),
                    revision_number: trade.revision_number,
                    phase: trade.trade_phase.clone(),
                    cross_exchange: trade.cross_px.unwrap_or(false),
                    reference_order_id: leg.reference_order_id.clone(),
                });
            }
        }
    }

    (trades, issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::dto::{TradeContractDto, TradeDto, TradeLegDto};
    use rust_decimal::Decimal;

    fn contract_with_legs() -> TradesResponse {
        TradesResponse {
            contracts: vec![TradeContractDto {
                contract_id: "C1".into(),
                contract_name: "PH 15-16".into(),
                delivery_start: "2025-01-01T15:00:00Z".into(),
                delivery_end: "2025-01-01T16:00:00Z".into(),
                trades: vec![TradeDto {
                    trade_id: "T1".into(),
                    trade_time: "2025-01-01T10:00:00Z".into(),
                    trade_updated_at: "2025-01-01T10:00:01Z".into(),
                    trade_state: "Completed".into(),
                    revision_number: 1,
                    price: Decimal::new(500, 1),
                    volume: Decimal::new(30, 1),
                    trade_phase: None,
                    cross_px: Some(false),
                    legs: vec![
                        TradeLegDto {
                            delivery_area: "SE3".into(),
                            reference_order_id: Some("O1".into()),
                            trade_side: "Buy".into(),
                        },
                        TradeLegDto {
                            delivery_area: "DK1".into(),
                            reference_order_id: Some("O2".into()),
                            trade_side: "Sell".into(),
                        },
                    ],
                }],
            }],
        }
    }

    #[test]
    fn s1_cold_start_single_se3_buy_row() {
        let response = contract_with_legs();
        let (trades, issues) = flatten_trades(&response, "SE3");
        assert!(issues.is_empty());
        assert_eq!(trades.len(), 2);
        let se3_buy: Vec<_> = trades
            .iter()
            .filter(|t| t.delivery_area == "SE3" && t.trade_side == "Buy")
            .collect();
        assert_eq!(se3_buy.len(), 1);
        assert_eq!(se3_buy[0].contract_type, ContractType::Ph);
    }

    #[test]
    fn no_legs_falls_back_to_unknown_side() {
        let mut response = contract_with_legs();
        response.contracts[0].trades[0].legs.clear();
        let (trades, _) = flatten_trades(&response, "SE3");
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].trade_side, "Unknown");
        assert_eq!(trades[0].delivery_area, "SE3");
    }
}
