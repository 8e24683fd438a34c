use crate::core_types::Side;
use crate::error::ParseIssue;
use crate::models::{OrderBookLevel, OrderBookSnapshot, OrderFlowTick};
use crate::parsers::tick_id::compute_tick_id;
use crate::upstream::dto::{OrderBookResponse, RevisionsResponse};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Canonical action a realtime revision maps to, per §4.D's action-string
/// table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionAction {
    New,
    Trade,
    Cancel,
    Update,
}

impl RevisionAction {
    fn from_raw(action: &str) -> Option<RevisionAction> {
        match action {
            "PartialExecution" | "FullExecution" => Some(RevisionAction::Trade),
            "UserAdded" => Some(RevisionAction::New),
            "UserDeleted" | "SystemDeleted" | "UserHibernated" | "SystemHibernated" => {
                Some(RevisionAction::Cancel)
            }
            "UserModified" | "SystemModified" => Some(RevisionAction::Update),
            _ => None,
        }
    }
}

/// One realtime revision after normalization: the persisted tick plus the
/// derived delta volume and (for trades) aggressor side. Delta volume and
/// aggressor are not persisted columns — they exist for downstream
/// microstructure analysis built on top of this normalizer's output.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTick {
    pub tick: OrderFlowTick,
    pub action: RevisionAction,
    pub delta_volume: Decimal,
    pub aggressor: Option<Side>,
}

const AGGRESSOR_THRESHOLD_MS: i64 = 200;

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, ParseIssue> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| ParseIssue::new(format!("bad timestamp '{raw}': {e}")))
}

/// Normalize the realtime revision-stream endpoint's per-order-grouped
/// response. For each order, revisions are sorted by `revision_number`
/// ascending and walked while tracking `last_remaining_volume`:
/// - NEW: `delta = current_remaining`.
/// - TRADE/CANCEL/UPDATE: `delta = max(0, last_remaining - current)` if a
///   prior remaining volume is known, else `0`.
/// - Revisions whose action isn't in the mapping table are skipped.
///
/// Aggressor is inferred for TRADE actions only: if `updated_time -
/// created_time < 200ms` the order's own side crossed the spread (taker);
/// otherwise the opposite side is inferred as aggressor.
pub fn normalize_realtime(
    response: &RevisionsResponse,
    area: &str,
) -> (Vec<NormalizedTick>, Vec<ParseIssue>) {
    let mut out = Vec::new();
    let mut issues = Vec::new();
    let root_updated_at = Utc::now();

    for contract in &response.contracts {
        for order in &contract.orders {
            let side: Side = match order.side.parse() {
                Ok(s) => s,
                Err(e) => {
                    issues.push(e);
                    continue;
                }
            };
            let created_time = match parse_instant(&order.created_time) {
                Ok(v) => v,
                Err(e) => {
                    issues.push(e);
                    continue;
                }
            };

            let mut revisions: Vec<_> = order.revisions.iter().collect();
            revisions.sort_by_key(|r| r.revision_number);

            let mut last_remaining: Option<Decimal> = None;

            for revision in revisions {
                let Some(action) = RevisionAction::from_raw(&revision.action) else {
                    continue;
                };

                let updated_time = match parse_instant(&revision.updated_time) {
                    Ok(v) => v,
                    Err(e) => {
                        issues.push(e);
                        continue;
                    }
                };
                let priority_time = match &revision.priority_time {
                    Some(raw) => parse_instant(raw).unwrap_or(updated_time),
                    None => updated_time,
                };

                let current_remaining = revision.volume;
                let delta_volume = match action {
                    RevisionAction::New => current_remaining,
                    RevisionAction::Trade | RevisionAction::Cancel | RevisionAction::Update => {
                        match last_remaining {
                            Some(prev) => (prev - current_remaining).max(Decimal::ZERO),
                            None => Decimal::ZERO,
                        }
                    }
                };
                last_remaining = Some(current_remaining);

                let aggressor = if action == RevisionAction::Trade {
                    let is_own_side_taker =
                        (updated_time - created_time).num_milliseconds() < AGGRESSOR_THRESHOLD_MS;
                    Some(if is_own_side_taker { side } else { side.opposite() })
                } else {
                    None
                };

                let is_deleted = action == RevisionAction::Cancel;
                let tick_id = compute_tick_id(
                    &contract.contract_id,
                    area,
                    &revision.revision_number.to_string(),
                    &order.order_id,
                    &revision.action,
                );

                out.push(NormalizedTick {
                    tick: OrderFlowTick {
                        tick_id,
                        contract_id: contract.contract_id.clone(),
                        delivery_area: area.to_string(),
                        order_id: order.order_id.clone(),
                        side,
                        price: revision.price,
                        volume: current_remaining,
                        updated_time,
                        priority_time,
                        is_snapshot: false,
                        is_deleted,
                        revision_number: revision.revision_number,
                        root_updated_at,
                    },
                    action,
                    delta_volume,
                    aggressor,
                });
            }
        }
    }

    (out, issues)
}

/// Result of normalizing the historical `OrderBook/ByContractId`
/// endpoint: snapshot revisions become [`OrderBookSnapshot`]s, non-snapshot
/// revisions become ticks (the historical endpoint does not disambiguate
/// NEW from MODIFY, so every live order row becomes an UPDATE-or-CANCEL
/// tick keyed on its `deleted` flag).
pub struct HistoricalNormalizeResult {
    pub ticks: Vec<OrderFlowTick>,
    pub snapshots: Vec<OrderBookSnapshot>,
}

pub fn normalize_historical(
    response: &OrderBookResponse,
) -> (HistoricalNormalizeResult, Vec<ParseIssue>) {
    let mut ticks = Vec::new();
    let mut snapshots = Vec::new();
    let mut issues = Vec::new();

    let root_updated_at = match parse_instant(&response.updated_at) {
        Ok(v) => v,
        Err(e) => {
            issues.push(e);
            return (HistoricalNormalizeResult { ticks, snapshots }, issues);
        }
    };

    for revision in &response.revisions {
        if revision.is_snapshot {
            let mut bids = Vec::new();
            let mut asks = Vec::new();

            for order in &revision.buy_orders {
                match book_level(order) {
                    Ok(level) => bids.push(level),
                    Err(e) => issues.push(e),
                }
            }
            for order in &revision.sell_orders {
                match book_level(order) {
                    Ok(level) => asks.push(level),
                    Err(e) => issues.push(e),
                }
            }

            bids.sort_by(|a, b| b.price.cmp(&a.price).then(a.priority_time.cmp(&b.priority_time)));
            asks.sort_by(|a, b| a.price.cmp(&b.price).then(a.priority_time.cmp(&b.priority_time)));

            snapshots.push(OrderBookSnapshot {
                snapshot_id: Uuid::new_v4(),
                contract_id: response.contract_id.clone(),
                area: response.delivery_area.clone(),
                timestamp: root_updated_at,
                revision_number: revision.revision,
                bids,
                asks,
                is_native: true,
            });
            continue;
        }

        for (side, orders) in [(Side::Buy, &revision.buy_orders), (Side::Sell, &revision.sell_orders)] {
            for order in orders {
                let updated_time = match parse_instant(&order.updated_time) {
                    Ok(v) => v,
                    Err(e) => {
                        issues.push(e);
                        continue;
                    }
                };
                let priority_time = match &order.priority_time {
                    Some(raw) => parse_instant(raw).unwrap_or(updated_time),
                    None => updated_time,
                };

                let action_tag = if order.deleted { "CANCEL" } else { "UPDATE" };
                let tick_id = compute_tick_id(
                    &response.contract_id,
                    &response.delivery_area,
                    &revision.revision.to_string(),
                    &order.order_id,
                    action_tag,
                );

                ticks.push(OrderFlowTick {
                    tick_id,
                    contract_id: response.contract_id.clone(),
                    delivery_area: response.delivery_area.clone(),
                    order_id: order.order_id.clone(),
                    side,
                    price: order.price,
                    volume: order.volume,
                    updated_time,
                    priority_time,
                    is_snapshot: false,
                    is_deleted: order.deleted,
                    revision_number: revision.revision,
                    root_updated_at,
                });
            }
        }
    }

    (HistoricalNormalizeResult { ticks, snapshots }, issues)
}

fn book_level(order: &crate::upstream::dto::BookOrderDto) -> Result<OrderBookLevel, ParseIssue> {
    let updated_time = parse_instant(&order.updated_time)?;
    let priority_time = match &order.priority_time {
        Some(raw) => parse_instant(raw).unwrap_or(updated_time),
        None => updated_time,
    };
    Ok(OrderBookLevel {
        order_id: order.order_id.clone(),
        price: order.price,
        volume: order.volume,
        priority_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::dto::{OrderDto, RevisionContractDto, RevisionDto};

    fn revision(revision_number: i64, action: &str, volume: &str) -> RevisionDto {
        RevisionDto {
            revision_number,
            action: action.to_string(),
            price: "100".parse().unwrap(),
            volume: volume.parse().unwrap(),
            updated_time: "2025-01-01T09:00:00Z".to_string(),
            priority_time: None,
        }
    }

    #[test]
    fn delta_volume_recovery_sequence() {
        let response = RevisionsResponse {
            contracts: vec![RevisionContractDto {
                contract_id: "C1".into(),
                contract_name: "PH".into(),
                delivery_start: "2025-01-01T15:00:00Z".into(),
                delivery_end: "2025-01-01T16:00:00Z".into(),
                orders: vec![OrderDto {
                    order_id: "O1".into(),
                    side: "BUY".into(),
                    created_time: "2025-01-01T08:59:59.900Z".into(),
                    revisions: vec![
                        revision(1, "UserAdded", "10"),
                        revision(2, "PartialExecution", "6"),
                        revision(3, "PartialExecution", "2"),
                        revision(4, "FullExecution", "0"),
                    ],
                }],
            }],
        };

        let (normalized, issues) = normalize_realtime(&response, "SE3");
        assert!(issues.is_empty());
        let deltas: Vec<_> = normalized.iter().map(|n| n.delta_volume.to_string()).collect();
        assert_eq!(deltas, vec!["10", "4", "4", "2"]);
    }

    #[test]
    fn aggressor_is_own_side_when_fast() {
        let response = RevisionsResponse {
            contracts: vec![RevisionContractDto {
                contract_id: "C1".into(),
                contract_name: "PH".into(),
                delivery_start: "2025-01-01T15:00:00Z".into(),
                delivery_end: "2025-01-01T16:00:00Z".into(),
                orders: vec![OrderDto {
                    order_id: "O1".into(),
                    side: "BUY".into(),
                    created_time: "2025-01-01T09:00:00.000Z".into(),
                    revisions: vec![RevisionDto {
                        revision_number: 1,
                        action: "FullExecution".to_string(),
                        price: "100".parse().unwrap(),
                        volume: "0".parse().unwrap(),
                        updated_time: "2025-01-01T09:00:00.100Z".to_string(),
                        priority_time: None,
                    }],
                }],
            }],
        };

        let (normalized, _) = normalize_realtime(&response, "SE3");
        assert_eq!(normalized[0].aggressor, Some(Side::Buy));
    }

    #[test]
    fn aggressor_is_opposite_side_when_slow() {
        let response = RevisionsResponse {
            contracts: vec![RevisionContractDto {
                contract_id: "C1".into(),
                contract_name: "PH".into(),
                delivery_start: "2025-01-01T15:00:00Z".into(),
                delivery_end: "2025-01-01T16:00:00Z".into(),
                orders: vec![OrderDto {
                    order_id: "O1".into(),
                    side: "BUY".into(),
                    created_time: "2025-01-01T09:00:00.000Z".into(),
                    revisions: vec![RevisionDto {
                        revision_number: 1,
                        action: "FullExecution".to_string(),
                        price: "100".parse().unwrap(),
                        volume: "0".parse().unwrap(),
                        updated_time: "2025-01-01T09:00:01.000Z".to_string(),
                        priority_time: None,
                    }],
                }],
            }],
        };

        let (normalized, _) = normalize_realtime(&response, "SE3");
        assert_eq!(normalized[0].aggressor, Some(Side::Sell));
    }

    #[test]
    fn unrecognized_action_is_skipped() {
        let response = RevisionsResponse {
            contracts: vec![RevisionContractDto {
                contract_id: "C1".into(),
                contract_name: "PH".into(),
                delivery_start: "2025-01-01T15:00:00Z".into(),
                delivery_end: "2025-01-01T16:00:00Z".into(),
                orders: vec![OrderDto {
                    order_id: "O1".into(),
                    side: "BUY".into(),
                    created_time: "2025-01-01T09:00:00.000Z".into(),
                    revisions: vec![revision(1, "SomeUnknownAction", "5")],
                }],
            }],
        };

        let (normalized, _) = normalize_realtime(&response, "SE3");
        assert!(normalized.is_empty());
    }
}
