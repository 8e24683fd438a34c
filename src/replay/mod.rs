//! Order-book reconstruction from the stored tick stream: fold every tick
//! up to `target_time` into a live order map, then partition and sort into
//! a book view. Read-only; writes nothing.

use crate::core_types::Side;
use crate::persistence::ticks;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct BookLevelView {
    pub order_id: String,
    pub price: Decimal,
    pub volume: Decimal,
    pub priority_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookView {
    pub timestamp: DateTime<Utc>,
    pub bids: Vec<BookLevelView>,
    pub asks: Vec<BookLevelView>,
}

struct LiveOrder {
    side: Side,
    price: Decimal,
    volume: Decimal,
    priority_time: DateTime<Utc>,
}

/// Reconstruct the order book for `contract_id` as of `target_time`.
///
/// The historical normalizer emits native snapshots into their own table,
/// never as replace-all events in the tick stream, so this fold never
/// clears `active_orders` on a snapshot tick — see §4.H.
pub async fn replay(
    pool: &PgPool,
    contract_id: &str,
    target_time: DateTime<Utc>,
) -> Result<BookView, sqlx::Error> {
    let tick_batch = ticks::ticks_up_to(pool, contract_id, target_time).await?;
    Ok(fold(&tick_batch, target_time))
}

fn fold(tick_batch: &[crate::models::OrderFlowTick], target_time: DateTime<Utc>) -> BookView {
    let mut active_orders: HashMap<String, LiveOrder> = HashMap::new();

    for tick in tick_batch {
        if tick.clears_order() {
            active_orders.remove(&tick.order_id);
            continue;
        }

        active_orders.insert(
            tick.order_id.clone(),
            LiveOrder {
                side: tick.side,
                price: tick.price,
                volume: tick.volume,
                priority_time: tick.priority_time,
            },
        );
    }

    let mut bids: Vec<BookLevelView> = Vec::new();
    let mut asks: Vec<BookLevelView> = Vec::new();

    for (order_id, order) in active_orders {
        let level = BookLevelView {
            order_id,
            price: order.price,
            volume: order.volume,
            priority_time: order.priority_time,
        };
        match order.side {
            Side::Buy => bids.push(level),
            Side::Sell => asks.push(level),
        }
    }

    bids.sort_by(|a, b| b.price.cmp(&a.price).then(a.priority_time.cmp(&b.priority_time)));
    asks.sort_by(|a, b| a.price.cmp(&b.price).then(a.priority_time.cmp(&b.priority_time)));

    BookView {
        timestamp: target_time,
        bids,
        asks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderFlowTick;
    use chrono::TimeZone;

    fn tick(order_id: &str, side: Side, price: i64, volume: i64, deleted: bool, t: i64) -> OrderFlowTick {
        OrderFlowTick {
            tick_id: format!("{order_id}-{t}"),
            contract_id: "C1".into(),
            delivery_area: "SE3".into(),
            order_id: order_id.into(),
            side,
            price: Decimal::from(price),
            volume: Decimal::from(volume),
            updated_time: Utc.timestamp_opt(t, 0).unwrap(),
            priority_time: Utc.timestamp_opt(t, 0).unwrap(),
            is_snapshot: false,
            is_deleted: deleted,
            revision_number: t,
            root_updated_at: Utc.timestamp_opt(t, 0).unwrap(),
        }
    }

    #[test]
    fn deletion_removes_order_from_book() {
        let ticks = vec![
            tick("O1", Side::Buy, 50, 10, false, 1),
            tick("O1", Side::Buy, 50, 0, true, 2),
        ];
        let view = fold(&ticks, Utc.timestamp_opt(100, 0).unwrap());
        assert!(view.bids.is_empty());
    }

    #[test]
    fn bids_sorted_price_desc_then_priority_asc() {
        let ticks = vec![
            tick("O1", Side::Buy, 40, 5, false, 1),
            tick("O2", Side::Buy, 50, 5, false, 2),
            tick("O3", Side::Buy, 50, 5, false, 1),
        ];
        let view = fold(&ticks, Utc.timestamp_opt(100, 0).unwrap());
        let ids: Vec<&str> = view.bids.iter().map(|l| l.order_id.as_str()).collect();
        assert_eq!(ids, vec!["O3", "O2", "O1"]);
    }

    #[test]
    fn asks_sorted_price_asc_then_priority_asc() {
        let ticks = vec![
            tick("O1", Side::Sell, 60, 5, false, 2),
            tick("O2", Side::Sell, 55, 5, false, 2),
            tick("O3", Side::Sell, 55, 5, false, 1),
        ];
        let view = fold(&ticks, Utc.timestamp_opt(100, 0).unwrap());
        let ids: Vec<&str> = view.asks.iter().map(|l| l.order_id.as_str()).collect();
        assert_eq!(ids, vec!["O3", "O2", "O1"]);
    }

    #[test]
    fn volume_zero_clears_order_without_deleted_flag() {
        let ticks = vec![
            tick("O1", Side::Buy, 50, 10, false, 1),
            tick("O1", Side::Buy, 50, 0, false, 2),
        ];
        let view = fold(&ticks, Utc.timestamp_opt(100, 0).unwrap());
        assert!(view.bids.is_empty());
    }
}
