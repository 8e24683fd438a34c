//! Time helpers shared by the read API and the live runner.

use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use chrono_tz::Europe::Stockholm;

/// A contract's trading window: when it opens for intraday trading and
/// when it closes (one hour before delivery starts).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradingWindow {
    pub open_utc: DateTime<Utc>,
    pub close_utc: DateTime<Utc>,
}

/// Compute `(open_utc, close_utc)` for a contract given its delivery start.
///
/// `open_utc` is 13:00 local Europe/Stockholm time on the day before the
/// delivery date, DST-aware, converted back to UTC. `close_utc` is simply
/// `delivery_start_utc - 1h`.
pub fn trading_window(delivery_start_utc: DateTime<Utc>) -> TradingWindow {
    let delivery_local = delivery_start_utc.with_timezone(&Stockholm);
    let day_before = delivery_local.date_naive() - Duration::days(1);
    let open_naive = day_before.and_time(NaiveTime::from_hms_opt(13, 0, 0).unwrap());

    // `and_local_timezone` picks the earliest valid offset across a DST
    // fold/gap; 13:00 never lands in Stockholm's spring-forward gap so this
    // is always unambiguous in practice.
    let open_local = Stockholm
        .from_local_datetime(&open_naive)
        .single()
        .unwrap_or_else(|| Stockholm.from_utc_datetime(&open_naive));

    TradingWindow {
        open_utc: open_local.with_timezone(&Utc),
        close_utc: delivery_start_utc - Duration::hours(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn winter_delivery_offset_is_plus_one() {
        // Delivery 2025-01-15 15:00 UTC -> Stockholm is UTC+1 in January.
        let delivery = Utc.with_ymd_and_hms(2025, 1, 15, 15, 0, 0).unwrap();
        let w = trading_window(delivery);
        // Day before = 2025-01-14, 13:00 local (+1) = 12:00 UTC.
        assert_eq!(w.open_utc, Utc.with_ymd_and_hms(2025, 1, 14, 12, 0, 0).unwrap());
        assert_eq!(w.close_utc, Utc.with_ymd_and_hms(2025, 1, 15, 14, 0, 0).unwrap());
    }

    #[test]
    fn summer_delivery_offset_is_plus_two() {
        // Delivery 2025-07-15 15:00 UTC -> Stockholm is UTC+2 (DST) in July.
        let delivery = Utc.with_ymd_and_hms(2025, 7, 15, 15, 0, 0).unwrap();
        let w = trading_window(delivery);
        assert_eq!(w.open_utc, Utc.with_ymd_and_hms(2025, 7, 14, 11, 0, 0).unwrap());
        assert_eq!(w.close_utc, Utc.with_ymd_and_hms(2025, 7, 15, 14, 0, 0).unwrap());
    }
}
