//! FX session hours in a simplified model: open 00:00-22:00 UTC every day.
//!
//! Weekends and holidays are not modelled.

use crate::core::currency::MarketStatus;
use chrono::{DateTime, Duration, NaiveTime, Timelike, Utc};

pub const CLOSE_HOUR: u32 = 22;

pub fn market_status(now: DateTime<Utc>) -> MarketStatus {
    let today = now.date_naive();
    let tomorrow = today + Duration::days(1);
    let close_time = NaiveTime::MIN + Duration::hours(CLOSE_HOUR as i64);

    let is_open = now.hour() < CLOSE_HOUR;
    let next_open = tomorrow.and_time(NaiveTime::MIN).and_utc();
    let next_close = if is_open {
        today.and_time(close_time).and_utc()
    } else {
        tomorrow.and_time(close_time).and_utc()
    };

    MarketStatus {
        is_open,
        next_open,
        next_close,
        timezone: "UTC".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_open_during_session() {
        let now = Utc.with_ymd_and_hms(2024, 6, 14, 9, 30, 0).unwrap();
        let status = market_status(now);

        assert!(status.is_open);
        assert_eq!(status.next_close, Utc.with_ymd_and_hms(2024, 6, 14, 22, 0, 0).unwrap());
        assert_eq!(status.next_open, Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap());
        assert_eq!(status.timezone, "UTC");
    }

    #[test]
    fn test_session_boundaries() {
        let midnight = Utc.with_ymd_and_hms(2024, 6, 14, 0, 0, 0).unwrap();
        assert!(market_status(midnight).is_open);

        let last_minute = Utc.with_ymd_and_hms(2024, 6, 14, 21, 59, 59).unwrap();
        assert!(market_status(last_minute).is_open);

        let close = Utc.with_ymd_and_hms(2024, 6, 14, 22, 0, 0).unwrap();
        assert!(!market_status(close).is_open);
    }

    #[test]
    fn test_closed_points_to_next_day() {
        let now = Utc.with_ymd_and_hms(2024, 12, 31, 23, 15, 0).unwrap();
        let status = market_status(now);

        assert!(!status.is_open);
        assert_eq!(status.next_open, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(status.next_close, Utc.with_ymd_and_hms(2025, 1, 1, 22, 0, 0).unwrap());
    }

    #[test]
    fn test_weekends_are_open() {
        // Saturday
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        assert!(market_status(now).is_open);
    }
}
