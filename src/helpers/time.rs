use chrono::{DateTime, Utc};
use tokio::time::Instant;

use crate::utils::constants::DEFAULT_SAFETY_MARGIN_SECS;

pub fn get_token_safety_margin_seconds(safety_margin_seconds_settings: Option<u64>) -> u64 {
    safety_margin_seconds_settings.unwrap_or(DEFAULT_SAFETY_MARGIN_SECS)
}

/// Absolute expiry of a freshly issued token, with the safety margin already subtracted.
///
/// `None` when `expires_in` is outside what a timestamp can represent.
pub fn expires_at_from(issued_at: DateTime<Utc>, expires_in_seconds: i64, safety_margin_seconds: u64) -> Option<DateTime<Utc>> {
    let margin = i64::try_from(safety_margin_seconds).ok()?;
    let lifetime = chrono::Duration::try_seconds(expires_in_seconds.checked_sub(margin)?)?;
    issued_at.checked_add_signed(lifetime)
}

pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

pub fn get_instant() -> Instant {
    Instant::now()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn margin_falls_back_to_default() {
        assert_eq!(get_token_safety_margin_seconds(None), 60);
        assert_eq!(get_token_safety_margin_seconds(Some(5)), 5);
    }

    #[test]
    fn expiry_subtracts_margin_once() {
        let issued = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let exp = expires_at_from(issued, 3600, 60).unwrap();
        assert_eq!(exp.timestamp(), 1_700_000_000 + 3540);
    }

    #[test]
    fn out_of_range_lifetimes_are_rejected() {
        let issued = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert!(expires_at_from(issued, 10_000_000_000_000, 60).is_none());
        assert!(expires_at_from(issued, i64::MAX, 60).is_none());
        assert!(expires_at_from(issued, i64::MIN, 60).is_none());
        assert!(expires_at_from(issued, 3600, u64::MAX).is_none());
    }
}
