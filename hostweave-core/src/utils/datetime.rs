//! Timestamp helpers.
//!
//! Refresh metadata is stored twice: epoch milliseconds for arithmetic and a
//! human-readable string for display. Both come from here so the formats
//! never drift apart.

use chrono::{DateTime, Utc};

/// Current time as epoch milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Format epoch milliseconds as `YYYY-MM-DD HH:MM:SS` (UTC).
///
/// Out-of-range values fall back to the epoch rather than failing.
#[must_use]
pub fn format_millis(ms: i64) -> String {
    let dt = DateTime::<Utc>::from_timestamp_millis(ms).unwrap_or_default();
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Current time as a (human string, epoch ms) pair.
#[must_use]
pub fn now_pair() -> (String, i64) {
    let ms = now_millis();
    (format_millis(ms), ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_epoch() {
        assert_eq!(format_millis(0), "1970-01-01 00:00:00");
    }

    #[test]
    fn format_known_timestamp() {
        // 2021-06-01 12:34:56 UTC
        assert_eq!(format_millis(1_622_550_896_000), "2021-06-01 12:34:56");
    }

    #[test]
    fn pair_is_consistent() {
        let (human, ms) = now_pair();
        assert_eq!(human, format_millis(ms));
    }
}
