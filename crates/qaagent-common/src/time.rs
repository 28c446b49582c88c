//! UTC timestamp helpers shared by run ids, evidence ids, and manifests.

use chrono::{DateTime, Utc};

/// `YYYYMMDD_HHMMSSZ`, the run-id timestamp format.
pub fn run_id_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d_%H%M%SZ").to_string()
}

/// `YYYYMMDD`, the date prefix embedded in evidence ids.
pub fn date_prefix(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d").to_string()
}

/// ISO-8601 UTC, used for every persisted timestamp field (manifest
/// `created_at`, evidence `collected_at`, etc).
pub fn iso8601(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn run_id_timestamp_has_no_separators_besides_underscore() {
        let t = Utc.with_ymd_and_hms(2026, 7, 28, 10, 5, 3).unwrap();
        assert_eq!(run_id_timestamp(t), "20260728_100503Z");
    }

    #[test]
    fn date_prefix_is_eight_digits() {
        let t = Utc.with_ymd_and_hms(2026, 7, 28, 10, 5, 3).unwrap();
        let prefix = date_prefix(t);
        assert_eq!(prefix.len(), 8);
        assert!(prefix.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn iso8601_is_rfc3339_utc() {
        let t = Utc.with_ymd_and_hms(2026, 7, 28, 10, 5, 3).unwrap();
        let s = iso8601(t);
        assert!(s.ends_with('Z'));
        DateTime::parse_from_rfc3339(&s).unwrap();
    }
}
