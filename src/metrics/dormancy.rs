use chrono::{DateTime, NaiveDateTime, Utc};
use crate::models::MISSING;
use tracing::warn;

const UPSTREAM_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";
const DISPLAY_DATE_FORMAT: &str = "%B %d, %Y";

/// Parses an upstream timestamp. Accepts RFC 3339 and the bare
/// `2024-01-31T12:00:00.000Z` form.
pub fn parse_scan_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, UPSTREAM_DATE_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Dormancy rule of a run, evaluated against a fixed "now".
#[derive(Debug, Clone, Copy)]
pub struct Dormancy {
    /// Threshold in days; zero or less disables dormancy.
    pub since_days: i64,
    pub now: DateTime<Utc>,
}

/// Display date and dormant flag of one version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanStatus {
    pub last_scan_date: String,
    pub is_dormant: bool,
}

impl Dormancy {
    pub fn new(since_days: i64) -> Self {
        Self { since_days, now: Utc::now() }
    }

    pub fn at(since_days: i64, now: DateTime<Utc>) -> Self {
        Self { since_days, now }
    }

    pub fn enabled(&self) -> bool {
        self.since_days > 0
    }

    /// Classifies a version by its raw `lastScanDate`. With dormancy enabled a
    /// version that was never scanned, or whose date cannot be parsed, is
    /// dormant.
    pub fn evaluate(&self, last_scan_date: Option<&str>) -> ScanStatus {
        let parsed = last_scan_date.filter(|s| !s.is_empty()).and_then(|raw| {
            let date = parse_scan_date(raw);
            if date.is_none() {
                warn!(value = raw, "Unparseable lastScanDate, treating as never scanned");
            }
            date
        });

        let display = parsed
            .map(|d| d.format(DISPLAY_DATE_FORMAT).to_string())
            .unwrap_or_else(|| MISSING.to_string());

        let is_dormant = self.enabled()
            && match parsed {
                Some(date) => (self.now - date).num_days() > self.since_days,
                None => true,
            };

        ScanStatus { last_scan_date: display, is_dormant }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn days_ago(days: i64) -> String {
        (now() - Duration::days(days)).format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
    }

    #[test]
    fn test_parse_both_formats() {
        assert!(parse_scan_date("2024-01-31T12:00:00.000Z").is_some());
        assert!(parse_scan_date("2024-01-31T12:00:00+02:00").is_some());
        assert!(parse_scan_date("yesterday").is_none());
    }

    #[test]
    fn test_dormant_after_threshold() {
        let rule = Dormancy::at(30, now());
        assert!(rule.evaluate(Some(&days_ago(31))).is_dormant);
        assert!(!rule.evaluate(Some(&days_ago(29))).is_dormant);
        assert!(!rule.evaluate(Some(&days_ago(30))).is_dormant);
    }

    #[test]
    fn test_never_scanned_is_dormant_when_enabled() {
        let rule = Dormancy::at(30, now());
        let status = rule.evaluate(None);
        assert!(status.is_dormant);
        assert_eq!(status.last_scan_date, MISSING);
        assert!(rule.evaluate(Some("not a date")).is_dormant);
    }

    #[test]
    fn test_disabled_rule_never_flags() {
        let rule = Dormancy::at(0, now());
        assert!(!rule.evaluate(None).is_dormant);
        assert!(!rule.evaluate(Some(&days_ago(400))).is_dormant);
    }

    #[test]
    fn test_display_format() {
        let rule = Dormancy::at(30, now());
        let status = rule.evaluate(Some("2024-01-05T08:30:00.000Z"));
        assert_eq!(status.last_scan_date, "January 05, 2024");
    }
}
