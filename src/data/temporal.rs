//! Calendar and delivery-speed derivation for order lines.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Timestamp layouts seen in exported order tables.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a raw timestamp cell.
///
/// Empty cells and anything that doesn't match a known layout yield `None`.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts);
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.naive_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Derive `(year, month)` from a purchase timestamp.
pub fn derive_calendar(ts: Option<NaiveDateTime>) -> (Option<i32>, Option<u32>) {
    match ts {
        Some(ts) => (Some(ts.year()), Some(ts.month())),
        None => (None, None),
    }
}

/// Whole days elapsed between purchase and delivery.
///
/// `None` when either side is missing or the delivery predates the purchase.
pub fn delivery_days(purchased: Option<NaiveDateTime>, delivered: Option<NaiveDateTime>) -> Option<i64> {
    let elapsed = delivered? - purchased?;
    let days = elapsed.num_days();
    (elapsed >= chrono::Duration::zero()).then_some(days)
}
