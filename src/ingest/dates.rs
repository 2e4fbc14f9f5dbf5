//! Date normalization: heterogeneous raw date encodings into a calendar
//! date. A `None` result drops the owning row from every aggregate.

use crate::utils::date::{parse_date, parse_dotted_date};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Try the supported encodings in order:
/// 1. already date-shaped (`YYYY-MM-DD`),
/// 2. number: Unix epoch seconds, truncated to local midnight,
/// 3. positional `DD.MM.YYYY`,
/// 4. generic locale-independent parse (RFC 3339, `YYYY-MM-DD HH:MM:SS`).
pub fn normalize(raw: &Value) -> Option<NaiveDate> {
    match raw {
        Value::String(s) => normalize_str(s.trim()),
        Value::Number(n) => {
            let secs = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            Some(epoch_to_local_date(secs)?)
        }
        _ => None,
    }
}

fn normalize_str(s: &str) -> Option<NaiveDate> {
    if s.is_empty() {
        return None;
    }
    if let Some(d) = parse_date(s) {
        return Some(d);
    }
    if let Some(d) = parse_dotted_date(s) {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).date_naive());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|dt| dt.date())
}

/// Epoch seconds to the local calendar day they fall on.
pub fn epoch_to_local_date(secs: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.with_timezone(&Local).date_naive())
}
