//! Legacy remote payload repair.
//!
//! Two historical shapes are recognized and rewritten in memory before any
//! other processing:
//! - a flat, non-per-year exception list (`holidays` / `shortDays` arrays at
//!   the payload top level) becomes a per-year map keyed to the current year;
//! - user-submitted entries at the legacy top-level `entries` key move to the
//!   unified `contributions` key, unless the unified key is already present
//!   (the unified location wins).

use serde_json::{Map, Value, json};

const LEGACY_HOLIDAYS: &str = "holidays";
const LEGACY_SHORT_DAYS: &str = "shortDays";
const LEGACY_ENTRIES: &str = "entries";

/// Rewrite a loaded remote payload into the current shape. Non-legacy
/// payloads pass through untouched.
pub fn normalize_payload(payload: &mut Map<String, Value>, current_year: i32) {
    migrate_flat_exceptions(payload, current_year);
    migrate_entry_location(payload);
}

fn migrate_flat_exceptions(payload: &mut Map<String, Value>, current_year: i32) {
    let holidays = payload.remove(LEGACY_HOLIDAYS);
    let short_days = payload.remove(LEGACY_SHORT_DAYS);

    if holidays.is_none() && short_days.is_none() {
        return;
    }

    // The per-year map always wins; flat lists are only promoted when no
    // per-year table exists yet.
    if payload.contains_key("exceptions") {
        log::warn!("remote payload carries both flat and per-year exceptions, flat list dropped");
        return;
    }

    let holidays = string_list(holidays);
    let short_days = string_list(short_days);

    payload.insert(
        "exceptions".to_string(),
        json!({
            current_year.to_string(): {
                "holidays": holidays,
                "shortDays": short_days,
            }
        }),
    );

    log::info!(
        "migrated flat exception list into per-year map under {}",
        current_year
    );
}

fn migrate_entry_location(payload: &mut Map<String, Value>) {
    let Some(legacy) = payload.remove(LEGACY_ENTRIES) else {
        return;
    };

    if payload.contains_key("contributions") {
        // Unified location is authoritative when both exist.
        return;
    }

    payload.insert("contributions".to_string(), legacy);
    log::info!("migrated user-submitted entries from legacy top-level location");
}

fn string_list(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}
