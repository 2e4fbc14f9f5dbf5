//! Ingestion layer: raw rows in, canonical records out.
//!
//! All deployment-specific messiness is confined here: variable column
//! names, mixed date encodings, inconsistent gate encodings and non-numeric
//! hour cells. Downstream code only ever sees [`CanonicalRecord`].

pub mod dates;
pub mod fields;

pub use fields::{AliasTable, Field, RawRecord};

use crate::models::record::CanonicalRecord;
use crate::models::bucket::UNASSIGNED;
use serde_json::Value;

/// Result of one ingestion pass: the rows that normalized cleanly plus a
/// count of rows dropped for an unparseable date.
#[derive(Debug, Default)]
pub struct IngestOutcome {
    pub records: Vec<CanonicalRecord>,
    pub dropped: u64,
}

/// Normalize the full raw dataset. Rows without a resolvable date are
/// silently excluded and counted; nothing here ever fails.
pub fn ingest(rows: &[RawRecord], aliases: &AliasTable) -> IngestOutcome {
    let mut out = IngestOutcome::default();

    for row in rows {
        let raw_date = aliases.resolve(row, Field::Date);
        let Some(date) = raw_date.and_then(dates::normalize) else {
            out.dropped += 1;
            log::debug!("dropping row with unparseable date: {:?}", raw_date);
            continue;
        };

        out.records.push(CanonicalRecord {
            date,
            project_name: project_name(aliases.resolve(row, Field::Project)),
            pure_hours: number(aliases.resolve(row, Field::PureHours)),
            markup_hours: number(aliases.resolve(row, Field::MarkupHours)),
            additional_hours: number(aliases.resolve(row, Field::AdditionalHours)),
            overtime_hours: number(aliases.resolve(row, Field::OvertimeHours)),
            idle_hours: number(aliases.resolve(row, Field::IdleHours)),
            checked_tasks: number(aliases.resolve(row, Field::CheckedTasks)),
            marked_tasks: number(aliases.resolve(row, Field::MarkedTasks)),
            project_gate: gate(aliases.resolve(row, Field::ProjectGate)),
            markup_gate: gate(aliases.resolve(row, Field::MarkupGate)),
            other_gate: gate(aliases.resolve(row, Field::OtherGate)),
            overtime_gate: gate(aliases.resolve(row, Field::OvertimeGate)),
        });
    }

    out
}

/// Gate truth table: `true`, `1` and `"true"` are on, everything else is
/// off. The only place gate encodings are interpreted.
pub fn gate(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64() == Some(1.0),
        Some(Value::String(s)) => s == "true",
        _ => false,
    }
}

/// Numeric coercion: finite and >= 0, or 0. Numeric strings are accepted.
pub fn number(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };

    if n.is_finite() && n > 0.0 { n } else { 0.0 }
}

fn project_name(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => UNASSIGNED.to_string(),
    }
}
