use chrono::NaiveDate;
use serde::Serialize;

/// One normalized timesheet row.
///
/// Produced by the ingestion layer from an opaque raw row. Every hour/count
/// field is finite and >= 0 (non-numeric input coerces to 0); every gate is a
/// strict boolean produced by a single truth table at ingestion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRecord {
    pub date: NaiveDate,
    pub project_name: String,

    pub pure_hours: f64,
    pub markup_hours: f64,
    pub additional_hours: f64,
    pub overtime_hours: f64,
    pub idle_hours: f64,

    pub checked_tasks: f64,
    pub marked_tasks: f64,

    pub project_gate: bool,
    pub markup_gate: bool,
    pub other_gate: bool,
    pub overtime_gate: bool,
}

impl CanonicalRecord {
    /// Unconditional total-hours figure for this row. Gating affects only the
    /// categorized subtotals, never this sum.
    pub fn gross_hours(&self) -> f64 {
        self.pure_hours
            + self.additional_hours
            + self.markup_hours
            + self.idle_hours
            + self.overtime_hours
    }

    /// Active work hours (no idle, no overtime). This is the figure workload
    /// percentages are computed against.
    pub fn active_hours(&self) -> f64 {
        self.pure_hours + self.additional_hours + self.markup_hours
    }
}
