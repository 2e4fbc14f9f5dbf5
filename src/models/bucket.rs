use chrono::NaiveDate;
use serde::Serialize;

/// Grouping axis for [`aggregate`](crate::core::aggregate::aggregate).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Day,
    Week,
    Month,
    Project,
    Overtime,
}

/// Fallback display name for rows without a project.
pub const UNASSIGNED: &str = "Unassigned";

/// Synthetic bucket receiving additional hours of rows whose project gate is
/// off but whose other gate is on.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Key identifying one aggregation bucket.
///
/// Week keys carry the ISO week-numbering year, which differs from the
/// calendar year around January 1st.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum BucketKey {
    Day(NaiveDate),
    Week { iso_year: i32, iso_week: u32 },
    Month { year: i32, month: u32 },
    Project(String),
}

/// Aggregation accumulator.
///
/// `check`, `markup`, `other`, `overtime` and the task counts are gated
/// subtotals; `idle` and `gross_hours` accumulate unconditionally. A record
/// contributes to each subtotal at most once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub key: BucketKey,
    pub check: f64,
    pub markup: f64,
    pub other: f64,
    pub overtime: f64,
    pub idle: f64,
    /// Unconditional per-record hours (pure + additional + markup + idle +
    /// overtime), independent of any gate.
    pub gross_hours: f64,
    pub checked_tasks: f64,
    pub marked_tasks: f64,
    /// Number of records that touched this bucket.
    pub entries: u64,
}

impl Bucket {
    pub fn new(key: BucketKey) -> Self {
        Self {
            key,
            check: 0.0,
            markup: 0.0,
            other: 0.0,
            overtime: 0.0,
            idle: 0.0,
            gross_hours: 0.0,
            checked_tasks: 0.0,
            marked_tasks: 0.0,
            entries: 0,
        }
    }

    /// Categorized total: check + markup + other. Never includes idle or
    /// overtime hours.
    pub fn total(&self) -> f64 {
        self.check + self.markup + self.other
    }

    /// Checked tasks per check hour; 0 when no check hours were logged.
    pub fn check_rate(&self) -> f64 {
        rate(self.checked_tasks, self.check)
    }

    /// Marked tasks per markup hour; 0 when no markup hours were logged.
    pub fn markup_rate(&self) -> f64 {
        rate(self.marked_tasks, self.markup)
    }

    /// Overtime hours per checked task; 0 when no tasks were counted.
    pub fn overtime_per_task(&self) -> f64 {
        rate(self.overtime, self.checked_tasks)
    }
}

/// Division defined as 0 on a zero denominator, never NaN/Infinity.
pub(crate) fn rate(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}
