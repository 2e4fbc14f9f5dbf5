//! Single-day detail: per-project breakdown for one calendar date.

use crate::core::aggregate::aggregate;
use crate::models::bucket::{Bucket, GroupBy};
use crate::models::period::PeriodKey;
use crate::models::record::CanonicalRecord;
use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DayDetail {
    pub date: NaiveDate,
    pub total_hours: f64,
    pub total_tasks: f64,
    /// Per-project buckets, descending by total; includes the synthetic
    /// uncategorized row when gated-off additional hours exist.
    pub projects: Vec<Bucket>,
}

pub fn day_detail(records: &[CanonicalRecord], date: NaiveDate) -> DayDetail {
    let day_records: Vec<CanonicalRecord> = records
        .iter()
        .filter(|r| r.date == date)
        .cloned()
        .collect();

    let projects = aggregate(&day_records, PeriodKey::All, GroupBy::Project);
    let total_hours = projects.iter().map(|b| b.total()).sum();
    let total_tasks = projects
        .iter()
        .map(|b| b.checked_tasks + b.marked_tasks)
        .sum();

    DayDetail {
        date,
        total_hours,
        total_tasks,
        projects,
    }
}
