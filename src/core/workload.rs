//! Workload figures: actual hours measured against calendar norms, plus the
//! free date-range summary.

use crate::core::calendar::{self, CalendarExceptionSet};
use crate::models::period::PeriodKey;
use crate::models::record::CanonicalRecord;
use crate::utils::date::{all_days_of_month, iso_week_key};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Period workload: active hours against the calendar norm.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WorkloadSummary {
    pub actual_hours: f64,
    pub norm_hours: u32,
    /// Rounded, unclamped percentage; 0 when the norm is 0.
    pub percentage: i64,
}

/// Totals over an inclusive date range, same gating rules as the buckets.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RangeSummary {
    pub gross_hours: f64,
    pub overtime_hours: f64,
    pub idle_hours: f64,
    pub check_hours: f64,
    pub markup_hours: f64,
    pub other_hours: f64,
    pub checked_tasks: f64,
    pub marked_tasks: f64,
}

/// One ISO week of a month, with the norm restricted to the month's days.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekRow {
    pub iso_week: u32,
    pub label: String,
    pub active_hours: f64,
    pub norm_hours: u32,
    pub overtime_hours: f64,
    pub idle_hours: f64,
    pub checked_tasks: f64,
    pub marked_tasks: f64,
    pub workload: i64,
}

/// Workload over a period. For `All` the norm spans the min..max record
/// dates; with no records at all both figures are 0.
pub fn workload_summary(
    records: &[CanonicalRecord],
    period: PeriodKey,
    exceptions: &CalendarExceptionSet,
) -> WorkloadSummary {
    let actual: f64 = records
        .iter()
        .filter(|r| period.contains(r.date))
        .map(|r| r.active_hours())
        .sum();

    let range = period.date_range().or_else(|| data_span(records));
    let norm = match range {
        Some((start, end)) => calendar::range_norm(start, end, exceptions),
        None => 0,
    };

    WorkloadSummary {
        actual_hours: actual,
        norm_hours: norm,
        percentage: calendar::workload_percentage(actual, norm),
    }
}

/// Inclusive-range totals, gated the same way as bucket subtotals.
pub fn range_summary(records: &[CanonicalRecord], from: NaiveDate, to: NaiveDate) -> RangeSummary {
    let mut out = RangeSummary::default();

    for rec in records {
        if rec.date < from || rec.date > to {
            continue;
        }

        out.gross_hours += rec.gross_hours();
        out.idle_hours += rec.idle_hours;

        if rec.project_gate {
            out.check_hours += rec.pure_hours;
            out.checked_tasks += rec.checked_tasks;
        }
        if rec.markup_gate {
            out.markup_hours += rec.markup_hours;
            out.marked_tasks += rec.marked_tasks;
        }
        if rec.project_gate || rec.other_gate {
            out.other_hours += rec.additional_hours;
        }
        if rec.overtime_gate {
            out.overtime_hours += rec.overtime_hours;
        }
    }

    out
}

/// One row per ISO week overlapping the month. Week norms count only the
/// month's own days, so edge weeks shared with a neighbouring month carry a
/// partial norm. Rows ascend by week number.
pub fn weekly_workload(
    records: &[CanonicalRecord],
    year: i32,
    month: u32,
    exceptions: &CalendarExceptionSet,
) -> Vec<WeekRow> {
    let mut rows: Vec<WeekRow> = Vec::new();

    for day in all_days_of_month(year, month) {
        let (_, iso_week) = iso_week_key(day);
        let norm = calendar::daily_norm(day, exceptions);

        match rows.iter_mut().find(|w| w.iso_week == iso_week) {
            Some(row) => row.norm_hours += norm,
            None => rows.push(WeekRow {
                iso_week,
                label: format!("W{}", iso_week),
                active_hours: 0.0,
                norm_hours: norm,
                overtime_hours: 0.0,
                idle_hours: 0.0,
                checked_tasks: 0.0,
                marked_tasks: 0.0,
                workload: 0,
            }),
        }
    }

    for rec in records {
        if rec.date.year() != year || rec.date.month() != month {
            continue;
        }
        let (_, iso_week) = iso_week_key(rec.date);
        if let Some(row) = rows.iter_mut().find(|w| w.iso_week == iso_week) {
            row.active_hours += rec.active_hours();
            row.overtime_hours += rec.overtime_hours;
            row.idle_hours += rec.idle_hours;
            row.checked_tasks += rec.checked_tasks;
            row.marked_tasks += rec.marked_tasks;
        }
    }

    rows.sort_by_key(|w| w.iso_week);
    for row in &mut rows {
        row.workload = calendar::workload_percentage(row.active_hours, row.norm_hours);
    }

    rows
}

fn data_span(records: &[CanonicalRecord]) -> Option<(NaiveDate, NaiveDate)> {
    let min = records.iter().map(|r| r.date).min()?;
    let max = records.iter().map(|r| r.date).max()?;
    Some((min, max))
}
