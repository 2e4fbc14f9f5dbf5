//! Per-project weekly drilldown over one month or a whole year.

use crate::models::bucket::rate;
use crate::models::period::PeriodKey;
use crate::models::record::CanonicalRecord;
use crate::utils::date::{iso_week_key, week_start};
use chrono::{Days, NaiveDate};
use serde::Serialize;

/// One week of a project's activity. Hour sums here are ungated: the
/// drilldown shows everything logged against the project.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectWeekRow {
    pub iso_week: u32,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub pure_hours: f64,
    pub markup_hours: f64,
    pub additional_hours: f64,
    pub checked_tasks: f64,
    pub marked_tasks: f64,
    pub total_hours: f64,
    /// Checked tasks per pure hour; 0 when no pure hours.
    pub check_rate: f64,
    /// Marked tasks per markup hour; 0 when no markup hours.
    pub markup_rate: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ProjectWeekly {
    pub total_hours: f64,
    pub total_tasks: f64,
    pub avg_hours_per_week: f64,
    pub weeks: Vec<ProjectWeekRow>,
}

/// Weekly drilldown for `project` over `Month(year, m)` when `month` is
/// given, else over the whole year. Weeks ascend by number.
pub fn project_weekly(
    records: &[CanonicalRecord],
    project: &str,
    year: i32,
    month: Option<u32>,
) -> ProjectWeekly {
    let period = match month {
        Some(m) => PeriodKey::Month(year, m),
        None => PeriodKey::Year(year),
    };

    let mut out = ProjectWeekly::default();

    for rec in records {
        if !period.contains(rec.date) || rec.project_name != project {
            continue;
        }

        let (_, iso_week) = iso_week_key(rec.date);
        let row = match out.weeks.iter_mut().find(|w| w.iso_week == iso_week) {
            Some(row) => row,
            None => {
                let start = week_start(rec.date);
                let end = start.checked_add_days(Days::new(6)).unwrap_or(start);
                out.weeks.push(ProjectWeekRow {
                    iso_week,
                    week_start: start,
                    week_end: end,
                    pure_hours: 0.0,
                    markup_hours: 0.0,
                    additional_hours: 0.0,
                    checked_tasks: 0.0,
                    marked_tasks: 0.0,
                    total_hours: 0.0,
                    check_rate: 0.0,
                    markup_rate: 0.0,
                });
                out.weeks.last_mut().expect("just pushed")
            }
        };

        row.pure_hours += rec.pure_hours;
        row.markup_hours += rec.markup_hours;
        row.additional_hours += rec.additional_hours;
        row.checked_tasks += rec.checked_tasks;
        row.marked_tasks += rec.marked_tasks;
        row.total_hours += rec.active_hours();

        out.total_hours += rec.active_hours();
        out.total_tasks += rec.checked_tasks + rec.marked_tasks;
    }

    out.weeks.sort_by_key(|w| w.iso_week);
    for row in &mut out.weeks {
        row.check_rate = rate(row.checked_tasks, row.pure_hours);
        row.markup_rate = rate(row.marked_tasks, row.markup_hours);
    }
    out.avg_hours_per_week = rate(out.total_hours, out.weeks.len() as f64);

    out
}
