//! Calendar norm engine: expected work-hours per day from per-year
//! exception tables.

use crate::utils::date::{day_month_key, days_inclusive, is_weekend};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Marker attached to a `"DD.MM"` day inside one year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayException {
    Holiday,
    ShortDay,
}

/// Exception markers for a single calendar year.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearExceptions {
    #[serde(default)]
    pub holidays: Vec<String>,
    #[serde(default)]
    pub short_days: Vec<String>,
}

/// Per-year exception table, keyed by calendar year.
///
/// Constructed and queried per year: a recurring holiday has to be entered
/// once per year it applies to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalendarExceptionSet {
    pub years: BTreeMap<i32, YearExceptions>,
}

impl CalendarExceptionSet {
    /// Look up the marker for a date in its own year. Holiday wins when a
    /// date carries both markers.
    pub fn lookup(&self, date: NaiveDate) -> Option<DayException> {
        let year = self.years.get(&date.year())?;
        let key = day_month_key(date);

        if year.holidays.contains(&key) {
            Some(DayException::Holiday)
        } else if year.short_days.contains(&key) {
            Some(DayException::ShortDay)
        } else {
            None
        }
    }

    /// Add a marker; duplicate entries are ignored.
    pub fn mark(&mut self, year: i32, day: &str, exception: DayException) {
        let entry = self.years.entry(year).or_default();
        let list = match exception {
            DayException::Holiday => &mut entry.holidays,
            DayException::ShortDay => &mut entry.short_days,
        };
        if !list.iter().any(|d| d == day) {
            list.push(day.to_string());
        }
    }

    pub fn unmark(&mut self, year: i32, day: &str, exception: DayException) {
        if let Some(entry) = self.years.get_mut(&year) {
            let list = match exception {
                DayException::Holiday => &mut entry.holidays,
                DayException::ShortDay => &mut entry.short_days,
            };
            list.retain(|d| d != day);
        }
    }
}

/// Expected work-hours for one date: holiday 0, short day 7, weekend 0,
/// ordinary weekday 8.
pub fn daily_norm(date: NaiveDate, exceptions: &CalendarExceptionSet) -> u32 {
    match exceptions.lookup(date) {
        Some(DayException::Holiday) => 0,
        Some(DayException::ShortDay) => 7,
        None => {
            if is_weekend(date) {
                0
            } else {
                8
            }
        }
    }
}

/// Sum of [`daily_norm`] over every day in `[start, end]` inclusive.
pub fn range_norm(start: NaiveDate, end: NaiveDate, exceptions: &CalendarExceptionSet) -> u32 {
    days_inclusive(start, end)
        .into_iter()
        .map(|d| daily_norm(d, exceptions))
        .sum()
}

/// Rounded percentage of actual against norm hours. 0 when the norm is 0;
/// unclamped, may exceed 100.
pub fn workload_percentage(actual: f64, norm: u32) -> i64 {
    if norm > 0 {
        (actual / norm as f64 * 100.0).round() as i64
    } else {
        0
    }
}
