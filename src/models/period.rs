use crate::utils::date::{last_day_of_month, parse_date};
use chrono::{Datelike, NaiveDate};

/// Reporting period selector: everything, one year, or one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodKey {
    All,
    Year(i32),
    Month(i32, u32),
}

impl PeriodKey {
    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            PeriodKey::All => true,
            PeriodKey::Year(y) => date.year() == y,
            PeriodKey::Month(y, m) => date.year() == y && date.month() == m,
        }
    }

    /// Calendar range covered by the period, inclusive. `All` has no fixed
    /// range of its own; callers fall back to the span of the data.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        match *self {
            PeriodKey::All => None,
            PeriodKey::Year(y) => {
                let start = NaiveDate::from_ymd_opt(y, 1, 1)?;
                let end = NaiveDate::from_ymd_opt(y, 12, 31)?;
                Some((start, end))
            }
            PeriodKey::Month(y, m) => {
                let start = NaiveDate::from_ymd_opt(y, m, 1)?;
                Some((start, last_day_of_month(y, m)?))
            }
        }
    }

    /// Parse the compact selector format used by callers:
    /// `all`, `YYYY` or `YYYY-MM`.
    pub fn parse(s: &str) -> Option<PeriodKey> {
        if s.eq_ignore_ascii_case("all") {
            return Some(PeriodKey::All);
        }
        if let Some(d) = parse_date(&format!("{}-01", s)) {
            return Some(PeriodKey::Month(d.year(), d.month()));
        }
        if let Ok(year) = s.parse::<i32>() {
            return Some(PeriodKey::Year(year));
        }
        None
    }
}
