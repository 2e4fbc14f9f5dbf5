//! Shared configuration document and its collaborative maintenance.
//!
//! The document merges four tiers: built-in defaults, the client-local
//! personal cache, the authoritative remote global document, and a
//! per-identity profile stored inside the global document. Reconciliation
//! of local edits against asynchronous remote updates lives in
//! [`reconcile`]; legacy payload shapes are repaired in [`migrate`].

pub mod migrate;
pub mod reconcile;
pub mod store;

use crate::core::calendar::{CalendarExceptionSet, DayException};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// KPI figures for one month of a quarter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthKpi {
    pub overall: u32,
    pub speed: u32,
    pub er: u32,
    pub test: u32,
}

/// KPI targets for one quarter: three months plus the quarter total.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterKpi {
    pub months: [MonthKpi; 3],
    pub total: u32,
}

/// KPI targets keyed by year, then quarter (1..=4).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KpiTargets {
    pub years: BTreeMap<i32, BTreeMap<u8, QuarterKpi>>,
}

impl KpiTargets {
    pub fn quarter(&self, year: i32, quarter: u8) -> Option<&QuarterKpi> {
        self.years.get(&year)?.get(&quarter)
    }
}

/// Displayed grade badge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeInfo {
    #[serde(default)]
    pub current: String,
    #[serde(default)]
    pub next: String,
    #[serde(default)]
    pub image: String,
}

/// Grade-transition progress row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRule {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub available: bool,
    #[serde(default)]
    pub last_date: String,
    #[serde(default)]
    pub next_date: String,
    #[serde(default)]
    pub progress: u32,
    #[serde(default)]
    pub variant: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContributionStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub author: String,
}

/// One user-submitted entry, keyed by its code.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionEntry {
    pub code: String,
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub result: String,
    #[serde(default)]
    pub status: ContributionStatus,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl ContributionEntry {
    /// Prepend a history line; newest entries come first.
    pub fn record_history(&mut self, date: &str, text: &str, author: &str) {
        self.history.insert(
            0,
            HistoryEntry {
                date: date.to_string(),
                text: text.to_string(),
                author: author.to_string(),
            },
        );
    }
}

/// Per-user presentation preferences. Never part of the canonical global
/// subset; mirrored into [`GlobalSettings::profiles`] per identity instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalSettings {
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub accent: String,
    #[serde(default)]
    pub display_name: String,
}

/// The authoritative shared portion of the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalSettings {
    #[serde(default)]
    pub exceptions: CalendarExceptionSet,
    #[serde(default)]
    pub years: Vec<i32>,
    #[serde(default)]
    pub grade: GradeInfo,
    #[serde(default)]
    pub kpi_targets: KpiTargets,
    #[serde(default)]
    pub transitions: Vec<TransitionRule>,
    #[serde(default)]
    pub contributions: Vec<ContributionEntry>,
    /// Last personal preferences per known identity, so switching identity
    /// on a shared document restores them.
    #[serde(default)]
    pub profiles: BTreeMap<String, PersonalSettings>,
}

impl GlobalSettings {
    /// Field-tolerant deserialization: each known key is decoded on its
    /// own, unrecognized or ill-typed parts fall back to their default.
    pub fn from_payload(payload: &serde_json::Map<String, Value>) -> Self {
        fn field<T: Default + for<'de> Deserialize<'de>>(
            payload: &serde_json::Map<String, Value>,
            key: &str,
        ) -> T {
            payload
                .get(key)
                .cloned()
                .and_then(|v| serde_json::from_value(v).ok())
                .unwrap_or_default()
        }

        Self {
            exceptions: field(payload, "exceptions"),
            years: field(payload, "years"),
            grade: field(payload, "grade"),
            kpi_targets: field(payload, "kpiTargets"),
            transitions: field(payload, "transitions"),
            contributions: field(payload, "contributions"),
            profiles: field(payload, "profiles"),
        }
    }
}

/// The whole in-memory document: shared global tier plus this client's
/// personal tier.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SettingsDocument {
    pub global: GlobalSettings,
    pub personal: PersonalSettings,
}

/// Typed mutation of the global tier.
#[derive(Debug, Clone)]
pub enum SettingsPatch {
    AddHoliday { year: i32, day: String },
    RemoveHoliday { year: i32, day: String },
    AddShortDay { year: i32, day: String },
    RemoveShortDay { year: i32, day: String },
    AddYear(i32),
    RemoveYear(i32),
    SetGrade(GradeInfo),
    SetKpiQuarter { year: i32, quarter: u8, kpi: QuarterKpi },
    SetTransitions(Vec<TransitionRule>),
    /// Insert or replace the entry with the same code.
    UpsertContribution(ContributionEntry),
    RemoveContribution { code: String },
    AddContributionComment { code: String, comment: Comment },
}

/// Partial update of the personal tier; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct PersonalPatch {
    pub theme: Option<String>,
    pub accent: Option<String>,
    pub display_name: Option<String>,
}

/// Apply one typed mutation to the global tier. Exposed so hosts can stage
/// document edits outside the controller when they need to.
pub fn apply_patch(global: &mut GlobalSettings, patch: SettingsPatch) {
    match patch {
        SettingsPatch::AddHoliday { year, day } => {
            global.exceptions.mark(year, &day, DayException::Holiday);
        }
        SettingsPatch::RemoveHoliday { year, day } => {
            global.exceptions.unmark(year, &day, DayException::Holiday);
        }
        SettingsPatch::AddShortDay { year, day } => {
            global.exceptions.mark(year, &day, DayException::ShortDay);
        }
        SettingsPatch::RemoveShortDay { year, day } => {
            global.exceptions.unmark(year, &day, DayException::ShortDay);
        }
        SettingsPatch::AddYear(year) => {
            if !global.years.contains(&year) {
                global.years.push(year);
                global.years.sort_by(|a, b| b.cmp(a));
            }
        }
        SettingsPatch::RemoveYear(year) => {
            global.years.retain(|y| *y != year);
        }
        SettingsPatch::SetGrade(grade) => global.grade = grade,
        SettingsPatch::SetKpiQuarter { year, quarter, kpi } => {
            global
                .kpi_targets
                .years
                .entry(year)
                .or_default()
                .insert(quarter, kpi);
        }
        SettingsPatch::SetTransitions(transitions) => global.transitions = transitions,
        SettingsPatch::UpsertContribution(entry) => {
            match global.contributions.iter_mut().find(|c| c.code == entry.code) {
                Some(existing) => *existing = entry,
                None => global.contributions.push(entry),
            }
        }
        SettingsPatch::RemoveContribution { code } => {
            global.contributions.retain(|c| c.code != code);
        }
        SettingsPatch::AddContributionComment { code, comment } => {
            if let Some(entry) = global.contributions.iter_mut().find(|c| c.code == code) {
                entry.comments.push(comment);
            }
        }
    }
}

pub(crate) fn apply_personal_patch(personal: &mut PersonalSettings, patch: PersonalPatch) {
    if let Some(theme) = patch.theme {
        personal.theme = theme;
    }
    if let Some(accent) = patch.accent {
        personal.accent = accent;
    }
    if let Some(display_name) = patch.display_name {
        personal.display_name = display_name;
    }
}
