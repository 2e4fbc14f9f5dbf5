//! The controller owning the ingested dataset and the settings document.
//!
//! Single-threaded by design: every method runs to completion, so a read
//! issued right after a mutation always observes it. The only asynchrony in
//! the system sits at the remote store boundary, behind
//! [`handle_remote_notification`](Core::handle_remote_notification).

use crate::core::aggregate::aggregate;
use crate::core::day::{DayDetail, day_detail};
use crate::core::project::{ProjectWeekly, project_weekly};
use crate::core::workload::{
    RangeSummary, WeekRow, WorkloadSummary, range_summary, weekly_workload, workload_summary,
};
use crate::errors::AppResult;
use crate::ingest::{self, AliasTable, RawRecord};
use crate::models::bucket::{Bucket, GroupBy};
use crate::models::period::PeriodKey;
use crate::models::record::CanonicalRecord;
use crate::settings::reconcile::SettingsController;
use crate::settings::store::{LocalCache, RemoteStore};
use crate::settings::{PersonalPatch, SettingsDocument, SettingsPatch};
use crate::utils::date::today;
use chrono::{Datelike, NaiveDate};
use serde_json::Value;

pub struct Core<S: RemoteStore, C: LocalCache> {
    aliases: AliasTable,
    records: Vec<CanonicalRecord>,
    dropped: u64,
    settings: SettingsController<S, C>,
}

impl<S: RemoteStore, C: LocalCache> Core<S, C> {
    pub fn new(store: S, cache: C, identity: Option<String>) -> Self {
        Self::with_aliases(store, cache, identity, AliasTable::default())
    }

    /// Controller with a deployment-specific alias table.
    pub fn with_aliases(
        store: S,
        cache: C,
        identity: Option<String>,
        aliases: AliasTable,
    ) -> Self {
        Self {
            aliases,
            records: Vec::new(),
            dropped: 0,
            settings: SettingsController::new(store, cache, identity),
        }
    }

    // ---------------------------
    // Record source
    // ---------------------------

    /// Replace the dataset with the full current row list. The record source
    /// is push-based: it re-delivers everything whenever anything changes.
    pub fn set_records(&mut self, rows: &[RawRecord]) {
        let outcome = ingest::ingest(rows, &self.aliases);
        if outcome.dropped > 0 {
            log::info!(
                "ingested {} rows, dropped {} with unparseable dates",
                outcome.records.len(),
                outcome.dropped
            );
        }
        self.records = outcome.records;
        self.dropped = outcome.dropped;
    }

    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    /// Rows excluded from every aggregate during the last ingestion.
    pub fn dropped_records(&self) -> u64 {
        self.dropped
    }

    // ---------------------------
    // Aggregates
    // ---------------------------

    pub fn aggregates(&self, period: PeriodKey, group_by: GroupBy) -> Vec<Bucket> {
        aggregate(&self.records, period, group_by)
    }

    pub fn workload_summary(&self, period: PeriodKey) -> WorkloadSummary {
        workload_summary(&self.records, period, &self.settings.document().global.exceptions)
    }

    pub fn range_summary(&self, from: NaiveDate, to: NaiveDate) -> RangeSummary {
        range_summary(&self.records, from, to)
    }

    pub fn calendar_day(&self, date: NaiveDate) -> DayDetail {
        day_detail(&self.records, date)
    }

    pub fn weekly_workload(&self, year: i32, month: u32) -> Vec<WeekRow> {
        weekly_workload(
            &self.records,
            year,
            month,
            &self.settings.document().global.exceptions,
        )
    }

    pub fn project_weekly(&self, project: &str, year: i32, month: Option<u32>) -> ProjectWeekly {
        project_weekly(&self.records, project, year, month)
    }

    /// Distinct years present in the settings document or the data,
    /// descending. Falls back to the current year when both are empty.
    pub fn available_years(&self) -> Vec<i32> {
        let mut years = self.settings.document().global.years.clone();
        for rec in &self.records {
            years.push(rec.date.year());
        }

        years.sort_unstable();
        years.dedup();
        years.reverse();

        if years.is_empty() {
            years.push(today().year());
        }
        years
    }

    // ---------------------------
    // Settings
    // ---------------------------

    pub fn settings(&self) -> &SettingsDocument {
        self.settings.document()
    }

    pub fn mutate_settings(&mut self, patch: SettingsPatch) -> AppResult<()> {
        self.settings.mutate(patch)
    }

    pub fn update_personal(&mut self, patch: PersonalPatch) -> AppResult<()> {
        self.settings.update_personal(patch)
    }

    pub fn handle_remote_notification(&mut self, payload: Value) {
        self.settings.handle_remote(payload);
    }

    pub fn subscribe_settings(&mut self, callback: impl Fn(&SettingsDocument) + 'static) {
        self.settings.subscribe(callback);
    }

    /// Direct access to the reconciliation controller, mainly for hosts
    /// needing the explicit-clock entry points.
    pub fn settings_controller(&mut self) -> &mut SettingsController<S, C> {
        &mut self.settings
    }
}
