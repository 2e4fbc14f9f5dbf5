//! Worktally library root.
//! Timesheet ingestion, categorized aggregation, calendar norms and
//! collaborative settings reconciliation.

pub mod core;
pub mod errors;
pub mod ingest;
pub mod models;
pub mod settings;
pub mod utils;

pub use crate::core::logic::Core;
pub use errors::{AppError, AppResult};
pub use ingest::{AliasTable, Field, RawRecord};
pub use models::{Bucket, BucketKey, CanonicalRecord, GroupBy, PeriodKey};
pub use settings::store::{FileCache, LocalCache, RemoteStore};
pub use settings::{PersonalPatch, SettingsDocument, SettingsPatch};
