//! Optimistic-write / echo-suppression reconciliation.
//!
//! Local edits are applied in memory first and pushed to the remote store
//! asynchronously; every push arms a guard holding the write instant and
//! the payload hash. Incoming change notifications are checked against the
//! guard twice: anything inside the lock window is treated as the echo of
//! the write just issued, and anything hashing to the last written payload
//! is an idempotent echo regardless of age. The hash check, not only the
//! time window, is what breaks the notify/merge/save/notify loop.

use crate::errors::AppResult;
use crate::settings::store::{LocalCache, PERSONAL_KEY, RemoteStore, SETTINGS_KEY};
use crate::settings::{
    GlobalSettings, PersonalPatch, PersonalSettings, SettingsDocument, SettingsPatch, apply_patch,
    apply_personal_patch, migrate,
};
use chrono::Datelike;
use serde_json::{Map, Value, json};
use sha2::{Digest, Sha256};
use std::time::{Duration, Instant};

/// Echo-suppression window after a local write. Must exceed the slowest
/// observed round-trip of the remote store (about 1.5x its typical sync
/// latency): too short reverts fresh edits, too long delays picking up a
/// genuine concurrent collaborator edit.
pub const LOCK_WINDOW: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Clean,
    /// A local write was just issued; its echo has not aged out yet.
    LocalPending,
}

/// Why a notification was discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EchoReason {
    WithinWindow,
    SameHash,
}

/// Ephemeral write guard; reset only by time decay or a superseding write.
#[derive(Debug, Default)]
pub struct ReconcileGuard {
    last_write_at: Option<Instant>,
    last_written_hash: Option<String>,
}

impl ReconcileGuard {
    /// Arm for a fresh write, superseding any previous guard.
    pub fn arm(&mut self, now: Instant, hash: String) {
        self.last_write_at = Some(now);
        self.last_written_hash = Some(hash);
    }

    /// Whether a notification carrying `payload_hash` at `now` is an echo.
    /// Inside the window everything is suppressed; outside it only an exact
    /// hash match is.
    pub fn suppresses(&self, now: Instant, payload_hash: &str) -> Option<EchoReason> {
        if let Some(at) = self.last_write_at {
            if now.saturating_duration_since(at) < LOCK_WINDOW {
                return Some(EchoReason::WithinWindow);
            }
        }
        if self.last_written_hash.as_deref() == Some(payload_hash) {
            return Some(EchoReason::SameHash);
        }
        None
    }
}

/// SHA-256 over the serialized payload. `serde_json` object keys are
/// ordered, so equal payloads always serialize identically.
pub fn payload_hash(value: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// The canonical global subset written to the remote store. Keys are
/// enumerated explicitly: personal fields never enter the shared payload,
/// only their per-identity mirrors under `profiles`.
pub fn canonical_global_payload(global: &GlobalSettings) -> AppResult<Value> {
    Ok(json!({
        "exceptions": serde_json::to_value(&global.exceptions)?,
        "years": serde_json::to_value(&global.years)?,
        "grade": serde_json::to_value(&global.grade)?,
        "kpiTargets": serde_json::to_value(&global.kpi_targets)?,
        "transitions": serde_json::to_value(&global.transitions)?,
        "contributions": serde_json::to_value(&global.contributions)?,
        "profiles": serde_json::to_value(&global.profiles)?,
    }))
}

/// Owner of the settings document and the reconciliation state machine.
pub struct SettingsController<S: RemoteStore, C: LocalCache> {
    store: S,
    cache: C,
    identity: Option<String>,
    doc: SettingsDocument,
    cached_personal: Option<PersonalSettings>,
    guard: ReconcileGuard,
    state: SyncState,
    subscribers: Vec<Box<dyn Fn(&SettingsDocument)>>,
}

impl<S: RemoteStore, C: LocalCache> SettingsController<S, C> {
    /// Bootstrap from the local cache; the remote tier arrives through the
    /// first change notification.
    pub fn new(store: S, cache: C, identity: Option<String>) -> Self {
        let cached_personal: Option<PersonalSettings> = cache
            .get(PERSONAL_KEY)
            .and_then(|s| serde_yaml::from_str(&s).ok());

        let doc = SettingsDocument {
            global: GlobalSettings::default(),
            personal: cached_personal.clone().unwrap_or_default(),
        };

        Self {
            store,
            cache,
            identity,
            doc,
            cached_personal,
            guard: ReconcileGuard::default(),
            state: SyncState::Clean,
            subscribers: Vec::new(),
        }
    }

    pub fn document(&self) -> &SettingsDocument {
        &self.doc
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn subscribe(&mut self, callback: impl Fn(&SettingsDocument) + 'static) {
        self.subscribers.push(Box::new(callback));
    }

    /// Apply a global mutation and push the result. Auto-saves on every
    /// mutation, not batched.
    pub fn mutate(&mut self, patch: SettingsPatch) -> AppResult<()> {
        self.mutate_at(patch, Instant::now())
    }

    /// Same as [`mutate`](Self::mutate) with an explicit clock.
    pub fn mutate_at(&mut self, patch: SettingsPatch, now: Instant) -> AppResult<()> {
        apply_patch(&mut self.doc.global, patch);
        self.push_global(now)
    }

    /// Personal-tier mutation: cached locally and, when an identity is
    /// known, mirrored into that identity's profile inside the global
    /// payload. Bypasses the guard entirely.
    pub fn update_personal(&mut self, patch: PersonalPatch) -> AppResult<()> {
        apply_personal_patch(&mut self.doc.personal, patch);
        self.cached_personal = Some(self.doc.personal.clone());

        let yaml = serde_yaml::to_string(&self.doc.personal)?;
        if let Err(e) = self.cache.set(PERSONAL_KEY, &yaml) {
            log::warn!("personal cache write failed: {}", e);
        }

        if let Some(identity) = self.identity.clone() {
            self.doc
                .global
                .profiles
                .insert(identity, self.doc.personal.clone());

            let payload = canonical_global_payload(&self.doc.global)?;
            if let Err(e) = self.store.write(SETTINGS_KEY, &payload) {
                log::warn!("profile mirror write failed: {}", e);
            }
        }

        Ok(())
    }

    /// Feed one remote change notification into the state machine.
    pub fn handle_remote(&mut self, payload: Value) {
        self.handle_remote_at(payload, Instant::now(), chrono::Local::now().year());
    }

    /// Same as [`handle_remote`](Self::handle_remote) with an explicit
    /// clock and migration year.
    pub fn handle_remote_at(&mut self, payload: Value, now: Instant, current_year: i32) {
        let hash = payload_hash(&payload);

        if let Some(reason) = self.guard.suppresses(now, &hash) {
            log::debug!("suppressed remote settings notification: {:?}", reason);
            return;
        }

        let mut map = match payload {
            Value::Object(map) => map,
            other => {
                log::warn!(
                    "malformed remote settings payload ({}), falling back to defaults",
                    value_kind(&other)
                );
                Map::new()
            }
        };

        migrate::normalize_payload(&mut map, current_year);

        // Full tier merge: defaults < local personal cache < remote global
        // < per-identity cloud profile.
        self.doc.global = GlobalSettings::from_payload(&map);
        self.doc.personal = self.personal_tier();
        self.state = SyncState::Clean;
        self.notify();
    }

    fn personal_tier(&self) -> PersonalSettings {
        self.identity
            .as_ref()
            .and_then(|id| self.doc.global.profiles.get(id))
            .cloned()
            .or_else(|| self.cached_personal.clone())
            .unwrap_or_default()
    }

    /// Serialize, hash, arm the guard and issue the write. A failed write
    /// keeps both the in-memory document and the guard: the stale echo is
    /// still suppressed, and the next mutation retries with whatever the
    /// document holds by then.
    fn push_global(&mut self, now: Instant) -> AppResult<()> {
        let payload = canonical_global_payload(&self.doc.global)?;
        let hash = payload_hash(&payload);

        self.guard.arm(now, hash);
        self.state = SyncState::LocalPending;

        if let Err(e) = self.store.write(SETTINGS_KEY, &payload) {
            log::warn!("remote settings write failed (will retry on next mutation): {}", e);
        }

        Ok(())
    }

    fn notify(&self) {
        for callback in &self.subscribers {
            callback(&self.doc);
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
