//! Boundaries to the remote document store and the client-local cache.
//!
//! The crate never talks to a network itself: the host hands it a
//! [`RemoteStore`] for writes and pushes change notifications into the
//! controller. The local cache is a plain synchronous string store holding
//! only the personal tier.

use crate::errors::{AppError, AppResult};
use serde_json::Value;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Document key the global settings payload lives under.
pub const SETTINGS_KEY: &str = "settings";

/// Cache key the personal tier is stored under.
pub const PERSONAL_KEY: &str = "personal";

/// Write half of the eventually-consistent remote store. Change
/// notifications arrive out of band through
/// [`Core::handle_remote_notification`](crate::core::logic::Core::handle_remote_notification).
pub trait RemoteStore {
    fn write(&mut self, key: &str, value: &Value) -> AppResult<()>;
}

/// Synchronous client-scoped string store. Read once at startup, written on
/// every personal-setting change.
pub trait LocalCache {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> AppResult<()>;
}

/// File-backed [`LocalCache`]: a YAML map in the platform config directory.
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    /// Standard cache location depending on the platform.
    pub fn cache_dir() -> PathBuf {
        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("worktally")
        } else {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".worktally")
        }
    }

    pub fn new() -> Self {
        Self {
            path: Self::cache_dir().join("cache.yaml"),
        }
    }

    /// Cache backed by an explicit file, for tests and custom setups.
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    fn load(&self) -> BTreeMap<String, String> {
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|content| serde_yaml::from_str(&content).ok())
            .unwrap_or_default()
    }
}

impl Default for FileCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalCache for FileCache {
    fn get(&self, key: &str) -> Option<String> {
        self.load().get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> AppResult<()> {
        let mut map = self.load();
        map.insert(key.to_string(), value.to_string());

        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(|e| AppError::Cache(e.to_string()))?;
        }
        let content = serde_yaml::to_string(&map)?;
        fs::write(&self.path, content).map_err(|e| AppError::Cache(e.to_string()))
    }
}
