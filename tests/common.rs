#![allow(dead_code)]
use chrono::NaiveDate;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use worktally::errors::{AppError, AppResult};
use worktally::models::record::CanonicalRecord;
use worktally::settings::store::{LocalCache, RemoteStore};

/// In-memory remote store recording every write; can be switched to fail.
#[derive(Clone, Default)]
pub struct MemStore {
    pub writes: Rc<RefCell<Vec<(String, Value)>>>,
    pub fail: Rc<RefCell<bool>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_count(&self) -> usize {
        self.writes.borrow().len()
    }

    pub fn last_write(&self) -> Option<Value> {
        self.writes.borrow().last().map(|(_, v)| v.clone())
    }

    pub fn set_failing(&self, fail: bool) {
        *self.fail.borrow_mut() = fail;
    }
}

impl RemoteStore for MemStore {
    fn write(&mut self, key: &str, value: &Value) -> AppResult<()> {
        if *self.fail.borrow() {
            return Err(AppError::StoreWrite("store unavailable".into()));
        }
        self.writes
            .borrow_mut()
            .push((key.to_string(), value.clone()));
        Ok(())
    }
}

/// In-memory local cache.
#[derive(Clone, Default)]
pub struct MemCache {
    pub entries: Rc<RefCell<std::collections::BTreeMap<String, String>>>,
}

impl MemCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn preload(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

impl LocalCache for MemCache {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> AppResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid test date")
}

/// Canonical record with every hour at zero and every gate off; tests
/// switch on what they need.
pub fn base_record(day: &str, project: &str) -> CanonicalRecord {
    CanonicalRecord {
        date: date(day),
        project_name: project.to_string(),
        pure_hours: 0.0,
        markup_hours: 0.0,
        additional_hours: 0.0,
        overtime_hours: 0.0,
        idle_hours: 0.0,
        checked_tasks: 0.0,
        marked_tasks: 0.0,
        project_gate: false,
        markup_gate: false,
        other_gate: false,
        overtime_gate: false,
    }
}
