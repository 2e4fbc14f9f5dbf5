use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;
use worktally::settings::reconcile::{
    LOCK_WINDOW, SettingsController, SyncState, canonical_global_payload, payload_hash,
};
use worktally::settings::store::PERSONAL_KEY;
use worktally::settings::{PersonalPatch, SettingsPatch};

mod common;
use common::{MemCache, MemStore};

type Controller = SettingsController<MemStore, MemCache>;

fn controller(identity: Option<&str>) -> (Controller, MemStore, MemCache) {
    let store = MemStore::new();
    let cache = MemCache::new();
    let ctl = SettingsController::new(
        store.clone(),
        cache.clone(),
        identity.map(str::to_string),
    );
    (ctl, store, cache)
}

fn merge_counter(ctl: &mut Controller) -> Rc<RefCell<u32>> {
    let counter = Rc::new(RefCell::new(0u32));
    let probe = Rc::clone(&counter);
    ctl.subscribe(move |_| *probe.borrow_mut() += 1);
    counter
}

fn add_holiday(year: i32, day: &str) -> SettingsPatch {
    SettingsPatch::AddHoliday {
        year,
        day: day.to_string(),
    }
}

// ---------------------------
// Echo suppression
// ---------------------------

#[test]
fn echo_inside_the_window_is_ignored() {
    let (mut ctl, store, _cache) = controller(None);
    let merges = merge_counter(&mut ctl);

    let t0 = Instant::now();
    ctl.mutate_at(add_holiday(2024, "08.03"), t0).unwrap();
    assert_eq!(ctl.state(), SyncState::LocalPending);

    let echo = store.last_write().expect("write issued");
    ctl.handle_remote_at(echo, t0 + LOCK_WINDOW / 10, 2024);

    assert_eq!(*merges.borrow(), 0);
    assert_eq!(ctl.state(), SyncState::LocalPending);
}

#[test]
fn any_notification_inside_the_window_is_ignored_even_with_a_different_hash() {
    let (mut ctl, _store, _cache) = controller(None);
    let merges = merge_counter(&mut ctl);

    let t0 = Instant::now();
    ctl.mutate_at(add_holiday(2024, "08.03"), t0).unwrap();

    ctl.handle_remote_at(json!({ "years": [1999] }), t0 + LOCK_WINDOW / 10, 2024);

    assert_eq!(*merges.borrow(), 0);
    assert!(ctl.document().global.years.is_empty());
}

#[test]
fn stale_echo_outside_the_window_is_ignored_by_hash() {
    let (mut ctl, store, _cache) = controller(None);
    let merges = merge_counter(&mut ctl);

    let t0 = Instant::now();
    ctl.mutate_at(add_holiday(2024, "08.03"), t0).unwrap();
    let echo = store.last_write().expect("write issued");

    ctl.handle_remote_at(echo, t0 + LOCK_WINDOW * 2, 2024);

    assert_eq!(*merges.borrow(), 0);
    // The edit survives: nothing reverted it.
    assert!(
        ctl.document().global.exceptions.years[&2024]
            .holidays
            .contains(&"08.03".to_string())
    );
}

#[test]
fn foreign_notification_outside_the_window_merges() {
    let (mut ctl, _store, _cache) = controller(None);
    let merges = merge_counter(&mut ctl);

    let t0 = Instant::now();
    ctl.mutate_at(add_holiday(2024, "08.03"), t0).unwrap();

    let foreign = json!({ "years": [1999] });
    ctl.handle_remote_at(foreign, t0 + LOCK_WINDOW * 2, 2024);

    assert_eq!(*merges.borrow(), 1);
    assert_eq!(ctl.state(), SyncState::Clean);
    assert_eq!(ctl.document().global.years, vec![1999]);
}

#[test]
fn a_second_mutation_supersedes_the_guard() {
    let (mut ctl, store, _cache) = controller(None);
    let merges = merge_counter(&mut ctl);

    let t0 = Instant::now();
    ctl.mutate_at(add_holiday(2024, "08.03"), t0).unwrap();
    let first_echo = store.last_write().expect("first write");

    let t1 = t0 + LOCK_WINDOW / 2;
    ctl.mutate_at(add_holiday(2024, "01.05"), t1).unwrap();
    let second_echo = store.last_write().expect("second write");

    let late = t1 + LOCK_WINDOW * 2;

    // The second write owns the guard now: its own echo is dropped by
    // hash, while the first (stale) echo no longer matches and merges.
    ctl.handle_remote_at(second_echo, late, 2024);
    assert_eq!(*merges.borrow(), 0);

    ctl.handle_remote_at(first_echo, late, 2024);
    assert_eq!(*merges.borrow(), 1);
}

// ---------------------------
// Failure semantics
// ---------------------------

#[test]
fn failed_write_keeps_document_and_guard() {
    let (mut ctl, store, _cache) = controller(None);
    let merges = merge_counter(&mut ctl);
    store.set_failing(true);

    let t0 = Instant::now();
    ctl.mutate_at(add_holiday(2024, "08.03"), t0).unwrap();

    assert_eq!(store.write_count(), 0);
    // In-memory document is not rolled back.
    assert!(
        ctl.document().global.exceptions.years[&2024]
            .holidays
            .contains(&"08.03".to_string())
    );

    // A late notification matching the failed write's hash is still
    // suppressed.
    let would_be = canonical_global_payload(&ctl.document().global).unwrap();
    ctl.handle_remote_at(would_be, t0 + LOCK_WINDOW * 2, 2024);
    assert_eq!(*merges.borrow(), 0);

    // The next mutation retries with the current document state.
    store.set_failing(false);
    ctl.mutate_at(add_holiday(2024, "01.05"), t0 + LOCK_WINDOW * 3)
        .unwrap();
    assert_eq!(store.write_count(), 1);

    let payload = store.last_write().unwrap();
    let holidays = &payload["exceptions"]["2024"]["holidays"];
    assert_eq!(*holidays, json!(["08.03", "01.05"]));
}

// ---------------------------
// Personal tier
// ---------------------------

#[test]
fn personal_mutation_bypasses_the_guard() {
    let (mut ctl, store, cache) = controller(Some("alice"));
    let merges = merge_counter(&mut ctl);

    ctl.update_personal(PersonalPatch {
        theme: Some("dark".to_string()),
        ..Default::default()
    })
    .unwrap();

    // Cached locally and mirrored into the identity's profile.
    let cached = cache.entries.borrow().get(PERSONAL_KEY).cloned().unwrap();
    assert!(cached.contains("dark"));

    let payload = store.last_write().expect("mirror write");
    assert_eq!(payload["profiles"]["alice"]["theme"], json!("dark"));

    // No guard was armed: even the immediate echo merges instead of being
    // suppressed, and the merge is a harmless self-merge.
    ctl.handle_remote_at(payload, Instant::now(), 2024);
    assert_eq!(*merges.borrow(), 1);
    assert_eq!(ctl.document().personal.theme, "dark");
}

#[test]
fn personal_mutation_without_identity_stays_local() {
    let (mut ctl, store, cache) = controller(None);

    ctl.update_personal(PersonalPatch {
        accent: Some("teal".to_string()),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(store.write_count(), 0);
    assert!(cache.entries.borrow().contains_key(PERSONAL_KEY));
    assert_eq!(ctl.document().personal.accent, "teal");
}

#[test]
fn cached_personal_tier_is_loaded_at_startup() {
    let store = MemStore::new();
    let cache = MemCache::new();
    cache.preload(PERSONAL_KEY, "theme: dark\naccent: teal\ndisplayName: A\n");

    let ctl: Controller = SettingsController::new(store, cache, None);

    assert_eq!(ctl.document().personal.theme, "dark");
    assert_eq!(ctl.document().personal.accent, "teal");
    assert_eq!(ctl.document().personal.display_name, "A");
}

#[test]
fn identity_profile_overrides_the_cached_tier_on_merge() {
    let store = MemStore::new();
    let cache = MemCache::new();
    cache.preload(PERSONAL_KEY, "theme: dark\naccent: ''\ndisplayName: ''\n");

    let mut ctl: Controller =
        SettingsController::new(store, cache, Some("alice".to_string()));
    assert_eq!(ctl.document().personal.theme, "dark");

    let payload = json!({
        "profiles": { "alice": { "theme": "solarized", "accent": "", "displayName": "Alice" } }
    });
    ctl.handle_remote_at(payload, Instant::now(), 2024);

    assert_eq!(ctl.document().personal.theme, "solarized");
    assert_eq!(ctl.document().personal.display_name, "Alice");
}

#[test]
fn merge_without_profile_falls_back_to_cached_tier() {
    let store = MemStore::new();
    let cache = MemCache::new();
    cache.preload(PERSONAL_KEY, "theme: dark\naccent: ''\ndisplayName: ''\n");

    let mut ctl: Controller =
        SettingsController::new(store, cache, Some("alice".to_string()));

    ctl.handle_remote_at(json!({ "years": [2024] }), Instant::now(), 2024);
    assert_eq!(ctl.document().personal.theme, "dark");
}

// ---------------------------
// Payload shape
// ---------------------------

#[test]
fn canonical_payload_excludes_personal_fields() {
    let (mut ctl, store, _cache) = controller(None);

    ctl.update_personal(PersonalPatch {
        theme: Some("dark".to_string()),
        ..Default::default()
    })
    .unwrap();
    ctl.mutate_at(add_holiday(2024, "08.03"), Instant::now())
        .unwrap();

    let payload = store.last_write().unwrap();
    let keys: Vec<&str> = payload.as_object().unwrap().keys().map(|k| k.as_str()).collect();

    assert!(!keys.contains(&"theme"));
    assert!(!keys.contains(&"accent"));
    assert!(!keys.contains(&"displayName"));
    assert!(keys.contains(&"exceptions"));
    assert!(keys.contains(&"profiles"));
}

#[test]
fn payload_hash_is_stable_across_equal_documents() {
    let a = json!({ "years": [2024], "grade": { "current": "J" } });
    let b = json!({ "grade": { "current": "J" }, "years": [2024] });

    // serde_json orders object keys, so logically equal payloads hash
    // identically regardless of construction order.
    assert_eq!(payload_hash(&a), payload_hash(&b));
}
