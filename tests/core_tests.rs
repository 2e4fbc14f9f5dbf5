use serde_json::{Map, Value, json};
use worktally::Core;
use worktally::models::bucket::{BucketKey, GroupBy, UNCATEGORIZED};
use worktally::models::period::PeriodKey;
use worktally::settings::SettingsPatch;

mod common;
use common::{MemCache, MemStore, date};

fn core() -> (Core<MemStore, MemCache>, MemStore) {
    let store = MemStore::new();
    let cache = MemCache::new();
    (Core::new(store.clone(), cache, None), store)
}

fn row(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("row helper expects an object"),
    }
}

fn sample_rows() -> Vec<Map<String, Value>> {
    vec![
        row(json!({
            "Date": "2024-05-06",
            "Project": "Alpha",
            "Project_Check": true,
            "Pure_Hours": 6,
            "Checked_Tasks": 12,
        })),
        row(json!({
            "Date": "2024-05-06",
            "Project": "Beta",
            "Markup_Check": true,
            "Markup_Hours": 2,
            "Marked_Tasks": 4,
        })),
        row(json!({
            "Date": "2024-05-07",
            "Project": "Alpha",
            "Other_Check": true,
            "Other_Hours": 3,
        })),
        row(json!({ "Project": "NoDate", "Pure_Hours": 9 })),
    ]
}

#[test]
fn set_records_ingests_and_counts_drops() {
    let (mut core, _store) = core();
    core.set_records(&sample_rows());

    assert_eq!(core.records().len(), 3);
    assert_eq!(core.dropped_records(), 1);
}

#[test]
fn aggregates_flow_through_the_controller() {
    let (mut core, _store) = core();
    core.set_records(&sample_rows());

    let projects = core.aggregates(PeriodKey::Month(2024, 5), GroupBy::Project);
    let names: Vec<_> = projects
        .iter()
        .map(|b| match &b.key {
            BucketKey::Project(name) => name.as_str().to_string(),
            other => panic!("unexpected key {:?}", other),
        })
        .collect();

    // Alpha 6h, Uncategorized 3h, Beta 2h, descending by total.
    assert_eq!(names, vec!["Alpha", UNCATEGORIZED, "Beta"]);
}

#[test]
fn calendar_day_breaks_one_date_down_by_project() {
    let (mut core, _store) = core();
    core.set_records(&sample_rows());

    let day = core.calendar_day(date("2024-05-06"));
    assert_eq!(day.projects.len(), 2);
    assert_eq!(day.total_hours, 8.0);
    assert_eq!(day.total_tasks, 16.0);

    let other_day = core.calendar_day(date("2024-05-07"));
    assert_eq!(other_day.projects.len(), 1);
    assert_eq!(
        other_day.projects[0].key,
        BucketKey::Project(UNCATEGORIZED.to_string())
    );
    assert_eq!(other_day.total_hours, 3.0);
}

#[test]
fn project_weekly_drilldown_sums_ungated() {
    let (mut core, _store) = core();
    core.set_records(&sample_rows());

    let weekly = core.project_weekly("Alpha", 2024, Some(5));

    // Both Alpha rows are in ISO week 19 (May 6-12).
    assert_eq!(weekly.weeks.len(), 1);
    let week = &weekly.weeks[0];
    assert_eq!(week.iso_week, 19);
    assert_eq!(week.week_start, date("2024-05-06"));
    assert_eq!(week.week_end, date("2024-05-12"));
    assert_eq!(week.pure_hours, 6.0);
    assert_eq!(week.additional_hours, 3.0);
    assert_eq!(week.check_rate, 2.0);
    assert_eq!(weekly.total_hours, 9.0);
    assert_eq!(weekly.avg_hours_per_week, 9.0);
}

#[test]
fn available_years_union_settings_and_data_descending() {
    let (mut core, _store) = core();
    core.set_records(&sample_rows());
    core.mutate_settings(SettingsPatch::AddYear(2022)).unwrap();
    core.mutate_settings(SettingsPatch::AddYear(2026)).unwrap();

    assert_eq!(core.available_years(), vec![2026, 2024, 2022]);
}

#[test]
fn workload_summary_uses_the_settings_exceptions() {
    let (mut core, _store) = core();
    core.set_records(&[row(json!({
        "Date": "2024-05-06",
        "Project": "Alpha",
        "Pure_Hours": 8,
    }))]);

    let before = core.workload_summary(PeriodKey::Month(2024, 5));
    assert_eq!(before.norm_hours, 184);

    // Marking a weekday holiday lowers the month norm by 8 hours.
    core.mutate_settings(SettingsPatch::AddHoliday {
        year: 2024,
        day: "06.05".into(),
    })
    .unwrap();

    let after = core.workload_summary(PeriodKey::Month(2024, 5));
    assert_eq!(after.norm_hours, 176);
}

#[test]
fn settings_roundtrip_through_remote_notification() {
    let (mut core, _store) = core();

    core.handle_remote_notification(json!({
        "exceptions": { "2024": { "holidays": ["01.01"], "shortDays": [] } },
        "years": [2024],
    }));

    assert_eq!(core.settings().global.years, vec![2024]);
    assert!(
        core.settings().global.exceptions.years[&2024]
            .holidays
            .contains(&"01.01".to_string())
    );
}
