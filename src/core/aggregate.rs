//! Record categorizer and aggregator: canonical records into keyed buckets.

use crate::models::bucket::{Bucket, BucketKey, GroupBy, UNCATEGORIZED};
use crate::models::period::PeriodKey;
use crate::models::record::CanonicalRecord;
use crate::utils::date::iso_week_key;
use chrono::Datelike;
use std::collections::HashMap;

/// Aggregate `records` falling inside `period` into buckets along the
/// `group_by` axis.
///
/// Ordering: Day/Week/Month ascending by key; Project descending by
/// categorized total, Overtime descending by overtime hours; ties keep
/// first-seen order.
pub fn aggregate(
    records: &[CanonicalRecord],
    period: PeriodKey,
    group_by: GroupBy,
) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = Vec::new();
    let mut index: HashMap<BucketKey, usize> = HashMap::new();

    for rec in records {
        if !period.contains(rec.date) {
            continue;
        }
        if group_by == GroupBy::Overtime && !rec.overtime_gate {
            continue;
        }

        let key = bucket_key(rec, group_by);
        apply(bucket_at(&mut buckets, &mut index, key), rec);

        // Additional hours of a row whose project gate is off divert to the
        // synthetic bucket under project grouping. Under a time axis both
        // cases land in the same bucket, handled inside `apply`.
        if group_by == GroupBy::Project && !rec.project_gate && rec.other_gate {
            let synthetic = BucketKey::Project(UNCATEGORIZED.to_string());
            let b = bucket_at(&mut buckets, &mut index, synthetic);
            b.other += rec.additional_hours;
            b.entries += 1;
        }
    }

    match group_by {
        GroupBy::Day | GroupBy::Week | GroupBy::Month => {
            buckets.sort_by(|a, b| a.key.cmp(&b.key));
        }
        GroupBy::Project => {
            // Rows that only carried ungated hours never surface a project
            // bucket of their own.
            buckets.retain(|b| {
                b.total() > 0.0 || b.checked_tasks > 0.0 || b.marked_tasks > 0.0
            });
            buckets.sort_by(|a, b| b.total().total_cmp(&a.total()));
        }
        GroupBy::Overtime => {
            buckets.sort_by(|a, b| b.overtime.total_cmp(&a.overtime));
        }
    }

    buckets
}

fn bucket_key(rec: &CanonicalRecord, group_by: GroupBy) -> BucketKey {
    match group_by {
        GroupBy::Day => BucketKey::Day(rec.date),
        GroupBy::Week => {
            let (iso_year, iso_week) = iso_week_key(rec.date);
            BucketKey::Week { iso_year, iso_week }
        }
        GroupBy::Month => BucketKey::Month {
            year: rec.date.year(),
            month: rec.date.month(),
        },
        GroupBy::Project | GroupBy::Overtime => BucketKey::Project(rec.project_name.clone()),
    }
}

fn bucket_at<'a>(
    buckets: &'a mut Vec<Bucket>,
    index: &mut HashMap<BucketKey, usize>,
    key: BucketKey,
) -> &'a mut Bucket {
    let i = *index.entry(key.clone()).or_insert_with(|| {
        buckets.push(Bucket::new(key));
        buckets.len() - 1
    });
    &mut buckets[i]
}

/// Fold one record into its bucket under the categorization rules. A row
/// never contributes to the same subtotal twice; the project-grouping
/// diversion of gated-off additional hours is the caller's job.
fn apply(bucket: &mut Bucket, rec: &CanonicalRecord) {
    if rec.project_gate {
        bucket.check += rec.pure_hours;
        bucket.checked_tasks += rec.checked_tasks;
        bucket.other += rec.additional_hours;
    } else if rec.other_gate && !matches!(bucket.key, BucketKey::Project(_)) {
        bucket.other += rec.additional_hours;
    }

    if rec.markup_gate {
        bucket.markup += rec.markup_hours;
        bucket.marked_tasks += rec.marked_tasks;
    }

    if rec.overtime_gate {
        bucket.overtime += rec.overtime_hours;
    }

    bucket.idle += rec.idle_hours;
    bucket.gross_hours += rec.gross_hours();
    bucket.entries += 1;
}
