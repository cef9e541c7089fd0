//! Retention decision for a single folder listing.
//!
//! Given a folder's backups, its policy and the evaluation instant, split the
//! listing into backups to keep and backups to delete. The count floor
//! (`min_backups_to_keep`) always wins over the age ceiling (`days_to_keep`).
//!
//! Ages are measured in whole elapsed 24-hour periods, rounded down: a backup
//! written 23h59m ago is 0 days old, one written exactly 24h ago is 1 day
//! old. Calendar dates and time zones play no part.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::domain::models::{
    BackupObject, ExpiredBackup, RetainReason, RetainedBackup, RetentionDecision, RetentionPolicy,
};

const SECONDS_PER_DAY: i64 = 86_400;

/// Whole days elapsed between `last_modified` and `now`, rounded down.
///
/// Negative when the backup claims to be newer than `now` (clock skew).
pub fn age_in_days(last_modified: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - last_modified)
        .num_seconds()
        .div_euclid(SECONDS_PER_DAY)
}

/// Decide which backups of one folder to keep and which to delete.
///
/// Pure: no I/O, no clock reads. Identical inputs always yield identical
/// output, including for backups sharing a timestamp (ties are broken by key,
/// ascending).
pub fn decide(
    objects: &[BackupObject],
    policy: &RetentionPolicy,
    now: DateTime<Utc>,
) -> RetentionDecision {
    let mut sorted: Vec<&BackupObject> = objects.iter().collect();
    sorted.sort_by(|a, b| newest_first(a, b));

    let protected = usize::try_from(policy.min_backups_to_keep)
        .unwrap_or(usize::MAX)
        .min(sorted.len());
    let max_age = i64::from(policy.days_to_keep);

    let mut decision = RetentionDecision {
        to_keep: Vec::with_capacity(sorted.len()),
        to_delete: Vec::new(),
    };

    for (rank, object) in sorted.into_iter().enumerate() {
        if rank < protected {
            decision.to_keep.push(RetainedBackup {
                key: object.key.clone(),
                reason: RetainReason::Protected { rank },
            });
            continue;
        }

        let age_days = age_in_days(object.last_modified, now);
        if age_days > max_age {
            decision.to_delete.push(ExpiredBackup {
                key: object.key.clone(),
                age_days,
            });
        } else {
            decision.to_keep.push(RetainedBackup {
                key: object.key.clone(),
                reason: RetainReason::WithinRetention { age_days },
            });
        }
    }

    decision
}

fn newest_first(a: &BackupObject, b: &BackupObject) -> Ordering {
    b.last_modified
        .cmp(&a.last_modified)
        .then_with(|| a.key.cmp(&b.key))
}
