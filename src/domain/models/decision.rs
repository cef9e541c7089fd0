use crate::domain::value_objects::ObjectKey;

/// Why a backup survives this run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetainReason {
    /// One of the newest `min_backups_to_keep` backups; `rank` 0 is the newest
    Protected { rank: usize },
    /// Outside the protected set but not old enough to expire
    WithinRetention { age_days: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetainedBackup {
    pub key: ObjectKey,
    pub reason: RetainReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpiredBackup {
    pub key: ObjectKey,
    pub age_days: i64,
}

/// Outcome of applying a retention policy to one folder listing.
///
/// `to_keep` and `to_delete` partition the listing exactly. Both are in
/// newest-first order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionDecision {
    pub to_keep: Vec<RetainedBackup>,
    pub to_delete: Vec<ExpiredBackup>,
}

impl RetentionDecision {
    pub fn keep_keys(&self) -> Vec<ObjectKey> {
        self.to_keep.iter().map(|r| r.key.clone()).collect()
    }

    pub fn delete_keys(&self) -> Vec<ObjectKey> {
        self.to_delete.iter().map(|e| e.key.clone()).collect()
    }

    pub fn protected_count(&self) -> usize {
        self.to_keep
            .iter()
            .filter(|r| matches!(r.reason, RetainReason::Protected { .. }))
            .count()
    }

    pub fn total(&self) -> usize {
        self.to_keep.len() + self.to_delete.len()
    }
}
