//! Retention policy and deletion selection
//!
//! Selection is a pure function over already-resolved directory entries so
//! the ordering rules can be tested without a filesystem.

use std::path::PathBuf;
use std::time::SystemTime;

use crate::errors::{ExError, ExErrorKind};

pub const DEFAULT_KEEP_COUNT: usize = 5;

/// At most `keep_count` artifacts survive a completed tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    keep_count: usize,
}

impl RetentionPolicy {
    /// # Errors
    ///
    /// `InvalidConfig` if `keep_count` is zero: the artifact a tick just
    /// produced must always survive.
    pub fn new(keep_count: usize) -> Result<Self, ExError> {
        if keep_count == 0 {
            return Err(ExError::new(ExErrorKind::InvalidConfig)
                .with_op("retention_policy")
                .with_message("keep_count must be at least 1"));
        }
        Ok(Self { keep_count })
    }

    pub fn keep_count(&self) -> usize {
        self.keep_count
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            keep_count: DEFAULT_KEEP_COUNT,
        }
    }
}

/// One artifact file as seen by a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactEntry {
    pub path: PathBuf,
    pub file_name: String,
    /// `None` when the modification time could not be read
    pub modified: Option<SystemTime>,
}

impl ArtifactEntry {
    pub fn is_orderable(&self) -> bool {
        self.modified.is_some()
    }
}

/// Choose which artifacts to delete so that at most `keep` orderable
/// artifacts remain.
///
/// Entries are ordered by full-precision modification time; only identical
/// times fall back to file name. Entries without a modification time are
/// never selected and do not count toward `keep`. The result is oldest first.
pub fn select_for_deletion(entries: &[ArtifactEntry], keep: usize) -> Vec<PathBuf> {
    let mut orderable: Vec<(SystemTime, &ArtifactEntry)> = entries
        .iter()
        .filter_map(|e| e.modified.map(|t| (t, e)))
        .collect();

    orderable.sort_by(|(a_time, a), (b_time, b)| {
        a_time
            .cmp(b_time)
            .then_with(|| a.file_name.cmp(&b.file_name))
    });

    let excess = orderable.len().saturating_sub(keep);
    orderable
        .into_iter()
        .take(excess)
        .map(|(_, e)| e.path.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn entry(name: &str, secs: Option<u64>) -> ArtifactEntry {
        ArtifactEntry {
            path: PathBuf::from("backups").join(name),
            file_name: name.to_string(),
            modified: secs.map(|s| UNIX_EPOCH + Duration::from_secs(s)),
        }
    }

    #[test]
    fn test_policy_rejects_zero() {
        assert!(RetentionPolicy::new(0).is_err());
        assert_eq!(RetentionPolicy::new(3).unwrap().keep_count(), 3);
        assert_eq!(RetentionPolicy::default().keep_count(), 5);
    }

    #[test]
    fn test_nothing_selected_at_or_below_keep() {
        let entries: Vec<_> = (0..5)
            .map(|i| entry(&format!("b{}.db", i), Some(100 + i)))
            .collect();
        assert!(select_for_deletion(&entries, 5).is_empty());
        assert!(select_for_deletion(&entries[..2], 5).is_empty());
        assert!(select_for_deletion(&[], 5).is_empty());
    }

    #[test]
    fn test_oldest_selected_first_regardless_of_input_order() {
        let entries = vec![
            entry("c.db", Some(300)),
            entry("a.db", Some(100)),
            entry("e.db", Some(500)),
            entry("b.db", Some(200)),
            entry("d.db", Some(400)),
        ];
        let selected = select_for_deletion(&entries, 3);
        assert_eq!(
            selected,
            vec![PathBuf::from("backups/a.db"), PathBuf::from("backups/b.db")]
        );
    }

    #[test]
    fn test_ties_broken_by_file_name() {
        let entries = vec![
            entry("backup_2026-01-02_03-00-00_1.db", Some(100)),
            entry("backup_2026-01-02_03-00-00.db", Some(100)),
            entry("backup_2027-01-02_03-00-00.db", Some(200)),
        ];
        let selected = select_for_deletion(&entries, 2);
        assert_eq!(
            selected,
            vec![PathBuf::from("backups/backup_2026-01-02_03-00-00.db")]
        );
    }

    #[test]
    fn test_sub_second_differences_order_before_name() {
        // `_10` sorts before `_2` by name but was written later
        let mut later = entry("backup_2026-01-02_03-00-00_10.db", None);
        later.modified = Some(UNIX_EPOCH + Duration::from_millis(100_900));
        let mut earlier = entry("backup_2026-01-02_03-00-00_2.db", None);
        earlier.modified = Some(UNIX_EPOCH + Duration::from_millis(100_100));

        let selected = select_for_deletion(&[later, earlier], 1);
        assert_eq!(
            selected,
            vec![PathBuf::from("backups/backup_2026-01-02_03-00-00_2.db")]
        );
    }

    #[test]
    fn test_unorderable_entries_are_never_selected() {
        let entries = vec![
            entry("mystery.db", None),
            entry("a.db", Some(100)),
            entry("b.db", Some(200)),
            entry("c.db", Some(300)),
        ];
        let selected = select_for_deletion(&entries, 2);
        assert_eq!(selected, vec![PathBuf::from("backups/a.db")]);
    }

    #[test]
    fn test_pre_epoch_times_order_correctly() {
        let mut before = entry("before.db", None);
        before.modified = Some(UNIX_EPOCH - Duration::from_millis(500));
        let mut at = entry("at.db", None);
        at.modified = Some(UNIX_EPOCH);

        let selected = select_for_deletion(&[at, before], 1);
        assert_eq!(selected, vec![PathBuf::from("backups/before.db")]);
    }

    proptest! {
        #[test]
        fn prop_selection_keeps_the_newest(
            times in proptest::collection::vec(proptest::option::weighted(0.9, 0u64..10_000_000), 0..30),
            keep in 1usize..8,
        ) {
            let entries: Vec<_> = times
                .iter()
                .enumerate()
                .map(|(i, t)| entry(&format!("backup_{:04}.db", i), *t))
                .collect();
            let orderable = entries.iter().filter(|e| e.is_orderable()).count();

            let selected = select_for_deletion(&entries, keep);

            prop_assert_eq!(selected.len(), orderable.saturating_sub(keep));

            let mut newest_deleted: Option<SystemTime> = None;
            for path in &selected {
                let deleted = entries.iter().find(|e| &e.path == path).unwrap();
                prop_assert!(deleted.is_orderable());
                let t = deleted.modified.unwrap();
                newest_deleted = Some(newest_deleted.map_or(t, |n| n.max(t)));
            }

            if let Some(newest_deleted) = newest_deleted {
                for kept in entries.iter().filter(|e| e.is_orderable() && !selected.contains(&e.path)) {
                    prop_assert!(kept.modified.unwrap() >= newest_deleted);
                }
            }
        }
    }
}
