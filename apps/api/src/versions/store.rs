use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::documents::new_id;
use crate::models::cv::CvDocument;

pub const DEFAULT_MAX_VERSIONS: usize = 50;

/// An immutable point-in-time copy of a CV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub id: String,
    pub cv_data: CvDocument,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub is_auto_save: bool,
    /// Insertion sequence; breaks timestamp ties, newest first.
    #[serde(default)]
    pub seq: u64,
}

/// Persisted form of the version history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VersionLedger {
    pub versions: Vec<Version>,
    pub current_version_id: Option<String>,
}

/// Capped, time-ordered history of CV snapshots.
///
/// Versions are kept sorted by timestamp descending; the tail is evicted when
/// the cap is exceeded.
#[derive(Debug, Clone)]
pub struct VersionStore {
    versions: Vec<Version>,
    current_version_id: Option<String>,
    max_versions: usize,
    next_seq: u64,
}

impl Default for VersionStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_VERSIONS)
    }
}

impl VersionStore {
    pub fn new(max_versions: usize) -> Self {
        Self {
            versions: Vec::new(),
            current_version_id: None,
            max_versions,
            next_seq: 0,
        }
    }

    /// Restores a persisted history. The cap is not applied until the next
    /// capture or an explicit `clear_old_versions`.
    pub fn from_ledger(ledger: VersionLedger, max_versions: usize) -> Self {
        let next_seq = ledger
            .versions
            .iter()
            .map(|v| v.seq + 1)
            .max()
            .unwrap_or(0);
        let mut store = Self {
            versions: ledger.versions,
            current_version_id: ledger.current_version_id,
            max_versions,
            next_seq,
        };
        store.sort();
        store
    }

    pub fn to_ledger(&self) -> VersionLedger {
        VersionLedger {
            versions: self.versions.clone(),
            current_version_id: self.current_version_id.clone(),
        }
    }

    pub fn current_version_id(&self) -> Option<&str> {
        self.current_version_id.as_deref()
    }

    /// Snapshots `document` now. See [`VersionStore::create_version_at`].
    pub fn create_version(
        &mut self,
        document: &CvDocument,
        label: Option<String>,
        is_auto_save: bool,
    ) -> String {
        self.create_version_at(document, label, is_auto_save, Utc::now())
    }

    /// Stores a deep copy of `document` captured at `timestamp`, re-sorts, and
    /// evicts the oldest versions beyond the cap. Identical content is stored
    /// again; there is no deduplication.
    pub fn create_version_at(
        &mut self,
        document: &CvDocument,
        label: Option<String>,
        is_auto_save: bool,
        timestamp: DateTime<Utc>,
    ) -> String {
        let id = new_id("v");
        let seq = self.next_seq;
        self.next_seq += 1;

        self.versions.push(Version {
            id: id.clone(),
            cv_data: document.clone(),
            timestamp,
            label,
            is_auto_save,
            seq,
        });
        self.sort();
        self.versions.truncate(self.max_versions);
        self.current_version_id = Some(id.clone());

        info!(
            "Captured version {id} ({}, {} retained)",
            if is_auto_save { "auto" } else { "manual" },
            self.versions.len()
        );
        id
    }

    /// Returns a copy of the stored CV and moves the current pointer to it.
    pub fn restore_version(&mut self, id: &str) -> Option<CvDocument> {
        let version = self.versions.iter().find(|v| v.id == id)?;
        let restored = version.cv_data.clone();
        self.current_version_id = Some(id.to_string());
        Some(restored)
    }

    pub fn delete_version(&mut self, id: &str) -> bool {
        let before = self.versions.len();
        self.versions.retain(|v| v.id != id);
        self.versions.len() != before
    }

    /// Re-applies the retention cap. Returns how many versions were evicted.
    pub fn clear_old_versions(&mut self) -> usize {
        self.sort();
        let before = self.versions.len();
        self.versions.truncate(self.max_versions);
        before - self.versions.len()
    }

    /// All versions, newest first.
    pub fn version_history(&self) -> Vec<Version> {
        let mut history = self.versions.clone();
        sort_newest_first(&mut history);
        history
    }

    pub fn last_version(&self) -> Option<&Version> {
        self.versions.first()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    fn sort(&mut self) {
        sort_newest_first(&mut self.versions);
    }
}

fn sort_newest_first(versions: &mut [Version]) {
    versions.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.seq.cmp(&a.seq)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn doc(summary: &str) -> CvDocument {
        CvDocument {
            summary: summary.to_string(),
            ..CvDocument::default()
        }
    }

    #[test]
    fn test_cap_keeps_most_recent() {
        let mut store = VersionStore::new(50);
        let start = Utc::now();
        let mut ids = Vec::new();
        for i in 0..51 {
            let at = start + Duration::seconds(i);
            ids.push(store.create_version_at(&doc(&i.to_string()), None, true, at));
        }

        let history = store.version_history();
        assert_eq!(history.len(), 50);
        assert!(history.iter().all(|v| v.id != ids[0]));
        assert_eq!(history[0].id, ids[50]);
        assert_eq!(history[49].id, ids[1]);
    }

    #[test]
    fn test_cap_plus_k_retains_cap() {
        let mut store = VersionStore::new(5);
        let start = Utc::now();
        for i in 0..12 {
            store.create_version_at(&doc("x"), None, false, start + Duration::seconds(i));
        }
        assert_eq!(store.len(), 5);
        let oldest = store.version_history().last().unwrap().timestamp;
        assert_eq!(oldest, start + Duration::seconds(7));
    }

    #[test]
    fn test_out_of_order_capture_is_sorted() {
        let mut store = VersionStore::new(10);
        let now = Utc::now();
        let late = store.create_version_at(&doc("late"), None, false, now);
        let early = store.create_version_at(&doc("early"), None, false, now - Duration::minutes(5));
        let history = store.version_history();
        assert_eq!(history[0].id, late);
        assert_eq!(history[1].id, early);
    }

    #[test]
    fn test_equal_timestamps_newest_insertion_first() {
        let mut store = VersionStore::new(10);
        let now = Utc::now();
        let first = store.create_version_at(&doc("a"), None, false, now);
        let second = store.create_version_at(&doc("b"), None, false, now);
        let history = store.version_history();
        assert_eq!(history[0].id, second);
        assert_eq!(history[1].id, first);
    }

    #[test]
    fn test_restore_round_trip_is_independent() {
        let mut store = VersionStore::default();
        let original = doc("snapshot");
        let id = store.create_version(&original, Some("Before rewrite".to_string()), false);

        let mut restored = store.restore_version(&id).unwrap();
        assert_eq!(restored, original);
        assert_eq!(store.current_version_id(), Some(id.as_str()));

        restored.summary = "mutated".to_string();
        let again = store.restore_version(&id).unwrap();
        assert_eq!(again.summary, "snapshot");
    }

    #[test]
    fn test_restore_miss_returns_none() {
        let mut store = VersionStore::default();
        assert!(store.restore_version("v-missing").is_none());
        assert!(store.current_version_id().is_none());
    }

    #[test]
    fn test_no_dedup_of_identical_content() {
        let mut store = VersionStore::default();
        store.create_version(&doc("same"), None, true);
        store.create_version(&doc("same"), None, true);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_delete_version() {
        let mut store = VersionStore::default();
        let id = store.create_version(&doc("x"), None, false);
        assert!(!store.delete_version("v-other"));
        assert!(store.delete_version(&id));
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear_old_versions_after_reload_with_smaller_cap() {
        let mut store = VersionStore::new(10);
        let start = Utc::now();
        for i in 0..8 {
            store.create_version_at(&doc("x"), None, true, start + Duration::seconds(i));
        }
        let mut reloaded = VersionStore::from_ledger(store.to_ledger(), 3);
        assert_eq!(reloaded.len(), 8);
        assert_eq!(reloaded.clear_old_versions(), 5);
        assert_eq!(
            reloaded.last_version().unwrap().timestamp,
            start + Duration::seconds(7)
        );
    }

    #[test]
    fn test_from_ledger_continues_sequence() {
        let mut store = VersionStore::new(10);
        let now = Utc::now();
        store.create_version_at(&doc("a"), None, true, now);
        let mut reloaded = VersionStore::from_ledger(store.to_ledger(), 10);
        let newer = reloaded.create_version_at(&doc("b"), None, true, now);
        assert_eq!(reloaded.version_history()[0].id, newer);
    }
}
