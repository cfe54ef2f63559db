//! Active registry and paused list.
//!
//! This module provides a pure state machine for the coordinator's records.
//! No I/O is performed here; the coordinator handles engine calls, files and
//! callbacks.
//!
//! # Design
//!
//! - Pure synchronous state (no async, no IO, no tracing)
//! - Removal hands the record back to the caller, so exactly one caller can
//!   ever finish a given transfer
//! - Deterministic ordering: active records are keyed in a `BTreeMap`

use std::collections::BTreeMap;

use bgdl_core::{DownloadError, DownloadRecord, DownloadResult, RegistrySnapshot, TransferId};

/// Records submitted to the engine, plus records stopped for later resume.
///
/// This is a sync type with no internal locking; the caller
/// (`LifecycleCoordinator`) is responsible for synchronization.
#[derive(Debug, Default)]
pub struct DownloadRegistry {
    active: BTreeMap<TransferId, DownloadRecord>,
    paused: Vec<DownloadRecord>,
}

impl DownloadRegistry {
    pub const fn new() -> Self {
        Self {
            active: BTreeMap::new(),
            paused: Vec::new(),
        }
    }

    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub const fn paused_len(&self) -> usize {
        self.paused.len()
    }

    /// Whether no record is currently submitted to the engine.
    pub fn is_idle(&self) -> bool {
        self.active.is_empty()
    }

    pub fn contains(&self, id: TransferId) -> bool {
        self.active.contains_key(&id)
    }

    pub fn active_ids(&self) -> Vec<TransferId> {
        self.active.keys().copied().collect()
    }

    /// Insert a submitted record under its transfer id.
    ///
    /// Returns the record previously stored under the same id, if any.
    pub fn insert(&mut self, record: DownloadRecord) -> DownloadResult<Option<DownloadRecord>> {
        let id = record.transfer_id().ok_or_else(|| {
            DownloadError::other(format!(
                "record for {} has no transfer id",
                record.source_uri()
            ))
        })?;
        Ok(self.active.insert(id, record))
    }

    /// Remove and return the record for `id`.
    pub fn remove(&mut self, id: TransferId) -> Option<DownloadRecord> {
        self.active.remove(&id)
    }

    /// Remove every active record whose source is `uri`, in id order.
    pub fn remove_by_uri(&mut self, uri: &str) -> Vec<DownloadRecord> {
        let ids: Vec<TransferId> = self
            .active
            .iter()
            .filter(|(_, record)| record.source_uri() == uri)
            .map(|(id, _)| *id)
            .collect();
        ids.into_iter().filter_map(|id| self.active.remove(&id)).collect()
    }

    /// Remove every active record, in id order.
    pub fn drain_active(&mut self) -> Vec<DownloadRecord> {
        std::mem::take(&mut self.active).into_values().collect()
    }

    /// Move every active record to the end of the paused list.
    ///
    /// Returns the transfer ids the records held, for engine cancellation.
    pub fn pause_active(&mut self) -> Vec<TransferId> {
        let mut ids = Vec::with_capacity(self.active.len());
        for (id, mut record) in std::mem::take(&mut self.active) {
            record.clear_transfer_id();
            self.paused.push(record);
            ids.push(id);
        }
        ids
    }

    /// Take the paused list, leaving it empty.
    pub fn take_paused(&mut self) -> Vec<DownloadRecord> {
        std::mem::take(&mut self.paused)
    }

    /// Drop every paused record. Returns how many were dropped.
    pub fn clear_paused(&mut self) -> usize {
        let count = self.paused.len();
        self.paused.clear();
        count
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            active: self.active.values().map(Into::into).collect(),
            paused: self.paused.iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bgdl_core::NoopCallback;

    use super::*;

    fn submitted(uri: &str, path: &str, id: i64) -> DownloadRecord {
        let mut record = DownloadRecord::new(uri, path, Vec::new(), Arc::new(NoopCallback));
        record.assign(TransferId::new(id));
        record
    }

    #[test]
    fn insert_requires_transfer_id() {
        let mut registry = DownloadRegistry::new();
        let record = DownloadRecord::new("https://x/a", "/d/a", Vec::new(), Arc::new(NoopCallback));

        assert!(registry.insert(record).is_err());
        assert!(registry.is_idle());
    }

    #[test]
    fn remove_returns_record_once() {
        let mut registry = DownloadRegistry::new();
        registry.insert(submitted("https://x/a", "/d/a", 1)).unwrap();

        assert!(registry.remove(TransferId::new(1)).is_some());
        assert!(registry.remove(TransferId::new(1)).is_none());
        assert!(registry.is_idle());
    }

    #[test]
    fn remove_by_uri_only_matches_source() {
        let mut registry = DownloadRegistry::new();
        registry.insert(submitted("https://x/a", "/d/a", 1)).unwrap();
        registry.insert(submitted("https://x/b", "/d/b", 2)).unwrap();
        registry.insert(submitted("https://x/a", "/d/a2", 3)).unwrap();

        let removed = registry.remove_by_uri("https://x/a");

        let ids: Vec<_> = removed.iter().filter_map(DownloadRecord::transfer_id).collect();
        assert_eq!(ids, vec![TransferId::new(1), TransferId::new(3)]);
        assert_eq!(registry.active_ids(), vec![TransferId::new(2)]);
    }

    #[test]
    fn pause_moves_records_and_clears_ids() {
        let mut registry = DownloadRegistry::new();
        registry.insert(submitted("https://x/b", "/d/b", 5)).unwrap();
        registry.insert(submitted("https://x/a", "/d/a", 4)).unwrap();

        let ids = registry.pause_active();

        assert_eq!(ids, vec![TransferId::new(4), TransferId::new(5)]);
        assert!(registry.is_idle());
        assert_eq!(registry.paused_len(), 2);

        let paused = registry.take_paused();
        assert_eq!(paused[0].source_uri(), "https://x/a");
        assert_eq!(paused[1].source_uri(), "https://x/b");
        assert!(paused.iter().all(|r| r.transfer_id().is_none()));
        assert_eq!(registry.paused_len(), 0);
    }

    #[test]
    fn snapshot_lists_active_and_paused() {
        let mut registry = DownloadRegistry::new();
        registry.insert(submitted("https://x/a", "/d/a", 1)).unwrap();
        registry.pause_active();
        registry.insert(submitted("https://x/b", "/d/b", 2)).unwrap();

        let snapshot = registry.snapshot();

        assert!(snapshot.is_active("https://x/b"));
        assert!(!snapshot.is_active("https://x/a"));
        assert_eq!(snapshot.paused.len(), 1);
        assert_eq!(snapshot.paused[0].transfer_id, None);
        assert_eq!(registry.clear_paused(), 1);
    }

    #[test]
    fn drain_active_empties_registry() {
        let mut registry = DownloadRegistry::new();
        registry.insert(submitted("https://x/a", "/d/a", 1)).unwrap();
        registry.insert(submitted("https://x/b", "/d/b", 2)).unwrap();

        let drained = registry.drain_active();

        assert_eq!(drained.len(), 2);
        assert!(registry.is_idle());
    }
}
