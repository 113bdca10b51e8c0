//! Client-side cached metric storage.
//!
//! One snapshot per source, replaced wholesale when a harvest lands: readers
//! always observe either the previous snapshot or the new one, never a
//! half-replaced dataset. Each source has a single writer (the harvest that
//! produced it), so the store needs no coordination beyond the atomic slot
//! swap.
//!
//! [`ViewState`] carries the per-view generation counter used to discard
//! stale in-flight harvests: winners are decided by filter-state identity,
//! not by completion order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;

use crate::models::{CanonicalMetric, Completeness, MetricSource};

/// One source's dataset plus the advisory completeness that produced it.
/// `None` completeness means the source does not harvest (keyword exports).
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub records: Vec<CanonicalMetric>,
    pub completeness: Option<Completeness>,
}

#[derive(Default)]
pub struct MetricStore {
    snapshots: DashMap<MetricSource, Arc<Snapshot>>,
}

impl MetricStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replace the source's snapshot.
    pub fn replace(&self, source: MetricSource, snapshot: Snapshot) {
        self.snapshots.insert(source, Arc::new(snapshot));
    }

    pub fn get(&self, source: MetricSource) -> Option<Arc<Snapshot>> {
        self.snapshots.get(&source).map(|entry| Arc::clone(&entry))
    }

    /// Concatenated records across sources, search console first, for
    /// merged aggregation passes.
    pub fn merged(&self) -> Vec<CanonicalMetric> {
        let mut records = Vec::new();
        for source in [MetricSource::SearchConsole, MetricSource::Ahrefs] {
            if let Some(snapshot) = self.get(source) {
                records.extend(snapshot.records.iter().cloned());
            }
        }
        records
    }
}

/// Generation counter for one view (overview, table, or chart). A harvest
/// captures a generation when the triggering filter state is read; by commit
/// time a newer filter state may have superseded it, in which case the
/// result is discarded regardless of arrival order.
#[derive(Debug, Default)]
pub struct ViewState {
    generation: AtomicU64,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new filter state; invalidates every earlier generation.
    pub fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Whether a harvest begun at `generation` may still commit.
    pub fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Commit `snapshot` into the store iff `generation` is still current.
    /// Returns whether the commit was applied.
    pub fn try_commit(
        &self,
        generation: u64,
        store: &MetricStore,
        source: MetricSource,
        snapshot: Snapshot,
    ) -> bool {
        if !self.is_current(generation) {
            return false;
        }
        store.replace(source, snapshot);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(query: &str) -> CanonicalMetric {
        CanonicalMetric {
            date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            source: MetricSource::SearchConsole,
            query: query.to_string(),
            url: None,
            clicks: Some(1),
            impressions: Some(10),
            ctr: Some(0.1),
            position: 5.0,
            volume: None,
            difficulty: None,
            cost_per_click: None,
            traffic: None,
            serp_features: None,
            previous_traffic: None,
            previous_position: None,
            previous_date: None,
        }
    }

    fn snapshot(queries: &[&str]) -> Snapshot {
        Snapshot {
            records: queries.iter().map(|q| record(q)).collect(),
            completeness: Some(Completeness::default()),
        }
    }

    #[test]
    fn test_replace_swaps_whole_snapshot() {
        let store = MetricStore::new();
        store.replace(MetricSource::SearchConsole, snapshot(&["a", "b"]));
        store.replace(MetricSource::SearchConsole, snapshot(&["c"]));

        let current = store.get(MetricSource::SearchConsole).unwrap();
        assert_eq!(current.records.len(), 1);
        assert_eq!(current.records[0].query, "c");
    }

    #[test]
    fn test_readers_keep_their_snapshot_across_replacement() {
        let store = MetricStore::new();
        store.replace(MetricSource::SearchConsole, snapshot(&["a", "b"]));
        let held = store.get(MetricSource::SearchConsole).unwrap();

        store.replace(MetricSource::SearchConsole, snapshot(&["c"]));
        assert_eq!(held.records.len(), 2);
    }

    #[test]
    fn test_stale_generation_cannot_commit() {
        let store = MetricStore::new();
        let view = ViewState::new();

        let first = view.begin();
        let second = view.begin();

        // The second filter state commits first; the first call's result
        // arrives later and must be dropped even though it is "newer" by
        // arrival order.
        assert!(view.try_commit(second, &store, MetricSource::SearchConsole, snapshot(&["new"])));
        assert!(!view.try_commit(first, &store, MetricSource::SearchConsole, snapshot(&["stale"])));

        let current = store.get(MetricSource::SearchConsole).unwrap();
        assert_eq!(current.records[0].query, "new");
    }

    #[test]
    fn test_merged_concatenates_sources() {
        let store = MetricStore::new();
        store.replace(MetricSource::SearchConsole, snapshot(&["a"]));
        let mut ahrefs_snapshot = snapshot(&["b"]);
        for record in &mut ahrefs_snapshot.records {
            record.source = MetricSource::Ahrefs;
        }
        ahrefs_snapshot.completeness = None;
        store.replace(MetricSource::Ahrefs, ahrefs_snapshot);

        let merged = store.merged();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].source, MetricSource::SearchConsole);
        assert_eq!(merged[1].source, MetricSource::Ahrefs);
    }
}
