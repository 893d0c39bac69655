//! Shared state for one pipeline run
//!
//! One `SharedState` is built per run from fully-resolved inputs and shared
//! by every worker through an `Arc`. Each table has exactly one write phase:
//!
//! | Table                                | Written in |
//! |--------------------------------------|------------|
//! | `raw_records`                        | ingest     |
//! | `id_frequency`, `title_frequency`    | count      |
//! | `clean_records`                      | filter     |
//! | `language_index`, `category_index`,  | aggregate  |
//! | `keyword_frequency`                  | aggregate  |
//!
//! Append targets are lock-protected vectors; keyed accumulators are sharded
//! `DashMap`s whose entry API makes each per-key update indivisible.

use crate::model::Article;
use crate::pipeline::cursor::PhaseCursor;
use crate::pipeline::Phase;
use dashmap::DashMap;
use parking_lot::{RwLock, RwLockReadGuard};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

/// Resolved inputs for a run
#[derive(Debug, Clone, Default)]
pub struct PipelineInputs {
    /// Article files, in manifest order
    pub files: Vec<PathBuf>,

    pub target_languages: HashSet<String>,

    pub target_categories: HashSet<String>,

    /// Tokens never counted as keywords
    pub excluded_words: HashSet<String>,
}

/// Concurrent append-only collection
#[derive(Debug)]
pub struct AppendLog<T> {
    items: RwLock<Vec<T>>,
}

impl<T> Default for AppendLog<T> {
    fn default() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
        }
    }
}

impl<T> AppendLog<T> {
    pub fn push(&self, item: T) {
        self.items.write().push(item);
    }

    /// Append a whole batch under one lock acquisition
    pub fn extend<I: IntoIterator<Item = T>>(&self, batch: I) {
        self.items.write().extend(batch);
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// Shared view for read-only phases
    pub fn read(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.items.read()
    }
}

/// Concurrent string -> count accumulator
#[derive(Debug, Default)]
pub struct FrequencyTable {
    counts: DashMap<String, usize>,
}

impl FrequencyTable {
    /// Add one occurrence of `key`
    pub fn increment(&self, key: &str) {
        // get_mut first to avoid allocating the key on the hot path
        if let Some(mut count) = self.counts.get_mut(key) {
            *count += 1;
            return;
        }
        *self.counts.entry(key.to_owned()).or_insert(0) += 1;
    }

    /// Occurrences of `key`, zero if never seen
    pub fn get(&self, key: &str) -> usize {
        self.counts.get(key).map(|c| *c).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Ordered copy of the table
    pub fn snapshot(&self) -> BTreeMap<String, usize> {
        self.counts
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect()
    }
}

/// Concurrent key -> id list accumulator
#[derive(Debug, Default)]
pub struct IdIndex {
    ids: DashMap<String, Vec<String>>,
}

impl IdIndex {
    pub fn append(&self, key: &str, id: &str) {
        if let Some(mut list) = self.ids.get_mut(key) {
            list.push(id.to_owned());
            return;
        }
        self.ids.entry(key.to_owned()).or_default().push(id.to_owned());
    }

    /// Ids recorded under `key`, sorted ascending
    pub fn sorted_ids(&self, key: &str) -> Option<Vec<String>> {
        self.ids.get(key).map(|list| {
            let mut ids = list.clone();
            ids.sort();
            ids
        })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ordered copy with every id list sorted
    pub fn snapshot(&self) -> BTreeMap<String, Vec<String>> {
        self.ids
            .iter()
            .map(|entry| {
                let mut ids = entry.value().clone();
                ids.sort();
                (entry.key().clone(), ids)
            })
            .collect()
    }
}

/// The process-wide context shared by all workers of a run
#[derive(Debug)]
pub struct SharedState {
    pub inputs: PipelineInputs,

    pub raw_records: AppendLog<Arc<Article>>,
    pub id_frequency: FrequencyTable,
    pub title_frequency: FrequencyTable,
    pub clean_records: AppendLog<Arc<Article>>,
    pub language_index: IdIndex,
    pub category_index: IdIndex,
    pub keyword_frequency: FrequencyTable,

    cursors: [PhaseCursor; 4],
}

impl SharedState {
    pub fn new(inputs: PipelineInputs) -> Self {
        Self {
            inputs,
            raw_records: AppendLog::default(),
            id_frequency: FrequencyTable::default(),
            title_frequency: FrequencyTable::default(),
            clean_records: AppendLog::default(),
            language_index: IdIndex::default(),
            category_index: IdIndex::default(),
            keyword_frequency: FrequencyTable::default(),
            cursors: Default::default(),
        }
    }

    /// Claim counter for `phase`
    pub fn cursor(&self, phase: Phase) -> &PhaseCursor {
        &self.cursors[phase.index()]
    }

    /// Upper bound of `phase`. Only stable once the previous phase's
    /// barrier has been crossed.
    pub fn phase_bound(&self, phase: Phase) -> usize {
        match phase {
            Phase::Ingest => self.inputs.files.len(),
            Phase::Count | Phase::Filter => self.raw_records.len(),
            Phase::Aggregate => self.clean_records.len(),
        }
    }

    /// Records dropped as duplicates
    pub fn duplicate_count(&self) -> usize {
        self.raw_records.len() - self.clean_records.len()
    }

    /// Clean records in no particular order
    pub fn clean_snapshot(&self) -> Vec<Arc<Article>> {
        self.clean_records.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_frequency_table_concurrent_increments() {
        let table = Arc::new(FrequencyTable::default());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let table = Arc::clone(&table);
                thread::spawn(move || {
                    for i in 0..1000 {
                        table.increment(if i % 2 == 0 { "even" } else { "odd" });
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(table.get("even"), 4000);
        assert_eq!(table.get("odd"), 4000);
        assert_eq!(table.get("missing"), 0);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_append_log_concurrent_pushes() {
        let log = Arc::new(AppendLog::default());

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let log = Arc::clone(&log);
                thread::spawn(move || {
                    for i in 0..250 {
                        log.push(t * 1000 + i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut items = log.read().clone();
        items.sort();
        items.dedup();
        assert_eq!(items.len(), 1000);
    }

    #[test]
    fn test_id_index_sorted_snapshot() {
        let index = IdIndex::default();
        index.append("sports", "b");
        index.append("sports", "a");
        index.append("news", "c");

        assert_eq!(index.sorted_ids("sports"), Some(vec!["a".into(), "b".into()]));
        assert_eq!(index.sorted_ids("weather"), None);

        let snapshot = index.snapshot();
        assert_eq!(snapshot.keys().collect::<Vec<_>>(), vec!["news", "sports"]);
    }

    #[test]
    fn test_phase_bounds_follow_tables() {
        let state = SharedState::new(PipelineInputs {
            files: vec![PathBuf::from("a.json"), PathBuf::from("b.json")],
            ..Default::default()
        });
        assert_eq!(state.phase_bound(Phase::Ingest), 2);
        assert_eq!(state.phase_bound(Phase::Count), 0);

        state.raw_records.push(Arc::new(Article::default()));
        assert_eq!(state.phase_bound(Phase::Filter), 1);
        assert_eq!(state.phase_bound(Phase::Aggregate), 0);
        assert_eq!(state.duplicate_count(), 1);
    }
}
