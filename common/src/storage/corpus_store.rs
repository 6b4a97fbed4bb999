use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::corpus_entry::CorpusEntry;

/// Corpus entries produced by one upload batch, keyed by position in that batch.
///
/// A store belongs to exactly one session. Entries are written once while the batch is
/// processed and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusStore {
    entries: BTreeMap<usize, CorpusEntry>,
}

impl CorpusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `entry` under `index`. An existing entry at that index is replaced and returned.
    pub fn put(&mut self, index: usize, entry: CorpusEntry) -> Option<CorpusEntry> {
        self.entries.insert(index, entry)
    }

    pub fn get(&self, index: usize) -> Option<&CorpusEntry> {
        self.entries.get(&index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending index order.
    pub fn entries(&self) -> impl Iterator<Item = &CorpusEntry> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(index: usize, text: &str) -> CorpusEntry {
        CorpusEntry::new(
            index,
            format!("notes_{index}.pdf"),
            text.to_string(),
            "## Summary".to_string(),
            "1. Question?".to_string(),
        )
    }

    #[test]
    fn get_returns_what_was_put() {
        let mut store = CorpusStore::new();
        assert!(store.put(0, entry(0, "Photosynthesis")).is_none());

        let stored = store.get(0).expect("entry should exist");
        assert_eq!(stored.full_text(), "Photosynthesis");
        assert_eq!(stored.file_name(), "notes_0.pdf");
    }

    #[test]
    fn missing_index_is_absent() {
        let mut store = CorpusStore::new();
        store.put(0, entry(0, "only one"));

        assert!(store.get(1).is_none());
        assert!(store.get(99).is_none());
    }

    #[test]
    fn last_write_wins() {
        let mut store = CorpusStore::new();
        store.put(2, entry(2, "first"));
        let previous = store.put(2, entry(2, "second"));

        assert_eq!(previous.map(|e| e.full_text().to_string()), Some("first".into()));
        assert_eq!(store.get(2).map(CorpusEntry::full_text), Some("second"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn sparse_indices_iterate_in_order() {
        let mut store = CorpusStore::new();
        store.put(3, entry(3, "c"));
        store.put(0, entry(0, "a"));

        let indices: Vec<usize> = store.entries().map(CorpusEntry::index).collect();
        assert_eq!(indices, vec![0, 3]);
        assert!(store.get(1).is_none());
    }

    #[test]
    fn survives_serialization_for_session_storage() {
        let mut store = CorpusStore::new();
        store.put(0, entry(0, "Light is converted to chemical energy."));

        let json = serde_json::to_string(&store).expect("serialize");
        let restored: CorpusStore = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(restored, store);
    }
}
