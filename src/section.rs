use indexmap::IndexMap;

use crate::entry::Entry;

/// A named group of entries, kept in the order their keys first appeared.
///
/// Localized keys such as `Name[de]` are stored as distinct keys; no locale matching is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    entries: IndexMap<String, Entry>,
}

impl Section {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: IndexMap::with_capacity(16),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entries(&self) -> impl ExactSizeIterator<Item = &Entry> {
        self.entries.values()
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    /// Change the value of an existing entry, returning whether `key` was present.
    pub fn set_value(&mut self, key: &str, value: impl Into<String>) -> bool {
        let Some(entry) = self.entries.get_mut(key) else {
            return false;
        };

        entry.set_value(value);
        true
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store `entry` under its own key, returning the entry it replaced.
    ///
    /// A replaced key keeps its original position.
    pub fn insert(&mut self, entry: Entry) -> Option<Entry> {
        self.entries.insert(entry.key().to_owned(), entry)
    }

    pub fn remove(&mut self, key: &str) -> Option<Entry> {
        self.entries.shift_remove(key)
    }
}
