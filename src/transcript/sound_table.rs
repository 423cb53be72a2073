use std::collections::HashMap;

/// A single `key: value` sound prompt definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    pub value: String,
}

/// Ordered table of parsed sound prompts.
///
/// Keys keep the position of their first occurrence. Inserting a key that is
/// already present replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SoundTable {
    order: Vec<String>,
    values: HashMap<String, String>,
}

impl SoundTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value.
    ///
    /// Returns `true` when the key was already present.
    pub fn insert(&mut self, key: String, value: String) -> bool {
        match self.values.get_mut(&key) {
            Some(existing) => {
                *existing = value;
                true
            }
            None => {
                self.order.push(key.clone());
                self.values.insert(key, value);
                false
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|v| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Keys in first-occurrence order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|k| k.as_str())
    }

    /// `(key, value)` pairs in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .map(move |k| (k.as_str(), self.values[k].as_str()))
    }

    pub fn into_entries(mut self) -> Vec<Entry> {
        self.order
            .into_iter()
            .filter_map(|key| {
                let value = self.values.remove(&key)?;
                Some(Entry { key, value })
            })
            .collect()
    }
}
