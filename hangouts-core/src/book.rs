//! Peer-keyed hangout book.
//!
//! Storage holds the relationship list as a JSON array. In memory it is a map
//! keyed by peer username that remembers insertion order, so that a
//! replace-by-key never moves a peer and a new peer lands at the end.

use hangouts_types::Hangout;
use std::collections::HashMap;

/// Relationship list keyed by peer username.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HangoutBook {
    /// Peer usernames in first-seen order.
    order: Vec<String>,
    /// Records by peer username.
    entries: HashMap<String, Hangout>,
}

impl HangoutBook {
    /// Create an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a book from the stored array.
    ///
    /// A peer that appears twice keeps its first position and its last record.
    pub fn from_vec(hangouts: Vec<Hangout>) -> Self {
        let mut book = Self::new();
        for hangout in hangouts {
            book.upsert(hangout);
        }
        book
    }

    /// Replace the record for this peer if present, else append it.
    ///
    /// Returns the record that was replaced.
    pub fn upsert(&mut self, hangout: Hangout) -> Option<Hangout> {
        let key = hangout.username.clone();
        let previous = self.entries.insert(key.clone(), hangout);
        if previous.is_none() {
            self.order.push(key);
        }
        previous
    }

    /// Look up a peer's record.
    pub fn get(&self, username: &str) -> Option<&Hangout> {
        self.entries.get(username)
    }

    /// Look up a peer's record for in-place mutation.
    pub fn get_mut(&mut self, username: &str) -> Option<&mut Hangout> {
        self.entries.get_mut(username)
    }

    /// Check if a peer has a record.
    pub fn contains(&self, username: &str) -> bool {
        self.entries.contains_key(username)
    }

    /// Number of peers.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the book is empty.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Records in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &Hangout> {
        self.order.iter().filter_map(|key| self.entries.get(key))
    }

    /// Records whose username contains `needle`, ignoring case.
    ///
    /// An empty needle matches everything.
    pub fn search(&self, needle: &str) -> Vec<Hangout> {
        let needle = needle.to_lowercase();
        self.iter()
            .filter(|h| h.username.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }

    /// Serialize back to the stored array shape.
    pub fn to_vec(&self) -> Vec<Hangout> {
        self.iter().cloned().collect()
    }

    /// Consume into the stored array shape.
    pub fn into_vec(mut self) -> Vec<Hangout> {
        self.order
            .iter()
            .filter_map(|key| self.entries.remove(key))
            .collect()
    }
}
