//! Conversation History
//!
//! Append-only, size-bounded log of conversation entries for one session.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;

use crate::domain::entities::ConversationEntry;
use crate::domain::value_objects::UserInput;

/// Default number of retained entries
pub const DEFAULT_MAX_HISTORY: usize = 50;

/// Bounded conversation log, oldest first
///
/// Length never exceeds `max_history`. Eviction only happens on
/// [`append`](Self::append); retrieval never mutates.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    entries: VecDeque<ConversationEntry>,
    max_history: usize,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl ConversationStore {
    pub fn new(max_history: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_history.min(DEFAULT_MAX_HISTORY)),
            max_history,
        }
    }

    /// Append an entry, dropping the oldest ones beyond `max_history`
    pub fn append(
        &mut self,
        user_input: UserInput,
        response: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        self.entries
            .push_back(ConversationEntry::new(user_input, response, now));
        while self.entries.len() > self.max_history {
            self.entries.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Entries in reverse insertion order
    pub fn newest_first(&self) -> Vec<&ConversationEntry> {
        self.entries.iter().rev().collect()
    }

    /// Newest-first entries whose input or response contains `term`
    /// (case-insensitive). An empty term matches everything.
    pub fn filter(&self, term: &str) -> Vec<&ConversationEntry> {
        self.filter_numbered(term)
            .into_iter()
            .map(|(_, entry)| entry)
            .collect()
    }

    /// Same as [`filter`](Self::filter), paired with each entry's 1-based
    /// position in insertion order among the stored entries
    pub fn filter_numbered(&self, term: &str) -> Vec<(usize, &ConversationEntry)> {
        let needle = term.to_lowercase();
        self.entries
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, entry)| needle.is_empty() || entry.contains_lowercase(&needle))
            .map(|(index, entry)| (index + 1, entry))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn t(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 5, 12, 0, 0).unwrap() + TimeDelta::seconds(n)
    }

    fn input(text: &str) -> UserInput {
        UserInput::new(text).unwrap()
    }

    fn filled(count: usize, max_history: usize) -> ConversationStore {
        let mut store = ConversationStore::new(max_history);
        for i in 0..count {
            store.append(input(&format!("question {i}")), format!("answer {i}"), t(i as i64));
        }
        store
    }

    #[test]
    fn test_append_evicts_oldest() {
        let store = filled(53, 50);
        assert_eq!(store.len(), 50);

        let newest = store.newest_first();
        assert_eq!(newest[0].user_input(), "question 52");
        assert_eq!(newest[49].user_input(), "question 3");
        assert!(store.filter("question 0").is_empty());
    }

    #[test]
    fn test_length_never_exceeds_max() {
        let mut store = ConversationStore::new(3);
        for i in 0..10 {
            store.append(input("q"), "a", t(i));
            assert!(store.len() <= 3);
        }
    }

    #[test]
    fn test_newest_first_reversal_is_insertion_order() {
        let store = filled(5, 50);
        let mut entries = store.newest_first();
        entries.reverse();
        let inputs: Vec<&str> = entries.iter().map(|e| e.user_input()).collect();
        assert_eq!(
            inputs,
            vec!["question 0", "question 1", "question 2", "question 3", "question 4"]
        );
    }

    #[test]
    fn test_filter() {
        let mut store = ConversationStore::default();
        store.append(input("How do lifetimes work?"), "They track borrows.", t(0));
        store.append(input("What is tokio?"), "An async runtime for Rust.", t(1));
        store.append(input("Explain RUST traits"), "Traits define shared behavior.", t(2));

        let hits = store.filter("rust");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].user_input(), "Explain RUST traits");
        assert_eq!(hits[1].user_input(), "What is tokio?");

        assert_eq!(store.filter("").len(), 3);
        let numbered = store.filter_numbered("rust");
        assert_eq!(numbered[0].0, 3);
        assert_eq!(numbered[1].0, 2);
        assert!(store.filter("xyz-no-match").is_empty());
    }

    #[test]
    fn test_retrieval_does_not_mutate() {
        let store = filled(3, 50);
        let _ = store.filter("question");
        let _ = store.newest_first();
        assert_eq!(store.len(), 3);
        assert_eq!(store.newest_first()[0].user_input(), "question 2");
    }

    #[test]
    fn test_clear() {
        let mut store = filled(3, 50);
        store.clear();
        assert!(store.is_empty());
        assert!(store.filter("").is_empty());
    }
}
