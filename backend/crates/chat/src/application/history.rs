//! History Use Cases
//!
//! Read-only search over the session history, and explicit clearing.

use crate::application::session::SessionContext;
use crate::domain::entities::ConversationEntry;

/// Entry with its display number ("Conversation N", oldest = 1)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedEntry {
    pub number: usize,
    pub entry: ConversationEntry,
}

/// Result of a history search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryPage {
    /// Entries stored in the session (before filtering)
    pub total: usize,
    /// Entries matching the search, newest first
    pub matched: usize,
    pub entries: Vec<NumberedEntry>,
}

/// Newest-first entries matching `term`, capped at `limit` if given
///
/// Numbering follows insertion order over all stored entries, so a
/// filtered view keeps the numbers of the unfiltered one.
pub fn search_history(session: &SessionContext, term: &str, limit: Option<usize>) -> HistoryPage {
    let history = session.history();
    let total = history.len();

    let numbered: Vec<NumberedEntry> = history
        .filter_numbered(term)
        .into_iter()
        .map(|(number, entry)| NumberedEntry {
            number,
            entry: entry.clone(),
        })
        .collect();

    let matched = numbered.len();
    let entries = match limit {
        Some(limit) => numbered.into_iter().take(limit).collect(),
        None => numbered,
    };

    HistoryPage {
        total,
        matched,
        entries,
    }
}

/// Empty the session history unconditionally
pub fn clear_history(session: &mut SessionContext) {
    let cleared = session.history().len();
    session.history_mut().clear();
    tracing::info!(cleared, "Conversation history cleared");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::config::ChatConfig;
    use crate::domain::value_objects::UserInput;
    use chrono::Utc;

    fn session_with(inputs: &[&str]) -> SessionContext {
        let mut session = SessionContext::new(&ChatConfig::default(), Utc::now());
        for text in inputs {
            session.history_mut().append(
                UserInput::new(*text).unwrap(),
                format!("re: {text}"),
                Utc::now(),
            );
        }
        session
    }

    #[test]
    fn test_numbering_is_stable_under_filter() {
        let session = session_with(&["alpha", "beta", "alphabet"]);
        let page = search_history(&session, "ALPHA", None);

        assert_eq!(page.total, 3);
        assert_eq!(page.matched, 2);
        assert_eq!(page.entries[0].number, 3);
        assert_eq!(page.entries[0].entry.user_input(), "alphabet");
        assert_eq!(page.entries[1].number, 1);
        assert_eq!(page.entries[1].entry.user_input(), "alpha");
    }

    #[test]
    fn test_limit() {
        let session = session_with(&["a1", "a2", "a3", "a4", "a5", "a6"]);
        let page = search_history(&session, "", Some(5));
        assert_eq!(page.matched, 6);
        assert_eq!(page.entries.len(), 5);
        assert_eq!(page.entries[0].entry.user_input(), "a6");
    }

    #[test]
    fn test_no_match_is_empty_page() {
        let session = session_with(&["hello"]);
        let page = search_history(&session, "xyz-no-match", None);
        assert_eq!(page.total, 1);
        assert!(page.entries.is_empty());
    }

    #[test]
    fn test_clear_history() {
        let mut session = session_with(&["one", "two"]);
        clear_history(&mut session);
        assert_eq!(search_history(&session, "", None).total, 0);
    }
}
