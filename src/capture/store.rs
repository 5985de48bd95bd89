//! Capture store implementation
//!
//! This module keeps the append-only log of every Bot API call the mock
//! transport answered, and the queries tests assert against.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::{Map, Value};

use crate::models::{CallKind, RequestRecord};
use crate::utils::logging::log_captured_request;

/// How text queries compare the needle with message text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextMatch {
    #[default]
    CaseSensitive,
    CaseInsensitive,
}

impl TextMatch {
    pub fn from_case_sensitive(case_sensitive: bool) -> Self {
        if case_sensitive {
            TextMatch::CaseSensitive
        } else {
            TextMatch::CaseInsensitive
        }
    }

    fn matches(&self, haystack: &str, needle: &str) -> bool {
        match self {
            TextMatch::CaseSensitive => haystack.contains(needle),
            TextMatch::CaseInsensitive => haystack.to_lowercase().contains(&needle.to_lowercase()),
        }
    }
}

#[derive(Debug, Default)]
struct CaptureLog {
    records: Vec<RequestRecord>,
    next_sequence: u64,
}

/// Shared, insertion-ordered log of captured requests
///
/// Clones share the same log. Queries return owned snapshots, so no lock
/// outlives a call.
#[derive(Debug, Clone, Default)]
pub struct CaptureStore {
    log: Arc<Mutex<CaptureLog>>,
    text_match: TextMatch,
}

impl CaptureStore {
    /// Create an empty store with case-sensitive text matching
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with the given text matching mode
    pub fn with_text_match(text_match: TextMatch) -> Self {
        Self {
            log: Arc::default(),
            text_match,
        }
    }

    pub fn text_match(&self) -> TextMatch {
        self.text_match
    }

    fn lock(&self) -> MutexGuard<'_, CaptureLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a record and return a copy of it
    pub fn record(&self, kind: CallKind, params: Map<String, Value>, response: Value) -> RequestRecord {
        let mut log = self.lock();
        let sequence = log.next_sequence;
        log.next_sequence += 1;

        let record = RequestRecord::new(kind, params, sequence, response);
        log_captured_request(kind, record.chat_id(), sequence);
        log.records.push(record.clone());
        record
    }

    /// Records matching the optional kind and chat filters, in insertion order
    pub fn query(&self, kind: Option<CallKind>, chat_id: Option<i64>) -> Vec<RequestRecord> {
        self.lock()
            .records
            .iter()
            .filter(|record| kind.map_or(true, |kind| record.kind() == kind))
            .filter(|record| chat_id.map_or(true, |chat_id| record.chat_id() == Some(chat_id)))
            .cloned()
            .collect()
    }

    /// Most recent record of any kind, optionally within one chat
    pub fn last(&self, chat_id: Option<i64>) -> Option<RequestRecord> {
        self.lock()
            .records
            .iter()
            .rev()
            .find(|record| chat_id.map_or(true, |chat_id| record.chat_id() == Some(chat_id)))
            .cloned()
    }

    pub fn count(&self, kind: CallKind) -> usize {
        self.lock().records.iter().filter(|record| record.kind() == kind).count()
    }

    /// Whether any `sendMessage` text contains `needle`
    pub fn contains_text(&self, needle: &str, chat_id: Option<i64>) -> bool {
        self.sent_messages(chat_id)
            .iter()
            .filter_map(RequestRecord::text)
            .any(|text| self.text_match.matches(text, needle))
    }

    /// Drop every record and restart sequence numbering
    pub fn clear(&self) {
        let mut log = self.lock();
        log.records.clear();
        log.next_sequence = 0;
    }

    pub fn all(&self) -> Vec<RequestRecord> {
        self.lock().records.clone()
    }

    /// Records whose sequence is at least `sequence`
    pub fn since(&self, sequence: u64) -> Vec<RequestRecord> {
        self.lock()
            .records
            .iter()
            .filter(|record| record.sequence() >= sequence)
            .cloned()
            .collect()
    }

    /// Sequence number the next record will receive
    pub fn next_sequence(&self) -> u64 {
        self.lock().next_sequence
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    pub fn by_kind(&self, kind: CallKind) -> Vec<RequestRecord> {
        self.query(Some(kind), None)
    }

    pub fn sent_messages(&self, chat_id: Option<i64>) -> Vec<RequestRecord> {
        self.query(Some(CallKind::SendMessage), chat_id)
    }

    pub fn edited_messages(&self, chat_id: Option<i64>) -> Vec<RequestRecord> {
        self.query(Some(CallKind::EditMessageText), chat_id)
    }

    pub fn deleted_messages(&self, chat_id: Option<i64>) -> Vec<RequestRecord> {
        self.query(Some(CallKind::DeleteMessage), chat_id)
    }

    pub fn callback_answers(&self) -> Vec<RequestRecord> {
        self.query(Some(CallKind::AnswerCallbackQuery), None)
    }

    pub fn dice_sends(&self, chat_id: Option<i64>) -> Vec<RequestRecord> {
        self.query(Some(CallKind::SendDice), chat_id)
    }

    /// Last `sendMessage`, optionally within one chat
    pub fn last_message(&self, chat_id: Option<i64>) -> Option<RequestRecord> {
        self.sent_messages(chat_id).pop()
    }

    pub fn last_request(&self) -> Option<RequestRecord> {
        self.last(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn send_text(store: &CaptureStore, chat_id: i64, text: &str) -> RequestRecord {
        store.record(
            CallKind::SendMessage,
            params(json!({"chat_id": chat_id, "text": text})),
            json!({"message_id": 1}),
        )
    }

    #[test]
    fn test_query_keeps_insertion_order() {
        let store = CaptureStore::new();
        send_text(&store, 1, "first");
        store.record(CallKind::DeleteMessage, params(json!({"chat_id": 1, "message_id": 1})), json!(true));
        send_text(&store, 2, "second");
        send_text(&store, 1, "third");

        let texts: Vec<_> = store
            .query(Some(CallKind::SendMessage), None)
            .iter()
            .map(|record| record.text().unwrap().to_string())
            .collect();
        assert_eq!(texts, vec!["first", "second", "third"]);

        assert_eq!(store.query(None, None).len(), 4);
        assert_eq!(store.query(None, Some(1)).len(), 3);
        assert_eq!(store.query(Some(CallKind::SendMessage), Some(1)).len(), 2);
    }

    #[test]
    fn test_sequence_is_monotonic() {
        let store = CaptureStore::new();
        let a = send_text(&store, 1, "a");
        let b = send_text(&store, 1, "b");
        assert_eq!(a.sequence(), 0);
        assert_eq!(b.sequence(), 1);
        assert_eq!(store.next_sequence(), 2);
    }

    #[test]
    fn test_last_returns_none_when_empty() {
        let store = CaptureStore::new();
        assert!(store.last(None).is_none());
        assert!(store.last(Some(5)).is_none());
        assert!(store.last_message(None).is_none());
    }

    #[test]
    fn test_last_filters_by_chat() {
        let store = CaptureStore::new();
        send_text(&store, 1, "to one");
        send_text(&store, 2, "to two");
        assert_eq!(store.last(Some(1)).unwrap().text(), Some("to one"));
        assert_eq!(store.last(None).unwrap().text(), Some("to two"));
        assert_eq!(store.last_request().unwrap().text(), Some("to two"));
    }

    #[test]
    fn test_clear_is_idempotent_and_resets_sequence() {
        let store = CaptureStore::new();
        store.clear();
        assert!(store.query(None, None).is_empty());

        send_text(&store, 1, "hello");
        send_text(&store, 1, "again");
        store.clear();
        store.clear();

        assert!(store.query(None, None).is_empty());
        assert!(store.last(None).is_none());
        assert!(store.is_empty());
        assert_eq!(send_text(&store, 1, "fresh").sequence(), 0);
    }

    #[test]
    fn test_contains_text_case_sensitive_by_default() {
        let store = CaptureStore::new();
        send_text(&store, 1, "Welcome to the bot!");
        assert!(store.contains_text("Welcome", None));
        assert!(!store.contains_text("welcome", None));
        assert!(!store.contains_text("Welcome", Some(2)));
    }

    #[test]
    fn test_contains_text_case_insensitive_mode() {
        let store = CaptureStore::with_text_match(TextMatch::CaseInsensitive);
        send_text(&store, 1, "Welcome to the bot!");
        assert!(store.contains_text("WELCOME", Some(1)));
    }

    #[test]
    fn test_contains_text_ignores_other_kinds() {
        let store = CaptureStore::new();
        store.record(
            CallKind::EditMessageText,
            params(json!({"chat_id": 1, "message_id": 1, "text": "Edited"})),
            json!(true),
        );
        assert!(!store.contains_text("Edited", None));
        assert_eq!(store.edited_messages(Some(1)).len(), 1);
    }

    #[test]
    fn test_since_returns_tail() {
        let store = CaptureStore::new();
        send_text(&store, 1, "before");
        let mark = store.next_sequence();
        send_text(&store, 1, "after");
        let tail = store.since(mark);
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].text(), Some("after"));
    }

    #[test]
    fn test_clones_share_log() {
        let store = CaptureStore::new();
        let other = store.clone();
        send_text(&other, 1, "shared");
        assert_eq!(store.len(), 1);
        assert_eq!(store.count(CallKind::SendMessage), 1);
    }
}
