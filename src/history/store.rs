//! Bounded per-subject exchange log

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::Exchange;
use crate::Subject;

/// Default per-subject retention bound
pub const DEFAULT_MAX_ENTRIES: usize = 50;

type Log = VecDeque<Arc<Exchange>>;

/// In-memory history of exchanges, one bounded FIFO log per subject
///
/// Each subject has its own lock, so appends and reads on one subject never
/// contend with another. When a log grows past `max_entries` the oldest
/// exchanges are evicted.
#[derive(Debug)]
pub struct HistoryStore {
    max_entries: usize,
    logs: [Mutex<Log>; Subject::COUNT],
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl HistoryStore {
    /// Create an empty store retaining at most `max_entries` exchanges per subject
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            logs: std::array::from_fn(|_| Mutex::new(VecDeque::new())),
        }
    }

    /// Per-subject retention bound
    #[must_use]
    pub const fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Append an exchange to the tail of a subject's log, evicting from the head
    /// until the log is back within bounds
    pub fn append(&self, subject: Subject, exchange: Exchange) {
        let mut log = self.lock(subject);
        log.push_back(Arc::new(exchange));

        let mut evicted = 0usize;
        while log.len() > self.max_entries {
            log.pop_front();
            evicted += 1;
        }

        if evicted > 0 {
            tracing::trace!(%subject, evicted, "evicted oldest exchanges");
        }
    }

    /// The last `min(limit, len)` exchanges for a subject, oldest first
    #[must_use]
    pub fn recent(&self, subject: Subject, limit: usize) -> HistorySnapshot {
        if limit == 0 {
            return HistorySnapshot::default();
        }

        let log = self.lock(subject);
        let skip = log.len().saturating_sub(limit);
        HistorySnapshot {
            entries: log.iter().skip(skip).cloned().collect(),
        }
    }

    /// Like [`recent`](Self::recent), but keyed by a raw identifier
    ///
    /// Identifiers outside the subject set have no history, so they yield an
    /// empty snapshot rather than an error.
    #[must_use]
    pub fn recent_by_name(&self, subject: &str, limit: usize) -> HistorySnapshot {
        Subject::parse(subject).map_or_else(HistorySnapshot::default, |s| self.recent(s, limit))
    }

    /// Reset a subject's log, returning how many exchanges were dropped
    pub fn clear(&self, subject: Subject) -> usize {
        let mut log = self.lock(subject);
        let removed = log.len();
        log.clear();
        tracing::debug!(%subject, removed, "cleared history");
        removed
    }

    /// Like [`clear`](Self::clear), but keyed by a raw identifier; unknown subjects clear nothing
    pub fn clear_by_name(&self, subject: &str) -> usize {
        Subject::parse(subject).map_or(0, |s| self.clear(s))
    }

    /// Number of exchanges currently retained for a subject
    #[must_use]
    pub fn len(&self, subject: Subject) -> usize {
        self.lock(subject).len()
    }

    /// Whether a subject has no retained exchanges
    #[must_use]
    pub fn is_empty(&self, subject: Subject) -> bool {
        self.lock(subject).is_empty()
    }

    fn lock(&self, subject: Subject) -> MutexGuard<'_, Log> {
        // A panic while holding the lock cannot leave a log half-written:
        // every mutation is a single push/pop/clear.
        self.logs[slot(subject)]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

const fn slot(subject: Subject) -> usize {
    match subject {
        Subject::MathPhysics => 0,
        Subject::Chemistry => 1,
        Subject::ImageAnalysis => 2,
    }
}

/// Immutable point-in-time view of a subject's recent exchanges, oldest first
///
/// Iterating never touches the store, so a snapshot can be walked any number
/// of times and stays consistent while other requests append.
#[derive(Debug, Clone, Default)]
pub struct HistorySnapshot {
    entries: Vec<Arc<Exchange>>,
}

impl HistorySnapshot {
    /// Iterate exchanges oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Exchange> + ExactSizeIterator {
        self.entries.iter().map(|e| &**e)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent exchange in the snapshot
    #[must_use]
    pub fn last(&self) -> Option<&Exchange> {
        self.entries.last().map(|e| &**e)
    }
}

impl<'a> IntoIterator for &'a HistorySnapshot {
    type Item = &'a Arc<Exchange>;
    type IntoIter = std::slice::Iter<'a, Arc<Exchange>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions(snapshot: &HistorySnapshot) -> Vec<String> {
        snapshot.iter().map(|e| e.question.clone()).collect()
    }

    #[test]
    fn recent_returns_last_entries_in_order() {
        let store = HistoryStore::new(10);
        for i in 1..=3 {
            store.append(Subject::Chemistry, Exchange::new(format!("q{i}"), format!("a{i}")));
        }

        let snapshot = store.recent(Subject::Chemistry, 2);
        assert_eq!(questions(&snapshot), vec!["q2", "q3"]);
    }

    #[test]
    fn recent_with_zero_limit_is_empty() {
        let store = HistoryStore::new(10);
        store.append(Subject::MathPhysics, Exchange::new("q", "a"));
        assert!(store.recent(Subject::MathPhysics, 0).is_empty());
    }

    #[test]
    fn recent_limit_larger_than_log_returns_everything() {
        let store = HistoryStore::new(10);
        store.append(Subject::MathPhysics, Exchange::new("only", "one"));
        assert_eq!(store.recent(Subject::MathPhysics, 100).len(), 1);
    }

    #[test]
    fn append_evicts_oldest_first() {
        let store = HistoryStore::new(3);
        for i in 0..5 {
            store.append(Subject::MathPhysics, Exchange::new(format!("q{i}"), "a"));
        }

        assert_eq!(store.len(Subject::MathPhysics), 3);
        assert_eq!(
            questions(&store.recent(Subject::MathPhysics, 10)),
            vec!["q2", "q3", "q4"]
        );
    }

    #[test]
    fn subjects_are_isolated() {
        let store = HistoryStore::new(5);
        store.append(Subject::Chemistry, Exchange::new("acid?", "yes"));

        assert_eq!(store.len(Subject::Chemistry), 1);
        assert!(store.is_empty(Subject::MathPhysics));
        assert!(store.is_empty(Subject::ImageAnalysis));
    }

    #[test]
    fn unknown_names_read_and_clear_as_empty() {
        let store = HistoryStore::new(5);
        store.append(Subject::Chemistry, Exchange::new("q", "a"));

        assert!(store.recent_by_name("arabic", 5).is_empty());
        assert_eq!(store.clear_by_name("arabic"), 0);
        assert_eq!(store.recent_by_name("chemistry", 5).len(), 1);
    }

    #[test]
    fn clear_resets_one_subject() {
        let store = HistoryStore::new(5);
        store.append(Subject::Chemistry, Exchange::new("q1", "a1"));
        store.append(Subject::Chemistry, Exchange::new("q2", "a2"));
        store.append(Subject::MathPhysics, Exchange::new("q3", "a3"));

        assert_eq!(store.clear(Subject::Chemistry), 2);
        assert!(store.is_empty(Subject::Chemistry));
        assert_eq!(store.len(Subject::MathPhysics), 1);
    }

    #[test]
    fn snapshot_is_unaffected_by_later_appends() {
        let store = HistoryStore::new(5);
        store.append(Subject::ImageAnalysis, Exchange::new("q1", "a1"));
        let snapshot = store.recent(Subject::ImageAnalysis, 5);

        store.append(Subject::ImageAnalysis, Exchange::new("q2", "a2"));

        assert_eq!(questions(&snapshot), vec!["q1"]);
        // restartable
        assert_eq!(snapshot.iter().count(), 1);
        assert_eq!((&snapshot).into_iter().count(), 1);
        assert_eq!(snapshot.last().map(|e| e.answer.as_str()), Some("a1"));
    }
}
