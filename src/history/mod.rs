//! Per-subject conversation history
//!
//! Keeps the most recent exchanges for each subject in memory for the
//! lifetime of the process. Nothing is persisted.

mod exchange;
mod store;

pub use exchange::{Exchange, ImageRef};
pub use store::{DEFAULT_MAX_ENTRIES, HistorySnapshot, HistoryStore};
