//! Operation journaling
//!
//! Append-only JSONL history of committed ledger operations.

pub mod journal;

pub use journal::{Journal, JournalAction, JournalEntry};
