//! Tanda - rotating savings circle ledger
//!
//! Models a trust circle: a fixed group contributes a fixed amount each
//! month, one member takes the pooled payout, and the rotation ends once
//! everyone has been paid out exactly once. The core is a set of pure
//! state transitions over the [`cycle::model::Cycle`] value; the CLI in
//! `main.rs` is just one caller of that contract.

// Allow multiple crate versions from dependencies (can't easily control)
#![allow(clippy::multiple_crate_versions)]

pub mod cli;
pub mod cycle;
pub mod log;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export commonly used types
pub use cli::{render_month, CycleDisplay};
pub use cycle::config::CycleSeed;
pub use cycle::engine::{ArrearsPolicy, MemberEdit, Rejection};
pub use cycle::model::{Cycle, CycleId, Member, MemberId, Month, PaymentStatus, RuleType};
pub use cycle::registry::CycleRegistry;
pub use log::{Journal, JournalAction, JournalEntry};
