//! Cycle domain
//!
//! The savings-circle ledger: data model, contribution tracking, payout
//! recipient selection, the lifecycle engine, and collection management.

pub mod config;
pub mod engine;
pub mod model;
pub mod registry;
pub mod selector;
pub mod tracker;
