//! CLI presentation helpers
//!
//! Terminal rendering for the `tanda` binary.

pub mod display;

pub use display::{render_month, CycleDisplay};
