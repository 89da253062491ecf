//! Shared test utilities
//!
//! Common fixtures used across test modules. Only compiled in test builds.

use crate::cycle::model::{Cycle, Member, RuleType};
use crate::cycle::tracker::record_payment;

/// Build a cycle named "Test Circle" with founding members of the given
/// names, the given standard contribution, joining fee 1000, strict rules.
#[must_use]
pub fn make_test_cycle(names: &[&str], contribution_amount: f64) -> Cycle {
    let members = names
        .iter()
        .map(|name| Member::founding(name, ""))
        .collect();
    Cycle::new("Test Circle", members, contribution_amount, 1000.0, RuleType::Strict)
}

/// Mark every member paid for the given month at the given amount.
#[must_use]
pub fn pay_month(cycle: &Cycle, month_number: u32, amount: f64) -> Cycle {
    let ids: Vec<_> = cycle.members.iter().map(|m| m.id).collect();
    let mut next = cycle.clone();
    for id in ids {
        next = record_payment(&next, month_number, id, amount);
    }
    next
}

/// Float comparison loose enough for money math accumulated over a cycle.
#[must_use]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
