//! Cycle lifecycle engine
//!
//! Orchestrates the month state machine (collecting → finalized), member
//! joins and removals with retroactive ledger adjustment, and rule/fee
//! configuration. Every operation is a pure transform from the current
//! cycle value to the next one; refusals come back as [`Rejection`] so the
//! calling layer can show the user why nothing changed, and operations on
//! ids that don't exist return the input untouched.

use chrono::Utc;
use rand::Rng;
use thiserror::Error;

use crate::cycle::model::{
    Contribution, Cycle, Member, MemberId, Month, PaymentStatus, RuleType, SAVINGS_RATE,
};
use crate::cycle::selector;
use crate::cycle::tracker;

/// A refused operation. The cycle is left exactly as it was; the variant
/// tells the caller which rule blocked the request.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Rejection {
    /// The last remaining member cannot be removed.
    #[error("cannot remove the last remaining member")]
    LastMember,
    /// A member who already received their payout cannot be removed.
    #[error("a member who has already received their payout cannot be removed")]
    AlreadyPaidOut,
    /// The current month's payout recipient cannot be removed mid-month.
    #[error("cannot remove the member scheduled for the current month's payout")]
    CurrentRecipient,
    /// Joining fees must be non-negative finite numbers.
    #[error("invalid joining fee: {0}")]
    InvalidJoiningFee(f64),
    /// Names cannot be empty or all whitespace.
    #[error("name cannot be empty")]
    EmptyName,
    /// Finalization was refused while contributions were still unpaid.
    #[error("{0} contribution(s) in the current month are still pending")]
    OutstandingContributions(usize),
}

/// What to do with still-pending contributions at finalization time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrearsPolicy {
    /// Refuse to close the month while anything is unpaid.
    Refuse,
    /// Close the month and mark unpaid contributions overdue.
    MarkOverdue,
}

/// Finalize the current month and advance collection to the next one.
///
/// The recipient is drawn by the selector over the full payout history,
/// the month's payout fields are stamped with the drawn member and the
/// caller-supplied amount, and the month pointer moves forward. Once the
/// pointer passes the cycle length the rotation is complete and further
/// calls return the cycle unchanged.
///
/// With [`ArrearsPolicy::Refuse`] the month will not close while any
/// contribution is still pending; with [`ArrearsPolicy::MarkOverdue`]
/// those contributions become overdue instead, which is the boundary past
/// which unpaid dues count as delinquent.
pub fn advance_to_next_month(
    cycle: &Cycle,
    payout_amount: f64,
    arrears: ArrearsPolicy,
) -> Result<Cycle, Rejection> {
    advance_to_next_month_with(cycle, payout_amount, arrears, &mut rand::rng())
}

/// [`advance_to_next_month`] with an injected random source, for callers
/// that need a reproducible draw.
pub fn advance_to_next_month_with<R: Rng + ?Sized>(
    cycle: &Cycle,
    payout_amount: f64,
    arrears: ArrearsPolicy,
    rng: &mut R,
) -> Result<Cycle, Rejection> {
    let Some(current) = cycle.current_month_record() else {
        // Already complete; nothing left to finalize.
        return Ok(cycle.clone());
    };

    let pending = current
        .contributions
        .iter()
        .filter(|c| c.status == PaymentStatus::Pending)
        .count();
    if pending > 0 && arrears == ArrearsPolicy::Refuse {
        return Err(Rejection::OutstandingContributions(pending));
    }

    let recipient = selector::select_recipient_with(cycle, rng);

    let mut next = cycle.clone();
    let current_number = next.current_month;
    for month in &mut next.months {
        if month.month != current_number {
            continue;
        }
        month.payout_member_id = recipient;
        month.payout_amount = Some(payout_amount);
        for c in &mut month.contributions {
            if c.status == PaymentStatus::Pending {
                c.status = PaymentStatus::Overdue;
            }
        }
    }
    next.current_month += 1;
    Ok(next)
}

/// Admit a new member as of the current month.
///
/// The joiner is treated as having squared up for every elapsed period:
/// each month at or before the current one gets a paid contribution at the
/// standard amount stamped now, the savings fund is credited 20% of the
/// standard amount per elapsed period, and later months get a pending
/// record. One extra month is appended to the schedule since every member
/// needs a payout slot, growing the cycle length by one.
///
/// Whether the rule mode permits joining this late is the calling layer's
/// check, not enforced here.
pub fn add_member(
    cycle: &Cycle,
    name: &str,
    joining_amount: f64,
    avatar_url: Option<&str>,
) -> Result<Cycle, Rejection> {
    if name.trim().is_empty() {
        return Err(Rejection::EmptyName);
    }

    let member = Member {
        id: MemberId::new(),
        name: name.trim().to_string(),
        avatar_url: avatar_url.unwrap_or_default().to_string(),
        join_month: cycle.current_month,
        joining_month_name: format!("Month {}", cycle.current_month),
        joining_fee_paid: joining_amount,
    };
    let new_id = member.id;

    let mut next = cycle.clone();

    let elapsed_periods = f64::from(cycle.current_month);
    next.savings_fund += cycle.contribution_amount * SAVINGS_RATE * elapsed_periods;

    for month in &mut next.months {
        let contribution = if month.month <= cycle.current_month {
            Contribution {
                member_id: new_id,
                status: PaymentStatus::Paid,
                payment_date: Some(Utc::now()),
                amount_paid: Some(cycle.contribution_amount),
            }
        } else {
            Contribution::pending(new_id)
        };
        month.contributions.push(contribution);
    }

    next.members.push(member);
    let member_ids: Vec<MemberId> = next.members.iter().map(|m| m.id).collect();
    let appended_number = next.months.len() as u32 + 1;
    next.months.push(Month::open(appended_number, &member_ids));
    next.cycle_length = next.members.len() as u32;

    Ok(next)
}

/// Remove a member who has not yet been paid out.
///
/// Refused when they are the last member, already received a payout in an
/// earlier month, or hold the current month's payout slot. Otherwise their
/// contribution records are dropped from every month, any future payout
/// slot of theirs is unassigned again, and the schedule is shortened by
/// its trailing month so month count keeps matching member count.
pub fn remove_member(cycle: &Cycle, member_id: MemberId) -> Result<Cycle, Rejection> {
    if cycle.member(member_id).is_none() {
        return Ok(cycle.clone());
    }
    if cycle.members.len() <= 1 {
        return Err(Rejection::LastMember);
    }
    if tracker::has_received_payout(cycle, member_id) {
        return Err(Rejection::AlreadyPaidOut);
    }
    let is_current_recipient = cycle
        .months
        .iter()
        .any(|m| m.month == cycle.current_month && m.payout_member_id == Some(member_id));
    if is_current_recipient {
        return Err(Rejection::CurrentRecipient);
    }

    let mut next = cycle.clone();
    next.members.retain(|m| m.id != member_id);
    let new_length = next.members.len() as u32;

    for month in &mut next.months {
        if month.payout_member_id == Some(member_id) {
            // A future slot they held goes back to the pool, to be drawn
            // again when that month is finalized.
            month.payout_member_id = None;
        }
        month.contributions.retain(|c| c.member_id != member_id);
    }
    next.months.truncate(new_length as usize);
    next.cycle_length = new_length;

    Ok(next)
}

/// Switch the joining-rule mode. Pure configuration flip.
#[must_use]
pub fn set_rule_type(cycle: &Cycle, rule_type: RuleType) -> Cycle {
    let mut next = cycle.clone();
    next.rule_type = rule_type;
    next
}

/// Replace the fee charged to future joiners. Negative and non-finite
/// values are refused.
pub fn set_joining_fee(cycle: &Cycle, fee: f64) -> Result<Cycle, Rejection> {
    if !fee.is_finite() || fee < 0.0 {
        return Err(Rejection::InvalidJoiningFee(fee));
    }
    let mut next = cycle.clone();
    next.joining_fee = fee;
    Ok(next)
}

/// Metadata corrections applied by [`edit_member`]. `None` fields are left
/// as they were.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberEdit {
    /// New display name.
    pub name: Option<String>,
    /// New avatar reference.
    pub avatar_url: Option<String>,
    /// New joining-period label.
    pub joining_month_name: Option<String>,
}

/// Correct a member's display metadata in place. No ledger side effects;
/// an unknown id is a silent no-op.
pub fn edit_member(
    cycle: &Cycle,
    member_id: MemberId,
    edit: &MemberEdit,
) -> Result<Cycle, Rejection> {
    if let Some(name) = &edit.name {
        if name.trim().is_empty() {
            return Err(Rejection::EmptyName);
        }
    }
    let mut next = cycle.clone();
    for member in &mut next.members {
        if member.id != member_id {
            continue;
        }
        if let Some(name) = &edit.name {
            member.name = name.trim().to_string();
        }
        if let Some(avatar) = &edit.avatar_url {
            member.avatar_url = avatar.clone();
        }
        if let Some(label) = &edit.joining_month_name {
            member.joining_month_name = label.clone();
        }
    }
    Ok(next)
}
