//! Contribution tracker
//!
//! Records and corrects per-member, per-month payments, keeping the
//! savings fund in step with what was actually paid, and answers the
//! derived queries the dashboards need. Every mutation returns a whole
//! new `Cycle`; a missing month or member id is a silent no-op.

use chrono::{DateTime, Utc};

use crate::cycle::model::{Cycle, Member, MemberId, PaymentStatus, SAVINGS_RATE};

/// Record a member's payment for a month: the contribution becomes `Paid`,
/// stamped with the current time and the amount handed over, and 20% of
/// the amount is credited to the savings fund.
///
/// Re-recording an already-paid contribution is a no-op, so duplicate
/// "mark paid" calls cannot double-count the fund.
#[must_use]
pub fn record_payment(cycle: &Cycle, month_number: u32, member_id: MemberId, amount: f64) -> Cycle {
    let Some(month) = cycle.month(month_number) else {
        return cycle.clone();
    };
    let Some(contribution) = month.contribution(member_id) else {
        return cycle.clone();
    };
    if contribution.status == PaymentStatus::Paid {
        return cycle.clone();
    }

    let mut next = cycle.clone();
    next.savings_fund += amount * SAVINGS_RATE;
    for month in &mut next.months {
        if month.month != month_number {
            continue;
        }
        for c in &mut month.contributions {
            if c.member_id == member_id {
                c.status = PaymentStatus::Paid;
                c.payment_date = Some(Utc::now());
                c.amount_paid = Some(amount);
            }
        }
    }
    next
}

/// Administrative override: move a contribution to any status, past or
/// present. This is the only path for correcting history.
///
/// Moving into `Paid` requires an amount (the cycle's standard amount when
/// omitted) and stamps a payment date if none is supplied or already
/// present. Moving out of `Paid` clears both date and amount. The savings
/// fund is adjusted by the 20% *difference* between the new and previous
/// amounts, so corrections never require re-deriving the fund.
///
/// Whether a month is still editable is the caller's rule, not enforced
/// here.
#[must_use]
pub fn edit_contribution(
    cycle: &Cycle,
    month_number: u32,
    member_id: MemberId,
    new_status: PaymentStatus,
    payment_date: Option<DateTime<Utc>>,
    amount_paid: Option<f64>,
) -> Cycle {
    let Some(month) = cycle.month(month_number) else {
        return cycle.clone();
    };
    let Some(original) = month.contribution(member_id) else {
        return cycle.clone();
    };

    let is_paid = new_status == PaymentStatus::Paid;
    let original_amount = original.amount_paid.unwrap_or(0.0);
    let new_amount = if is_paid {
        amount_paid.unwrap_or(cycle.contribution_amount)
    } else {
        0.0
    };
    let fund_adjustment = (new_amount - original_amount) * SAVINGS_RATE;

    let mut next = cycle.clone();
    next.savings_fund += fund_adjustment;
    for month in &mut next.months {
        if month.month != month_number {
            continue;
        }
        for c in &mut month.contributions {
            if c.member_id != member_id {
                continue;
            }
            c.status = new_status;
            if is_paid {
                c.amount_paid = Some(new_amount);
                c.payment_date = payment_date.or(c.payment_date).or_else(|| Some(Utc::now()));
            } else {
                c.amount_paid = None;
                c.payment_date = None;
            }
        }
    }
    next
}

/// Total a member has contributed across all months up to and including
/// the current one. Sums `amount_paid` of `Paid` contributions, falling
/// back to the standard amount for legacy paid records without one.
#[must_use]
pub fn total_contributed(cycle: &Cycle, member_id: MemberId) -> f64 {
    cycle
        .months
        .iter()
        .filter(|m| m.month <= cycle.current_month)
        .filter_map(|m| m.contribution(member_id))
        .filter(|c| c.status == PaymentStatus::Paid)
        .map(|c| c.amount_paid.unwrap_or(cycle.contribution_amount))
        .sum()
}

/// Whether the member received a payout in a strictly earlier month.
#[must_use]
pub fn has_received_payout(cycle: &Cycle, member_id: MemberId) -> bool {
    cycle
        .months
        .iter()
        .any(|m| m.month < cycle.current_month && m.payout_member_id == Some(member_id))
}

/// The member's current-month status as the dashboards present it: a
/// `Pending` contribution is promoted to `Overdue` while the member has an
/// overdue record in any earlier month. Computed, never stored.
#[must_use]
pub fn effective_status(cycle: &Cycle, member_id: MemberId) -> PaymentStatus {
    let status = cycle
        .current_month_record()
        .and_then(|m| m.contribution(member_id))
        .map_or(PaymentStatus::Pending, |c| c.status);

    if status != PaymentStatus::Pending {
        return status;
    }

    let chronically_overdue = cycle.months.iter().any(|m| {
        m.month < cycle.current_month
            && m.contributions
                .iter()
                .any(|c| c.member_id == member_id && c.status == PaymentStatus::Overdue)
    });
    if chronically_overdue {
        PaymentStatus::Overdue
    } else {
        status
    }
}

/// Collection progress of one month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthProgress {
    /// Sum of amounts actually paid so far.
    pub collected: f64,
    /// Number of contributions marked paid.
    pub paid: usize,
    /// Total contributions due in the month.
    pub total: usize,
}

impl MonthProgress {
    /// Whether every contribution in the month has been paid.
    #[must_use]
    pub const fn fully_paid(&self) -> bool {
        self.paid == self.total
    }

    /// Suggested payout: what was collected less the 20% savings cut.
    #[must_use]
    pub fn suggested_payout(&self) -> f64 {
        self.collected * (1.0 - SAVINGS_RATE)
    }
}

/// How far along a month's collection is. Months with no record report
/// zero progress.
#[must_use]
pub fn month_progress(cycle: &Cycle, month_number: u32) -> MonthProgress {
    cycle.month(month_number).map_or(
        MonthProgress {
            collected: 0.0,
            paid: 0,
            total: 0,
        },
        |month| {
            let paid: Vec<_> = month
                .contributions
                .iter()
                .filter(|c| c.status == PaymentStatus::Paid)
                .collect();
            MonthProgress {
                collected: paid.iter().map(|c| c.amount_paid.unwrap_or(0.0)).sum(),
                paid: paid.len(),
                total: month.contributions.len(),
            }
        },
    )
}

/// A member's whole-cycle position, for the completion summary.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberSummary {
    /// The member's id.
    pub member_id: MemberId,
    /// Display name at summary time.
    pub name: String,
    /// Everything the member put in across the whole schedule. Counts any
    /// contribution record they hold, amount or standard fallback, since a
    /// completed cycle has squared everyone up.
    pub total_contributions: f64,
    /// The payout they took home (zero if their month disbursed nothing).
    pub payout_received: f64,
    /// One-time premium paid on joining late.
    pub joining_fee_paid: f64,
}

/// Per-member totals over the full schedule, in member order.
#[must_use]
pub fn completion_summary(cycle: &Cycle) -> Vec<MemberSummary> {
    cycle.members.iter().map(|m| member_summary(cycle, m)).collect()
}

fn member_summary(cycle: &Cycle, member: &Member) -> MemberSummary {
    let total_contributions = cycle
        .months
        .iter()
        .filter_map(|m| m.contribution(member.id))
        .map(|c| c.amount_paid.unwrap_or(cycle.contribution_amount))
        .sum();

    let payout_received = cycle
        .months
        .iter()
        .find(|m| m.payout_member_id == Some(member.id))
        .and_then(|m| m.payout_amount)
        .unwrap_or(0.0);

    MemberSummary {
        member_id: member.id,
        name: member.name.clone(),
        total_contributions,
        payout_received,
        joining_fee_paid: member.joining_fee_paid,
    }
}
