//! Ledger data model
//!
//! Pure data shapes for a savings circle: the `Cycle` aggregate, its
//! `Member`s, and the per-month `Contribution` records. All mutation lives
//! in `tracker`/`engine`; operations there take a cycle and return a whole
//! new cycle value, so a caller never observes a partially applied update.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Share of every recorded payment credited to the cycle's savings fund.
pub const SAVINGS_RATE: f64 = 0.20;

/// Opaque unique identifier for a member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(Uuid);

impl MemberId {
    /// Generate a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MemberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MemberId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Opaque unique identifier for a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CycleId(Uuid);

impl CycleId {
    /// Generate a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CycleId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CycleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CycleId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Payment state of a single contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    /// Due but not yet paid; the month has not been finalized.
    Pending,
    /// Paid; `payment_date` and `amount_paid` are set.
    Paid,
    /// Left unpaid past finalization of its month.
    Overdue,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Overdue => "Overdue",
        };
        write!(f, "{s}")
    }
}

/// Joining-rule mode for a cycle.
///
/// `Strict` forbids joining after month 1; `Flexible` allows joining any
/// time for the configured joining fee. Enforced by the calling layer, not
/// by `engine::add_member` itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleType {
    /// Membership is fixed after the first month.
    Strict,
    /// Members may join mid-cycle by paying the joining fee.
    Flexible,
}

/// A participant in a cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    /// Unique id, stable across edits.
    pub id: MemberId,
    /// Display name.
    pub name: String,
    /// Avatar reference (URL or data reference); presentation only.
    pub avatar_url: String,
    /// Month number (1-based) in which the member joined.
    pub join_month: u32,
    /// Human-readable label for the joining period, e.g. "Month 3".
    pub joining_month_name: String,
    /// One-time premium paid on joining (zero for founding members).
    pub joining_fee_paid: f64,
}

impl Member {
    /// Create a founding member, present from month 1 with no premium.
    #[must_use]
    pub fn founding(name: &str, avatar_url: &str) -> Self {
        Self {
            id: MemberId::new(),
            name: name.to_string(),
            avatar_url: avatar_url.to_string(),
            join_month: 1,
            joining_month_name: "Month 1".to_string(),
            joining_fee_paid: 0.0,
        }
    }
}

/// One member's payment record for one month.
///
/// Invariant: `payment_date` and `amount_paid` are `Some` iff
/// `status == Paid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    /// The owing member.
    pub member_id: MemberId,
    /// Current payment state.
    pub status: PaymentStatus,
    /// When the payment was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<DateTime<Utc>>,
    /// Amount actually paid, which may differ from the standard amount.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_paid: Option<f64>,
}

impl Contribution {
    /// A fresh, unpaid contribution for the given member.
    #[must_use]
    pub const fn pending(member_id: MemberId) -> Self {
        Self {
            member_id,
            status: PaymentStatus::Pending,
            payment_date: None,
            amount_paid: None,
        }
    }
}

/// One collection period of a cycle, with a single payout slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Month {
    /// 1-based position within the cycle.
    pub month: u32,
    /// Recipient of this month's pooled payout; `None` until finalized
    /// (or when no eligible member remained).
    pub payout_member_id: Option<MemberId>,
    /// Amount actually disbursed; `None` until finalized.
    pub payout_amount: Option<f64>,
    /// One record per member active in or before this month.
    pub contributions: Vec<Contribution>,
}

impl Month {
    /// An open month with a pending contribution for every given member.
    #[must_use]
    pub fn open(month: u32, member_ids: &[MemberId]) -> Self {
        Self {
            month,
            payout_member_id: None,
            payout_amount: None,
            contributions: member_ids
                .iter()
                .map(|id| Contribution::pending(*id))
                .collect(),
        }
    }

    /// Look up a member's contribution record in this month.
    #[must_use]
    pub fn contribution(&self, member_id: MemberId) -> Option<&Contribution> {
        self.contributions.iter().find(|c| c.member_id == member_id)
    }
}

/// The aggregate root: one full rotation of contributions and payouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    /// Unique id.
    pub id: CycleId,
    /// Display name.
    pub name: String,
    /// Members, in joining order.
    pub members: Vec<Member>,
    /// Fixed per-period contribution amount.
    pub contribution_amount: f64,
    /// 1-based pointer to the month currently collecting. Ranges over
    /// `1..=cycle_length + 1`; the latter means the cycle is complete.
    pub current_month: u32,
    /// The schedule, one month per payout slot. Equal in length to
    /// `cycle_length` except transiently inside an engine operation.
    pub months: Vec<Month>,
    /// Joining-rule mode.
    pub rule_type: RuleType,
    /// Fee charged to members joining mid-cycle.
    pub joining_fee: f64,
    /// Number of payout slots; always the member count.
    pub cycle_length: u32,
    /// Soft-disabled once the rotation is done and closed out.
    pub archived: bool,
    /// Accumulated side-pool, credited 20% of every recorded payment.
    /// Adjusted additively by the tracker, never edited directly.
    pub savings_fund: f64,
}

impl Cycle {
    /// Create a cycle from its founding members: one month per member,
    /// every contribution pending, collection starting at month 1.
    #[must_use]
    pub fn new(
        name: &str,
        members: Vec<Member>,
        contribution_amount: f64,
        joining_fee: f64,
        rule_type: RuleType,
    ) -> Self {
        let member_ids: Vec<MemberId> = members.iter().map(|m| m.id).collect();
        let cycle_length = members.len() as u32;
        let months = (1..=cycle_length)
            .map(|n| Month::open(n, &member_ids))
            .collect();

        Self {
            id: CycleId::new(),
            name: name.to_string(),
            members,
            contribution_amount,
            current_month: 1,
            months,
            rule_type,
            joining_fee,
            cycle_length,
            archived: false,
            savings_fund: 0.0,
        }
    }

    /// Whether every payout slot has been finalized.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.current_month > self.cycle_length
    }

    /// Look up a month by its 1-based number.
    #[must_use]
    pub fn month(&self, number: u32) -> Option<&Month> {
        self.months.iter().find(|m| m.month == number)
    }

    /// The month currently collecting, if the cycle is not complete.
    #[must_use]
    pub fn current_month_record(&self) -> Option<&Month> {
        self.month(self.current_month)
    }

    /// Look up a member by id.
    #[must_use]
    pub fn member(&self, member_id: MemberId) -> Option<&Member> {
        self.members.iter().find(|m| m.id == member_id)
    }

    /// Find a member by display name (exact match), for CLI convenience.
    #[must_use]
    pub fn member_by_name(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }
}
