//! Recipient selector
//!
//! Chooses which member receives a month's pooled payout when the month is
//! finalized. Eligibility is membership minus everyone already named as a
//! recipient anywhere in the schedule, so no member can be paid out twice
//! in one rotation. The draw itself is a uniform random permutation;
//! callers that need determinism inject their own `Rng`.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::cycle::model::{Cycle, MemberId};

/// Members who have never held a payout slot in any month of the cycle,
/// in member order.
#[must_use]
pub fn eligible_members(cycle: &Cycle) -> Vec<MemberId> {
    cycle
        .members
        .iter()
        .map(|m| m.id)
        .filter(|id| {
            !cycle
                .months
                .iter()
                .any(|month| month.payout_member_id == Some(*id))
        })
        .collect()
}

/// Draw this month's recipient from the eligible set using the given
/// random source. Returns `None` when every member has already been paid
/// out, which is the terminal condition of the rotation.
pub fn select_recipient_with<R: Rng + ?Sized>(cycle: &Cycle, rng: &mut R) -> Option<MemberId> {
    let mut eligible = eligible_members(cycle);
    eligible.shuffle(rng);
    eligible.first().copied()
}

/// [`select_recipient_with`] using the thread-local random source.
#[must_use]
pub fn select_recipient(cycle: &Cycle) -> Option<MemberId> {
    select_recipient_with(cycle, &mut rand::rng())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::make_test_cycle;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_all_members_eligible_before_any_payout() {
        let cycle = make_test_cycle(&["Alice", "Bob", "Charlie"], 1000.0);
        let ids: Vec<_> = cycle.members.iter().map(|m| m.id).collect();
        assert_eq!(eligible_members(&cycle), ids);
    }

    #[test]
    fn test_past_recipients_are_excluded() {
        let mut cycle = make_test_cycle(&["Alice", "Bob", "Charlie"], 1000.0);
        let alice = cycle.members[0].id;
        cycle.months[0].payout_member_id = Some(alice);

        let eligible = eligible_members(&cycle);
        assert_eq!(eligible.len(), 2);
        assert!(!eligible.contains(&alice));
    }

    #[test]
    fn test_selection_lands_in_eligible_set() {
        let mut cycle = make_test_cycle(&["Alice", "Bob", "Charlie"], 1000.0);
        cycle.months[0].payout_member_id = Some(cycle.members[2].id);

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let chosen = select_recipient_with(&cycle, &mut rng).unwrap();
            assert!(eligible_members(&cycle).contains(&chosen));
        }
    }

    #[test]
    fn test_no_eligible_members_yields_none() {
        let mut cycle = make_test_cycle(&["Alice", "Bob"], 1000.0);
        cycle.months[0].payout_member_id = Some(cycle.members[0].id);
        cycle.months[1].payout_member_id = Some(cycle.members[1].id);

        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(select_recipient_with(&cycle, &mut rng), None);
    }

    #[test]
    fn test_seeded_draw_is_reproducible() {
        let cycle = make_test_cycle(&["Alice", "Bob", "Charlie", "Diana"], 1000.0);

        let a = select_recipient_with(&cycle, &mut StdRng::seed_from_u64(42));
        let b = select_recipient_with(&cycle, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }
}
