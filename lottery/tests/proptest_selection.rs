//! Property-based tests for winner selection.
//!
//! These tests check that the draw is deterministic, order independent and
//! never repeats a winner, for arbitrary participant lists and block hashes.

use std::collections::HashSet;

use eth_lottery::{rank, select_winners, select_winners_with, OversubscriptionPolicy};
use proptest::prelude::*;

/// Distinct participant identifiers, 1 to 40 of them.
fn participants() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set("[a-z0-9_]{1,12}", 1..40)
        .prop_map(|set| set.into_iter().collect::<Vec<_>>())
}

fn block_hash() -> impl Strategy<Value = String> {
    "0x[0-9a-f]{64}"
}

proptest! {
    /// Property: the same inputs always draw the same ordered winners.
    #[test]
    fn prop_deterministic(
        lottery_id in "[A-Za-z0-9-]{0,16}",
        participants in participants(),
        prizes in 0u64..10,
        hash in block_hash(),
    ) {
        let first = select_winners(&lottery_id, &participants, prizes, &hash).unwrap();
        let second = select_winners(&lottery_id, &participants, prizes, &hash).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Property: permuting the participant list does not change the draw.
    #[test]
    fn prop_order_independent(
        participants in participants(),
        prizes in 0u64..10,
        hash in block_hash(),
    ) {
        let mut reversed = participants.clone();
        reversed.reverse();

        prop_assert_eq!(
            select_winners("prop", &participants, prizes, &hash).unwrap(),
            select_winners("prop", &reversed, prizes, &hash).unwrap()
        );
        prop_assert_eq!(rank("prop", &participants), rank("prop", &reversed));
    }

    /// Property: winners are distinct participants and there are exactly
    /// min(prizes, n) of them.
    #[test]
    fn prop_distinct_and_sized(
        participants in participants(),
        prizes in 0u64..60,
        hash in block_hash(),
    ) {
        let winners = select_winners("prop", &participants, prizes, &hash).unwrap();

        let unique: HashSet<&String> = winners.iter().collect();
        prop_assert_eq!(unique.len(), winners.len());
        prop_assert_eq!(winners.len() as u64, prizes.min(participants.len() as u64));
        for winner in &winners {
            prop_assert!(participants.contains(winner));
        }
    }

    /// Property: with enough participants, the strict policy draws the same
    /// winners as the clamping one.
    #[test]
    fn prop_policies_agree_when_not_oversubscribed(
        participants in participants(),
        hash in block_hash(),
    ) {
        let prizes = (participants.len() as u64).min(5);
        let draw = |policy| select_winners_with("prop", &participants, prizes, &hash, policy);
        prop_assert_eq!(
            draw(OversubscriptionPolicy::Clamp).unwrap(),
            draw(OversubscriptionPolicy::Reject).unwrap()
        );
    }
}
