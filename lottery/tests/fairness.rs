//! Fairness and verifiability tests for the lottery draw.
//!
//! Covers:
//! 1. Uniformity of the first winner over many block hashes (chi-squared)
//! 2. Regression fixtures for the published algorithm
//! 3. Draw/verify symmetry and tamper detection

use eth_lottery::{
    select_winners, trace_draw, verify, DrawResult, OversubscriptionPolicy, StepOutcome,
    VerificationError,
};
use statrs::distribution::{ChiSquared, ContinuousCDF};

// ============================================================================
// Helpers
// ============================================================================

fn pool(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("p{}", i)).collect()
}

fn synthetic_block_hash(i: u64) -> String {
    format!("0x{:064x}", i)
}

/// Index of the first winner drawn for a single-prize lottery.
fn first_winner_index(lottery_id: &str, participants: &[String], block_hash: &str) -> usize {
    let trace = trace_draw(
        lottery_id,
        participants,
        1,
        block_hash,
        OversubscriptionPolicy::Clamp,
    )
    .unwrap();

    trace
        .steps
        .iter()
        .find_map(|step| match step.outcome {
            StepOutcome::Winner { index } => Some(index),
            _ => None,
        })
        .unwrap()
}

/// Chi-squared p-value of observed counts against a uniform distribution.
fn uniform_p_value(counts: &[u64]) -> f64 {
    let total: u64 = counts.iter().sum();
    let expected = total as f64 / counts.len() as f64;
    let statistic: f64 = counts
        .iter()
        .map(|&c| {
            let diff = c as f64 - expected;
            diff * diff / expected
        })
        .sum();

    let distribution = ChiSquared::new((counts.len() - 1) as f64).unwrap();
    1.0 - distribution.cdf(statistic)
}

fn published(participants: &[&str], prizes: u64, block_hash: &str) -> DrawResult {
    let participants: Vec<String> = participants.iter().map(|p| p.to_string()).collect();
    let winners = select_winners("L1", &participants, prizes, block_hash).unwrap();
    DrawResult {
        lottery_id: "L1".to_string(),
        participants,
        prizes,
        draw_time: "2024-06-01 12:00:00".to_string(),
        block_num: 20_000_000,
        block_hash: block_hash.to_string(),
        winners,
    }
}

// ============================================================================
// Unbiasedness
// ============================================================================

#[test]
fn test_first_winner_uniform_seven() {
    let participants = pool(7);
    let mut counts = vec![0u64; participants.len()];

    for i in 0..7_000 {
        let index = first_winner_index("chi", &participants, &synthetic_block_hash(i));
        counts[index] += 1;
    }

    let p = uniform_p_value(&counts);
    assert!(p > 0.01, "first winner not uniform: counts={:?} p={}", counts, p);
}

#[test]
fn test_first_winner_uniform_ten() {
    let participants = pool(10);
    let mut counts = vec![0u64; participants.len()];

    for i in 0..5_000 {
        let index = first_winner_index("chi", &participants, &synthetic_block_hash(i));
        counts[index] += 1;
    }

    let p = uniform_p_value(&counts);
    assert!(p > 0.01, "first winner not uniform: counts={:?} p={}", counts, p);
}

// ============================================================================
// Regression fixtures
// ============================================================================

#[test]
fn test_reference_single_prize() {
    let participants = ["alice", "bob", "carol"];
    let first = select_winners("L1", &participants, 1, "0xdeadbeef").unwrap();
    let second = select_winners("L1", &participants, 1, "0xdeadbeef").unwrap();

    assert_eq!(first, vec!["alice"]);
    assert_eq!(first, second);
}

#[test]
fn test_reference_weekly_draw() {
    let participants: Vec<String> = (0..10).map(|i| format!("user{}", i)).collect();
    let winners = select_winners(
        "weekly-42",
        &participants,
        3,
        "0x8f2a559490bf39e7ab5e1a2b4c4ee0b6f1c1d1e7f7a8e5b0d0c7c3e7c2a9f1d3",
    )
    .unwrap();

    assert_eq!(winners, vec!["user2", "user4", "user1"]);
}

// ============================================================================
// Draw / verify symmetry
// ============================================================================

#[test]
fn test_verify_accepts_own_draws() {
    for i in 0..50 {
        let result = published(
            &["alice", "bob", "carol", "dave", "erin"],
            2,
            &synthetic_block_hash(i),
        );
        assert_eq!(verify(&result), Ok(()));
    }
}

#[test]
fn test_swapped_winner_detected() {
    let mut result = published(&["alice", "bob", "carol", "dave", "erin"], 2, "0xabc");
    let outsider = result
        .participants
        .iter()
        .find(|p| !result.winners.contains(*p))
        .cloned()
        .unwrap();
    result.winners[0] = outsider;

    assert!(matches!(
        verify(&result),
        Err(VerificationError::Mismatch { .. })
    ));
}

#[test]
fn test_altered_block_hash_detected() {
    let mut result = published(&["alice", "bob", "carol", "dave", "erin"], 2, "0xabc");
    assert_eq!(result.winners, vec!["alice", "erin"]);

    result.block_hash = "0xabd".to_string();

    match verify(&result) {
        Err(VerificationError::Mismatch { expected, actual }) => {
            assert_eq!(expected, vec!["bob", "carol"]);
            assert_eq!(actual, vec!["alice", "erin"]);
        }
        other => panic!("expected mismatch, got {:?}", other),
    }
}

#[test]
fn test_removed_participant_detected() {
    let mut result = published(&["alice", "bob", "carol", "dave", "erin"], 2, "0xabc");
    let winner = result.winners[0].clone();
    result.participants.retain(|p| *p != winner);
    result.participants.reverse();

    match verify(&result) {
        Err(VerificationError::Mismatch { expected, actual }) => {
            assert!(!expected.contains(&winner));
            assert!(actual.contains(&winner));
        }
        other => panic!("expected mismatch, got {:?}", other),
    }
}

#[test]
fn test_reordered_participants_still_verify() {
    let mut result = published(&["alice", "bob", "carol", "dave", "erin"], 3, "0xabc");
    result.participants.reverse();
    assert_eq!(verify(&result), Ok(()));
}
