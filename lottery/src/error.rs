//! Error types for lottery draws and verification.

use displaydoc::Display;
use thiserror::Error;

/// Errors that prevent a draw from running.
#[derive(Clone, Debug, Display, Error, PartialEq, Eq)]
pub enum LotteryError {
    /// Participant listed more than once: {0}
    DuplicateParticipant(String),

    /// Requested {prize_count} prizes but only {participants} participants
    Oversubscribed {
        /// Requested number of prizes
        prize_count: u64,
        /// Number of participants
        participants: usize,
    },
}

/// Errors reported when checking a published draw.
#[derive(Clone, Debug, Display, Error, PartialEq, Eq)]
pub enum VerificationError {
    /// Winners do not match: expected {expected:?}, published {actual:?}
    Mismatch {
        /// Winners recomputed from the published inputs
        expected: Vec<String>,
        /// Winners as published
        actual: Vec<String>,
    },

    /// Published inputs cannot be drawn: {0}
    Invalid(#[from] LotteryError),
}
