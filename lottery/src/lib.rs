//! Verifiable lottery draws anchored to an Ethereum block hash.
//!
//! Winners are chosen from randomness nobody controls in advance: the hash of
//! the first block mined at or after a draw time that was announced together
//! with the participant list. Anyone holding the participant list, the prize
//! count and that block hash can recompute the winners.
//!
//! ## Algorithm
//!
//! 1. **Ranking**: each participant is fingerprinted as
//!    `SHA-256(participant || lottery_id)`. Fingerprints are sorted in
//!    descending hex order and numbered `0..n`, so the index space does not
//!    depend on the order participants were listed in.
//! 2. **Seed**: `SHA-256(lottery_id || n || prize_count || block_hash)`.
//! 3. **Rejection sampling**: a seed read as a 256-bit integer is only reduced
//!    modulo `n` when it is below `floor(2^256 / n) * n`; otherwise it is
//!    rehashed. This removes modulo bias.
//! 4. **Seed chaining**: after every examined seed the next one is
//!    `SHA-256(hex(seed))`. Repeated indices are skipped until enough
//!    distinct winners are drawn.
//!
//! Drawing and verification call the same function, so identical inputs
//! always produce identical, identically ordered winners.
//!
//! ## Usage
//!
//! ```
//! use eth_lottery::{select_winners, verify, DrawResult};
//!
//! let participants = ["alice", "bob", "carol"];
//! let winners = select_winners("L1", &participants, 1, "0xdeadbeef").unwrap();
//! assert_eq!(winners, vec!["alice"]);
//!
//! let result = DrawResult {
//!     lottery_id: "L1".to_string(),
//!     participants: participants.iter().map(|p| p.to_string()).collect(),
//!     prizes: 1,
//!     draw_time: "2024-01-01 00:00:00".to_string(),
//!     block_num: 19_000_000,
//!     block_hash: "0xdeadbeef".to_string(),
//!     winners,
//! };
//! assert!(verify(&result).is_ok());
//! ```

pub mod fingerprint;
pub mod ranking;
pub mod seed;
pub mod selection;

mod error;
mod record;
mod verify;

pub use error::{LotteryError, VerificationError};
pub use fingerprint::{Fingerprint, FINGERPRINT_LEN};
pub use ranking::{rank, RankedIndex};
pub use record::DrawResult;
pub use seed::Seed;
pub use selection::{
    select_winners, select_winners_with, trace_draw, winner_count, DrawSequence, DrawStep,
    DrawTrace, OversubscriptionPolicy, SafeRange, StepOutcome, TraceStep,
};
pub use verify::{verify, verify_with};
