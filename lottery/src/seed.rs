//! Draw seed derivation and chaining.
//!
//! The initial seed commits to every public input of a draw:
//!
//! ```text
//! seed_0   = SHA-256(lottery_id || num_participants || prize_count || block_hash)
//! seed_i+1 = SHA-256(hex(seed_i))
//! ```
//!
//! Components are concatenated as plain strings with no separators, and the
//! chaining step hashes the 64-character lowercase hex string of the previous
//! seed rather than its raw bytes. Both details are part of the public
//! verification contract.

use std::fmt;

use primitive_types::U256;
use sha2::{Digest, Sha256};

/// A 256-bit draw seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Seed([u8; 32]);

impl Seed {
    /// Derive the initial seed of a draw.
    pub fn initial(
        lottery_id: &str,
        num_participants: usize,
        prize_count: u64,
        block_hash: &str,
    ) -> Self {
        let preimage = format!(
            "{}{}{}{}",
            lottery_id, num_participants, prize_count, block_hash
        );
        Self(Sha256::digest(preimage.as_bytes()).into())
    }

    /// Wrap raw digest bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Next seed in the chain.
    pub fn advance(&self) -> Self {
        Self(Sha256::digest(self.to_hex().as_bytes()).into())
    }

    /// The seed as a big-endian unsigned integer.
    pub fn to_u256(&self) -> U256 {
        U256::from_big_endian(&self.0)
    }

    /// Lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
