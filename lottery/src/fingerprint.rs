//! Participant fingerprints.
//!
//! A fingerprint is `SHA-256(participant || lottery_id)`. Salting with the
//! lottery ID means the same participant list ranks differently in every
//! lottery, while staying a pure function of the two strings.

use std::fmt;

use sha2::{Digest, Sha256};

/// Length of a fingerprint in bytes.
pub const FINGERPRINT_LEN: usize = 32;

/// A 256-bit participant fingerprint.
///
/// `Ord` compares the raw digest bytes, which orders fingerprints exactly as
/// their lowercase hex strings compare lexicographically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// Fingerprint a participant identifier within a lottery.
    pub fn compute(participant: &str, lottery_id: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(participant.as_bytes());
        hasher.update(lottery_id.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Wrap raw digest bytes.
    pub fn from_bytes(bytes: [u8; FINGERPRINT_LEN]) -> Self {
        Self(bytes)
    }

    /// Lowercase hex encoding (64 characters).
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
