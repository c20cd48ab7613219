//! Published draw results.

use crate::{
    error::LotteryError,
    selection::{select_winners_with, OversubscriptionPolicy},
};

/// The public record of a draw.
///
/// Holds everything a third party needs to recompute the winners. Field
/// names match the published JSON format.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DrawResult {
    /// Lottery identifier (salt)
    pub lottery_id: String,

    /// Participants as listed by the organizer
    pub participants: Vec<String>,

    /// Number of prizes requested
    pub prizes: u64,

    /// Draw time, `%Y-%m-%d %H:%M:%S`
    pub draw_time: String,

    /// Number of the anchoring block
    pub block_num: u64,

    /// Hash of the anchoring block
    pub block_hash: String,

    /// Winners in draw order
    pub winners: Vec<String>,
}

impl DrawResult {
    /// Recompute the winners from this record's public inputs.
    pub fn recompute(&self, policy: OversubscriptionPolicy) -> Result<Vec<String>, LotteryError> {
        select_winners_with(
            &self.lottery_id,
            &self.participants,
            self.prizes,
            &self.block_hash,
            policy,
        )
    }
}
