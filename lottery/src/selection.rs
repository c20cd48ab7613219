//! Fair winner selection.
//!
//! Winners are drawn from a [`RankedIndex`] by walking the seed chain:
//!
//! 1. Read the current seed as a big-endian 256-bit integer.
//! 2. If it falls at or above the safe range (the largest multiple of `n`
//!    not exceeding `2^256`), skip it. Reducing those values modulo `n`
//!    would favour the low indices.
//! 3. Otherwise `seed mod n` is the drawn index. A participant who has
//!    already won is skipped.
//! 4. Advance the seed and repeat until enough winners are drawn.
//!
//! Every examined seed is advanced exactly once, whether it was rejected,
//! drew a duplicate or drew a new winner, so the whole draw is a fold over
//! the seed chain. [`DrawSequence`] is that chain.

use std::{collections::HashSet, num::NonZeroUsize};

use primitive_types::U256;
use tracing::debug;

use crate::{
    error::LotteryError,
    ranking::{rank, RankedIndex},
    seed::Seed,
};

/// What to do when more prizes are requested than there are participants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum OversubscriptionPolicy {
    /// Every participant wins, in drawn order.
    #[default]
    Clamp,
    /// Refuse to draw.
    Reject,
}

/// Values accepted by rejection sampling for a given participant count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SafeRange {
    /// `n` divides `2^256`; every seed is accepted.
    Full,
    /// Seeds strictly below the bound are accepted.
    Below(U256),
}

impl SafeRange {
    /// Safe range `floor(2^256 / n) * n` for `n` participants.
    pub fn for_participants(n: NonZeroUsize) -> Self {
        let n = U256::from(n.get());
        // 2^256 mod n, computed from 2^256 - 1 which fits in a U256.
        let excess = (U256::MAX % n + U256::one()) % n;
        if excess.is_zero() {
            SafeRange::Full
        } else {
            SafeRange::Below(U256::MAX - excess + U256::one())
        }
    }

    /// Whether `value` can be reduced without bias.
    pub fn accepts(&self, value: &U256) -> bool {
        match self {
            SafeRange::Full => true,
            SafeRange::Below(bound) => value < bound,
        }
    }

    /// Reduce a seed to an index in `[0, n)`, or `None` if it must be
    /// rejected.
    pub fn reduce(&self, seed: &Seed, n: NonZeroUsize) -> Option<usize> {
        let value = seed.to_u256();
        if !self.accepts(&value) {
            return None;
        }
        // The remainder is below n, which came from a usize.
        Some((value % U256::from(n.get())).low_u64() as usize)
    }
}

/// One examined seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawStep {
    /// Seed examined at this step
    pub seed: Seed,
    /// Index it reduced to, or `None` if rejection sampling skipped it
    pub index: Option<usize>,
}

/// The seed chain of a draw, one [`DrawStep`] per examined seed.
///
/// The sequence is infinite; callers stop once they have enough winners.
#[derive(Clone, Debug)]
pub struct DrawSequence {
    seed: Seed,
    range: SafeRange,
    n: NonZeroUsize,
}

impl DrawSequence {
    /// Start a chain at `seed` over `n` participants.
    pub fn new(seed: Seed, n: NonZeroUsize) -> Self {
        Self {
            seed,
            range: SafeRange::for_participants(n),
            n,
        }
    }

    /// The safe range used for rejection sampling.
    pub fn safe_range(&self) -> SafeRange {
        self.range
    }
}

impl Iterator for DrawSequence {
    type Item = DrawStep;

    fn next(&mut self) -> Option<DrawStep> {
        let seed = self.seed;
        self.seed = seed.advance();
        Some(DrawStep {
            seed,
            index: self.range.reduce(&seed, self.n),
        })
    }
}

/// Outcome of one examined seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    /// Seed was in the biased zone and skipped.
    Rejected,
    /// Seed drew a participant who had already won.
    Duplicate {
        /// Drawn index
        index: usize,
    },
    /// Seed drew a new winner.
    Winner {
        /// Drawn index
        index: usize,
    },
}

/// A step of a traced draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceStep {
    /// Seed examined at this step
    pub seed: Seed,
    /// What the seed did
    pub outcome: StepOutcome,
}

/// Full record of a draw, for audits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawTrace {
    /// Ranking the draw used
    pub ranking: RankedIndex,
    /// Seed derived from the public inputs
    pub initial_seed: Seed,
    /// Rejection sampling bound, `None` when nobody participated
    pub safe_range: Option<SafeRange>,
    /// Every examined seed in order
    pub steps: Vec<TraceStep>,
    /// Winners in draw order
    pub winners: Vec<String>,
}

impl DrawTrace {
    /// Number of seeds skipped by rejection sampling.
    pub fn rejected(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.outcome == StepOutcome::Rejected)
            .count()
    }

    /// Number of seeds that drew an existing winner.
    pub fn duplicates(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s.outcome, StepOutcome::Duplicate { .. }))
            .count()
    }
}

/// Select winners, clamping the prize count to the number of participants.
///
/// Returns at most `min(prize_count, participants.len())` distinct
/// participants in draw order. An empty participant list draws nobody.
pub fn select_winners<S: AsRef<str>>(
    lottery_id: &str,
    participants: &[S],
    prize_count: u64,
    block_hash: &str,
) -> Result<Vec<String>, LotteryError> {
    select_winners_with(
        lottery_id,
        participants,
        prize_count,
        block_hash,
        OversubscriptionPolicy::Clamp,
    )
}

/// Select winners with an explicit over-subscription policy.
pub fn select_winners_with<S: AsRef<str>>(
    lottery_id: &str,
    participants: &[S],
    prize_count: u64,
    block_hash: &str,
    policy: OversubscriptionPolicy,
) -> Result<Vec<String>, LotteryError> {
    let target = winner_count(participants, prize_count, policy)?;
    let ranking = rank(lottery_id, participants);
    let seed = Seed::initial(lottery_id, participants.len(), prize_count, block_hash);

    let (winners, _) = draw(&ranking, seed, target, |_| {});

    debug!(
        lottery_id = lottery_id,
        participants = participants.len(),
        prize_count = prize_count,
        winners = winners.len(),
        "Selected winners"
    );

    Ok(resolve(&ranking, &winners))
}

/// Run a draw and record every examined seed.
///
/// Draws exactly the same winners as [`select_winners_with`].
pub fn trace_draw<S: AsRef<str>>(
    lottery_id: &str,
    participants: &[S],
    prize_count: u64,
    block_hash: &str,
    policy: OversubscriptionPolicy,
) -> Result<DrawTrace, LotteryError> {
    let target = winner_count(participants, prize_count, policy)?;
    let ranking = rank(lottery_id, participants);
    let initial_seed = Seed::initial(lottery_id, participants.len(), prize_count, block_hash);

    let mut steps = Vec::new();
    let (winners, safe_range) = draw(&ranking, initial_seed, target, |step| steps.push(step));
    let winners = resolve(&ranking, &winners);

    Ok(DrawTrace {
        safe_range,
        ranking,
        initial_seed,
        steps,
        winners,
    })
}

/// Check a participant list and work out how many winners it draws.
///
/// Fails on a repeated participant, and on more prizes than participants
/// under [`OversubscriptionPolicy::Reject`].
pub fn winner_count<S: AsRef<str>>(
    participants: &[S],
    prize_count: u64,
    policy: OversubscriptionPolicy,
) -> Result<usize, LotteryError> {
    let mut seen = HashSet::with_capacity(participants.len());
    for participant in participants {
        let participant = participant.as_ref();
        if !seen.insert(participant) {
            return Err(LotteryError::DuplicateParticipant(participant.to_string()));
        }
    }

    let n = participants.len();
    let requested = usize::try_from(prize_count).unwrap_or(usize::MAX);
    if requested > n && n > 0 && policy == OversubscriptionPolicy::Reject {
        return Err(LotteryError::Oversubscribed {
            prize_count,
            participants: n,
        });
    }

    Ok(requested.min(n))
}

/// Fold over the seed chain until `target` distinct indices are drawn.
///
/// Also returns the safe range the chain used, `None` for an empty ranking.
fn draw(
    ranking: &RankedIndex,
    seed: Seed,
    target: usize,
    mut observe: impl FnMut(TraceStep),
) -> (Vec<usize>, Option<SafeRange>) {
    let Some(n) = NonZeroUsize::new(ranking.len()) else {
        return (Vec::new(), None);
    };

    let mut winners = Vec::with_capacity(target);
    let mut won = HashSet::with_capacity(target);
    let sequence = DrawSequence::new(seed, n);
    let safe_range = sequence.safe_range();

    for step in sequence {
        if winners.len() >= target {
            break;
        }

        let outcome = match step.index {
            None => {
                debug!(seed = %step.seed, "Seed outside safe range, rehashing");
                StepOutcome::Rejected
            }
            Some(index) if won.insert(index) => {
                winners.push(index);
                StepOutcome::Winner { index }
            }
            Some(index) => StepOutcome::Duplicate { index },
        };

        observe(TraceStep {
            seed: step.seed,
            outcome,
        });
    }

    (winners, Some(safe_range))
}

fn resolve(ranking: &RankedIndex, indices: &[usize]) -> Vec<String> {
    indices
        .iter()
        .filter_map(|&index| ranking.participant_at(index))
        .map(str::to_string)
        .collect()
}
