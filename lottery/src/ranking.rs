//! Participant ranking.
//!
//! Turns raw participant identifiers into a dense, order-independent index
//! space `[0, k)`. Fingerprints are sorted in descending case-insensitive
//! lexicographic order of their hex encoding and numbered in that order.
//! Drawers and verifiers must use exactly this order.

use std::collections::BTreeMap;

use crate::fingerprint::Fingerprint;

/// Dense index over the fingerprints of a lottery's participants.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RankedIndex {
    /// Entries in index order (descending fingerprint)
    entries: Vec<(Fingerprint, String)>,
}

impl RankedIndex {
    /// Number of ranked fingerprints.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there is nothing to draw from.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fingerprint at `index`.
    pub fn fingerprint_at(&self, index: usize) -> Option<&Fingerprint> {
        self.entries.get(index).map(|(fp, _)| fp)
    }

    /// Participant identifier at `index`.
    pub fn participant_at(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|(_, p)| p.as_str())
    }

    /// Participant identifier for a fingerprint.
    pub fn participant_for(&self, fingerprint: &Fingerprint) -> Option<&str> {
        self.position_of(fingerprint)
            .map(|index| self.entries[index].1.as_str())
    }

    /// Index assigned to a fingerprint.
    pub fn position_of(&self, fingerprint: &Fingerprint) -> Option<usize> {
        // Entries are sorted descending, so compare in reverse.
        self.entries
            .binary_search_by(|(fp, _)| fingerprint.cmp(fp))
            .ok()
    }

    /// Iterate `(index, fingerprint, participant)` in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Fingerprint, &str)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, (fp, p))| (i, fp, p.as_str()))
    }
}

/// Rank participants for a lottery.
///
/// If two participants share a fingerprint (in practice: the same identifier
/// appears twice) the later one in input order replaces the earlier one, and
/// the index has fewer entries than the input.
pub fn rank<S: AsRef<str>>(lottery_id: &str, participants: &[S]) -> RankedIndex {
    let mut by_fingerprint = BTreeMap::new();
    for participant in participants {
        let participant = participant.as_ref();
        by_fingerprint.insert(
            Fingerprint::compute(participant, lottery_id),
            participant.to_string(),
        );
    }

    // Hex fingerprints are lowercase already, so byte order is the
    // case-insensitive hex order.
    RankedIndex {
        entries: by_fingerprint.into_iter().rev().collect(),
    }
}
