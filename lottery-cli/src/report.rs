//! Plain-text reports printed by the CLI.

use eth_lottery::{DrawResult, DrawTrace, RankedIndex, SafeRange, StepOutcome};

/// Index table for a ranking, one line per participant.
pub fn ranking_table(ranking: &RankedIndex) -> String {
    let mut lines = vec![format!("{:<8} {:<64}  PARTICIPANT", "INDEX", "FINGERPRINT")];
    for (index, fingerprint, participant) in ranking.iter() {
        lines.push(format!("{:<8} {}  {}", index, fingerprint, participant));
    }
    lines.join("\n")
}

/// Step-by-step replay of a draw.
pub fn audit_report(result: &DrawResult, trace: &DrawTrace) -> String {
    let mut lines = vec![
        format!("=== Lottery {} ===", result.lottery_id),
        format!("Draw time: {}", result.draw_time),
        format!("Block: {} ({})", result.block_num, result.block_hash),
        format!("Initial seed: {}", trace.initial_seed),
        match trace.safe_range {
            Some(SafeRange::Full) => "Safe range: every seed".to_string(),
            Some(SafeRange::Below(bound)) => format!("Safe range: below {:#x}", bound),
            None => "Safe range: no participants".to_string(),
        },
        String::new(),
    ];

    for (step, entry) in trace.steps.iter().enumerate() {
        let outcome = match entry.outcome {
            StepOutcome::Rejected => "rejected".to_string(),
            StepOutcome::Duplicate { index } => format!("index {} (already drawn)", index),
            StepOutcome::Winner { index } => format!(
                "index {} -> {}",
                index,
                trace.ranking.participant_at(index).unwrap_or("?")
            ),
        };
        lines.push(format!("{:>4}  {}  {}", step, entry.seed, outcome));
    }

    lines.push(String::new());
    lines.push(format!(
        "{} seeds examined, {} rejected, {} duplicates",
        trace.steps.len(),
        trace.rejected(),
        trace.duplicates()
    ));
    lines.push(format!("Winners: {:?}", trace.winners));
    lines.join("\n")
}
