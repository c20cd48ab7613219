//! Draw and verify orchestration.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::DateTime;
use eth_lottery::{
    select_winners_with, trace_draw, verify_with, DrawResult, DrawTrace, OversubscriptionPolicy,
    VerificationError,
};

use crate::{anchor::AnchorSource, config::LotteryConfig};

/// Format of the `draw_time` field.
pub const DRAW_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Run a draw anchored to the first block at or after `timestamp`.
///
/// Sleeps until `timestamp` if it is still in the future, resolves the
/// anchor block and selects the winners.
pub async fn draw(
    config: &LotteryConfig,
    timestamp: u64,
    source: &dyn AnchorSource,
) -> Result<DrawResult> {
    wait_until(timestamp).await;

    tracing::info!("Fetching block hash...");
    let anchor = source
        .block_after(timestamp)
        .await
        .context("Failed to resolve the anchor block")?;
    tracing::info!(
        "Fetched block hash {} (block {})",
        anchor.block_hash,
        anchor.block_number
    );

    let winners = select_winners_with(
        &config.lottery_id,
        &config.participants,
        config.prizes,
        &anchor.block_hash,
        config.oversubscription,
    )?;

    Ok(DrawResult {
        lottery_id: config.lottery_id.clone(),
        participants: config.participants.clone(),
        prizes: config.prizes,
        draw_time: format_draw_time(timestamp),
        block_num: anchor.block_number,
        block_hash: anchor.block_hash,
        winners,
    })
}

/// Sleep until the given Unix timestamp. Returns at once for past times.
pub async fn wait_until(timestamp: u64) {
    let now = unix_now();
    if timestamp > now {
        tracing::info!("Waiting for draw time {}", format_draw_time(timestamp));
        tokio::time::sleep(Duration::from_secs(timestamp - now)).await;
    }
}

/// Current Unix time in seconds.
pub fn unix_now() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or(0)
}

/// Human-readable draw time (UTC).
pub fn format_draw_time(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format(DRAW_TIME_FORMAT).to_string())
        .unwrap_or_else(|| timestamp.to_string())
}

/// Verify a published result, logging the outcome.
pub fn verify_result(
    result: &DrawResult,
    policy: OversubscriptionPolicy,
) -> Result<(), VerificationError> {
    match verify_with(result, policy) {
        Ok(()) => {
            tracing::info!("Verification succeeded");
            Ok(())
        }
        Err(VerificationError::Mismatch { expected, actual }) => {
            tracing::error!("Verification failed!");
            tracing::error!("Expected winners: {:?}", expected);
            tracing::error!("Published winners: {:?}", actual);
            Err(VerificationError::Mismatch { expected, actual })
        }
        Err(e) => {
            tracing::error!("Verification failed: {}", e);
            Err(e)
        }
    }
}

/// Replay a published result seed by seed.
///
/// Returns the trace when the recomputed winners match the published ones,
/// in order.
pub fn audit_result(
    result: &DrawResult,
    policy: OversubscriptionPolicy,
) -> Result<DrawTrace, VerificationError> {
    let trace = trace_draw(
        &result.lottery_id,
        &result.participants,
        result.prizes,
        &result.block_hash,
        policy,
    )?;

    if trace.winners != result.winners {
        tracing::error!("Audit failed after {} seeds", trace.steps.len());
        tracing::error!("Recomputed winners: {:?}", trace.winners);
        tracing::error!("Published winners: {:?}", result.winners);
        return Err(VerificationError::Mismatch {
            expected: trace.winners,
            actual: result.winners.clone(),
        });
    }

    tracing::info!(
        "Audit succeeded: {} seeds examined, {} rejected, {} duplicates",
        trace.steps.len(),
        trace.rejected(),
        trace.duplicates()
    );
    Ok(trace)
}
