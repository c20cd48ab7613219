//! Verification of published draws.
//!
//! Verification runs the same selection as the draw on the published inputs
//! and compares the winners element by element, order included.

use tracing::{debug, warn};

use crate::{error::VerificationError, record::DrawResult, selection::OversubscriptionPolicy};

/// Verify a published draw with the default over-subscription policy.
pub fn verify(result: &DrawResult) -> Result<(), VerificationError> {
    verify_with(result, OversubscriptionPolicy::default())
}

/// Verify a published draw.
///
/// Returns [`VerificationError::Mismatch`] carrying both winner lists when
/// the recomputed winners differ from the published ones.
pub fn verify_with(
    result: &DrawResult,
    policy: OversubscriptionPolicy,
) -> Result<(), VerificationError> {
    let expected = result.recompute(policy)?;

    if expected != result.winners {
        warn!(
            lottery_id = %result.lottery_id,
            block_num = result.block_num,
            "Published winners do not match recomputed winners"
        );
        return Err(VerificationError::Mismatch {
            expected,
            actual: result.winners.clone(),
        });
    }

    debug!(
        lottery_id = %result.lottery_id,
        winners = expected.len(),
        "Draw verified"
    );
    Ok(())
}
