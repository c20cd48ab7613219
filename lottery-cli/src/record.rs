//! Result file persistence.

use std::path::Path;

use anyhow::{Context, Result};
use eth_lottery::DrawResult;

/// Load a published draw result.
pub fn load_result(path: &Path) -> Result<DrawResult> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read result file {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse result file {}", path.display()))
}

/// Save a draw result as pretty-printed JSON.
///
/// Uses atomic write (write to temp file, then rename) so a published result
/// is never left half written.
pub fn save_result(result: &DrawResult, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(result).context("Failed to serialize result")?;

    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, &content)
        .with_context(|| format!("Failed to write {}", temp_path.display()))?;
    std::fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to move result into {}", path.display()))?;

    tracing::debug!("Saved draw result to {}", path.display());
    Ok(())
}
