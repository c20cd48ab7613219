//! Lottery configuration.
//!
//! A lottery is defined by a JSON or TOML file (chosen by extension):
//!
//! ```json
//! {
//!   "lottery_id": "weekly-42",
//!   "participants": ["alice", "bob", "carol"],
//!   "prizes": 1
//! }
//! ```
//!
//! The optional `explorer` section configures the block explorer and the
//! optional `oversubscription` key (`"clamp"` or `"reject"`) decides what
//! happens when there are more prizes than participants.

use std::{path::Path, time::Duration};

use anyhow::{Context, Result};
use eth_lottery::{winner_count, OversubscriptionPolicy};
use serde::{Deserialize, Serialize};

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV: &str = "ETHERSCAN_API_KEY";

/// Definition of a single lottery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LotteryConfig {
    /// Lottery identifier, salts the participant ranking
    pub lottery_id: String,

    /// Participant identifiers
    pub participants: Vec<String>,

    /// Number of prizes to draw
    pub prizes: u64,

    /// Behaviour when prizes exceed participants
    #[serde(default)]
    pub oversubscription: OversubscriptionPolicy,

    /// Block explorer settings
    #[serde(default)]
    pub explorer: ExplorerConfig,
}

/// Block explorer (Etherscan-compatible API) settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExplorerConfig {
    /// API endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Chain to read blocks from (1 = Ethereum mainnet)
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// API key; falls back to the ETHERSCAN_API_KEY environment variable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Retries per request before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay between retries in seconds (grows linearly)
    #[serde(default = "default_retry_delay")]
    pub retry_delay_secs: u64,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://api.etherscan.io/v2/api".to_string()
}

fn default_chain_id() -> u64 {
    1
}

fn default_max_retries() -> u32 {
    20
}

fn default_retry_delay() -> u64 {
    3
}

fn default_timeout() -> u64 {
    30
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            chain_id: default_chain_id(),
            api_key: None,
            max_retries: default_max_retries(),
            retry_delay_secs: default_retry_delay(),
            timeout_secs: default_timeout(),
        }
    }
}

impl ExplorerConfig {
    /// API key from the config, or from the environment.
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.is_empty())
    }

    /// Base delay between retries.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.retry_delay_secs)
    }

    /// HTTP request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl LotteryConfig {
    /// Create a config with default explorer settings.
    pub fn new(lottery_id: &str, participants: Vec<String>, prizes: u64) -> Self {
        Self {
            lottery_id: lottery_id.to_string(),
            participants,
            prizes,
            oversubscription: OversubscriptionPolicy::default(),
            explorer: ExplorerConfig::default(),
        }
    }

    /// Load and validate a config file.
    ///
    /// Files ending in `.toml` are parsed as TOML, anything else as JSON.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: LotteryConfig = if is_toml(path) {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config from {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config from {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let winners = winner_count(&self.participants, self.prizes, self.oversubscription)
            .context("Invalid participant list")?;

        if self.participants.is_empty() {
            tracing::warn!("No participants configured, the draw will have no winners");
        } else if (winners as u64) < self.prizes {
            tracing::warn!(
                "prizes ({}) exceeds the number of participants ({}), every participant wins",
                self.prizes,
                winners
            );
        }

        if self.explorer.api_url.is_empty() {
            anyhow::bail!("explorer.api_url must not be empty");
        }

        if self.explorer.timeout_secs == 0 {
            anyhow::bail!("explorer.timeout_secs must be greater than 0");
        }

        Ok(())
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_load_json() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"lottery_id": "L1", "participants": ["alice", "bob", "carol"], "prizes": 1}"#,
        )
        .unwrap();

        let config = LotteryConfig::from_file(&path).unwrap();
        assert_eq!(config.lottery_id, "L1");
        assert_eq!(config.participants, names(&["alice", "bob", "carol"]));
        assert_eq!(config.prizes, 1);
        assert_eq!(config.oversubscription, OversubscriptionPolicy::Clamp);
        assert_eq!(config.explorer, ExplorerConfig::default());
    }

    #[test]
    fn test_load_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lottery.toml");
        std::fs::write(
            &path,
            r#"
lottery_id = "L1"
participants = ["alice", "bob"]
prizes = 2
oversubscription = "reject"

[explorer]
chain_id = 11155111
max_retries = 3
"#,
        )
        .unwrap();

        let config = LotteryConfig::from_file(&path).unwrap();
        assert_eq!(config.oversubscription, OversubscriptionPolicy::Reject);
        assert_eq!(config.explorer.chain_id, 11155111);
        assert_eq!(config.explorer.max_retries, 3);
        assert_eq!(config.explorer.api_url, default_api_url());
    }

    #[test]
    fn test_negative_prizes_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"lottery_id": "L1", "participants": ["alice"], "prizes": -1}"#,
        )
        .unwrap();

        assert!(LotteryConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_fractional_prizes_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"lottery_id": "L1", "participants": ["alice"], "prizes": 1.5}"#,
        )
        .unwrap();

        assert!(LotteryConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempdir().unwrap();
        assert!(LotteryConfig::from_file(&dir.path().join("nope.json")).is_err());
    }

    #[test]
    fn test_validate_duplicates() {
        let config = LotteryConfig::new("L1", names(&["alice", "bob", "alice"]), 1);
        let err = config.validate().unwrap_err();
        assert!(format!("{:#}", err).contains("Participant listed more than once: alice"));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = LotteryConfig::new("L1", names(&["alice", "bob"]), 1);
        config.explorer.timeout_secs = 0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));

        config.explorer.timeout_secs = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_in_file_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"lottery_id": "L1", "participants": ["alice"], "prizes": 1,
                "explorer": {"timeout_secs": 0}}"#,
        )
        .unwrap();

        assert!(LotteryConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_validate_oversubscription() {
        let mut config = LotteryConfig::new("L1", names(&["alice", "bob"]), 3);
        assert!(config.validate().is_ok());

        config.oversubscription = OversubscriptionPolicy::Reject;
        let err = config.validate().unwrap_err();
        assert!(format!("{:#}", err).contains("Requested 3 prizes but only 2 participants"));

        config.prizes = 2;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_empty_participants() {
        let config = LotteryConfig::new("L1", Vec::new(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_configured_api_key_wins() {
        let explorer = ExplorerConfig {
            api_key: Some("from-config".to_string()),
            ..Default::default()
        };
        assert_eq!(explorer.resolved_api_key().as_deref(), Some("from-config"));
    }
}
