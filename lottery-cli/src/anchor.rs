//! Block anchors: the source of a draw's randomness.
//!
//! A draw is anchored to the first Ethereum block mined at or after the
//! announced draw time. [`EtherscanSource`] looks that block up through an
//! Etherscan-compatible API in two steps:
//!
//! 1. `module=block&action=getblocknobytime&closest=after` for the block
//!    number,
//! 2. `module=proxy&action=eth_getBlockByNumber` for its hash.
//!
//! Each step is retried with a linearly growing delay until it succeeds or
//! the retry budget runs out.

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

use crate::config::ExplorerConfig;

/// The block a draw is anchored to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockAnchor {
    /// Block hash (`0x` followed by 64 hex digits)
    pub block_hash: String,
    /// Block number
    pub block_number: u64,
}

/// Errors that can occur while looking up an anchor block.
#[derive(Debug, Error)]
pub enum AnchorError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected explorer response: {0}")]
    UnexpectedResponse(String),

    #[error("gave up after {attempts} attempts: {last}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        last: Box<AnchorError>,
    },
}

/// Something that can resolve a draw time to an anchor block.
#[async_trait]
pub trait AnchorSource: Send + Sync {
    /// The first block mined at or after `timestamp` (Unix seconds).
    async fn block_after(&self, timestamp: u64) -> Result<BlockAnchor, AnchorError>;
}

/// An anchor that is already known, e.g. for offline draws.
#[derive(Debug, Clone)]
pub struct FixedAnchor {
    anchor: BlockAnchor,
}

impl FixedAnchor {
    /// Always answer with the given block.
    pub fn new(block_hash: &str, block_number: u64) -> Self {
        Self {
            anchor: BlockAnchor {
                block_hash: block_hash.to_string(),
                block_number,
            },
        }
    }
}

#[async_trait]
impl AnchorSource for FixedAnchor {
    async fn block_after(&self, _timestamp: u64) -> Result<BlockAnchor, AnchorError> {
        Ok(self.anchor.clone())
    }
}

/// Anchor lookup through an Etherscan-compatible HTTP API.
pub struct EtherscanSource {
    /// HTTP client
    client: Client,
    /// API endpoint
    api_url: String,
    /// Chain ID query parameter
    chain_id: u64,
    /// API key, if any
    api_key: Option<String>,
    /// Number of retries per request
    max_retries: u32,
    /// Base retry delay
    retry_delay: Duration,
}

impl EtherscanSource {
    /// Create a source from explorer settings.
    pub fn new(config: &ExplorerConfig) -> Result<Self, AnchorError> {
        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            chain_id: config.chain_id,
            api_key: config.resolved_api_key(),
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
        })
    }

    /// Override the retry settings.
    pub fn with_retries(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_delay = retry_delay;
        self
    }

    async fn retry<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, AnchorError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AnchorError>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                tracing::warn!("Retry {} fetching {}", attempt, what);
                tokio::time::sleep(self.retry_delay * attempt).await;
            }

            match op().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    tracing::warn!("Failed to fetch {}: {}", what, e);
                    last_error = Some(e);
                }
            }
        }

        let last = last_error
            .unwrap_or_else(|| AnchorError::UnexpectedResponse("no attempt made".to_string()));
        Err(AnchorError::RetriesExhausted {
            attempts: self.max_retries + 1,
            last: Box::new(last),
        })
    }

    async fn query(&self, params: &[(&str, String)]) -> Result<Value, AnchorError> {
        let mut request = self
            .client
            .get(&self.api_url)
            .query(&[("chainid", self.chain_id.to_string())])
            .query(params);
        if let Some(key) = &self.api_key {
            request = request.query(&[("apikey", key)]);
        }

        let response = request.send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    async fn fetch_block_number(&self, timestamp: u64) -> Result<u64, AnchorError> {
        let response = self
            .query(&[
                ("module", "block".to_string()),
                ("action", "getblocknobytime".to_string()),
                ("timestamp", timestamp.to_string()),
                ("closest", "after".to_string()),
            ])
            .await?;
        parse_block_number(&response)
    }

    async fn fetch_block_hash(&self, block_number: u64) -> Result<String, AnchorError> {
        let response = self
            .query(&[
                ("module", "proxy".to_string()),
                ("action", "eth_getBlockByNumber".to_string()),
                ("tag", format!("{:#x}", block_number)),
                ("boolean", "false".to_string()),
            ])
            .await?;
        parse_block_hash(&response)
    }
}

#[async_trait]
impl AnchorSource for EtherscanSource {
    async fn block_after(&self, timestamp: u64) -> Result<BlockAnchor, AnchorError> {
        let block_number = self
            .retry("block number", move || self.fetch_block_number(timestamp))
            .await?;
        tracing::debug!("Block at or after {} is {}", timestamp, block_number);

        let block_hash = self
            .retry("block hash", move || self.fetch_block_hash(block_number))
            .await?;

        Ok(BlockAnchor {
            block_hash,
            block_number,
        })
    }
}

/// Parse a `getblocknobytime` response.
pub fn parse_block_number(response: &Value) -> Result<u64, AnchorError> {
    let message = response.get("message").and_then(|m| m.as_str());
    let result = response.get("result").and_then(|r| r.as_str());

    match (message, result) {
        (Some("OK"), Some(result)) => result.trim().parse().map_err(|_| {
            AnchorError::UnexpectedResponse(format!("block number is not an integer: {}", result))
        }),
        _ => Err(AnchorError::UnexpectedResponse(response.to_string())),
    }
}

/// Parse an `eth_getBlockByNumber` response.
pub fn parse_block_hash(response: &Value) -> Result<String, AnchorError> {
    let hash = response
        .get("result")
        .and_then(|r| r.get("hash"))
        .and_then(|h| h.as_str())
        .ok_or_else(|| AnchorError::UnexpectedResponse(response.to_string()))?;

    if !is_block_hash(hash) {
        return Err(AnchorError::UnexpectedResponse(format!(
            "malformed block hash: {}",
            hash
        )));
    }

    Ok(hash.to_string())
}

/// Whether `hash` looks like `0x` followed by 64 hex digits.
pub fn is_block_hash(hash: &str) -> bool {
    hash.strip_prefix("0x")
        .map(|digits| digits.len() == 64 && digits.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false)
}
