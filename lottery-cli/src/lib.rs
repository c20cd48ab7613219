//! Ethereum-anchored lottery tool
//!
//! Draws and verifies lotteries whose randomness comes from the hash of the
//! first Ethereum block mined after an announced draw time. This library
//! provides:
//!
//! - Lottery definition files (JSON or TOML)
//! - Anchor block lookup through an Etherscan-compatible API, with retries
//! - Draw orchestration (wait for the draw time, fetch the anchor, select)
//! - Result file persistence, verification and audits
//!
//! # Trust Model
//!
//! The participant list and draw time must be published before the anchor
//! block exists. After the draw, anyone can rerun `verify` on the published
//! result file; it recomputes the winners locally from the recorded block
//! hash and compares them in order.

pub mod anchor;
pub mod config;
pub mod draw;
pub mod record;
pub mod report;

pub use anchor::{AnchorError, AnchorSource, BlockAnchor, EtherscanSource, FixedAnchor};
pub use config::{ExplorerConfig, LotteryConfig};
pub use draw::{audit_result, draw, verify_result};
pub use record::{load_result, save_result};
