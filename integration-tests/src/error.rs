//! Error taxonomy of the harness.
//!
//! Setup and configuration errors abort a suite or a scenario straight away.
//! RPC failures surface unchanged, nothing in this crate retries.
//! Balance and event mismatches are assertion panics inside the scenarios
//! and never show up here.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::types::{Account, Asset, Chain};

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "Polimec runtime not found at {path}! Please build it by running \
         `cargo b -r -p polimec-runtime` before executing the tests."
    )]
    RuntimeNotFound { path: PathBuf },
    #[error("setup failed: {0}")]
    Setup(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("asset {0:?} has no home parachain, a sibling location cannot be built")]
    MissingParachainId(Asset),
    #[error("{0:?} cannot be the destination of this transfer")]
    UnsupportedDestination(Chain),
    #[error("no signer for account {0:?}")]
    UnknownAccount(Account),
    #[error("chain {0:?} is not connected")]
    NotConnected(Chain),
    #[error("block subscription on {0:?} ended")]
    SubscriptionClosed(Chain),
    #[error(
        "insufficient balance on source chain for asset {asset:?}: \
         have {available}, need {requested}"
    )]
    InsufficientBalance {
        asset: Asset,
        available: u128,
        requested: u128,
    },
    #[error("runtime api error: {0}")]
    RuntimeApi(String),
    #[error("dry run failed: {0}")]
    DryRunFailed(String),
    #[error("{what} timed out after {after:?}")]
    Timeout { what: String, after: Duration },
    #[error(transparent)]
    Rpc(#[from] subxt::Error),
    #[error(transparent)]
    Codec(#[from] parity_scale_codec::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}
