//! Chopsticks Integration Tests for Cross-Chain Transfers
//!
//! This crate forks Polimec, Polkadot, Polkadot Hub and Bridge Hub into
//! local chopsticks instances and checks that assets move between them
//! with the expected balance changes.
//!
//! ## Overview
//!
//! Polimec runs the locally built runtime, the other chains run whatever
//! their live network runs. Each chain is driven through a manager
//! ([`managers::ChainManager`]) that knows how that chain sees every asset
//! and where its balances live. Transfer scenarios ([`transfers`]) build
//! the XCM call, submit it, and compare the balances before and after,
//! accounting for the extrinsic, delivery and execution fees.
//!
//! ## Scenarios
//!
//! 1. **Hub -> Polimec**: reserve transfers of DOT, USDT and USDC
//! 2. **Polimec -> Hub**: the same assets back to the Hub
//! 3. **Polkadot -> Polimec**: DOT through the Hub as reserve
//! 4. **Bridge Hub -> Polimec**: bridged WETH, checked through dry runs
//!
//! ## Running Tests
//!
//! ```bash
//! # Build the runtime the tests run against
//! cargo b -r -p polimec-runtime
//!
//! # Run the network suites
//! cargo test -p xcm-transfer-tests -- --ignored
//!
//! # With logging, including chopsticks' own output
//! RUST_LOG=info,chopsticks=debug cargo test -p xcm-transfer-tests -- --ignored --nocapture
//! ```
//!
//! ## Prerequisites
//!
//! 1. Node.js with `npx`, or a chopsticks binary set through `CHOPSTICKS_BIN`
//! 2. Network access to the live endpoints, see [`config`]
//!
//! ## Network Topology
//!
//! - Polkadot relay on port 8002
//! - Polimec (3344) on 8000, Polkadot Hub (1000) on 8001, Bridge Hub (1002) on 8003
//! - HRMP between all parachains

pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod fees;
pub mod location;
pub mod managers;
pub mod overrides;
pub mod payload;
pub mod runtime_api;
pub mod setup;
pub mod transfers;
pub mod types;

pub use context::{TestContext, with_context};
pub use error::{Error, Result};
pub use managers::{
    AnyChainManager, BridgeHubManager, ChainManager, PolimecManager, PolkadotHubManager,
    PolkadotManager, create_chain_manager,
};
pub use transfers::{
    BridgeToPolimecTransfer, FeeModel, HubToPolimecTransfer, PolimecToHubTransfer,
    PolkadotToPolimecTransfer, TransferTest,
};
pub use types::{
    Account, Asset, AssetSourceRelation, AssetTransfer, BalanceCheck, Chain, TransferOptions,
};
