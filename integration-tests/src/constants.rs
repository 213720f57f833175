//! Fixed values shared by the fixtures and the scenarios.

use hex_literal::hex;

/// Balances seeded through the storage overrides.
pub mod initial_balances {
    pub const USDT: u128 = 52_000_000_000;
    pub const USDC: u128 = 66_600_000_000;
    pub const DOT: u128 = 10_000_000_000_000_000;
    pub const PLMC: u128 = 10_000_000_000_000_000_000;
    pub const ETH: u128 = 1_000_000_000_000_000;
    /// Relay chain Alice gets more DOT than anybody else.
    pub const RELAY_DOT: u128 = 20_000_000_000_000_000_000;
}

pub mod transfer_amounts {
    pub const TOKENS: u128 = 2_000_000;
    pub const NATIVE: u128 = 20_000_000_000;
    pub const BRIDGED: u128 = 15_000_000_000_000;
}

pub mod para_ids {
    pub const POLIMEC: u32 = 3344;
    pub const POLKADOT_HUB: u32 = 1000;
    pub const BRIDGE_HUB: u32 = 1002;
}

/// Local ports the simulated nodes listen on.
pub mod ports {
    pub const POLIMEC: u16 = 8000;
    pub const POLKADOT_HUB: u16 = 8001;
    pub const POLKADOT: u16 = 8002;
    pub const BRIDGE_HUB: u16 = 8003;
}

/// `pallet-assets` instance holding USDT/USDC on the Hub.
pub const ASSETS_PALLET_INSTANCE: u8 = 50;
/// Snowbridge inbound queue pallet on Bridge Hub.
pub const BRIDGE_PALLET_INSTANCE: u8 = 80;

pub const USDT_ASSET_INDEX: u128 = 1984;
pub const USDC_ASSET_INDEX: u128 = 1337;
pub const UNKNOWN_ASSET_INDEX: u128 = 42;

pub const ETHEREUM_CHAIN_ID: u64 = 1;
pub const WETH_CONTRACT: [u8; 20] = hex!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");

/// `ForeignAssets` min balance used when registering ETH on Polimec.
pub const ETH_MIN_BALANCE: u128 = 15_000_000_000_000;

/// Execution bought on the Hub for the relay -> Hub -> Polimec route.
pub const MULTI_HOP_BUY_EXECUTION: u128 = 1_000_000_000;
/// Observed Hub execution fee for the relay -> Hub -> Polimec route.
pub const MULTI_HOP_HUB_FEE: u128 = 422_157_353;

/// DOT teleported along with the bridged message into the Hub.
pub const BRIDGED_DOT_TELEPORT: u128 = 80_000_000_000;
pub const BRIDGED_DOT_EXECUTION: u128 = 40_000_000_000;
pub const BRIDGED_TOPIC: [u8; 32] = [1u8; 32];

/// `ForeignAssets.Issued` events expected when dry running the bridged message.
pub const BRIDGED_ISSUED_ON_HUB: usize = 1;
pub const BRIDGED_ISSUED_ON_POLIMEC: usize = 3;

/// SS58 addresses of the fixed identities.
pub mod addresses {
    pub const ALICE: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";
    pub const BOB: &str = "5FHneW46xGXgs5mUiveU4sbTyGBzmstUspZC92UhjJM694ty";
    pub const CHARLIE: &str = "5FLSigC9HGRKVhB9FiEo4Y3koPsNmBmLJbpXg2mp1hXcS59Y";
    pub const POLIMEC_TREASURY: &str = "58kXueYKLr5b8yCeY3Gd1nLQX2zSJLXjfMzTAuksNq25CFEL";
}
