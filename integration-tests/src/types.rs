//! Identities of the chains, accounts and assets the suites work with.

use std::str::FromStr;

use subxt::utils::AccountId32;

use crate::constants::{addresses, para_ids, ports};
use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Chain {
    Polimec,
    PolkadotHub,
    Polkadot,
    BridgeHub,
}

impl Chain {
    pub const ALL: [Chain; 4] = [
        Chain::Polimec,
        Chain::PolkadotHub,
        Chain::Polkadot,
        Chain::BridgeHub,
    ];

    pub fn port(self) -> u16 {
        match self {
            Chain::Polimec => ports::POLIMEC,
            Chain::PolkadotHub => ports::POLKADOT_HUB,
            Chain::Polkadot => ports::POLKADOT,
            Chain::BridgeHub => ports::BRIDGE_HUB,
        }
    }

    /// Websocket endpoint of the local simulated node.
    pub fn endpoint(self) -> String {
        format!("ws://localhost:{}", self.port())
    }

    /// `None` for the relay chain.
    pub fn para_id(self) -> Option<u32> {
        match self {
            Chain::Polimec => Some(para_ids::POLIMEC),
            Chain::PolkadotHub => Some(para_ids::POLKADOT_HUB),
            Chain::BridgeHub => Some(para_ids::BRIDGE_HUB),
            Chain::Polkadot => None,
        }
    }

    /// Name of the XCM pallet in the chain's metadata.
    pub fn xcm_pallet(self) -> &'static str {
        match self {
            Chain::Polkadot => "XcmPallet",
            Chain::Polimec | Chain::PolkadotHub | Chain::BridgeHub => "PolkadotXcm",
        }
    }

    /// Asset paying for extrinsics on this chain.
    pub fn native_asset(self) -> Asset {
        match self {
            Chain::Polimec => Asset::Plmc,
            Chain::PolkadotHub | Chain::Polkadot | Chain::BridgeHub => Asset::Dot,
        }
    }
}

/// Test identities. Alice, Bob and the relayer sign; the treasury only receives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Account {
    Alice,
    Bob,
    Treasury,
    BridgeRelayer,
}

impl Account {
    pub fn address(self) -> &'static str {
        match self {
            Account::Alice => addresses::ALICE,
            Account::Bob => addresses::BOB,
            Account::Treasury => addresses::POLIMEC_TREASURY,
            Account::BridgeRelayer => addresses::CHARLIE,
        }
    }

    /// Derivation path from the development mnemonic.
    pub fn derivation_path(self) -> Option<&'static str> {
        match self {
            Account::Alice => Some("//Alice"),
            Account::Bob => Some("//Bob"),
            Account::BridgeRelayer => Some("//Charlie"),
            Account::Treasury => None,
        }
    }

    pub fn account_id(self) -> Result<AccountId32> {
        AccountId32::from_str(self.address())
            .map_err(|e| Error::Config(format!("invalid address for {self:?}: {e}")))
    }
}

/// Logical tokens moved around by the scenarios.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Asset {
    Dot,
    Plmc,
    Usdt,
    Usdc,
    Eth,
    Weth,
    /// Registered nowhere on the destination; transfers must be rejected.
    Unknown,
}

impl Asset {
    pub const ALL: [Asset; 7] = [
        Asset::Dot,
        Asset::Plmc,
        Asset::Usdt,
        Asset::Usdc,
        Asset::Eth,
        Asset::Weth,
        Asset::Unknown,
    ];
}

/// Where an asset's canonical location lives, seen from the chain evaluating it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetSourceRelation {
    /// Native to the parent relay chain.
    Parent,
    /// Native to a peer parachain.
    Sibling,
    /// Local to the evaluating chain.
    Here,
}

/// Free balances captured before or after a transfer.
///
/// `treasury` is only tracked when the destination has a fee sink worth
/// checking (Polimec).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BalanceCheck {
    pub source: u128,
    pub destination: u128,
    pub treasury: Option<u128>,
}

#[derive(Clone, Debug)]
pub struct AssetTransfer {
    pub asset: Asset,
    pub amount: u128,
    pub relation: AssetSourceRelation,
}

impl AssetTransfer {
    pub fn new(asset: Asset, amount: u128, relation: AssetSourceRelation) -> Self {
        Self {
            asset,
            amount,
            relation,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TransferOptions {
    pub account: Account,
    pub assets: Vec<AssetTransfer>,
    /// Index into `assets`; the first asset pays when unset.
    pub fee_asset_item: Option<usize>,
    /// Expected source balance of the first asset before the transfer.
    pub initial_balance: Option<u128>,
}

impl TransferOptions {
    pub fn new(account: Account, assets: Vec<AssetTransfer>) -> Self {
        Self {
            account,
            assets,
            fee_asset_item: None,
            initial_balance: None,
        }
    }

    pub fn single(
        account: Account,
        asset: Asset,
        amount: u128,
        relation: AssetSourceRelation,
    ) -> Self {
        Self::new(account, vec![AssetTransfer::new(asset, amount, relation)])
    }

    pub fn with_fee_asset_item(mut self, index: usize) -> Self {
        self.fee_asset_item = Some(index);
        self
    }

    pub fn with_initial_balance(mut self, balance: u128) -> Self {
        self.initial_balance = Some(balance);
        self
    }

    pub fn fee_index(&self) -> usize {
        self.fee_asset_item.unwrap_or(0)
    }

    pub fn fee_asset(&self) -> Result<Asset> {
        self.assets
            .get(self.fee_index())
            .map(|t| t.asset)
            .ok_or_else(|| {
                Error::Config(format!("fee asset index {} out of range", self.fee_index()))
            })
    }

    pub fn validate(&self) -> Result<()> {
        if self.assets.is_empty() {
            return Err(Error::Config("a transfer needs at least one asset".into()));
        }
        if let Some(t) = self.assets.iter().find(|t| t.amount == 0) {
            return Err(Error::Config(format!("zero amount for {:?}", t.asset)));
        }
        self.fee_asset().map(|_| ())
    }
}

/// Outcome of the dry runs of a bridged message along its hops.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DryRunReport {
    pub source_success: bool,
    pub hop_success: bool,
    pub hop_issued_events: usize,
    pub destination_success: bool,
    pub destination_issued_events: usize,
}

/// Block watermarks captured right before submission.
#[derive(Clone, Debug, Default)]
pub struct TransferResult {
    pub source_block: u32,
    pub destination_block: u32,
    pub hop_block: Option<u32>,
    pub dry_run: Option<DryRunReport>,
}
