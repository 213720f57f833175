//! Per-chain managers.
//!
//! A manager owns the connection to one chain and answers balance, fee and
//! event queries for it. The chains differ in how they see each asset
//! ([`ChainManager::asset_source_relation`]) and in where balances live;
//! everything else is shared through the trait's provided methods.

mod bridge_hub;
mod connection;
mod polimec;
mod polkadot;
mod polkadot_hub;

pub use bridge_hub::BridgeHubManager;
pub use connection::{ChainClient, ChainConnection, ProcessedMessage, first_fungible, signer_for};
pub use polimec::PolimecManager;
pub use polkadot::PolkadotManager;
pub use polkadot_hub::PolkadotHubManager;

use subxt::tx::Payload;
use subxt::utils::H256;
use subxt_signer::sr25519::Keypair;
use tracing::debug;

use crate::error::Result;
use crate::location::{asset_location, fungible_balance};
use crate::types::{Account, Asset, AssetSourceRelation, Chain};

// Tests run on a current-thread runtime, the futures need not be `Send`.
#[allow(async_fn_in_trait)]
pub trait ChainManager {
    fn connection(&self) -> &ChainConnection;

    fn connection_mut(&mut self) -> &mut ChainConnection;

    /// How this chain sees `asset`.
    fn asset_source_relation(&self, asset: Asset) -> AssetSourceRelation;

    /// Account collecting execution fees, for chains that have one.
    fn treasury_account(&self) -> Option<Account> {
        None
    }

    fn chain(&self) -> Chain {
        self.connection().chain()
    }

    fn xcm_pallet(&self) -> &'static str {
        self.chain().xcm_pallet()
    }

    async fn connect(&mut self) -> Result<()> {
        self.connection_mut().connect().await
    }

    fn disconnect(&mut self) {
        self.connection_mut().disconnect()
    }

    fn signer(&self, account: Account) -> Result<Keypair> {
        signer_for(account)
    }

    /// Submits `call` signed by `account` and waits for finalization.
    async fn submit<Call: Payload>(&self, call: &Call, account: Account) -> Result<H256> {
        let signer = self.signer(account)?;
        debug!(chain = ?self.chain(), ?account, "submitting extrinsic");
        self.connection().submit(call, &signer).await
    }

    async fn block_number(&self) -> Result<u32> {
        self.connection().block_number().await
    }

    async fn wait_for_next_block(&self, watermark: u32) -> Result<u32> {
        self.connection().wait_for_next_block(watermark).await
    }

    async fn native_balance_of(&self, account: Account) -> Result<u128> {
        self.connection().native_balance_of(account).await
    }

    /// Looks `asset` up in `FungiblesApi` by its location on this chain.
    async fn asset_balance_of(&self, account: Account, asset: Asset) -> Result<u128> {
        let location = asset_location(asset, self.asset_source_relation(asset))?;
        let balances = self.connection().account_balances(account).await?;
        Ok(fungible_balance(&balances, &location))
    }

    async fn message_queue_events(&self) -> Result<Vec<ProcessedMessage>> {
        self.connection().message_queue_events().await
    }

    async fn extrinsic_fee(&self) -> Result<u128> {
        self.connection().extrinsic_fee().await
    }

    async fn transaction_fee(&self) -> Result<u128> {
        self.extrinsic_fee().await
    }

    /// Fee charged by the XCM pallet for the last message sent from here.
    async fn xcm_fee(&self) -> Result<u128> {
        self.connection().xcm_fees_paid(self.xcm_pallet()).await
    }

    async fn local_xcm_fee(&self) -> Result<u128> {
        self.xcm_fee().await
    }
}

/// Any of the four managers, picked at runtime.
pub enum AnyChainManager {
    Polimec(PolimecManager),
    PolkadotHub(PolkadotHubManager),
    Polkadot(PolkadotManager),
    BridgeHub(BridgeHubManager),
}

macro_rules! dispatch {
    ($self:ident, $m:ident => $e:expr) => {
        match $self {
            AnyChainManager::Polimec($m) => $e,
            AnyChainManager::PolkadotHub($m) => $e,
            AnyChainManager::Polkadot($m) => $e,
            AnyChainManager::BridgeHub($m) => $e,
        }
    };
}

impl ChainManager for AnyChainManager {
    fn connection(&self) -> &ChainConnection {
        dispatch!(self, m => m.connection())
    }

    fn connection_mut(&mut self) -> &mut ChainConnection {
        dispatch!(self, m => m.connection_mut())
    }

    fn asset_source_relation(&self, asset: Asset) -> AssetSourceRelation {
        dispatch!(self, m => m.asset_source_relation(asset))
    }

    fn treasury_account(&self) -> Option<Account> {
        dispatch!(self, m => m.treasury_account())
    }

    async fn asset_balance_of(&self, account: Account, asset: Asset) -> Result<u128> {
        dispatch!(self, m => m.asset_balance_of(account, asset).await)
    }
}

pub fn create_chain_manager(chain: Chain) -> AnyChainManager {
    match chain {
        Chain::Polimec => AnyChainManager::Polimec(PolimecManager::new()),
        Chain::PolkadotHub => AnyChainManager::PolkadotHub(PolkadotHubManager::new()),
        Chain::Polkadot => AnyChainManager::Polkadot(PolkadotManager::new()),
        Chain::BridgeHub => AnyChainManager::BridgeHub(BridgeHubManager::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use AssetSourceRelation::*;

    #[tokio::test]
    async fn submit_signs_as_the_account() {
        let manager = create_chain_manager(Chain::Polimec);
        let remark = subxt::dynamic::Value::from_bytes(b"hi");
        let call = subxt::dynamic::tx("System", "remark", vec![remark]);
        // the signer is resolved before the connection is needed
        assert!(matches!(
            manager.submit(&call, Account::Treasury).await,
            Err(Error::UnknownAccount(Account::Treasury))
        ));
        assert!(matches!(
            manager.submit(&call, Account::Alice).await,
            Err(Error::NotConnected(Chain::Polimec))
        ));
    }

    #[test]
    fn factory_picks_the_right_chain() {
        for chain in Chain::ALL {
            let manager = create_chain_manager(chain);
            assert_eq!(manager.chain(), chain);
            assert!(!manager.connection().is_connected());
        }
    }

    #[test]
    fn dot_is_parent_except_on_the_relay() {
        for chain in Chain::ALL {
            let expected = if chain == Chain::Polkadot { Here } else { Parent };
            assert_eq!(create_chain_manager(chain).asset_source_relation(Asset::Dot), expected);
        }
    }

    #[test]
    fn treasury_only_on_polimec() {
        assert_eq!(
            create_chain_manager(Chain::Polimec).treasury_account(),
            Some(Account::Treasury)
        );
        assert_eq!(create_chain_manager(Chain::PolkadotHub).treasury_account(), None);
    }

    #[test]
    fn relations_yield_valid_locations() {
        for chain in Chain::ALL {
            let manager = create_chain_manager(chain);
            for asset in Asset::ALL {
                let relation = manager.asset_source_relation(asset);
                assert!(
                    asset_location(asset, relation).is_ok(),
                    "{chain:?} sees {asset:?} as {relation:?}"
                );
            }
        }
    }

    #[test]
    fn locations_are_distinct_per_chain() {
        for chain in Chain::ALL {
            if chain == Chain::Polkadot {
                // the relay only knows DOT, other entries are placeholders
                continue;
            }
            let manager = create_chain_manager(chain);
            let mut seen = Vec::new();
            for asset in Asset::ALL {
                let location = asset_location(asset, manager.asset_source_relation(asset)).unwrap();
                assert!(!seen.contains(&location), "{chain:?}: {asset:?} collides");
                seen.push(location);
            }
        }
    }

    #[tokio::test]
    async fn relay_and_bridge_hub_hold_nothing_but_dot() {
        for chain in [Chain::Polkadot, Chain::BridgeHub] {
            let manager = create_chain_manager(chain);
            for asset in Asset::ALL.into_iter().filter(|a| *a != Asset::Dot) {
                let balance = manager.asset_balance_of(Account::Alice, asset).await.unwrap();
                assert_eq!(balance, 0, "{chain:?}: {asset:?}");
            }
            // DOT is a real read, which needs the chain
            assert!(matches!(
                manager.asset_balance_of(Account::Alice, Asset::Dot).await,
                Err(Error::NotConnected(c)) if c == chain
            ));
        }
    }

    #[test]
    fn disconnect_is_idempotent() {
        let mut manager = create_chain_manager(Chain::BridgeHub);
        manager.disconnect();
        manager.disconnect();
        assert!(!manager.connection().is_connected());
    }
}
