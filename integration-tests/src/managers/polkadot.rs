use super::{ChainConnection, ChainManager};
use crate::error::Result;
use crate::types::{Account, Asset, AssetSourceRelation, Chain};

/// The relay chain. It only holds DOT, in `System.Account`.
pub struct PolkadotManager {
    connection: ChainConnection,
}

impl PolkadotManager {
    pub fn new() -> Self {
        Self {
            connection: ChainConnection::new(Chain::Polkadot),
        }
    }
}

impl Default for PolkadotManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainManager for PolkadotManager {
    fn connection(&self) -> &ChainConnection {
        &self.connection
    }

    fn connection_mut(&mut self) -> &mut ChainConnection {
        &mut self.connection
    }

    fn asset_source_relation(&self, _asset: Asset) -> AssetSourceRelation {
        AssetSourceRelation::Here
    }

    async fn asset_balance_of(&self, account: Account, asset: Asset) -> Result<u128> {
        match asset {
            Asset::Dot => self.native_balance_of(account).await,
            _ => Ok(0),
        }
    }
}
