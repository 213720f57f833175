use super::{ChainConnection, ChainManager};
use crate::error::Result;
use crate::types::{Account, Asset, AssetSourceRelation, Chain};

/// Bridge Hub has no `FungiblesApi`; only native DOT is tracked.
pub struct BridgeHubManager {
    connection: ChainConnection,
}

impl BridgeHubManager {
    pub fn new() -> Self {
        Self {
            connection: ChainConnection::new(Chain::BridgeHub),
        }
    }
}

impl Default for BridgeHubManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainManager for BridgeHubManager {
    fn connection(&self) -> &ChainConnection {
        &self.connection
    }

    fn connection_mut(&mut self) -> &mut ChainConnection {
        &mut self.connection
    }

    fn asset_source_relation(&self, asset: Asset) -> AssetSourceRelation {
        match asset {
            Asset::Dot => AssetSourceRelation::Parent,
            Asset::Usdt | Asset::Usdc | Asset::Plmc | Asset::Unknown => {
                AssetSourceRelation::Sibling
            }
            Asset::Eth | Asset::Weth => AssetSourceRelation::Here,
        }
    }

    async fn asset_balance_of(&self, account: Account, asset: Asset) -> Result<u128> {
        match asset {
            Asset::Dot => self.native_balance_of(account).await,
            _ => Ok(0),
        }
    }
}
