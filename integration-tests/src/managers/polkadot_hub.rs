use super::{ChainConnection, ChainManager};
use crate::error::Result;
use crate::types::{Asset, AssetSourceRelation, Chain};

pub struct PolkadotHubManager {
    connection: ChainConnection,
}

impl PolkadotHubManager {
    pub fn new() -> Self {
        Self {
            connection: ChainConnection::new(Chain::PolkadotHub),
        }
    }

    /// `amount_in` of the last `AssetConversion.SwapCreditExecuted`, zero if none.
    pub async fn swap_credit(&self) -> Result<u128> {
        self.connection
            .first_event_amount("AssetConversion", "SwapCreditExecuted", "amount_in")
            .await
    }
}

impl Default for PolkadotHubManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainManager for PolkadotHubManager {
    fn connection(&self) -> &ChainConnection {
        &self.connection
    }

    fn connection_mut(&mut self) -> &mut ChainConnection {
        &mut self.connection
    }

    fn asset_source_relation(&self, asset: Asset) -> AssetSourceRelation {
        match asset {
            Asset::Dot => AssetSourceRelation::Parent,
            Asset::Plmc => AssetSourceRelation::Sibling,
            // bridged assets ignore the relation
            Asset::Usdt | Asset::Usdc | Asset::Unknown | Asset::Eth | Asset::Weth => {
                AssetSourceRelation::Here
            }
        }
    }
}
