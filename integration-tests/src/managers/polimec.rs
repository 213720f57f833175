use super::{ChainConnection, ChainManager};
use crate::types::{Account, Asset, AssetSourceRelation, Chain};

pub struct PolimecManager {
    connection: ChainConnection,
}

impl PolimecManager {
    pub fn new() -> Self {
        Self {
            connection: ChainConnection::new(Chain::Polimec),
        }
    }
}

impl Default for PolimecManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainManager for PolimecManager {
    fn connection(&self) -> &ChainConnection {
        &self.connection
    }

    fn connection_mut(&mut self) -> &mut ChainConnection {
        &mut self.connection
    }

    fn asset_source_relation(&self, asset: Asset) -> AssetSourceRelation {
        match asset {
            Asset::Dot => AssetSourceRelation::Parent,
            Asset::Usdt | Asset::Usdc | Asset::Unknown => AssetSourceRelation::Sibling,
            Asset::Plmc | Asset::Eth | Asset::Weth => AssetSourceRelation::Here,
        }
    }

    fn treasury_account(&self) -> Option<Account> {
        Some(Account::Treasury)
    }
}
