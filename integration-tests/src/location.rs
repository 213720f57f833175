//! Location codec: maps `(Asset, AssetSourceRelation)` to an XCM v4 location.
//!
//! The same asset yields different locations depending on which chain looks
//! at it, so callers always pass the relation of the evaluating chain. The
//! relation picks the hops in front of the asset's local junctions. `Sibling`
//! needs the asset's home parachain, so it fails for relay native assets.
//! Bridged assets ignore the relation, they always live two hops out.

use xcm::v4::{
    Asset as XcmAsset, AssetId, Assets, Fungibility, Junction, Junctions, Location, NetworkId,
};
use xcm::{VersionedAssetId, VersionedAssets, VersionedLocation};

use crate::constants::{
    ASSETS_PALLET_INSTANCE, ETHEREUM_CHAIN_ID, USDC_ASSET_INDEX, USDT_ASSET_INDEX,
    UNKNOWN_ASSET_INDEX, WETH_CONTRACT, para_ids,
};
use crate::error::{Error, Result};
use crate::types::{Account, Asset, AssetSourceRelation, AssetTransfer, Chain};

/// Chain an asset is native to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssetHome {
    Relay,
    Parachain(u32),
    Ethereum,
}

impl Asset {
    pub fn home(self) -> AssetHome {
        match self {
            Asset::Dot => AssetHome::Relay,
            Asset::Plmc => AssetHome::Parachain(para_ids::POLIMEC),
            Asset::Usdt | Asset::Usdc | Asset::Unknown => {
                AssetHome::Parachain(para_ids::POLKADOT_HUB)
            }
            Asset::Eth | Asset::Weth => AssetHome::Ethereum,
        }
    }

    /// Junctions identifying the asset inside its home chain.
    fn local_junctions(self) -> Vec<Junction> {
        match self {
            Asset::Dot | Asset::Plmc => vec![],
            Asset::Usdt => pallet_asset(USDT_ASSET_INDEX),
            Asset::Usdc => pallet_asset(USDC_ASSET_INDEX),
            Asset::Unknown => pallet_asset(UNKNOWN_ASSET_INDEX),
            Asset::Eth => vec![],
            Asset::Weth => vec![Junction::AccountKey20 {
                network: None,
                key: WETH_CONTRACT,
            }],
        }
    }
}

fn pallet_asset(index: u128) -> Vec<Junction> {
    vec![
        Junction::PalletInstance(ASSETS_PALLET_INSTANCE),
        Junction::GeneralIndex(index),
    ]
}

pub fn ethereum() -> Junction {
    Junction::GlobalConsensus(NetworkId::Ethereum {
        chain_id: ETHEREUM_CHAIN_ID,
    })
}

fn location(parents: u8, junctions: Vec<Junction>) -> Result<Location> {
    let mut interior = Junctions::Here;
    for junction in junctions {
        interior
            .push(junction)
            .map_err(|j| Error::Config(format!("location too long, cannot append {j:?}")))?;
    }
    Ok(Location::new(parents, interior))
}

/// Location of `asset` as seen by a chain holding it with `relation`.
pub fn asset_location(asset: Asset, relation: AssetSourceRelation) -> Result<Location> {
    let local = asset.local_junctions();
    match (asset.home(), relation) {
        (AssetHome::Ethereum, _) => {
            let mut junctions = vec![ethereum()];
            junctions.extend(local);
            location(2, junctions)
        }
        (_, AssetSourceRelation::Here) => location(0, local),
        (_, AssetSourceRelation::Parent) => location(1, local),
        (AssetHome::Parachain(para_id), AssetSourceRelation::Sibling) => {
            let mut junctions = vec![Junction::Parachain(para_id)];
            junctions.extend(local);
            location(1, junctions)
        }
        (AssetHome::Relay, AssetSourceRelation::Sibling) => Err(Error::MissingParachainId(asset)),
    }
}

pub fn versioned_asset_location(
    asset: Asset,
    relation: AssetSourceRelation,
) -> Result<VersionedLocation> {
    asset_location(asset, relation).map(VersionedLocation::V4)
}

pub fn versioned_asset_id(asset: Asset, relation: AssetSourceRelation) -> Result<VersionedAssetId> {
    asset_location(asset, relation).map(|l| VersionedAssetId::V4(AssetId(l)))
}

pub fn fungible(asset: Asset, relation: AssetSourceRelation, amount: u128) -> Result<XcmAsset> {
    Ok(XcmAsset {
        id: AssetId(asset_location(asset, relation)?),
        fun: Fungibility::Fungible(amount),
    })
}

/// Packs the transfers into an asset list. The list comes back sorted, as
/// XCM requires, so indices into `transfers` do not carry over.
pub fn assets(transfers: &[AssetTransfer]) -> Result<Assets> {
    let assets = transfers
        .iter()
        .map(|t| fungible(t.asset, t.relation, t.amount))
        .collect::<Result<Vec<_>>>()?;
    Ok(Assets::from(assets))
}

pub fn versioned_assets(transfers: &[AssetTransfer]) -> Result<VersionedAssets> {
    assets(transfers).map(VersionedAssets::V4)
}

/// Position of the asset with id `location` inside `assets`.
pub fn position_of(assets: &Assets, location: &Location) -> Option<usize> {
    assets.inner().iter().position(|a| &a.id.0 == location)
}

/// Fungible amount held under `location`, zero when the entry is missing.
pub fn fungible_balance(assets: &Assets, location: &Location) -> u128 {
    assets
        .inner()
        .iter()
        .find(|a| &a.id.0 == location)
        .map(|a| match a.fun {
            Fungibility::Fungible(amount) => amount,
            Fungibility::NonFungible(_) => 0,
        })
        .unwrap_or(0)
}

pub fn account_location(account: Account) -> Result<Location> {
    let id = account.account_id()?;
    Ok(Location::new(
        0,
        [Junction::AccountId32 {
            network: None,
            id: id.0,
        }],
    ))
}

/// Location of parachain `para_id` seen from `from`.
pub fn parachain_location(from: Chain, para_id: u32) -> Location {
    let parents = match from {
        Chain::Polkadot => 0,
        Chain::Polimec | Chain::PolkadotHub | Chain::BridgeHub => 1,
    };
    Location::new(parents, [Junction::Parachain(para_id)])
}

/// Location of `to` seen from `from`. Only parachains can be targeted.
pub fn chain_location(from: Chain, to: Chain) -> Result<Location> {
    let para_id = to.para_id().ok_or(Error::UnsupportedDestination(to))?;
    Ok(parachain_location(from, para_id))
}
