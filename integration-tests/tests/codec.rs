//! Properties of the location codec and payload builder that hold without
//! a running network.
//!
//! ## Running
//!
//! ```bash
//! cargo test -p xcm-transfer-tests --test codec
//! ```

use std::collections::HashSet;

use anyhow::Result;
use parity_scale_codec::{Decode, Encode};
use xcm::VersionedLocation;
use xcm_transfer_tests::constants::transfer_amounts;
use xcm_transfer_tests::location::{asset_location, versioned_asset_location};
use xcm_transfer_tests::managers::ChainConnection;
use xcm_transfer_tests::payload::create_transfer_data;
use xcm_transfer_tests::{
    Account, Asset, AssetSourceRelation, AssetTransfer, Chain, ChainManager, create_chain_manager,
};

const RELATIONS: [AssetSourceRelation; 3] = [
    AssetSourceRelation::Parent,
    AssetSourceRelation::Sibling,
    AssetSourceRelation::Here,
];

#[test]
fn locations_are_deterministic() {
    for asset in Asset::ALL {
        for relation in RELATIONS {
            let first = asset_location(asset, relation).ok();
            let second = asset_location(asset, relation).ok();
            assert_eq!(first, second, "{asset:?} / {relation:?}");
        }
    }
}

/// Every parachain must see each asset it knows about at a distinct location.
/// The relay only ever holds DOT, so it is left out.
#[test]
fn locations_are_distinct_per_chain() -> Result<()> {
    for chain in [Chain::Polimec, Chain::PolkadotHub, Chain::BridgeHub] {
        let manager = create_chain_manager(chain);
        let mut seen = HashSet::new();
        for asset in Asset::ALL {
            let location = asset_location(asset, manager.asset_source_relation(asset))?;
            assert!(seen.insert(location.encode()), "{chain:?}: {asset:?} collides");
        }
    }
    Ok(())
}

#[test]
fn versioned_locations_survive_scale() -> Result<()> {
    for asset in Asset::ALL {
        for relation in RELATIONS {
            let Ok(location) = versioned_asset_location(asset, relation) else {
                continue;
            };
            let decoded = VersionedLocation::decode(&mut &location.encode()[..])?;
            assert_eq!(decoded, location);
        }
    }
    Ok(())
}

#[test]
fn payload_asset_ids_match_codec() -> Result<()> {
    let transfers = vec![
        AssetTransfer::new(Asset::Dot, transfer_amounts::NATIVE, AssetSourceRelation::Parent),
        AssetTransfer::new(Asset::Usdt, transfer_amounts::TOKENS, AssetSourceRelation::Here),
        AssetTransfer::new(Asset::Usdc, transfer_amounts::TOKENS, AssetSourceRelation::Here),
    ];
    let data = create_transfer_data(Chain::PolkadotHub, Chain::Polimec, &transfers, None, 0)?;
    let assets = data.asset_list()?;
    assert_eq!(assets.len(), transfers.len());
    for transfer in &transfers {
        let location = asset_location(transfer.asset, transfer.relation)?;
        assert!(
            assets.inner().iter().any(|a| a.id.0 == location),
            "{:?} missing from payload",
            transfer.asset
        );
    }
    // local assets sort before the parent's DOT
    assert_eq!(data.fee_asset_item, 2);
    Ok(())
}

#[test]
fn transfers_to_the_relay_are_rejected() {
    let transfers = [AssetTransfer::new(Asset::Dot, 1, AssetSourceRelation::Parent)];
    let res =
        create_transfer_data(Chain::Polimec, Chain::Polkadot, &transfers, Some(Account::Bob), 0);
    assert!(res.is_err());
}

#[test]
fn disconnect_without_connect_is_a_no_op() {
    for chain in Chain::ALL {
        let mut manager = create_chain_manager(chain);
        manager.disconnect();
        manager.disconnect();
        assert!(!manager.connection().is_connected());
    }
    let mut connection = ChainConnection::new(Chain::Polimec);
    connection.disconnect();
}
