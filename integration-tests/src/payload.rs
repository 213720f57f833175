//! Call payloads submitted to the XCM pallets.
//!
//! Every XCM typed argument is SCALE encoded by `staging-xcm` and handed to
//! subxt through [`Static`], so the runtime metadata only has to agree on
//! the byte layout, not on the Rust types.

use parity_scale_codec::{Decode, Encode};
use subxt::ext::scale_encode::EncodeAsType;
use subxt::utils::Static;
use xcm::v4::{
    AssetFilter, AssetId, Assets, Instruction, Junction, Location, WeightLimit, WildAsset, Xcm,
};
use xcm::{VersionedAssetId, VersionedAssets, VersionedLocation, VersionedXcm};

use crate::constants::{
    BRIDGE_PALLET_INSTANCE, BRIDGED_DOT_EXECUTION, BRIDGED_DOT_TELEPORT, BRIDGED_TOPIC,
    MULTI_HOP_BUY_EXECUTION, para_ids,
};
use crate::error::{Error, Result};
use crate::location::{self, account_location, asset_location, chain_location, ethereum, fungible};
use crate::types::{Account, Asset, AssetSourceRelation, AssetTransfer, Chain};

/// How `transfer_assets_using_type_and_then` moves assets and fees.
#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode)]
pub enum TransferType {
    Teleport,
    LocalReserve,
    DestinationReserve,
    RemoteReserve(VersionedLocation),
}

/// Arguments of `transfer_assets`.
#[derive(Clone, Debug, EncodeAsType)]
#[encode_as_type(crate_path = "::subxt::ext::scale_encode")]
pub struct TransferAssets {
    pub dest: Static<VersionedLocation>,
    pub beneficiary: Static<VersionedLocation>,
    pub assets: Static<VersionedAssets>,
    pub fee_asset_item: u32,
    pub weight_limit: Static<WeightLimit>,
}

/// Arguments of `transfer_assets_using_type_and_then`.
#[derive(Clone, Debug, EncodeAsType)]
#[encode_as_type(crate_path = "::subxt::ext::scale_encode")]
pub struct TransferAssetsUsingTypeAndThen {
    pub dest: Static<VersionedLocation>,
    pub assets: Static<VersionedAssets>,
    pub assets_transfer_type: Static<TransferType>,
    pub remote_fees_id: Static<VersionedAssetId>,
    pub fees_transfer_type: Static<TransferType>,
    pub custom_xcm_on_dest: Static<VersionedXcm<()>>,
    pub weight_limit: Static<WeightLimit>,
}

/// Arguments of `send`.
#[derive(Clone, Debug, EncodeAsType)]
#[encode_as_type(crate_path = "::subxt::ext::scale_encode")]
pub struct XcmSend {
    pub dest: Static<VersionedLocation>,
    pub message: Static<VersionedXcm<()>>,
}

impl TransferAssets {
    pub fn call(self, pallet: &str) -> subxt::tx::DefaultPayload<Self> {
        subxt::tx::DefaultPayload::new(pallet, "transfer_assets", self)
    }

    /// Assets as a v4 list, whatever version the payload was built with.
    pub fn asset_list(&self) -> Result<Assets> {
        Assets::try_from(self.assets.0.clone())
            .map_err(|()| Error::Config("assets cannot be expressed in XCM v4".into()))
    }
}

impl TransferAssetsUsingTypeAndThen {
    pub fn call(self, pallet: &str) -> subxt::tx::DefaultPayload<Self> {
        subxt::tx::DefaultPayload::new(pallet, "transfer_assets_using_type_and_then", self)
    }
}

impl XcmSend {
    pub fn call(self, pallet: &str) -> subxt::tx::DefaultPayload<Self> {
        subxt::tx::DefaultPayload::new(pallet, "send", self)
    }
}

/// Builds `transfer_assets` from `from` to the parachain `to`.
///
/// `fee_index` points into `transfers`. The encoded asset list is sorted, so
/// the index is translated to the fee asset's position in that list.
pub fn create_transfer_data(
    from: Chain,
    to: Chain,
    transfers: &[AssetTransfer],
    recv: Option<Account>,
    fee_index: usize,
) -> Result<TransferAssets> {
    let dest = chain_location(from, to)?;
    let beneficiary = account_location(recv.unwrap_or(Account::Alice))?;
    let fee = transfers
        .get(fee_index)
        .ok_or_else(|| Error::Config(format!("fee asset index {fee_index} out of range")))?;
    let fee_location = asset_location(fee.asset, fee.relation)?;
    let assets = location::assets(transfers)?;
    let fee_asset_item = location::position_of(&assets, &fee_location)
        .ok_or_else(|| Error::Config(format!("fee asset {:?} missing from assets", fee.asset)))?;

    Ok(TransferAssets {
        dest: Static(VersionedLocation::V4(dest)),
        beneficiary: Static(VersionedLocation::V4(beneficiary)),
        assets: Static(VersionedAssets::V4(assets)),
        fee_asset_item: fee_asset_item as u32,
        weight_limit: Static(WeightLimit::Unlimited),
    })
}

/// DOT from the relay to Polimec, teleported to the Hub and reserve
/// deposited from there.
pub fn create_dot_multi_hop_transfer_data(
    amount: u128,
    recv: Option<Account>,
) -> Result<TransferAssetsUsingTypeAndThen> {
    let beneficiary = account_location(recv.unwrap_or(Account::Alice))?;
    let dot_here = fungible(Asset::Dot, AssetSourceRelation::Here, amount)?;
    let hub_fee = fungible(Asset::Dot, AssetSourceRelation::Parent, MULTI_HOP_BUY_EXECUTION)?;

    let on_hub = Xcm::<()>(vec![Instruction::DepositReserveAsset {
        assets: AssetFilter::Wild(WildAsset::AllCounted(1)),
        dest: location::parachain_location(Chain::PolkadotHub, para_ids::POLIMEC),
        xcm: Xcm(vec![
            Instruction::BuyExecution {
                fees: hub_fee,
                weight_limit: WeightLimit::Unlimited,
            },
            Instruction::DepositAsset {
                assets: AssetFilter::Wild(WildAsset::AllCounted(1)),
                beneficiary,
            },
        ]),
    }]);

    Ok(TransferAssetsUsingTypeAndThen {
        dest: Static(VersionedLocation::V4(location::parachain_location(
            Chain::Polkadot,
            para_ids::POLKADOT_HUB,
        ))),
        assets: Static(VersionedAssets::V4(Assets::from(vec![dot_here]))),
        assets_transfer_type: Static(TransferType::Teleport),
        remote_fees_id: Static(VersionedAssetId::V4(AssetId(Location::here()))),
        fees_transfer_type: Static(TransferType::Teleport),
        custom_xcm_on_dest: Static(VersionedXcm::V4(on_hub)),
        weight_limit: Static(WeightLimit::Unlimited),
    })
}

/// Message the Ethereum bridge delivers to the Hub for an inbound WETH
/// transfer forwarded to Polimec.
pub fn bridged_weth_message(amount: u128, recv: Option<Account>) -> Result<Xcm<()>> {
    let beneficiary = account_location(recv.unwrap_or(Account::Alice))?;
    let dot = |amount| fungible(Asset::Dot, AssetSourceRelation::Parent, amount);
    let weth = fungible(Asset::Weth, AssetSourceRelation::Here, amount)?;
    let execution = dot(BRIDGED_DOT_EXECUTION)?;

    Ok(Xcm(vec![
        Instruction::ReceiveTeleportedAsset(Assets::from(vec![dot(BRIDGED_DOT_TELEPORT)?])),
        Instruction::BuyExecution {
            fees: execution.clone(),
            weight_limit: WeightLimit::Unlimited,
        },
        Instruction::DescendOrigin(Junction::PalletInstance(BRIDGE_PALLET_INSTANCE).into()),
        Instruction::UniversalOrigin(ethereum()),
        Instruction::ReserveAssetDeposited(Assets::from(vec![weth.clone()])),
        Instruction::ClearOrigin,
        Instruction::SetAppendix(Xcm(vec![Instruction::DepositAsset {
            assets: AssetFilter::Wild(WildAsset::AllCounted(2)),
            beneficiary: Location::new(2, [ethereum()]),
        }])),
        Instruction::DepositReserveAsset {
            assets: AssetFilter::Definite(Assets::from(vec![execution.clone(), weth])),
            dest: location::parachain_location(Chain::PolkadotHub, para_ids::POLIMEC),
            xcm: Xcm(vec![
                Instruction::BuyExecution {
                    fees: execution,
                    weight_limit: WeightLimit::Unlimited,
                },
                Instruction::DepositAsset {
                    assets: AssetFilter::Wild(WildAsset::AllCounted(2)),
                    beneficiary,
                },
                Instruction::SetTopic(BRIDGED_TOPIC),
            ]),
        },
        Instruction::SetTopic(BRIDGED_TOPIC),
    ]))
}

/// `send` from BridgeHub to the Hub carrying [`bridged_weth_message`].
pub fn create_bridged_send(message: Xcm<()>) -> Result<XcmSend> {
    Ok(XcmSend {
        dest: Static(VersionedLocation::V4(chain_location(Chain::BridgeHub, Chain::PolkadotHub)?)),
        message: Static(VersionedXcm::V4(message)),
    })
}
