//! Wire types and helpers for the runtime APIs the managers call.
//!
//! `FungiblesApi` and `XcmPaymentApi` answer with plain XCM types and are
//! decoded with `parity-scale-codec`. `DryRunApi` embeds the runtime's own
//! event enum, so its effects are decoded against the chain metadata and the
//! events are kept as dynamic values.

use parity_scale_codec::{Decode, Encode};
use subxt::dynamic::Value;
use subxt::ext::scale_decode::DecodeAsType;
use subxt::ext::scale_encode::EncodeAsType;
use subxt::ext::scale_value::{Composite, ValueDef};
use subxt::utils::{Encoded, Static};
use xcm::{VersionedLocation, VersionedXcm};

use crate::error::Result;
use crate::types::Account;

pub const DRY_RUN_API: &str = "DryRunApi";
pub const FUNGIBLES_QUERY_ACCOUNT_BALANCES: &str = "FungiblesApi_query_account_balances";
pub const XCM_PAYMENT_QUERY_XCM_WEIGHT: &str = "XcmPaymentApi_query_xcm_weight";
pub const XCM_PAYMENT_QUERY_WEIGHT_TO_ASSET_FEE: &str = "XcmPaymentApi_query_weight_to_asset_fee";

/// XCM version requested for forwarded messages by `DryRunApi` v2.
pub const DRY_RUN_XCM_VERSION: u32 = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Encode, Decode)]
pub struct Weight {
    #[codec(compact)]
    pub ref_time: u64,
    #[codec(compact)]
    pub proof_size: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Encode, Decode)]
pub enum XcmPaymentApiError {
    Unimplemented,
    VersionedConversionFailed,
    WeightNotComputable,
    UnhandledXcmVersion,
    AssetNotFound,
    Unroutable,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Encode, Decode)]
pub enum FungiblesAccessError {
    AssetIdConversionFailed,
    AmountToBalanceConversionFailed,
}

/// `dry_run_call` arguments for runtimes exposing `DryRunApi` v1.
#[derive(Clone, Debug, EncodeAsType)]
#[encode_as_type(crate_path = "::subxt::ext::scale_encode")]
pub struct DryRunCallV1 {
    pub origin: Value,
    pub call: Static<Encoded>,
}

/// `dry_run_call` arguments for runtimes exposing `DryRunApi` v2.
#[derive(Clone, Debug, EncodeAsType)]
#[encode_as_type(crate_path = "::subxt::ext::scale_encode")]
pub struct DryRunCallV2 {
    pub origin: Value,
    pub call: Static<Encoded>,
    pub result_xcms_version: u32,
}

#[derive(Clone, Debug, EncodeAsType)]
#[encode_as_type(crate_path = "::subxt::ext::scale_encode")]
pub struct DryRunXcm {
    pub origin_location: Static<VersionedLocation>,
    pub xcm: Static<VersionedXcm<()>>,
}

pub type ForwardedXcms = Vec<(Static<VersionedLocation>, Vec<Static<VersionedXcm<()>>>)>;

#[derive(Clone, Debug, DecodeAsType)]
#[decode_as_type(crate_path = "::subxt::ext::scale_decode")]
pub struct CallDryRunEffects {
    pub execution_result: Value,
    pub emitted_events: Vec<Value>,
    pub local_xcm: Option<Static<VersionedXcm<()>>>,
    pub forwarded_xcms: ForwardedXcms,
}

#[derive(Clone, Debug, DecodeAsType)]
#[decode_as_type(crate_path = "::subxt::ext::scale_decode")]
pub struct XcmDryRunEffects {
    pub execution_result: Value,
    pub emitted_events: Vec<Value>,
    pub forwarded_xcms: ForwardedXcms,
}

/// Outcome of a dry run, reduced to what the scenarios assert on.
#[derive(Clone, Debug)]
pub struct DryRunOutcome {
    pub execution_result: Value,
    pub emitted_events: Vec<Value>,
    pub forwarded_xcms: Vec<(VersionedLocation, Vec<VersionedXcm<()>>)>,
}

impl DryRunOutcome {
    /// `Ok(..)` for dispatched calls, `Complete { .. }` for executed messages.
    pub fn success(&self) -> bool {
        is_success(&self.execution_result)
    }

    pub fn count_events(&self, pallet: &str, event: &str) -> usize {
        count_events(&self.emitted_events, pallet, event)
    }

    /// Messages forwarded to `dest`, matched on the destination location.
    pub fn messages_to(&self, dest: &VersionedLocation) -> Option<&[VersionedXcm<()>]> {
        self.forwarded_xcms
            .iter()
            .find(|(location, _)| same_location(location, dest))
            .map(|(_, messages)| messages.as_slice())
    }
}

fn unwrap_forwarded(forwarded: ForwardedXcms) -> Vec<(VersionedLocation, Vec<VersionedXcm<()>>)> {
    forwarded
        .into_iter()
        .map(|(location, messages)| (location.0, messages.into_iter().map(|m| m.0).collect()))
        .collect()
}

impl From<CallDryRunEffects> for DryRunOutcome {
    fn from(effects: CallDryRunEffects) -> Self {
        Self {
            execution_result: effects.execution_result,
            emitted_events: effects.emitted_events,
            forwarded_xcms: unwrap_forwarded(effects.forwarded_xcms),
        }
    }
}

impl From<XcmDryRunEffects> for DryRunOutcome {
    fn from(effects: XcmDryRunEffects) -> Self {
        Self {
            execution_result: effects.execution_result,
            emitted_events: effects.emitted_events,
            forwarded_xcms: unwrap_forwarded(effects.forwarded_xcms),
        }
    }
}

fn same_location(a: &VersionedLocation, b: &VersionedLocation) -> bool {
    match (xcm::v4::Location::try_from(a.clone()), xcm::v4::Location::try_from(b.clone())) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// `OriginCaller::system(RawOrigin::Signed(account))`.
pub fn signed_origin(account: Account) -> Result<Value> {
    let id = account.account_id()?;
    Ok(Value::unnamed_variant(
        "system",
        [Value::unnamed_variant("Signed", [Value::from_bytes(id.0)])],
    ))
}

/// `OriginCaller::system(RawOrigin::Root)`.
pub fn root_origin() -> Value {
    Value::unnamed_variant("system", [Value::unnamed_variant("Root", [])])
}

pub fn variant_name<T>(value: &subxt::ext::scale_value::Value<T>) -> Option<&str> {
    match &value.value {
        ValueDef::Variant(variant) => Some(variant.name.as_str()),
        _ => None,
    }
}

pub fn is_success<T>(result: &subxt::ext::scale_value::Value<T>) -> bool {
    matches!(variant_name(result), Some("Ok" | "Complete"))
}

/// Runtime events are `Pallet(Event { .. })` variants.
pub fn is_event<T>(event: &subxt::ext::scale_value::Value<T>, pallet: &str, name: &str) -> bool {
    let ValueDef::Variant(outer) = &event.value else {
        return false;
    };
    outer.name == pallet && first_field(&outer.values).and_then(variant_name) == Some(name)
}

fn first_field<T>(composite: &Composite<T>) -> Option<&subxt::ext::scale_value::Value<T>> {
    composite.values().next()
}

pub fn count_events<T>(
    events: &[subxt::ext::scale_value::Value<T>],
    pallet: &str,
    name: &str,
) -> usize {
    events.iter().filter(|e| is_event(e, pallet, name)).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(pallet: &str, name: &str) -> Value {
        Value::unnamed_variant(
            pallet,
            [Value::named_variant(name, [("amount", Value::u128(1))])],
        )
    }

    #[test]
    fn matches_pallet_and_event() {
        let events = vec![
            event("ForeignAssets", "Issued"),
            event("Assets", "Issued"),
            event("ForeignAssets", "Burned"),
            event("ForeignAssets", "Issued"),
        ];
        assert_eq!(count_events(&events, "ForeignAssets", "Issued"), 2);
        assert_eq!(count_events(&events, "Balances", "Issued"), 0);
        assert!(!is_event(&Value::u128(3), "ForeignAssets", "Issued"));
    }

    #[test]
    fn success_variants() {
        assert!(is_success(&Value::unnamed_variant("Ok", [Value::unnamed_composite([])])));
        assert!(is_success(&Value::named_variant("Complete", [("used", Value::u128(0))])));
        assert!(!is_success(&Value::unnamed_variant("Incomplete", [])));
        assert!(!is_success(&Value::unnamed_variant("Err", [])));
    }

    #[test]
    fn origins() {
        let origin = signed_origin(Account::Alice).unwrap();
        assert_eq!(variant_name(&origin), Some("system"));
        assert_eq!(variant_name(&root_origin()), Some("system"));
    }

    #[test]
    fn weight_is_compact() {
        let weight = Weight {
            ref_time: 1,
            proof_size: 1,
        };
        assert_eq!(weight.encode(), vec![4, 4]);
        let res: core::result::Result<Weight, XcmPaymentApiError> =
            Decode::decode(&mut &[1u8, 4][..]).unwrap();
        assert_eq!(res, Err(XcmPaymentApiError::VersionedConversionFailed));
    }
}
