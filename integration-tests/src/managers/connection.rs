//! Live connection to one simulated chain.

use std::str::FromStr;

use futures::StreamExt;
use parity_scale_codec::Encode;
use subxt::dynamic::Value;
use subxt::events::Events;
use subxt::ext::scale_value::{At, Composite, ValueDef};
use subxt::runtime_api::DefaultPayload as RuntimeApiPayload;
use subxt::tx::Payload;
use subxt::utils::{Encoded, H256, Static};
use subxt::{OnlineClient, PolkadotConfig};
use subxt_signer::SecretUri;
use subxt_signer::sr25519::Keypair;
use tracing::{debug, info};
use xcm::{VersionedAssetId, VersionedAssets, VersionedLocation, VersionedXcm};

use crate::error::{Error, Result};
use crate::runtime_api::{
    CallDryRunEffects, DRY_RUN_API, DRY_RUN_XCM_VERSION, DryRunCallV1, DryRunCallV2,
    DryRunOutcome, DryRunXcm, FUNGIBLES_QUERY_ACCOUNT_BALANCES, FungiblesAccessError,
    XCM_PAYMENT_QUERY_WEIGHT_TO_ASSET_FEE, XCM_PAYMENT_QUERY_XCM_WEIGHT, Weight,
    XcmDryRunEffects, XcmPaymentApiError,
};
use crate::types::{Account, Chain};

pub type ChainClient = OnlineClient<PolkadotConfig>;

type CallDryRunResult = core::result::Result<CallDryRunEffects, Value>;
type XcmDryRunResult = core::result::Result<XcmDryRunEffects, Value>;

/// `MessageQueue.Processed` as seen by the scenarios.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProcessedMessage {
    pub success: bool,
}

/// Signer for `account`, derived from the development phrase.
pub fn signer_for(account: Account) -> Result<Keypair> {
    let path = account.derivation_path().ok_or(Error::UnknownAccount(account))?;
    let uri = SecretUri::from_str(path).map_err(|_| Error::UnknownAccount(account))?;
    Keypair::from_uri(&uri).map_err(|_| Error::UnknownAccount(account))
}

/// Owned handle to a chain's RPC client. Created disconnected.
pub struct ChainConnection {
    chain: Chain,
    endpoint: String,
    client: Option<ChainClient>,
}

impl ChainConnection {
    pub fn new(chain: Chain) -> Self {
        Self::with_endpoint(chain, chain.endpoint())
    }

    pub fn with_endpoint(chain: Chain, endpoint: impl Into<String>) -> Self {
        Self {
            chain,
            endpoint: endpoint.into(),
            client: None,
        }
    }

    pub fn chain(&self) -> Chain {
        self.chain
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn is_connected(&self) -> bool {
        self.client.is_some()
    }

    pub async fn connect(&mut self) -> Result<()> {
        if self.client.is_some() {
            return Ok(());
        }
        let client = ChainClient::from_insecure_url(&self.endpoint).await?;
        info!(chain = ?self.chain, endpoint = %self.endpoint, "connected");
        self.client = Some(client);
        Ok(())
    }

    /// Drops the client. Never connected is fine.
    pub fn disconnect(&mut self) {
        if self.client.take().is_some() {
            debug!(chain = ?self.chain, "disconnected");
        }
    }

    pub fn client(&self) -> Result<&ChainClient> {
        self.client.as_ref().ok_or(Error::NotConnected(self.chain))
    }

    pub async fn block_number(&self) -> Result<u32> {
        let block = self.client()?.blocks().at_latest().await?;
        Ok(block.number())
    }

    /// Returns the first finalized height above `watermark`.
    pub async fn wait_for_next_block(&self, watermark: u32) -> Result<u32> {
        let client = self.client()?;
        let mut blocks = client.blocks().subscribe_finalized().await?;
        let current = self.block_number().await?;
        if current > watermark {
            return Ok(current);
        }
        while let Some(block) = blocks.next().await {
            let number = block?.number();
            if number > watermark {
                debug!(chain = ?self.chain, watermark, number, "new block");
                return Ok(number);
            }
        }
        Err(Error::SubscriptionClosed(self.chain))
    }

    pub async fn latest_events(&self) -> Result<Events<PolkadotConfig>> {
        let block = self.client()?.blocks().at_latest().await?;
        Ok(block.events().await?)
    }

    /// Field values of every `pallet.event` in the latest block.
    pub async fn events_named(&self, pallet: &str, event: &str) -> Result<Vec<Composite<u32>>> {
        let events = self.latest_events().await?;
        let mut found = Vec::new();
        for ev in events.iter() {
            let ev = ev?;
            if ev.pallet_name() == pallet && ev.variant_name() == event {
                found.push(ev.field_values()?);
            }
        }
        Ok(found)
    }

    pub async fn message_queue_events(&self) -> Result<Vec<ProcessedMessage>> {
        let events = self.events_named("MessageQueue", "Processed").await?;
        Ok(events
            .iter()
            .map(|fields| ProcessedMessage {
                success: fields.at("success").and_then(|v| v.as_bool()).unwrap_or(false),
            })
            .collect())
    }

    /// `field` of the first `pallet.event` in the latest block, zero if absent.
    pub async fn first_event_amount(&self, pallet: &str, event: &str, field: &str) -> Result<u128> {
        let events = self.events_named(pallet, event).await?;
        Ok(events
            .first()
            .and_then(|fields| fields.at(field))
            .and_then(|v| v.as_u128())
            .unwrap_or(0))
    }

    pub async fn extrinsic_fee(&self) -> Result<u128> {
        self.first_event_amount("TransactionPayment", "TransactionFeePaid", "actual_fee")
            .await
    }

    /// First fungible amount of the first `FeesPaid` emitted by `pallet`.
    pub async fn xcm_fees_paid(&self, pallet: &str) -> Result<u128> {
        let events = self.events_named(pallet, "FeesPaid").await?;
        Ok(events
            .first()
            .and_then(|fields| fields.at("fees"))
            .and_then(first_fungible)
            .unwrap_or(0))
    }

    pub async fn native_balance_of(&self, account: Account) -> Result<u128> {
        let id = account.account_id()?;
        let query = subxt::dynamic::storage("System", "Account", vec![Value::from_bytes(id.0)]);
        let entry = self.client()?.storage().at_latest().await?.fetch(&query).await?;
        let account = entry.map(|e| e.to_value()).transpose()?;
        Ok(free_balance(account.as_ref()))
    }

    /// Every balance the runtime reports for `account`, as a v4 list.
    pub async fn account_balances(&self, account: Account) -> Result<xcm::v4::Assets> {
        let id = account.account_id()?;
        let res: core::result::Result<VersionedAssets, FungiblesAccessError> = self
            .client()?
            .runtime_api()
            .at_latest()
            .await?
            .call_raw(FUNGIBLES_QUERY_ACCOUNT_BALANCES, Some(id.0.encode().as_slice()))
            .await?;
        let assets = res.map_err(|e| {
            Error::RuntimeApi(format!("{FUNGIBLES_QUERY_ACCOUNT_BALANCES}: {e:?}"))
        })?;
        xcm::v4::Assets::try_from(assets)
            .map_err(|()| Error::RuntimeApi("account balances not convertible to XCM v4".into()))
    }

    /// Signs `call` with `signer` and waits until it is finalized.
    pub async fn submit<Call: Payload>(&self, call: &Call, signer: &Keypair) -> Result<H256> {
        let events = self
            .client()?
            .tx()
            .sign_and_submit_then_watch_default(call, signer)
            .await?
            .wait_for_finalized_success()
            .await?;
        info!(chain = ?self.chain, block = ?events.block_hash(), "extrinsic included");
        Ok(events.block_hash())
    }

    pub fn call_data<Call: Payload>(&self, call: &Call) -> Result<Vec<u8>> {
        Ok(self.client()?.tx().call_data(call)?)
    }

    /// Dry runs `call` dispatched from `origin` against the latest state.
    pub async fn dry_run_call<Call: Payload>(
        &self,
        origin: Value,
        call: &Call,
    ) -> Result<DryRunOutcome> {
        let client = self.client()?;
        let call = Static(Encoded(self.call_data(call)?));
        let inputs = client
            .metadata()
            .runtime_api_trait_by_name(DRY_RUN_API)
            .and_then(|api| api.method_by_name("dry_run_call").map(|m| m.inputs().len()))
            .ok_or_else(|| Error::RuntimeApi(format!("{:?} has no DryRunApi", self.chain)))?;

        let api = client.runtime_api().at_latest().await?;
        let res = if inputs > 2 {
            let args = DryRunCallV2 {
                origin,
                call,
                result_xcms_version: DRY_RUN_XCM_VERSION,
            };
            let payload = RuntimeApiPayload::<_, CallDryRunResult>::new(
                DRY_RUN_API,
                "dry_run_call",
                args,
            );
            api.call(payload).await?
        } else {
            let payload = RuntimeApiPayload::<_, CallDryRunResult>::new(
                DRY_RUN_API,
                "dry_run_call",
                DryRunCallV1 { origin, call },
            );
            api.call(payload).await?
        };
        let effects = res.map_err(|e| Error::DryRunFailed(format!("{:?}: {e}", self.chain)))?;
        let outcome = DryRunOutcome::from(effects);
        debug!(chain = ?self.chain, success = outcome.success(), "dry_run_call");
        Ok(outcome)
    }

    /// Dry runs `xcm` as if it arrived from `origin`.
    pub async fn dry_run_xcm(
        &self,
        origin: VersionedLocation,
        xcm: VersionedXcm<()>,
    ) -> Result<DryRunOutcome> {
        let payload = RuntimeApiPayload::<_, XcmDryRunResult>::new(
            DRY_RUN_API,
            "dry_run_xcm",
            DryRunXcm {
                origin_location: Static(origin),
                xcm: Static(xcm),
            },
        );
        let res = self.client()?.runtime_api().at_latest().await?.call(payload).await?;
        let effects = res.map_err(|e| Error::DryRunFailed(format!("{:?}: {e}", self.chain)))?;
        let outcome = DryRunOutcome::from(effects);
        debug!(chain = ?self.chain, success = outcome.success(), "dry_run_xcm");
        Ok(outcome)
    }

    pub async fn query_xcm_weight(&self, message: &VersionedXcm<()>) -> Result<Weight> {
        let res: core::result::Result<Weight, XcmPaymentApiError> = self
            .client()?
            .runtime_api()
            .at_latest()
            .await?
            .call_raw(XCM_PAYMENT_QUERY_XCM_WEIGHT, Some(message.encode().as_slice()))
            .await?;
        res.map_err(|e| Error::RuntimeApi(format!("{XCM_PAYMENT_QUERY_XCM_WEIGHT}: {e:?}")))
    }

    pub async fn query_weight_to_asset_fee(
        &self,
        weight: Weight,
        asset: &VersionedAssetId,
    ) -> Result<u128> {
        let res: core::result::Result<u128, XcmPaymentApiError> = self
            .client()?
            .runtime_api()
            .at_latest()
            .await?
            .call_raw(
                XCM_PAYMENT_QUERY_WEIGHT_TO_ASSET_FEE,
                Some((weight, asset).encode().as_slice()),
            )
            .await?;
        res.map_err(|e| {
            Error::RuntimeApi(format!("{XCM_PAYMENT_QUERY_WEIGHT_TO_ASSET_FEE}: {e:?}"))
        })
    }
}

/// `data.free` of a `System.Account` entry. Accounts without an entry hold
/// nothing.
pub fn free_balance<T>(account: Option<&subxt::ext::scale_value::Value<T>>) -> u128 {
    account
        .and_then(|a| a.at("data").at("free"))
        .and_then(|v| v.as_u128())
        .unwrap_or(0)
}

/// Amount of the first `Fungible(..)` found in an event field.
///
/// Asset lists nest differently across XCM versions, so the value is
/// searched instead of navigated.
pub fn first_fungible<T>(value: &subxt::ext::scale_value::Value<T>) -> Option<u128> {
    match &value.value {
        ValueDef::Variant(variant) if variant.name == "Fungible" => {
            variant.values.values().next().and_then(|v| v.as_u128())
        }
        ValueDef::Variant(variant) => variant.values.values().find_map(first_fungible),
        ValueDef::Composite(composite) => composite.values().find_map(first_fungible),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signers_for_dev_accounts() {
        let alice = signer_for(Account::Alice).unwrap();
        assert_eq!(
            alice.public_key().to_account_id(),
            Account::Alice.account_id().unwrap()
        );
        let charlie = signer_for(Account::BridgeRelayer).unwrap();
        assert_eq!(
            charlie.public_key().to_account_id(),
            Account::BridgeRelayer.account_id().unwrap()
        );
        assert!(matches!(
            signer_for(Account::Treasury),
            Err(Error::UnknownAccount(Account::Treasury))
        ));
    }

    #[test]
    fn disconnect_without_connect() {
        let mut conn = ChainConnection::new(Chain::Polimec);
        conn.disconnect();
        assert!(!conn.is_connected());
        assert!(matches!(conn.client(), Err(Error::NotConnected(Chain::Polimec))));
    }

    #[test]
    fn missing_account_has_no_free_balance() {
        assert_eq!(free_balance::<()>(None), 0);
        let account = Value::named_composite([
            ("nonce", Value::u128(0)),
            (
                "data",
                Value::named_composite([
                    ("free", Value::u128(1_000)),
                    ("reserved", Value::u128(5)),
                ]),
            ),
        ]);
        assert_eq!(free_balance(Some(&account)), 1_000);
        assert_eq!(free_balance(Some(&Value::named_composite([("nonce", Value::u128(3))]))), 0);
    }

    #[test]
    fn fungible_amount_is_found_in_nested_assets() {
        let asset = Value::named_composite([
            ("id", Value::unnamed_composite([Value::u128(1)])),
            ("fun", Value::unnamed_variant("Fungible", [Value::u128(4242)])),
        ]);
        let fees = Value::unnamed_composite([Value::unnamed_composite([asset])]);
        assert_eq!(first_fungible(&fees), Some(4242));
        assert_eq!(first_fungible(&Value::unnamed_composite([])), None);
    }
}
