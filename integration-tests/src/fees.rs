//! Execution fee a destination charges for a message, estimated by dry
//! running the originating call.

use subxt::tx::Payload;
use tracing::debug;
use xcm::VersionedLocation;

use crate::error::{Error, Result};
use crate::location::{chain_location, versioned_asset_id};
use crate::managers::ChainManager;
use crate::runtime_api::signed_origin;
use crate::types::{Account, Asset};

/// Dry runs `call` on `source` as `account`, then prices the message it
/// forwards to `dest` in `fee_asset`, seen from `dest`.
pub async fn estimate_remote_execution_fee<S, D, Call>(
    source: &S,
    dest: &D,
    call: &Call,
    account: Account,
    fee_asset: Asset,
) -> Result<u128>
where
    S: ChainManager,
    D: ChainManager,
    Call: Payload,
{
    let outcome = source
        .connection()
        .dry_run_call(signed_origin(account)?, call)
        .await?;
    if !outcome.success() {
        return Err(Error::DryRunFailed(format!(
            "{:?}: {}",
            source.chain(),
            outcome.execution_result
        )));
    }

    let target = VersionedLocation::V4(chain_location(source.chain(), dest.chain())?);
    let message = outcome
        .messages_to(&target)
        .and_then(|messages| messages.first())
        .ok_or_else(|| {
            Error::DryRunFailed(format!(
                "no message from {:?} to {:?}",
                source.chain(),
                dest.chain()
            ))
        })?;

    let weight = dest.connection().query_xcm_weight(message).await?;
    let asset_id = versioned_asset_id(fee_asset, dest.asset_source_relation(fee_asset))?;
    let fee = dest.connection().query_weight_to_asset_fee(weight, &asset_id).await?;
    debug!(
        source = ?source.chain(),
        dest = ?dest.chain(),
        ?fee_asset,
        ?weight,
        fee,
        "remote execution fee"
    );
    Ok(fee)
}
