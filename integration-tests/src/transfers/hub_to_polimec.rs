use subxt::tx::DefaultPayload;
use tracing::info;

use super::{FeeModel, TransferTest, transfer_charges, verify_balances};
use crate::error::Result;
use crate::fees::estimate_remote_execution_fee;
use crate::managers::{ChainManager, PolimecManager, PolkadotHubManager};
use crate::payload::{TransferAssets, create_transfer_data};
use crate::types::{BalanceCheck, TransferOptions, TransferResult};

/// Reserve transfer from the Hub into Polimec. Polimec's treasury collects
/// the execution fee.
pub struct HubToPolimecTransfer {
    source: PolkadotHubManager,
    dest: PolimecManager,
    fee_model: FeeModel,
}

impl HubToPolimecTransfer {
    pub fn new(source: PolkadotHubManager, dest: PolimecManager) -> Self {
        Self {
            source,
            dest,
            fee_model: FeeModel::Exact,
        }
    }

    pub fn with_fee_model(mut self, fee_model: FeeModel) -> Self {
        self.fee_model = fee_model;
        self
    }

    fn transfer_call(&self, options: &TransferOptions) -> Result<DefaultPayload<TransferAssets>> {
        let data = create_transfer_data(
            self.source.chain(),
            self.dest.chain(),
            &options.assets,
            Some(options.account),
            options.fee_index(),
        )?;
        Ok(data.call(self.source.xcm_pallet()))
    }
}

impl Default for HubToPolimecTransfer {
    fn default() -> Self {
        Self::new(PolkadotHubManager::new(), PolimecManager::new())
    }
}

impl TransferTest for HubToPolimecTransfer {
    type Source = PolkadotHubManager;
    type Dest = PolimecManager;

    fn source(&self) -> &PolkadotHubManager {
        &self.source
    }

    fn source_mut(&mut self) -> &mut PolkadotHubManager {
        &mut self.source
    }

    fn dest(&self) -> &PolimecManager {
        &self.dest
    }

    fn dest_mut(&mut self) -> &mut PolimecManager {
        &mut self.dest
    }

    async fn execute_transfer(&self, options: &TransferOptions) -> Result<TransferResult> {
        let (source_block, destination_block) =
            futures::try_join!(self.source.block_number(), self.dest.block_number())?;
        let call = self.transfer_call(options)?;
        self.source.submit(&call, options.account).await?;
        Ok(TransferResult {
            source_block,
            destination_block,
            ..Default::default()
        })
    }

    async fn verify_final_balances(
        &self,
        initial: &[BalanceCheck],
        finals: &[BalanceCheck],
        options: &TransferOptions,
    ) -> Result<()> {
        let extrinsic_fee = self.source.transaction_fee().await?;
        let delivery_fee = self.source.xcm_fee().await?;
        let call = self.transfer_call(options)?;
        let destination_fee = estimate_remote_execution_fee(
            &self.source,
            &self.dest,
            &call,
            options.account,
            options.fee_asset()?,
        )
        .await?;
        info!(extrinsic_fee, delivery_fee, destination_fee, "hub -> polimec fees");

        let charges = transfer_charges(
            options,
            self.source.chain().native_asset(),
            extrinsic_fee + delivery_fee,
            destination_fee,
            true,
        )?;
        verify_balances(options, initial, finals, &charges, self.fee_model)
    }
}
