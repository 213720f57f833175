use subxt::tx::DefaultPayload;
use tracing::info;

use super::{FeeModel, TransferTest, transfer_charges, verify_balances};
use crate::error::Result;
use crate::fees::estimate_remote_execution_fee;
use crate::managers::{ChainManager, PolimecManager, PolkadotHubManager};
use crate::payload::{TransferAssets, create_transfer_data};
use crate::types::{BalanceCheck, TransferOptions, TransferResult};

/// Sends Hub assets held on Polimec back to their reserve.
pub struct PolimecToHubTransfer {
    source: PolimecManager,
    dest: PolkadotHubManager,
    fee_model: FeeModel,
}

impl PolimecToHubTransfer {
    pub fn new(source: PolimecManager, dest: PolkadotHubManager) -> Self {
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

impl Default for PolimecToHubTransfer {
    fn default() -> Self {
        Self::new(PolimecManager::new(), PolkadotHubManager::new())
    }
}

impl TransferTest for PolimecToHubTransfer {
    type Source = PolimecManager;
    type Dest = PolkadotHubManager;

    fn source(&self) -> &PolimecManager {
        &self.source
    }

    fn source_mut(&mut self) -> &mut PolimecManager {
        &mut self.source
    }

    fn dest(&self) -> &PolkadotHubManager {
        &self.dest
    }

    fn dest_mut(&mut self) -> &mut PolkadotHubManager {
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
        let delivery_fee = self.source.local_xcm_fee().await?;
        let call = self.transfer_call(options)?;
        let estimated = estimate_remote_execution_fee(
            &self.source,
            &self.dest,
            &call,
            options.account,
            options.fee_asset()?,
        )
        .await?;
        // Fees in anything but DOT are swapped on the Hub, what the swap took is the real charge.
        let swap_credit = self.dest.swap_credit().await?;
        let destination_fee = if swap_credit > 0 { swap_credit } else { estimated };
        info!(extrinsic_fee, delivery_fee, estimated, swap_credit, "polimec -> hub fees");

        // The Hub has no treasury column to check.
        let charges = transfer_charges(
            options,
            self.source.chain().native_asset(),
            extrinsic_fee + delivery_fee,
            destination_fee,
            false,
        )?;
        verify_balances(options, initial, finals, &charges, self.fee_model)
    }
}
