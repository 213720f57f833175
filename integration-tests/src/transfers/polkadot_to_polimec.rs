use tracing::info;

use super::{FeeModel, TransferTest, transfer_charges, verify_balances};
use crate::constants::MULTI_HOP_HUB_FEE;
use crate::error::Result;
use crate::managers::{ChainManager, PolimecManager, PolkadotHubManager, PolkadotManager};
use crate::payload::create_dot_multi_hop_transfer_data;
use crate::types::{BalanceCheck, TransferOptions, TransferResult};

/// DOT from the relay to Polimec through the Hub: teleported to the Hub,
/// then reserve deposited into Polimec.
///
/// The Hub fee is a calibrated constant and Polimec's own execution fee is
/// not estimated, so the destination is checked within a 1% band.
pub struct PolkadotToPolimecTransfer {
    source: PolkadotManager,
    hop: PolkadotHubManager,
    dest: PolimecManager,
    fee_model: FeeModel,
}

impl PolkadotToPolimecTransfer {
    pub fn new(source: PolkadotManager, hop: PolkadotHubManager, dest: PolimecManager) -> Self {
        Self {
            source,
            hop,
            dest,
            fee_model: FeeModel::Tolerance {
                parts_per_million: 10_000,
            },
        }
    }

    pub fn with_fee_model(mut self, fee_model: FeeModel) -> Self {
        self.fee_model = fee_model;
        self
    }
}

impl Default for PolkadotToPolimecTransfer {
    fn default() -> Self {
        Self::new(PolkadotManager::new(), PolkadotHubManager::new(), PolimecManager::new())
    }
}

impl TransferTest for PolkadotToPolimecTransfer {
    type Source = PolkadotManager;
    type Dest = PolimecManager;

    fn source(&self) -> &PolkadotManager {
        &self.source
    }

    fn source_mut(&mut self) -> &mut PolkadotManager {
        &mut self.source
    }

    fn dest(&self) -> &PolimecManager {
        &self.dest
    }

    fn dest_mut(&mut self) -> &mut PolimecManager {
        &mut self.dest
    }

    async fn connect(&mut self) -> Result<()> {
        self.source.connect().await?;
        self.hop.connect().await?;
        self.dest.connect().await
    }

    fn disconnect(&mut self) {
        self.source.disconnect();
        self.hop.disconnect();
        self.dest.disconnect();
    }

    async fn execute_transfer(&self, options: &TransferOptions) -> Result<TransferResult> {
        let (source_block, hop_block, destination_block) = futures::try_join!(
            self.source.block_number(),
            self.hop.block_number(),
            self.dest.block_number()
        )?;
        let amount = options.assets[0].amount;
        let call = create_dot_multi_hop_transfer_data(amount, Some(options.account))?
            .call(self.source.xcm_pallet());
        self.source.submit(&call, options.account).await?;
        Ok(TransferResult {
            source_block,
            destination_block,
            hop_block: Some(hop_block),
            dry_run: None,
        })
    }

    async fn wait_for_blocks(&self, result: &TransferResult) -> Result<()> {
        let hop_block = result.hop_block.unwrap_or_default();
        futures::try_join!(
            self.source.wait_for_next_block(result.source_block),
            self.hop.wait_for_next_block(hop_block),
            self.dest.wait_for_next_block(result.destination_block),
        )?;
        Ok(())
    }

    async fn verify_final_balances(
        &self,
        initial: &[BalanceCheck],
        finals: &[BalanceCheck],
        options: &TransferOptions,
    ) -> Result<()> {
        let extrinsic_fee = self.source.transaction_fee().await?;
        let delivery_fee = self.source.xcm_fee().await?;
        info!(
            extrinsic_fee,
            delivery_fee,
            hop_fee = MULTI_HOP_HUB_FEE,
            "polkadot -> hub -> polimec fees"
        );

        let mut charges = transfer_charges(
            options,
            self.source.chain().native_asset(),
            extrinsic_fee + delivery_fee,
            MULTI_HOP_HUB_FEE,
            true,
        )?;
        // The treasury collects Polimec's fee, which is not estimated here.
        for charge in &mut charges {
            charge.treasury = None;
        }
        verify_balances(options, initial, finals, &charges, self.fee_model)
    }
}
