use tracing::{info, warn};
use xcm::{VersionedLocation, VersionedXcm};

use super::TransferTest;
use crate::constants::{BRIDGED_ISSUED_ON_HUB, BRIDGED_ISSUED_ON_POLIMEC};
use crate::error::{Error, Result};
use crate::location::chain_location;
use crate::managers::{BridgeHubManager, ChainManager, PolimecManager, PolkadotHubManager};
use crate::payload::{bridged_weth_message, create_bridged_send};
use crate::runtime_api::root_origin;
use crate::types::{BalanceCheck, Chain, DryRunReport, TransferOptions, TransferResult};

const ISSUED: (&str, &str) = ("ForeignAssets", "Issued");

/// Inbound WETH from Ethereum: Bridge Hub -> Hub -> Polimec.
///
/// Nothing is submitted. The bridge message is dry run on each hop and the
/// message the Hub forwards is dry run on Polimec.
pub struct BridgeToPolimecTransfer {
    source: BridgeHubManager,
    hop: PolkadotHubManager,
    dest: PolimecManager,
}

impl BridgeToPolimecTransfer {
    pub fn new(source: BridgeHubManager, hop: PolkadotHubManager, dest: PolimecManager) -> Self {
        Self { source, hop, dest }
    }

    async fn dry_run(&self, options: &TransferOptions) -> Result<DryRunReport> {
        let amount = options.assets[0].amount;
        let message = bridged_weth_message(amount, Some(options.account))?;

        let send = create_bridged_send(message.clone())?.call(self.source.xcm_pallet());
        let on_source = self.source.connection().dry_run_call(root_origin(), &send).await?;
        info!(success = on_source.success(), "bridge hub dry run");

        let from_bridge =
            VersionedLocation::V4(chain_location(Chain::PolkadotHub, Chain::BridgeHub)?);
        let on_hop = self
            .hop
            .connection()
            .dry_run_xcm(from_bridge, VersionedXcm::V4(message))
            .await?;
        let hop_issued = on_hop.count_events(ISSUED.0, ISSUED.1);
        info!(success = on_hop.success(), hop_issued, "hub dry run");

        let to_polimec = VersionedLocation::V4(chain_location(Chain::PolkadotHub, Chain::Polimec)?);
        let forwarded = on_hop
            .messages_to(&to_polimec)
            .and_then(|messages| messages.first())
            .cloned()
            .ok_or_else(|| Error::DryRunFailed("hub forwarded nothing to Polimec".into()))?;
        let from_hub = VersionedLocation::V4(chain_location(Chain::Polimec, Chain::PolkadotHub)?);
        let on_dest = self.dest.connection().dry_run_xcm(from_hub, forwarded).await?;
        let destination_issued = on_dest.count_events(ISSUED.0, ISSUED.1);
        info!(success = on_dest.success(), destination_issued, "polimec dry run");

        Ok(DryRunReport {
            source_success: on_source.success(),
            hop_success: on_hop.success(),
            hop_issued_events: hop_issued,
            destination_success: on_dest.success(),
            destination_issued_events: destination_issued,
        })
    }
}

impl Default for BridgeToPolimecTransfer {
    fn default() -> Self {
        Self::new(BridgeHubManager::new(), PolkadotHubManager::new(), PolimecManager::new())
    }
}

impl TransferTest for BridgeToPolimecTransfer {
    type Source = BridgeHubManager;
    type Dest = PolimecManager;

    fn source(&self) -> &BridgeHubManager {
        &self.source
    }

    fn source_mut(&mut self) -> &mut BridgeHubManager {
        &mut self.source
    }

    fn dest(&self) -> &PolimecManager {
        &self.dest
    }

    fn dest_mut(&mut self) -> &mut PolimecManager {
        &mut self.dest
    }

    fn checks_balances(&self) -> bool {
        false
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
        let report = self.dry_run(options).await?;
        Ok(TransferResult {
            source_block,
            destination_block,
            hop_block: Some(hop_block),
            dry_run: Some(report),
        })
    }

    /// Dry runs produce no blocks.
    async fn wait_for_blocks(&self, _result: &TransferResult) -> Result<()> {
        Ok(())
    }

    async fn verify_execution(&self, result: &TransferResult) -> Result<()> {
        let report = result
            .dry_run
            .as_ref()
            .ok_or_else(|| Error::DryRunFailed("no dry run report".into()))?;
        if !report.source_success {
            warn!("bridge hub rejected the root send, checking the hops anyway");
        }
        assert!(report.hop_success, "hub dry run failed");
        assert_eq!(report.hop_issued_events, BRIDGED_ISSUED_ON_HUB, "issued events on the Hub");
        assert!(report.destination_success, "polimec dry run failed");
        assert_eq!(
            report.destination_issued_events, BRIDGED_ISSUED_ON_POLIMEC,
            "issued events on Polimec"
        );
        Ok(())
    }

    async fn verify_final_balances(
        &self,
        _initial: &[BalanceCheck],
        _finals: &[BalanceCheck],
        _options: &TransferOptions,
    ) -> Result<()> {
        Ok(())
    }
}
