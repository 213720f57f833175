//! Bridged WETH from Ethereum, through Bridge Hub and the Hub, into Polimec.
//! Only dry runs are checked, the simulated bridge cannot deliver for real.
//!
//! ## Running
//!
//! ```bash
//! cargo test -p xcm-transfer-tests --test bridge_to_polimec -- --ignored --nocapture
//! ```

use anyhow::Result;
use xcm_transfer_tests::constants::transfer_amounts;
use xcm_transfer_tests::overrides::polimec_storage;
use xcm_transfer_tests::{
    Account, Asset, AssetSourceRelation, BridgeToPolimecTransfer, TransferOptions, with_context,
};

#[test_log::test(tokio::test)]
#[ignore = "requires chopsticks and a built Polimec runtime"]
async fn bridged_weth_dry_run() -> Result<()> {
    with_context(Some(polimec_storage()?), async |ctx| {
        let mut scenario = BridgeToPolimecTransfer::default();
        let options = TransferOptions::single(
            Account::Alice,
            Asset::Weth,
            transfer_amounts::BRIDGED,
            AssetSourceRelation::Here,
        );
        let finals = ctx.run(&mut scenario, &options).await?;
        assert!(finals.is_empty());
        Ok(())
    })
    .await?;
    Ok(())
}
