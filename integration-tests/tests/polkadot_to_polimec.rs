//! DOT from the relay to Polimec, teleported to the Hub on the way.
//!
//! ## Running
//!
//! ```bash
//! cargo test -p xcm-transfer-tests --test polkadot_to_polimec -- --ignored --nocapture
//! ```

use anyhow::Result;
use xcm_transfer_tests::constants::{initial_balances, transfer_amounts};
use xcm_transfer_tests::{
    Account, Asset, AssetSourceRelation, PolkadotToPolimecTransfer, TransferOptions, with_context,
};

#[test_log::test(tokio::test)]
#[ignore = "requires chopsticks and a built Polimec runtime"]
async fn polkadot_to_polimec_dot() -> Result<()> {
    with_context(None, async |ctx| {
        let mut scenario = PolkadotToPolimecTransfer::default();
        let options = TransferOptions::single(
            Account::Alice,
            Asset::Dot,
            transfer_amounts::NATIVE,
            AssetSourceRelation::Here,
        )
        .with_initial_balance(initial_balances::RELAY_DOT);
        let finals = ctx.run(&mut scenario, &options).await?;
        assert!(finals[0].destination > 0, "no DOT arrived on Polimec");
        Ok(())
    })
    .await?;
    Ok(())
}
