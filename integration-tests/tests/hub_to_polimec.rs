//! Reserve transfers from Polkadot Hub into Polimec.
//!
//! ## Running
//!
//! ```bash
//! cargo test -p xcm-transfer-tests --test hub_to_polimec -- --ignored --nocapture
//! ```

use anyhow::Result;
use tracing::info;
use xcm_transfer_tests::constants::{initial_balances, transfer_amounts};
use xcm_transfer_tests::{
    Account, Asset, AssetSourceRelation, HubToPolimecTransfer, TransferOptions, with_context,
};

#[test_log::test(tokio::test)]
#[ignore = "requires chopsticks and a built Polimec runtime"]
async fn hub_to_polimec_transfers() -> Result<()> {
    with_context(None, async |ctx| {
        let mut scenario = HubToPolimecTransfer::default();

        info!("Hub -> Polimec: DOT");
        let dot = TransferOptions::single(
            Account::Alice,
            Asset::Dot,
            transfer_amounts::NATIVE,
            AssetSourceRelation::Parent,
        )
        .with_initial_balance(initial_balances::DOT);
        let finals = ctx.run(&mut scenario, &dot).await?;
        assert!(finals[0].destination > 0, "no DOT arrived on Polimec");

        info!("Hub -> Polimec: USDT");
        let usdt = TransferOptions::single(
            Account::Alice,
            Asset::Usdt,
            transfer_amounts::TOKENS,
            AssetSourceRelation::Here,
        )
        .with_initial_balance(initial_balances::USDT);
        ctx.run(&mut scenario, &usdt).await?;

        info!("Hub -> Polimec: USDC");
        let usdc = TransferOptions::single(
            Account::Alice,
            Asset::Usdc,
            transfer_amounts::TOKENS,
            AssetSourceRelation::Here,
        )
        .with_initial_balance(initial_balances::USDC);
        ctx.run(&mut scenario, &usdc).await?;

        info!("Hub -> Polimec: unknown asset");
        let unknown = TransferOptions::single(
            Account::Alice,
            Asset::Unknown,
            transfer_amounts::TOKENS,
            AssetSourceRelation::Here,
        );
        let res = ctx.run(&mut scenario, &unknown).await;
        assert!(res.is_err(), "unknown asset transfer went through: {res:?}");
        Ok(())
    })
    .await?;
    Ok(())
}
