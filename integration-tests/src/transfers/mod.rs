//! Transfer scenarios.
//!
//! [`TransferTest::test_transfer`] runs the four phases every scenario goes
//! through: pre-check, execute, wait for inclusion, post-check. Scenarios
//! supply the transfer itself and the fee accounting; the expected balance
//! arithmetic lives in [`expected_final_balances`] so it can be tested
//! without a network.

mod bridge_to_polimec;
mod hub_to_polimec;
mod polimec_to_hub;
mod polkadot_to_polimec;

pub use bridge_to_polimec::BridgeToPolimecTransfer;
pub use hub_to_polimec::HubToPolimecTransfer;
pub use polimec_to_hub::PolimecToHubTransfer;
pub use polkadot_to_polimec::PolkadotToPolimecTransfer;

use futures::future::try_join_all;
use tracing::info;

use crate::error::{Error, Result};
use crate::managers::ChainManager;
use crate::types::{Asset, BalanceCheck, TransferOptions, TransferResult};

/// How strictly final balances must match the expected ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeeModel {
    Exact,
    /// Destination and treasury may be off by this fraction of the actual
    /// balance. The source side is always exact.
    Tolerance { parts_per_million: u128 },
}

/// Deductions and gains a transfer causes for one asset, on top of the
/// transferred amount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Charges {
    pub source: u128,
    pub destination: u128,
    /// `None` leaves the treasury unchecked.
    pub treasury: Option<u128>,
}

/// Balances expected after moving `amount` with `charges`. Charges the
/// balances cannot cover are a broken expectation, not a zero balance.
pub fn expected_final_balances(
    initial: &BalanceCheck,
    amount: u128,
    charges: &Charges,
) -> Result<BalanceCheck> {
    let checked = |value: Option<u128>, side: &str| {
        value.ok_or_else(|| {
            Error::Config(format!("expected {side} balance out of range: {initial:?} {charges:?}"))
        })
    };
    let spent = checked(amount.checked_add(charges.source), "source")?;
    let source = checked(initial.source.checked_sub(spent), "source")?;
    let received = checked(initial.destination.checked_add(amount), "destination")?;
    let destination = checked(received.checked_sub(charges.destination), "destination")?;
    let treasury = match (initial.treasury, charges.treasury) {
        (Some(treasury), Some(gained)) => Some(checked(treasury.checked_add(gained), "treasury")?),
        _ => None,
    };
    Ok(BalanceCheck {
        source,
        destination,
        treasury,
    })
}

/// Charges for scenarios where the source pays extrinsic and delivery fees
/// in its native asset and the destination takes its execution fee from
/// the fee asset.
pub fn transfer_charges(
    options: &TransferOptions,
    source_native: Asset,
    source_fees: u128,
    destination_fee: u128,
    track_treasury: bool,
) -> Result<Vec<Charges>> {
    let fee_asset = options.fee_asset()?;
    Ok(options
        .assets
        .iter()
        .map(|t| {
            let dest_fee = if t.asset == fee_asset { destination_fee } else { 0 };
            Charges {
                source: if t.asset == source_native { source_fees } else { 0 },
                destination: dest_fee,
                treasury: track_treasury.then_some(dest_fee),
            }
        })
        .collect())
}

fn within(actual: u128, expected: u128, model: FeeModel) -> bool {
    match model {
        FeeModel::Exact => actual == expected,
        FeeModel::Tolerance { parts_per_million } => {
            let band = actual.saturating_mul(parts_per_million) / 1_000_000;
            actual.abs_diff(expected) <= band
        }
    }
}

/// Panics on any mismatch, like the assertions of a test body.
pub fn assert_balances(
    asset: Asset,
    actual: &BalanceCheck,
    expected: &BalanceCheck,
    model: FeeModel,
) {
    assert_eq!(
        actual.source, expected.source,
        "{asset:?}: source balance {} != expected {}",
        actual.source, expected.source
    );
    assert!(
        within(actual.destination, expected.destination, model),
        "{asset:?}: destination balance {} != expected {} ({model:?})",
        actual.destination,
        expected.destination
    );
    if let (Some(actual_treasury), Some(expected_treasury)) = (actual.treasury, expected.treasury) {
        assert!(
            within(actual_treasury, expected_treasury, model),
            "{asset:?}: treasury balance {actual_treasury} != expected {expected_treasury} \
             ({model:?})"
        );
    }
}

/// Checks every asset of `options` against its expected final balance.
pub fn verify_balances(
    options: &TransferOptions,
    initial: &[BalanceCheck],
    finals: &[BalanceCheck],
    charges: &[Charges],
    model: FeeModel,
) -> Result<()> {
    assert_eq!(initial.len(), options.assets.len(), "one initial balance per asset");
    assert_eq!(finals.len(), options.assets.len(), "one final balance per asset");
    for (i, transfer) in options.assets.iter().enumerate() {
        let expected = expected_final_balances(&initial[i], transfer.amount, &charges[i])?;
        info!(asset = ?transfer.asset, ?expected, actual = ?finals[i], "final balances");
        assert_balances(transfer.asset, &finals[i], &expected, model);
    }
    Ok(())
}

#[allow(async_fn_in_trait)]
pub trait TransferTest {
    type Source: ChainManager;
    type Dest: ChainManager;

    fn source(&self) -> &Self::Source;
    fn source_mut(&mut self) -> &mut Self::Source;
    fn dest(&self) -> &Self::Dest;
    fn dest_mut(&mut self) -> &mut Self::Dest;

    /// Submits the transfer and returns the block watermarks captured
    /// before submission.
    async fn execute_transfer(&self, options: &TransferOptions) -> Result<TransferResult>;

    async fn verify_final_balances(
        &self,
        initial: &[BalanceCheck],
        finals: &[BalanceCheck],
        options: &TransferOptions,
    ) -> Result<()>;

    /// Scenarios without observable balance effects skip the pre- and
    /// post-checks.
    fn checks_balances(&self) -> bool {
        true
    }

    async fn connect(&mut self) -> Result<()> {
        self.source_mut().connect().await?;
        self.dest_mut().connect().await
    }

    fn disconnect(&mut self) {
        self.source_mut().disconnect();
        self.dest_mut().disconnect();
    }

    /// Source, destination and (when the destination has one) treasury
    /// balance of each transferred asset.
    async fn get_balances(&self, options: &TransferOptions) -> Result<Vec<BalanceCheck>> {
        let account = options.account;
        let treasury = self.dest().treasury_account();
        try_join_all(options.assets.iter().map(|t| async move {
            let treasury_balance = async {
                match treasury {
                    Some(treasury) => {
                        self.dest().asset_balance_of(treasury, t.asset).await.map(Some)
                    }
                    None => Ok(None),
                }
            };
            let (source, destination, treasury) = futures::try_join!(
                self.source().asset_balance_of(account, t.asset),
                self.dest().asset_balance_of(account, t.asset),
                treasury_balance,
            )?;
            Ok::<_, Error>(BalanceCheck {
                source,
                destination,
                treasury,
            })
        }))
        .await
    }

    async fn wait_for_blocks(&self, result: &TransferResult) -> Result<()> {
        futures::try_join!(
            self.source().wait_for_next_block(result.source_block),
            self.dest().wait_for_next_block(result.destination_block),
        )?;
        Ok(())
    }

    /// The destination must have processed exactly one message, successfully.
    async fn verify_execution(&self, _result: &TransferResult) -> Result<()> {
        let events = self.dest().message_queue_events().await?;
        assert_eq!(events.len(), 1, "expected exactly one processed message, got {events:?}");
        assert!(events[0].success, "message processing failed on {:?}", self.dest().chain());
        Ok(())
    }

    /// Runs the scenario and returns the final balances (empty when the
    /// scenario does not check balances).
    async fn test_transfer(&self, options: &TransferOptions) -> Result<Vec<BalanceCheck>> {
        options.validate()?;
        let checks = self.checks_balances();

        let initial = if checks {
            let initial = self.get_balances(options).await?;
            let first = &options.assets[0];
            let available = initial.first().map(|b| b.source).unwrap_or(0);
            if first.amount > available {
                return Err(Error::InsufficientBalance {
                    asset: first.asset,
                    available,
                    requested: first.amount,
                });
            }
            if let Some(expected) = options.initial_balance {
                assert_eq!(available, expected, "unexpected initial {:?} balance", first.asset);
            }
            info!(?initial, "initial balances");
            initial
        } else {
            Vec::new()
        };

        let result = self.execute_transfer(options).await?;
        info!(?result, "transfer submitted");
        self.wait_for_blocks(&result).await?;
        self.verify_execution(&result).await?;

        if !checks {
            return Ok(Vec::new());
        }
        let finals = self.get_balances(options).await?;
        self.verify_final_balances(&initial, &finals, options).await?;
        Ok(finals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Account, AssetSourceRelation, AssetTransfer};

    fn check(source: u128, destination: u128, treasury: Option<u128>) -> BalanceCheck {
        BalanceCheck {
            source,
            destination,
            treasury,
        }
    }

    #[test]
    fn expected_balances_apply_fees() {
        let initial = check(1_000, 0, Some(10));
        let charges = Charges {
            source: 7,
            destination: 3,
            treasury: Some(3),
        };
        assert_eq!(
            expected_final_balances(&initial, 100, &charges).unwrap(),
            check(893, 97, Some(13))
        );
        let untracked = Charges {
            treasury: None,
            ..charges
        };
        assert_eq!(
            expected_final_balances(&initial, 100, &untracked).unwrap().treasury,
            None
        );
    }

    #[tokio::test]
    async fn balances_fail_with_the_destination() {
        // the relay answers non-DOT assets without a connection
        let scenario = PolkadotToPolimecTransfer::default();
        let options = TransferOptions::single(
            Account::Alice,
            Asset::Usdt,
            1,
            AssetSourceRelation::Here,
        );
        assert!(matches!(
            scenario.get_balances(&options).await,
            Err(Error::NotConnected(crate::types::Chain::Polimec))
        ));
    }

    #[test]
    fn uncoverable_charges_are_an_error() {
        let initial = check(100, 0, None);
        let fees = Charges {
            source: 1,
            ..Charges::default()
        };
        assert!(matches!(
            expected_final_balances(&initial, 100, &fees),
            Err(Error::Config(_))
        ));
        let dest_fee = Charges {
            destination: 11,
            ..Charges::default()
        };
        assert!(expected_final_balances(&initial, 10, &dest_fee).is_err());
        assert_eq!(
            expected_final_balances(&initial, 10, &Charges::default()).unwrap(),
            check(90, 10, None)
        );
    }

    #[test]
    fn charges_follow_native_and_fee_asset() {
        let options = TransferOptions::new(
            Account::Alice,
            vec![
                AssetTransfer::new(Asset::Usdt, 10, AssetSourceRelation::Here),
                AssetTransfer::new(Asset::Dot, 20, AssetSourceRelation::Parent),
            ],
        );
        let charges = transfer_charges(&options, Asset::Dot, 5, 2, true).unwrap();
        assert_eq!(
            charges,
            vec![
                Charges {
                    source: 0,
                    destination: 2,
                    treasury: Some(2)
                },
                Charges {
                    source: 5,
                    destination: 0,
                    treasury: Some(0)
                },
            ]
        );
        let charges =
            transfer_charges(&options.with_fee_asset_item(1), Asset::Plmc, 5, 2, false).unwrap();
        assert_eq!(charges[0], Charges::default());
        assert_eq!(charges[1].destination, 2);
    }

    #[test]
    fn tolerance_band() {
        let one_percent = FeeModel::Tolerance {
            parts_per_million: 10_000,
        };
        assert!(within(1_000, 1_010, one_percent));
        assert!(!within(1_000, 1_011, one_percent));
        assert!(!within(1_000, 1_001, FeeModel::Exact));
    }

    #[test]
    #[should_panic(expected = "destination balance")]
    fn mismatch_panics() {
        assert_balances(Asset::Dot, &check(1, 2, None), &check(1, 3, None), FeeModel::Exact);
    }

    #[test]
    fn treasury_compared_when_both_sides_track_it() {
        assert_balances(Asset::Dot, &check(1, 2, Some(4)), &check(1, 2, None), FeeModel::Exact);
        let res = std::panic::catch_unwind(|| {
            let expected = check(1, 2, Some(5));
            assert_balances(Asset::Dot, &check(1, 2, Some(4)), &expected, FeeModel::Exact)
        });
        assert!(res.is_err());
    }
}
