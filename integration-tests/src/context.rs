//! Suite-level lifecycle: start the network once, run scenarios against it
//! under a per-scenario deadline, tear it down.

use std::panic::{AssertUnwindSafe, resume_unwind};

use futures::FutureExt;
use tracing::{info, warn};

use crate::config::HarnessConfig;
use crate::error::{Error, Result};
use crate::setup::ChainSetup;
use crate::transfers::TransferTest;
use crate::types::{BalanceCheck, TransferOptions};

pub struct TestContext {
    setup: ChainSetup,
}

impl TestContext {
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            setup: ChainSetup::new(config),
        }
    }

    /// Context configured from the environment.
    pub fn from_env() -> Result<Self> {
        Ok(Self::new(HarnessConfig::from_env()?))
    }

    pub fn config(&self) -> &HarnessConfig {
        self.setup.config()
    }

    pub async fn initialize(&mut self, polimec_storage: Option<serde_json::Value>) -> Result<()> {
        self.setup.initialize(polimec_storage).await
    }

    pub async fn cleanup(&mut self) -> Result<()> {
        self.setup.cleanup().await
    }

    /// Connects `scenario`, runs it within the test timeout and disconnects
    /// it whatever the outcome.
    pub async fn run<T: TransferTest>(
        &self,
        scenario: &mut T,
        options: &TransferOptions,
    ) -> Result<Vec<BalanceCheck>> {
        let timeout = self.config().test_timeout();
        scenario.connect().await?;
        let res = AssertUnwindSafe(tokio::time::timeout(timeout, scenario.test_transfer(options)))
            .catch_unwind()
            .await;
        scenario.disconnect();
        match res {
            Ok(Ok(res)) => res,
            Ok(Err(_)) => Err(Error::Timeout {
                what: "transfer scenario".into(),
                after: timeout,
            }),
            Err(panic) => resume_unwind(panic),
        }
    }

    /// Runs `body` and cleans up afterwards, also when `body` fails or
    /// panics. A panic is resumed once the chains are down.
    pub async fn scope<T>(
        &mut self,
        body: impl AsyncFnOnce(&TestContext) -> Result<T>,
    ) -> Result<T> {
        let res = AssertUnwindSafe(body(&*self)).catch_unwind().await;
        let cleaned = self.cleanup().await;
        match res {
            Ok(res) => res.and_then(|value| cleaned.map(|()| value)),
            Err(panic) => {
                if let Err(e) = cleaned {
                    warn!("cleanup after a failed scenario: {e}");
                }
                resume_unwind(panic)
            }
        }
    }
}

/// Initializes a context, runs `body` and always cleans up afterwards.
pub async fn with_context<T>(
    polimec_storage: Option<serde_json::Value>,
    body: impl AsyncFnOnce(&TestContext) -> Result<T>,
) -> Result<T> {
    let mut ctx = TestContext::from_env()?;
    if let Err(e) = ctx.initialize(polimec_storage).await {
        ctx.cleanup().await?;
        return Err(e);
    }
    info!("chains ready");
    ctx.scope(body).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::spawn_in_group;

    #[tokio::test]
    async fn failing_scenario_still_tears_down() {
        let mut ctx = TestContext::new(HarnessConfig::default());
        ctx.setup.adopt(spawn_in_group(tokio::process::Command::new("sleep").arg("30")).unwrap());
        assert!(ctx.setup.is_running());

        let res = AssertUnwindSafe(ctx.scope(async |_| -> Result<()> {
            panic!("destination balance mismatch")
        }))
        .catch_unwind()
        .await;
        assert!(res.is_err());
        assert!(!ctx.setup.is_running());
    }

    #[tokio::test]
    async fn scope_returns_the_body_error() {
        let mut ctx = TestContext::new(HarnessConfig::default());
        ctx.setup.adopt(spawn_in_group(tokio::process::Command::new("sleep").arg("30")).unwrap());
        let res = ctx
            .scope(async |_| -> Result<()> { Err(Error::Setup("no chains".into())) })
            .await;
        assert!(matches!(res, Err(Error::Setup(_))));
        assert!(!ctx.setup.is_running());
    }
}
