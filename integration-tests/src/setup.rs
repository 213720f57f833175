//! Brings the simulated network up and down.
//!
//! The four chains run in one `chopsticks xcm` process, forked from their
//! live networks: Polkadot as the relay with Polimec, the Hub and Bridge
//! Hub connected to it and to each other. Per-chain configs, including the
//! storage overrides, are written to a temporary directory that lives as
//! long as the process.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde::Serialize;
use subxt::backend::rpc::{RpcClient, RpcParams};
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::config::HarnessConfig;
use crate::error::{Error, Result};
use crate::managers::ChainConnection;
use crate::overrides;
use crate::types::Chain;

const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BuildBlockMode {
    Batch,
    Instant,
    Manual,
}

/// One chain's chopsticks config file.
#[derive(Clone, Debug, Serialize)]
pub struct ChopsticksConfig {
    pub endpoint: String,
    pub port: u16,
    #[serde(rename = "wasm-override", skip_serializing_if = "Option::is_none")]
    pub wasm_override: Option<PathBuf>,
    #[serde(rename = "import-storage", skip_serializing_if = "Option::is_none")]
    pub import_storage: Option<serde_json::Value>,
    #[serde(rename = "build-block-mode")]
    pub build_block_mode: BuildBlockMode,
}

fn config_file_name(chain: Chain) -> &'static str {
    match chain {
        Chain::Polimec => "polimec.yml",
        Chain::PolkadotHub => "polkadot-hub.yml",
        Chain::Polkadot => "polkadot.yml",
        Chain::BridgeHub => "bridge-hub.yml",
    }
}

/// blake2-256 of the runtime blob at `path`.
pub async fn runtime_hash(path: &Path) -> Result<[u8; 32]> {
    let code = tokio::fs::read(path).await?;
    Ok(sp_core::hashing::blake2_256(&code))
}

pub struct ChainSetup {
    config: HarnessConfig,
    workdir: Option<TempDir>,
    child: Option<Child>,
}

impl ChainSetup {
    pub fn new(config: HarnessConfig) -> Self {
        Self {
            config,
            workdir: None,
            child: None,
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.child.is_some()
    }

    #[cfg(test)]
    pub(crate) fn adopt(&mut self, child: Child) {
        self.child = Some(child);
    }

    /// Config for `chain`. Only Polimec runs the locally built runtime.
    pub fn chain_config(
        &self,
        chain: Chain,
        wasm: Option<&Path>,
        polimec_storage: Option<&serde_json::Value>,
    ) -> ChopsticksConfig {
        let (wasm_override, import_storage) = match chain {
            Chain::Polimec => (wasm.map(Path::to_path_buf), polimec_storage.cloned()),
            other => (None, overrides::default_storage(other)),
        };
        ChopsticksConfig {
            endpoint: self.config.upstream.get(chain).to_string(),
            port: chain.port(),
            wasm_override,
            import_storage,
            build_block_mode: BuildBlockMode::Instant,
        }
    }

    /// Writes one YAML file per chain into `dir`, relay first.
    pub fn write_configs(
        &self,
        dir: &Path,
        wasm: &Path,
        polimec_storage: Option<&serde_json::Value>,
    ) -> Result<Vec<(Chain, PathBuf)>> {
        [Chain::Polkadot, Chain::Polimec, Chain::PolkadotHub, Chain::BridgeHub]
            .into_iter()
            .map(|chain| {
                let path = dir.join(config_file_name(chain));
                let config = self.chain_config(chain, Some(wasm), polimec_storage);
                let yaml = serde_yaml::to_string(&config)?;
                std::fs::write(&path, yaml)?;
                Ok((chain, path))
            })
            .collect()
    }

    /// Starts the network and waits until every chain answers RPC.
    ///
    /// `polimec_storage` patches Polimec on top of its forked state.
    pub async fn initialize(&mut self, polimec_storage: Option<serde_json::Value>) -> Result<()> {
        if self.child.is_some() {
            return Ok(());
        }
        let wasm = &self.config.polimec_wasm;
        if !wasm.is_file() {
            return Err(Error::RuntimeNotFound { path: wasm.clone() });
        }
        let wasm = std::fs::canonicalize(wasm)?;
        let hash = runtime_hash(&wasm).await?;
        info!("Polimec runtime used in tests: 0x{}", hex::encode(hash));
        if polimec_storage.is_some() {
            info!("Polimec custom storage provided");
        }

        let workdir = tempfile::Builder::new().prefix("chopsticks-").tempdir()?;
        let files = self.write_configs(workdir.path(), &wasm, polimec_storage.as_ref())?;

        let mut command = Command::new(&self.config.chopsticks_bin);
        command.args(self.config.chopsticks_prefix_args()).arg("xcm");
        for (chain, path) in &files {
            command.arg(if *chain == Chain::Polkadot { "-r" } else { "-p" }).arg(path);
        }
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(?command, "spawning chopsticks");
        let mut child = spawn_in_group(&mut command).map_err(|e| {
            Error::Setup(format!("cannot run `{}`: {e}", self.config.chopsticks_bin))
        })?;
        forward_output(&mut child);
        self.child = Some(child);
        self.workdir = Some(workdir);

        let timeout = self.config.setup_timeout();
        match tokio::time::timeout(timeout, self.wait_until_up()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                self.cleanup().await?;
                return Err(e);
            }
            Err(_) => {
                self.cleanup().await?;
                return Err(Error::Timeout {
                    what: "chain setup".into(),
                    after: timeout,
                });
            }
        }
        info!("Local nodes instances are up");

        self.produce_polimec_block().await?;
        Ok(())
    }

    async fn wait_until_up(&mut self) -> Result<()> {
        for chain in Chain::ALL {
            loop {
                if let Some(child) = self.child.as_mut() {
                    if let Some(status) = child.try_wait()? {
                        return Err(Error::Setup(format!("chopsticks exited early with {status}")));
                    }
                }
                match RpcClient::from_insecure_url(chain.endpoint()).await {
                    Ok(_) => {
                        debug!(?chain, "rpc reachable");
                        break;
                    }
                    Err(_) => tokio::time::sleep(POLL_INTERVAL).await,
                }
            }
        }
        Ok(())
    }

    /// Produces one block on Polimec so the overridden runtime's migrations
    /// run before any scenario.
    async fn produce_polimec_block(&self) -> Result<()> {
        let mut polimec = ChainConnection::new(Chain::Polimec);
        polimec.connect().await?;
        let head = polimec.block_number().await?;
        info!("Polimec chain is at block {head}, producing a new block");

        let rpc = RpcClient::from_insecure_url(Chain::Polimec.endpoint()).await?;
        let _: serde_json::Value = rpc.request("dev_newBlock", RpcParams::new()).await?;

        let new_head = polimec.wait_for_next_block(head).await?;
        info!("Polimec chain is at block {new_head}");
        polimec.disconnect();
        if new_head != head + 1 {
            return Err(Error::Setup(format!(
                "expected Polimec at block {}, found {new_head}",
                head + 1
            )));
        }
        Ok(())
    }

    /// Stops the network. Safe to call when it never started.
    pub async fn cleanup(&mut self) -> Result<()> {
        if let Some(mut child) = self.child.take() {
            kill_group(&child);
            if let Err(e) = child.kill().await {
                debug!("chopsticks already gone: {e}");
            }
            info!("Local nodes instances are down");
        }
        self.workdir = None;
        Ok(())
    }
}

impl Drop for ChainSetup {
    /// Last resort when `cleanup` never ran, e.g. a suite panicked.
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            kill_group(&child);
            let _ = child.start_kill();
        }
    }
}

/// Spawns `command` as the leader of a new process group, killed on drop.
pub(crate) fn spawn_in_group(command: &mut Command) -> std::io::Result<Child> {
    command.kill_on_drop(true);
    #[cfg(unix)]
    command.process_group(0);
    command.spawn()
}

/// SIGKILLs the whole group led by `child`. Killing only `npx` leaves the
/// node process behind, still holding the ports.
fn kill_group(child: &Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        let status = std::process::Command::new("kill")
            .args(["-KILL", &format!("-{pid}")])
            .stderr(Stdio::null())
            .status();
        if let Err(e) = status {
            warn!("failed to kill chopsticks process group: {e}");
        }
    }
    #[cfg(not(unix))]
    let _ = child;
}

/// Relays chopsticks output to the log and keeps its pipes drained.
fn forward_output(child: &mut Child) {
    if let Some(stdout) = child.stdout.take() {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(target: "chopsticks", "{line}");
            }
        });
    }
    if let Some(stderr) = child.stderr.take() {
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                warn!(target: "chopsticks", "{line}");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_configs_are_written_per_chain() {
        let setup = ChainSetup::new(HarnessConfig::default());
        let dir = tempfile::tempdir().unwrap();
        let wasm = Path::new("/tmp/polimec.wasm");
        let files = setup.write_configs(dir.path(), wasm, None).unwrap();
        assert_eq!(files.len(), 4);
        assert_eq!(files[0].0, Chain::Polkadot);

        let polimec = std::fs::read_to_string(dir.path().join("polimec.yml")).unwrap();
        assert!(polimec.contains("wasm-override: /tmp/polimec.wasm"));
        assert!(polimec.contains("port: 8000"));
        assert!(polimec.contains("build-block-mode: Instant"));
        assert!(!polimec.contains("import-storage"));

        let relay = std::fs::read_to_string(dir.path().join("polkadot.yml")).unwrap();
        assert!(relay.contains("rpc.ibp.network/polkadot"));
        assert!(relay.contains("$removePrefix"));
        assert!(!relay.contains("wasm-override"));
    }

    #[test]
    fn custom_polimec_storage_is_imported() {
        let setup = ChainSetup::new(HarnessConfig::default());
        let storage = overrides::polimec_storage().unwrap();
        let config = setup.chain_config(Chain::Polimec, None, Some(&storage));
        assert_eq!(config.import_storage, Some(storage));
        assert_eq!(config.wasm_override, None);
    }

    #[tokio::test]
    async fn missing_runtime_is_reported() {
        let config = HarnessConfig {
            polimec_wasm: PathBuf::from("/definitely/not/here.wasm"),
            ..HarnessConfig::default()
        };
        let mut setup = ChainSetup::new(config);
        let err = setup.initialize(None).await.unwrap_err();
        assert!(matches!(err, Error::RuntimeNotFound { .. }));
        assert!(err.to_string().contains("cargo b -r -p polimec-runtime"));
        assert!(!setup.is_running());
        setup.cleanup().await.unwrap();
    }

    #[cfg(target_os = "linux")]
    fn is_alive(pid: &str) -> bool {
        std::fs::read_to_string(format!("/proc/{pid}/status"))
            .is_ok_and(|status| !status.lines().any(|l| l.starts_with("State:") && l.contains('Z')))
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn dropping_setup_kills_the_whole_group() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("grandchild.pid");
        let child = spawn_in_group(Command::new("sh").arg("-c").arg(format!(
            "sleep 30 & echo $! > {}; wait",
            pid_file.display()
        )))
        .unwrap();
        let mut setup = ChainSetup::new(HarnessConfig::default());
        setup.adopt(child);

        let mut grandchild = String::new();
        for _ in 0..100 {
            grandchild = std::fs::read_to_string(&pid_file).unwrap_or_default().trim().to_string();
            if !grandchild.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(is_alive(&grandchild), "grandchild {grandchild:?} did not start");

        drop(setup);
        let mut alive = true;
        for _ in 0..100 {
            alive = is_alive(&grandchild);
            if !alive {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(!alive, "grandchild {grandchild} survived the drop");
    }

    #[tokio::test]
    async fn runtime_hash_is_blake2() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runtime.wasm");
        std::fs::write(&path, b"abc").unwrap();
        assert_eq!(runtime_hash(&path).await.unwrap(), sp_core::hashing::blake2_256(b"abc"));
    }
}
