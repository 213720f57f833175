//! Harness configuration.
//!
//! Every knob has a default that works from the workspace root of a
//! Polimec checkout, and can be overridden through the environment:
//!
//! | Variable                | Default |
//! |-------------------------|---------|
//! | `POLIMEC_WASM`          | compressed runtime in `../target/release/wbuild/polimec-runtime/` |
//! | `CHOPSTICKS_BIN`        | `npx` |
//! | `CHOPSTICKS_PACKAGE`    | `@acala-network/chopsticks@latest` (only passed to `npx`) |
//! | `POLIMEC_ENDPOINT`      | `wss://polimec.ibp.network` |
//! | `POLKADOT_HUB_ENDPOINT` | `wss://sys.ibp.network/statemint` |
//! | `POLKADOT_ENDPOINT`     | `wss://rpc.ibp.network/polkadot` |
//! | `BRIDGE_HUB_ENDPOINT`   | `wss://sys.ibp.network/bridgehub-polkadot` |
//! | `SETUP_TIMEOUT_SECS`    | `300` |
//! | `TEST_TIMEOUT_SECS`     | `25` |

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Chain;

pub const DEFAULT_POLIMEC_WASM: &str =
    "../target/release/wbuild/polimec-runtime/polimec_runtime.compact.compressed.wasm";
pub const DEFAULT_CHOPSTICKS_BIN: &str = "npx";
pub const DEFAULT_CHOPSTICKS_PACKAGE: &str = "@acala-network/chopsticks@latest";

/// Live networks the simulated chains fork from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamEndpoints {
    pub polimec: String,
    pub polkadot_hub: String,
    pub polkadot: String,
    pub bridge_hub: String,
}

impl Default for UpstreamEndpoints {
    fn default() -> Self {
        Self {
            polimec: "wss://polimec.ibp.network".into(),
            polkadot_hub: "wss://sys.ibp.network/statemint".into(),
            polkadot: "wss://rpc.ibp.network/polkadot".into(),
            bridge_hub: "wss://sys.ibp.network/bridgehub-polkadot".into(),
        }
    }
}

impl UpstreamEndpoints {
    pub fn get(&self, chain: Chain) -> &str {
        match chain {
            Chain::Polimec => &self.polimec,
            Chain::PolkadotHub => &self.polkadot_hub,
            Chain::Polkadot => &self.polkadot,
            Chain::BridgeHub => &self.bridge_hub,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub polimec_wasm: PathBuf,
    pub chopsticks_bin: String,
    pub chopsticks_package: String,
    pub upstream: UpstreamEndpoints,
    pub setup_timeout_secs: u64,
    pub test_timeout_secs: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            polimec_wasm: PathBuf::from(DEFAULT_POLIMEC_WASM),
            chopsticks_bin: DEFAULT_CHOPSTICKS_BIN.into(),
            chopsticks_package: DEFAULT_CHOPSTICKS_PACKAGE.into(),
            upstream: UpstreamEndpoints::default(),
            setup_timeout_secs: 300,
            test_timeout_secs: 25,
        }
    }
}

impl HarnessConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from `lookup`, falling back to defaults for
    /// missing keys.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(path) = lookup("POLIMEC_WASM") {
            config.polimec_wasm = PathBuf::from(path);
        }
        if let Some(bin) = lookup("CHOPSTICKS_BIN") {
            config.chopsticks_bin = bin;
        }
        if let Some(package) = lookup("CHOPSTICKS_PACKAGE") {
            config.chopsticks_package = package;
        }
        for (key, slot) in [
            ("POLIMEC_ENDPOINT", &mut config.upstream.polimec),
            ("POLKADOT_HUB_ENDPOINT", &mut config.upstream.polkadot_hub),
            ("POLKADOT_ENDPOINT", &mut config.upstream.polkadot),
            ("BRIDGE_HUB_ENDPOINT", &mut config.upstream.bridge_hub),
        ] {
            if let Some(endpoint) = lookup(key) {
                *slot = endpoint;
            }
        }
        if let Some(secs) = lookup("SETUP_TIMEOUT_SECS") {
            config.setup_timeout_secs = parse_secs("SETUP_TIMEOUT_SECS", &secs)?;
        }
        if let Some(secs) = lookup("TEST_TIMEOUT_SECS") {
            config.test_timeout_secs = parse_secs("TEST_TIMEOUT_SECS", &secs)?;
        }
        Ok(config)
    }

    pub fn setup_timeout(&self) -> Duration {
        Duration::from_secs(self.setup_timeout_secs)
    }

    pub fn test_timeout(&self) -> Duration {
        Duration::from_secs(self.test_timeout_secs)
    }

    /// Arguments placed before the chopsticks subcommand. `npx` needs the
    /// package name, a direct binary does not.
    pub fn chopsticks_prefix_args(&self) -> Vec<String> {
        let is_npx = std::path::Path::new(&self.chopsticks_bin)
            .file_name()
            .is_some_and(|name| name == "npx");
        if is_npx {
            vec!["--yes".into(), self.chopsticks_package.clone()]
        } else {
            Vec::new()
        }
    }
}

fn parse_secs(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse()
        .map_err(|e| Error::Config(format!("{key}={value:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let config = HarnessConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, HarnessConfig::default());
        assert_eq!(config.test_timeout(), Duration::from_secs(25));
        assert_eq!(
            config.chopsticks_prefix_args(),
            vec!["--yes".to_string(), DEFAULT_CHOPSTICKS_PACKAGE.to_string()]
        );
    }

    #[test]
    fn env_overrides() {
        let config = HarnessConfig::from_lookup(lookup(&[
            ("CHOPSTICKS_BIN", "/usr/local/bin/chopsticks"),
            ("POLKADOT_ENDPOINT", "ws://127.0.0.1:9944"),
            ("SETUP_TIMEOUT_SECS", " 60 "),
        ]))
        .unwrap();
        assert!(config.chopsticks_prefix_args().is_empty());
        assert_eq!(config.upstream.get(Chain::Polkadot), "ws://127.0.0.1:9944");
        assert_eq!(config.upstream.get(Chain::Polimec), "wss://polimec.ibp.network");
        assert_eq!(config.setup_timeout_secs, 60);
    }

    #[test]
    fn bad_timeout_is_a_config_error() {
        let res = HarnessConfig::from_lookup(lookup(&[("TEST_TIMEOUT_SECS", "soon")]));
        assert!(matches!(res, Err(Error::Config(_))));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: HarnessConfig = serde_json::from_str(r#"{"test_timeout_secs": 5}"#).unwrap();
        assert_eq!(config.test_timeout_secs, 5);
        assert_eq!(config.upstream, UpstreamEndpoints::default());
    }
}
