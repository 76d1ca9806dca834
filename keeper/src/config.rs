//! Keeper configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use tavern_auction::{CellarParams, OfficeParams};
use tavern_staking::StakingParams;
use tavern_types::Address;
use tavern_utils::LogFormat;

use crate::KeeperError;

/// Configuration for a tavern keeper.
///
/// Can be loaded from a TOML file via [`KeeperConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeeperConfig {
    /// Directory holding the state snapshot.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// May pause, and receives treasury and penalty withdrawals.
    #[serde(default)]
    pub operator: Address,

    /// Interface the HTTP server binds to.
    #[serde(default = "default_rpc_bind")]
    pub rpc_bind: String,

    #[serde(default = "default_rpc_port")]
    pub rpc_port: u16,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Whether to serve `/metrics`.
    #[serde(default = "default_true")]
    pub enable_metrics: bool,

    /// Whether `/faucet` may credit balances (dev and test deployments).
    #[serde(default)]
    pub enable_faucet: bool,

    /// Load the snapshot at start and write it at shutdown.
    #[serde(default = "default_true")]
    pub persist_snapshot: bool,

    #[serde(default)]
    pub office: OfficeParams,

    #[serde(default)]
    pub cellar: CellarParams,

    #[serde(default)]
    pub staking: StakingParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./tavern_data")
}

fn default_rpc_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_rpc_port() -> u16 {
    7077
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

// ── Impl ───────────────────────────────────────────────────────────────

impl KeeperConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, KeeperError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            KeeperError::Config(format!("{}: {e}", path.as_ref().display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, KeeperError> {
        let config: Self = toml::from_str(s).map_err(|e| KeeperError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, KeeperError> {
        toml::to_string_pretty(self).map_err(|e| KeeperError::Config(e.to_string()))
    }

    /// Reject parameter sets the engines would refuse.
    pub fn validate(&self) -> Result<(), KeeperError> {
        self.office.validate()?;
        self.cellar.validate()?;
        self.staking.validate()?;
        Ok(())
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join("tavern.snapshot")
    }

    pub fn rpc_addr(&self) -> String {
        format!("{}:{}", self.rpc_bind, self.rpc_port)
    }
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            operator: Address::ZERO,
            rpc_bind: default_rpc_bind(),
            rpc_port: default_rpc_port(),
            log_format: LogFormat::Human,
            log_level: default_log_level(),
            enable_metrics: true,
            enable_faucet: false,
            persist_snapshot: true,
            office: OfficeParams::default(),
            cellar: CellarParams::default(),
            staking: StakingParams::default(),
        }
    }
}
