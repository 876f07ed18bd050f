//! CLI configuration with TOML file support.

use anyhow::Context;
use ridepay_types::{Address, ChainId};
use ridepay_wallet_core::DEFAULT_ERC20_TOKEN;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default fare recipient.
pub const DEFAULT_RECIPIENT: Address = Address::new([
    0x8c, 0x79, 0xb9, 0x07, 0x86, 0xab, 0xd8, 0x07, 0x33, 0x41, 0xdc, 0x41, 0xe6, 0x87, 0x48,
    0x9d, 0xaa, 0x17, 0x7e, 0xc2,
]);

/// Configuration for the ridepay CLI.
///
/// Loaded from a TOML file via [`CliConfig::from_toml_file`]; every field has
/// a default, so an empty file is valid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Chain delegations are created for.
    #[serde(default)]
    pub chain: ChainId,

    /// JSON file holding accounts and delegations.
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,

    /// ERC-20 token ride fares are paid in.
    #[serde(default = "default_token")]
    pub default_token: Address,

    /// Artificial delay before a simulated payment is recorded.
    #[serde(default = "default_processing_delay_ms")]
    pub processing_delay_ms: u64,

    /// Bundler JSON-RPC endpoint, required for on-chain payments.
    #[serde(default)]
    pub bundler_url: Option<String>,

    /// Paymaster sponsoring gas for on-chain payments.
    #[serde(default)]
    pub paymaster_url: Option<String>,

    /// Who ride fares are paid to.
    #[serde(default = "default_recipient")]
    pub recipient: Address,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_storage_path() -> PathBuf {
    PathBuf::from("./ridepay_data/storage.json")
}

fn default_token() -> Address {
    DEFAULT_ERC20_TOKEN
}

fn default_processing_delay_ms() -> u64 {
    1_500
}

fn default_recipient() -> Address {
    DEFAULT_RECIPIENT
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "human".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl CliConfig {
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            chain: ChainId::default(),
            storage_path: default_storage_path(),
            default_token: default_token(),
            processing_delay_ms: default_processing_delay_ms(),
            bundler_url: None,
            paymaster_url: None,
            recipient: default_recipient(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}
