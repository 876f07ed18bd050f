//! Chain identifier.

use serde::{Deserialize, Serialize};

/// Identifies which chain delegations are created for.
///
/// Part of a delegation's environment: a delegation signed for one chain is
/// not redeemable on another.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainId {
    /// Ethereum mainnet.
    Mainnet,
    /// The Sepolia test network.
    #[default]
    Sepolia,
    /// Local development chain.
    Dev,
}

impl ChainId {
    /// EIP-155 numeric chain id.
    pub fn numeric(&self) -> u64 {
        match self {
            Self::Mainnet => 1,
            Self::Sepolia => 11_155_111,
            Self::Dev => 31_337,
        }
    }

    /// Human-readable name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Sepolia => "sepolia",
            Self::Dev => "dev",
        }
    }

    /// Parse a chain name; unknown names fall back to the dev chain.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "mainnet" => Self::Mainnet,
            "sepolia" => Self::Sepolia,
            _ => Self::Dev,
        }
    }
}
