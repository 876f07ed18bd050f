//! Ride-payment delegation presets.
//!
//! Amounts are given as decimal token strings (`"10"`, `"0.0001"`) and
//! parsed with 18 decimals.

use ridepay_types::{Address, Delegation, Timestamp};
use ridepay_utils::parse_ether;
use serde::{Deserialize, Serialize};

use crate::error::WalletError;
use crate::scopes::{self, DelegationParties, DEFAULT_PERIOD_DURATION};

/// The token ride fares are paid in unless another is configured.
pub const DEFAULT_ERC20_TOKEN: Address = Address::new([
    0xb4, 0xae, 0x65, 0x4a, 0xca, 0x57, 0x77, 0x81, 0xca, 0x1c, 0x5d, 0xe8, 0xfb, 0xe6, 0x0c,
    0x2f, 0x42, 0x3f, 0x37, 0xda,
]);

/// A per-period allowance (10 tokens per day by default).
pub fn ride_periodic_delegation(
    parties: &DelegationParties,
    token_address: Address,
    amount_per_period: &str,
    period_duration: u64,
    now: Timestamp,
) -> Result<Delegation, WalletError> {
    Ok(scopes::erc20_period(
        parties,
        token_address,
        parse_ether(amount_per_period)?,
        period_duration,
        now,
    ))
}

/// A streaming allowance (0.0001 per second from 1, up to 100 by default).
pub fn ride_streaming_delegation(
    parties: &DelegationParties,
    token_address: Address,
    amount_per_second: &str,
    initial_amount: &str,
    max_amount: &str,
    now: Timestamp,
) -> Result<Delegation, WalletError> {
    Ok(scopes::erc20_streaming(
        parties,
        token_address,
        parse_ether(amount_per_second)?,
        parse_ether(initial_amount)?,
        parse_ether(max_amount)?,
        now,
    ))
}

/// A one-off cap (50 tokens by default).
pub fn ride_fixed_amount_delegation(
    parties: &DelegationParties,
    token_address: Address,
    max_amount: &str,
) -> Result<Delegation, WalletError> {
    Ok(scopes::erc20_transfer(
        parties,
        token_address,
        parse_ether(max_amount)?,
    ))
}

/// Native-token delegation capped at 0.001.
pub fn root_delegation(parties: &DelegationParties) -> Result<Delegation, WalletError> {
    Ok(scopes::native_token_transfer(parties, parse_ether("0.001")?))
}

/// The ride presets with their default parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RidePreset {
    Periodic,
    Streaming,
    Fixed,
    Root,
}

impl RidePreset {
    pub const ALL: [RidePreset; 4] = [Self::Periodic, Self::Streaming, Self::Fixed, Self::Root];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Periodic => "periodic",
            Self::Streaming => "streaming",
            Self::Fixed => "fixed",
            Self::Root => "root",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(name))
    }

    /// Build this preset for `token_address` (ignored by the native root preset).
    pub fn build(
        &self,
        parties: &DelegationParties,
        token_address: Address,
        now: Timestamp,
    ) -> Result<Delegation, WalletError> {
        match self {
            Self::Periodic => {
                ride_periodic_delegation(parties, token_address, "10", DEFAULT_PERIOD_DURATION, now)
            }
            Self::Streaming => {
                ride_streaming_delegation(parties, token_address, "0.0001", "1", "100", now)
            }
            Self::Fixed => ride_fixed_amount_delegation(parties, token_address, "50"),
            Self::Root => root_delegation(parties),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ridepay_types::{ChainId, Scope, ScopeKind, TokenAmount};

    fn parties() -> DelegationParties {
        DelegationParties::new(Address::new([1; 20]), Address::new([2; 20]), ChainId::Sepolia)
    }

    #[test]
    fn default_token_matches_checksum_address() {
        assert_eq!(
            DEFAULT_ERC20_TOKEN,
            "0xb4aE654Aca577781Ca1c5DE8FbE60c2F423f37da".parse().unwrap()
        );
    }

    #[test]
    fn presets_use_documented_defaults() {
        let now = Timestamp::new(1_700_000_000);
        let periodic = RidePreset::Periodic.build(&parties(), DEFAULT_ERC20_TOKEN, now).unwrap();
        assert_eq!(
            periodic.scope,
            Scope::Erc20PeriodTransfer {
                token_address: DEFAULT_ERC20_TOKEN,
                period_amount: TokenAmount::from_tokens(10),
                period_duration: 86_400,
                start_date: now,
            }
        );

        let streaming = RidePreset::Streaming.build(&parties(), DEFAULT_ERC20_TOKEN, now).unwrap();
        assert_eq!(
            streaming.scope,
            Scope::Erc20Streaming {
                token_address: DEFAULT_ERC20_TOKEN,
                amount_per_second: TokenAmount::new(100_000_000_000_000),
                initial_amount: TokenAmount::from_tokens(1),
                max_amount: TokenAmount::from_tokens(100),
                start_time: now,
            }
        );

        let fixed = RidePreset::Fixed.build(&parties(), DEFAULT_ERC20_TOKEN, now).unwrap();
        assert_eq!(fixed.scope.initial_allowance(), TokenAmount::from_tokens(50));

        let root = RidePreset::Root.build(&parties(), DEFAULT_ERC20_TOKEN, now).unwrap();
        assert_eq!(root.scope.kind(), ScopeKind::NativeTokenTransferAmount);
        assert_eq!(root.scope.initial_allowance(), TokenAmount::new(1_000_000_000_000_000));
    }

    #[test]
    fn bad_amount_string_is_rejected() {
        assert!(matches!(
            ride_fixed_amount_delegation(&parties(), DEFAULT_ERC20_TOKEN, "fifty"),
            Err(WalletError::InvalidAmount(_))
        ));
    }

    #[test]
    fn preset_names() {
        assert_eq!(RidePreset::from_name("Periodic"), Some(RidePreset::Periodic));
        assert_eq!(RidePreset::from_name("weekly"), None);
    }
}
