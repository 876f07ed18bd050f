//! Delegation scopes: the spending policy embedded in a delegation.
//!
//! Seven scope kinds exist, split by token (native, ERC-20, ERC-721) and by
//! policy (fixed cap, periodic reset, linear streaming). Each variant carries
//! only the fields its policy needs; the `type` tag names the kind on the wire.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::address::Address;
use crate::amount::TokenAmount;
use crate::error::TypesError;
use crate::time::Timestamp;

/// Identifier of a single ERC-721 token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(pub u128);

impl Serialize for TokenId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TokenId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Reuse the amount parser: both are non-negative decimal integers.
        TokenAmount::deserialize(deserializer).map(|a| Self(a.raw()))
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A delegation's spending policy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Scope {
    /// Up to `max_amount` of the native token, no time limit.
    NativeTokenTransferAmount { max_amount: TokenAmount },

    /// `period_amount` of the native token per `period_duration` seconds.
    NativeTokenPeriodTransfer {
        period_amount: TokenAmount,
        period_duration: u64,
        start_date: Timestamp,
    },

    /// Native token accruing at `amount_per_second` on top of `initial_amount`,
    /// capped at `max_amount`.
    NativeTokenStreaming {
        amount_per_second: TokenAmount,
        initial_amount: TokenAmount,
        max_amount: TokenAmount,
        start_time: Timestamp,
    },

    /// Up to `max_amount` of an ERC-20 token, no time limit.
    Erc20TransferAmount {
        token_address: Address,
        max_amount: TokenAmount,
    },

    /// `period_amount` of an ERC-20 token per `period_duration` seconds.
    Erc20PeriodTransfer {
        token_address: Address,
        period_amount: TokenAmount,
        period_duration: u64,
        start_date: Timestamp,
    },

    /// ERC-20 token accruing linearly, capped at `max_amount`.
    Erc20Streaming {
        token_address: Address,
        amount_per_second: TokenAmount,
        initial_amount: TokenAmount,
        max_amount: TokenAmount,
        start_time: Timestamp,
    },

    /// Transfer of one specific NFT.
    Erc721Transfer {
        token_address: Address,
        token_id: TokenId,
    },
}

/// The parameters of a periodic allowance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeriodTerms {
    pub period_amount: TokenAmount,
    pub period_duration: u64,
    pub start_date: Timestamp,
}

impl PeriodTerms {
    /// End of the first period.
    pub fn first_reset_time(&self) -> Timestamp {
        self.start_date.plus(self.period_duration)
    }
}

impl Scope {
    pub fn kind(&self) -> ScopeKind {
        match self {
            Self::NativeTokenTransferAmount { .. } => ScopeKind::NativeTokenTransferAmount,
            Self::NativeTokenPeriodTransfer { .. } => ScopeKind::NativeTokenPeriodTransfer,
            Self::NativeTokenStreaming { .. } => ScopeKind::NativeTokenStreaming,
            Self::Erc20TransferAmount { .. } => ScopeKind::Erc20TransferAmount,
            Self::Erc20PeriodTransfer { .. } => ScopeKind::Erc20PeriodTransfer,
            Self::Erc20Streaming { .. } => ScopeKind::Erc20Streaming,
            Self::Erc721Transfer { .. } => ScopeKind::Erc721Transfer,
        }
    }

    /// The token contract, or the zero address for native-token scopes.
    pub fn token_address(&self) -> Address {
        match self {
            Self::Erc20TransferAmount { token_address, .. }
            | Self::Erc20PeriodTransfer { token_address, .. }
            | Self::Erc20Streaming { token_address, .. }
            | Self::Erc721Transfer { token_address, .. } => *token_address,
            Self::NativeTokenTransferAmount { .. }
            | Self::NativeTokenPeriodTransfer { .. }
            | Self::NativeTokenStreaming { .. } => Address::ZERO,
        }
    }

    /// Period parameters, for periodic scopes only.
    pub fn period(&self) -> Option<PeriodTerms> {
        match *self {
            Self::NativeTokenPeriodTransfer {
                period_amount,
                period_duration,
                start_date,
            }
            | Self::Erc20PeriodTransfer {
                period_amount,
                period_duration,
                start_date,
                ..
            } => Some(PeriodTerms {
                period_amount,
                period_duration,
                start_date,
            }),
            _ => None,
        }
    }

    /// The allowance available when tracking starts.
    ///
    /// Periodic scopes start with one period's amount, streaming scopes with
    /// their initial amount, fixed scopes with their cap. An NFT transfer
    /// counts as a single unit.
    pub fn initial_allowance(&self) -> TokenAmount {
        match *self {
            Self::NativeTokenPeriodTransfer { period_amount, .. }
            | Self::Erc20PeriodTransfer { period_amount, .. } => period_amount,
            Self::NativeTokenStreaming { initial_amount, .. }
            | Self::Erc20Streaming { initial_amount, .. } => initial_amount,
            Self::NativeTokenTransferAmount { max_amount }
            | Self::Erc20TransferAmount { max_amount, .. } => max_amount,
            Self::Erc721Transfer { .. } => TokenAmount::new(1),
        }
    }

    /// Total accrued by a streaming scope at `now`, capped at its maximum.
    ///
    /// `None` for non-streaming scopes.
    pub fn streaming_allowance_at(&self, now: Timestamp) -> Option<TokenAmount> {
        match *self {
            Self::NativeTokenStreaming {
                amount_per_second,
                initial_amount,
                max_amount,
                start_time,
            }
            | Self::Erc20Streaming {
                amount_per_second,
                initial_amount,
                max_amount,
                start_time,
                ..
            } => {
                let elapsed = start_time.elapsed_since(now) as u128;
                let accrued = initial_amount.saturating_add(amount_per_second.saturating_mul(elapsed));
                Some(accrued.min(max_amount))
            }
            _ => None,
        }
    }

    /// Canonical JSON encoding, used for ids and signing payloads.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        // Field order is fixed by the variant definitions.
        serde_json::to_vec(self).unwrap_or_default()
    }
}

/// The seven scope kinds, without their parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScopeKind {
    NativeTokenTransferAmount,
    NativeTokenPeriodTransfer,
    NativeTokenStreaming,
    Erc20TransferAmount,
    Erc20PeriodTransfer,
    Erc20Streaming,
    Erc721Transfer,
}

impl ScopeKind {
    pub const ALL: [ScopeKind; 7] = [
        Self::NativeTokenTransferAmount,
        Self::NativeTokenPeriodTransfer,
        Self::NativeTokenStreaming,
        Self::Erc20TransferAmount,
        Self::Erc20PeriodTransfer,
        Self::Erc20Streaming,
        Self::Erc721Transfer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NativeTokenTransferAmount => "nativeTokenTransferAmount",
            Self::NativeTokenPeriodTransfer => "nativeTokenPeriodTransfer",
            Self::NativeTokenStreaming => "nativeTokenStreaming",
            Self::Erc20TransferAmount => "erc20TransferAmount",
            Self::Erc20PeriodTransfer => "erc20PeriodTransfer",
            Self::Erc20Streaming => "erc20Streaming",
            Self::Erc721Transfer => "erc721Transfer",
        }
    }

    pub fn is_periodic(&self) -> bool {
        matches!(self, Self::NativeTokenPeriodTransfer | Self::Erc20PeriodTransfer)
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::NativeTokenStreaming | Self::Erc20Streaming)
    }

    pub fn is_erc20(&self) -> bool {
        matches!(
            self,
            Self::Erc20TransferAmount | Self::Erc20PeriodTransfer | Self::Erc20Streaming
        )
    }

    pub fn is_native(&self) -> bool {
        matches!(
            self,
            Self::NativeTokenTransferAmount | Self::NativeTokenPeriodTransfer | Self::NativeTokenStreaming
        )
    }

    /// Label shown to riders.
    pub fn payment_label(&self) -> &'static str {
        if self.is_periodic() {
            "Periodic Payment"
        } else if self.is_streaming() {
            "Streaming Payment"
        } else {
            "Fixed Amount Payment"
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScopeKind {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| TypesError::UnknownScope(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token() -> Address {
        Address::parse("0xb4ae654aca577781ca1c5de8fbe60c2f423f37da").unwrap()
    }

    #[test]
    fn tagged_json_shape() {
        let scope = Scope::Erc20PeriodTransfer {
            token_address: token(),
            period_amount: TokenAmount::from_tokens(10),
            period_duration: 86_400,
            start_date: Timestamp::new(1_700_000_000),
        };
        let json: serde_json::Value = serde_json::to_value(&scope).unwrap();
        assert_eq!(json["type"], "erc20PeriodTransfer");
        assert_eq!(json["periodAmount"], "10000000000000000000");
        assert_eq!(json["periodDuration"], 86_400);
        assert_eq!(json["startDate"], 1_700_000_000u64);

        let back: Scope = serde_json::from_value(json).unwrap();
        assert_eq!(back, scope);
    }

    #[test]
    fn native_scopes_use_zero_token_address() {
        let scope = Scope::NativeTokenTransferAmount {
            max_amount: TokenAmount::new(1),
        };
        assert!(scope.token_address().is_zero());
        assert_eq!(scope.kind(), ScopeKind::NativeTokenTransferAmount);
    }

    #[test]
    fn period_only_for_periodic_scopes() {
        let periodic = Scope::NativeTokenPeriodTransfer {
            period_amount: TokenAmount::new(5),
            period_duration: 60,
            start_date: Timestamp::new(1_000),
        };
        let terms = periodic.period().unwrap();
        assert_eq!(terms.first_reset_time(), Timestamp::new(1_060));

        let fixed = Scope::Erc20TransferAmount {
            token_address: token(),
            max_amount: TokenAmount::new(5),
        };
        assert!(fixed.period().is_none());
    }

    #[test]
    fn initial_allowance_per_kind() {
        let streaming = Scope::Erc20Streaming {
            token_address: token(),
            amount_per_second: TokenAmount::new(1),
            initial_amount: TokenAmount::new(100),
            max_amount: TokenAmount::new(1_000),
            start_time: Timestamp::new(0),
        };
        assert_eq!(streaming.initial_allowance(), TokenAmount::new(100));

        let nft = Scope::Erc721Transfer {
            token_address: token(),
            token_id: TokenId(7),
        };
        assert_eq!(nft.initial_allowance(), TokenAmount::new(1));
    }

    #[test]
    fn streaming_accrues_and_caps() {
        let scope = Scope::NativeTokenStreaming {
            amount_per_second: TokenAmount::new(10),
            initial_amount: TokenAmount::new(100),
            max_amount: TokenAmount::new(500),
            start_time: Timestamp::new(1_000),
        };
        assert_eq!(
            scope.streaming_allowance_at(Timestamp::new(1_010)),
            Some(TokenAmount::new(200))
        );
        assert_eq!(
            scope.streaming_allowance_at(Timestamp::new(9_999)),
            Some(TokenAmount::new(500))
        );
        // Before the start only the initial amount is available.
        assert_eq!(
            scope.streaming_allowance_at(Timestamp::new(10)),
            Some(TokenAmount::new(100))
        );
    }

    #[test]
    fn scope_kind_parses_case_insensitively() {
        assert_eq!(
            "ERC20PeriodTransfer".parse::<ScopeKind>().unwrap(),
            ScopeKind::Erc20PeriodTransfer
        );
        assert!("erc1155Transfer".parse::<ScopeKind>().is_err());
    }

    #[test]
    fn every_kind_has_a_unique_name() {
        let mut names: Vec<_> = ScopeKind::ALL.iter().map(|k| k.as_str()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 7);
    }
}
