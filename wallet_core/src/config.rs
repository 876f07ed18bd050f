//! Form-style delegation settings and their conversion into a delegation.

use ridepay_types::{Address, Delegation, ScopeKind, Timestamp, TokenAmount, TokenId};
use serde::{Deserialize, Serialize};

use crate::error::WalletError;
use crate::scopes::{self, DelegationParties};

/// User-supplied parameters for a new delegation.
///
/// Every amount is optional and falls back to the scope's default when
/// absent or zero.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationConfig {
    pub scope_type: ScopeKind,
    #[serde(default)]
    pub token_address: Option<Address>,
    #[serde(default)]
    pub token_id: Option<TokenId>,
    #[serde(default)]
    pub max_amount: Option<TokenAmount>,
    #[serde(default)]
    pub period_amount: Option<TokenAmount>,
    #[serde(default)]
    pub period_duration: Option<u64>,
    #[serde(default)]
    pub amount_per_second: Option<TokenAmount>,
    #[serde(default)]
    pub initial_amount: Option<TokenAmount>,
}

impl DelegationConfig {
    pub fn new(scope_type: ScopeKind) -> Self {
        Self {
            scope_type,
            token_address: None,
            token_id: None,
            max_amount: None,
            period_amount: None,
            period_duration: None,
            amount_per_second: None,
            initial_amount: None,
        }
    }

    pub fn with_token(mut self, token_address: Address) -> Self {
        self.token_address = Some(token_address);
        self
    }
}

fn or_default(value: Option<TokenAmount>, default: TokenAmount) -> TokenAmount {
    value.filter(|v| !v.is_zero()).unwrap_or(default)
}

fn duration_or_default(value: Option<u64>) -> u64 {
    value
        .filter(|d| *d != 0)
        .unwrap_or(scopes::DEFAULT_PERIOD_DURATION)
}

/// Build the unsigned delegation described by `config`. Time-based scopes
/// start at `now`.
pub fn build_delegation(
    config: &DelegationConfig,
    parties: &DelegationParties,
    now: Timestamp,
) -> Result<Delegation, WalletError> {
    let erc20_token = || config.token_address.ok_or(WalletError::MissingTokenAddress);

    let delegation = match config.scope_type {
        ScopeKind::NativeTokenTransferAmount => scopes::native_token_transfer(
            parties,
            or_default(config.max_amount, scopes::DEFAULT_NATIVE_MAX_AMOUNT),
        ),
        ScopeKind::NativeTokenPeriodTransfer => scopes::native_token_period(
            parties,
            or_default(config.period_amount, scopes::DEFAULT_NATIVE_PERIOD_AMOUNT),
            duration_or_default(config.period_duration),
            now,
        ),
        ScopeKind::NativeTokenStreaming => scopes::native_token_streaming(
            parties,
            or_default(config.amount_per_second, scopes::DEFAULT_NATIVE_AMOUNT_PER_SECOND),
            or_default(config.initial_amount, scopes::DEFAULT_NATIVE_INITIAL_AMOUNT),
            or_default(config.max_amount, scopes::DEFAULT_NATIVE_STREAMING_MAX),
            now,
        ),
        ScopeKind::Erc20TransferAmount => scopes::erc20_transfer(
            parties,
            erc20_token()?,
            or_default(config.max_amount, scopes::DEFAULT_ERC20_MAX_AMOUNT),
        ),
        ScopeKind::Erc20PeriodTransfer => scopes::erc20_period(
            parties,
            erc20_token()?,
            or_default(config.period_amount, scopes::DEFAULT_ERC20_PERIOD_AMOUNT),
            duration_or_default(config.period_duration),
            now,
        ),
        ScopeKind::Erc20Streaming => scopes::erc20_streaming(
            parties,
            erc20_token()?,
            or_default(config.amount_per_second, scopes::DEFAULT_ERC20_AMOUNT_PER_SECOND),
            or_default(config.initial_amount, scopes::DEFAULT_ERC20_INITIAL_AMOUNT),
            or_default(config.max_amount, scopes::DEFAULT_ERC20_STREAMING_MAX),
            now,
        ),
        ScopeKind::Erc721Transfer => match (config.token_address, config.token_id) {
            (Some(token), Some(id)) => scopes::erc721_transfer(parties, token, id),
            _ => return Err(WalletError::MissingNftTarget),
        },
    };
    Ok(delegation)
}
