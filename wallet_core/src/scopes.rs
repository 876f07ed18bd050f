//! Builders for the seven spending-limit scopes.
//!
//! Each builder produces an unsigned [`Delegation`] from the delegator to the
//! delegate on the delegator's chain. Time-based scopes start at the `start`
//! timestamp supplied by the caller.

use ridepay_types::{Address, ChainId, Delegation, Scope, Timestamp, TokenAmount, TokenId};

/// 0.01 of a native token.
pub const DEFAULT_NATIVE_MAX_AMOUNT: TokenAmount = TokenAmount::new(10_000_000_000_000_000);
/// 0.01 of a native token per period.
pub const DEFAULT_NATIVE_PERIOD_AMOUNT: TokenAmount = TokenAmount::new(10_000_000_000_000_000);
/// 0.0001 of a native token per second.
pub const DEFAULT_NATIVE_AMOUNT_PER_SECOND: TokenAmount = TokenAmount::new(100_000_000_000_000);
/// 0.01 of a native token available up front.
pub const DEFAULT_NATIVE_INITIAL_AMOUNT: TokenAmount = TokenAmount::new(10_000_000_000_000_000);
/// 0.1 of a native token at most.
pub const DEFAULT_NATIVE_STREAMING_MAX: TokenAmount = TokenAmount::new(100_000_000_000_000_000);

pub const DEFAULT_ERC20_MAX_AMOUNT: TokenAmount = TokenAmount::from_tokens(10);
pub const DEFAULT_ERC20_PERIOD_AMOUNT: TokenAmount = TokenAmount::from_tokens(10);
/// Raw base units per second, not scaled by decimals.
pub const DEFAULT_ERC20_AMOUNT_PER_SECOND: TokenAmount = TokenAmount::new(100_000_000);
pub const DEFAULT_ERC20_INITIAL_AMOUNT: TokenAmount = TokenAmount::from_tokens(1);
pub const DEFAULT_ERC20_STREAMING_MAX: TokenAmount = TokenAmount::from_tokens(100);

/// One day, in seconds.
pub const DEFAULT_PERIOD_DURATION: u64 = 86_400;

/// Who grants a delegation, to whom, and on which chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DelegationParties {
    pub delegator: Address,
    pub delegate: Address,
    pub environment: ChainId,
}

impl DelegationParties {
    pub fn new(delegator: Address, delegate: Address, environment: ChainId) -> Self {
        Self {
            delegator,
            delegate,
            environment,
        }
    }

    /// A delegation with the given scope between these parties.
    pub fn delegation(&self, scope: Scope) -> Delegation {
        Delegation::new(self.delegator, self.delegate, scope, self.environment)
    }
}

/// Fixed cap on native-token transfers.
pub fn native_token_transfer(parties: &DelegationParties, max_amount: TokenAmount) -> Delegation {
    parties.delegation(Scope::NativeTokenTransferAmount { max_amount })
}

/// Native-token allowance that refills every `period_duration` seconds.
pub fn native_token_period(
    parties: &DelegationParties,
    period_amount: TokenAmount,
    period_duration: u64,
    start: Timestamp,
) -> Delegation {
    parties.delegation(Scope::NativeTokenPeriodTransfer {
        period_amount,
        period_duration,
        start_date: start,
    })
}

/// Native-token allowance accruing linearly up to `max_amount`.
pub fn native_token_streaming(
    parties: &DelegationParties,
    amount_per_second: TokenAmount,
    initial_amount: TokenAmount,
    max_amount: TokenAmount,
    start: Timestamp,
) -> Delegation {
    parties.delegation(Scope::NativeTokenStreaming {
        amount_per_second,
        initial_amount,
        max_amount,
        start_time: start,
    })
}

pub fn erc20_transfer(
    parties: &DelegationParties,
    token_address: Address,
    max_amount: TokenAmount,
) -> Delegation {
    parties.delegation(Scope::Erc20TransferAmount {
        token_address,
        max_amount,
    })
}

pub fn erc20_period(
    parties: &DelegationParties,
    token_address: Address,
    period_amount: TokenAmount,
    period_duration: u64,
    start: Timestamp,
) -> Delegation {
    parties.delegation(Scope::Erc20PeriodTransfer {
        token_address,
        period_amount,
        period_duration,
        start_date: start,
    })
}

pub fn erc20_streaming(
    parties: &DelegationParties,
    token_address: Address,
    amount_per_second: TokenAmount,
    initial_amount: TokenAmount,
    max_amount: TokenAmount,
    start: Timestamp,
) -> Delegation {
    parties.delegation(Scope::Erc20Streaming {
        token_address,
        amount_per_second,
        initial_amount,
        max_amount,
        start_time: start,
    })
}

/// Permission to transfer a single NFT.
pub fn erc721_transfer(
    parties: &DelegationParties,
    token_address: Address,
    token_id: TokenId,
) -> Delegation {
    parties.delegation(Scope::Erc721Transfer {
        token_address,
        token_id,
    })
}
