use ridepay_store::StoreError;
use ridepay_types::UserOpHash;
use ridepay_utils::UnitsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("delegator or delegate account not found")]
    MissingAccount,

    #[error("token address is required for ERC-20 scopes")]
    MissingTokenAddress,

    #[error("token address and token ID are required for ERC-721 scopes")]
    MissingNftTarget,

    #[error("invalid amount: {0}")]
    InvalidAmount(#[from] UnitsError),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("key error: {0}")]
    Key(String),

    #[error("signing error: {0}")]
    Signing(String),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    #[error("bundler RPC error: {0}")]
    Bundler(String),

    #[error("user operation {0} was not included in time")]
    ReceiptTimeout(UserOpHash),

    #[error("user operation {0} reverted")]
    Reverted(UserOpHash),

    #[error("{0}")]
    Other(String),
}
