//! Wallet core library for ridepay.
//!
//! Provides everything the ride-payment client needs:
//! - Hybrid smart accounts and their persistence
//! - Spending-limit scope builders, ride presets and form-style configs
//! - Delegation creation (build, sign, store)
//! - Redemption call data and bundler submission of ride payments

pub mod account;
pub mod bundler;
pub mod config;
pub mod error;
pub mod executor;
pub mod redeem;
pub mod ride;
pub mod scopes;
pub mod signer;
pub mod spending;

pub use account::{load_account, save_account, AccountRole, Implementation, SmartAccount};
pub use bundler::{
    BundlerClient, Call, GasFees, GasPriceTiers, RpcBundlerClient, TransactionReceipt,
    UserOperation, UserOperationReceipt, ENTRY_POINT_V07,
};
pub use config::{build_delegation, DelegationConfig};
pub use error::WalletError;
pub use executor::{PaymentReceipt, RidePaymentExecutor};
pub use redeem::{prepare_redeem_delegation_data, CallData, Execution, ExecutionMode};
pub use ride::{RidePreset, DEFAULT_ERC20_TOKEN};
pub use scopes::DelegationParties;
pub use signer::DelegationSigner;
pub use spending::SpendingLimits;
