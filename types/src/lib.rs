//! Fundamental types for ridepay.
//!
//! This crate defines the core types shared across every other crate in the workspace:
//! chain addresses, token amounts, timestamps and clocks, delegation scopes,
//! delegations, usage status, and the common error type.

pub mod address;
pub mod amount;
pub mod delegation;
pub mod error;
pub mod hash;
pub mod keys;
pub mod network;
pub mod scope;
pub mod state;
pub mod time;

pub use address::Address;
pub use amount::{Allowance, TokenAmount, TOKEN_DECIMALS};
pub use delegation::{Delegation, SignedDelegation};
pub use error::TypesError;
pub use hash::{DelegationId, TxHash, UserOpHash};
pub use keys::{KeyPair, PrivateKey, PublicKey, Signature};
pub use network::ChainId;
pub use scope::{PeriodTerms, Scope, ScopeKind, TokenId};
pub use state::DelegationStatus;
pub use time::{Clock, SystemClock, Timestamp};
