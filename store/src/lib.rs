//! Storage traits for ridepay.
//!
//! Signed delegations are kept in a string key/value store modelled on
//! browser `localStorage`. Backends (a JSON file on disk, in-memory for
//! testing) implement [`LocalStorage`]; the rest of the codebase talks to
//! delegations through [`DelegationStore`].

pub mod delegation;
pub mod error;
pub mod local;

pub use delegation::{delegation_key, DelegationStore, StorageClient, DELEGATION_KEY_PREFIX};
pub use error::StoreError;
pub use local::LocalStorage;
