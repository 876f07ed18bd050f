//! Spending-limit service: build, sign and store delegations.

use ridepay_store::{DelegationStore, LocalStorage, StorageClient};
use ridepay_types::{Address, ChainId, Delegation, SignedDelegation, Timestamp};

use crate::account::SmartAccount;
use crate::config::{build_delegation, DelegationConfig};
use crate::error::WalletError;
use crate::ride::RidePreset;
use crate::scopes::DelegationParties;
use crate::signer::DelegationSigner;

/// Creates spending-limit delegations from a delegator account to a delegate.
///
/// Every operation returns its error, and the message of the most recent
/// failure is also kept for display until the next operation starts.
pub struct SpendingLimits<S, A = SmartAccount> {
    delegator: Option<A>,
    delegate: Option<Address>,
    storage: StorageClient<S>,
    last_error: Option<String>,
}

impl<S: LocalStorage, A: DelegationSigner> SpendingLimits<S, A> {
    pub fn new(storage: StorageClient<S>) -> Self {
        Self {
            delegator: None,
            delegate: None,
            storage,
            last_error: None,
        }
    }

    pub fn with_delegator(mut self, delegator: A) -> Self {
        self.delegator = Some(delegator);
        self
    }

    pub fn with_delegate(mut self, delegate: Address) -> Self {
        self.delegate = Some(delegate);
        self
    }

    pub fn delegator(&self) -> Option<&A> {
        self.delegator.as_ref()
    }

    pub fn delegate(&self) -> Option<Address> {
        self.delegate
    }

    pub fn storage(&self) -> &StorageClient<S> {
        &self.storage
    }

    /// Message of the last failed operation, if the last operation failed.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Build the delegation described by `config`, sign it with the delegator
    /// and store it under the delegate's key.
    pub fn create_delegation(
        &mut self,
        config: &DelegationConfig,
        now: Timestamp,
    ) -> Result<SignedDelegation, WalletError> {
        self.last_error = None;
        let result = self.try_create_delegation(config, now);
        self.remember(result)
    }

    fn try_create_delegation(
        &self,
        config: &DelegationConfig,
        now: Timestamp,
    ) -> Result<SignedDelegation, WalletError> {
        let (Some(delegator), Some(delegate)) = (self.delegator.as_ref(), self.delegate) else {
            return Err(WalletError::MissingAccount);
        };

        let parties = DelegationParties::new(delegator.address(), delegate, delegator.environment());
        let delegation = build_delegation(config, &parties, now)?;
        self.sign_and_store(delegator, delegation)
    }

    /// Like [`create_delegation`](Self::create_delegation), for a ride preset
    /// paid in `token_address`.
    pub fn create_preset_delegation(
        &mut self,
        preset: RidePreset,
        token_address: Address,
        now: Timestamp,
    ) -> Result<SignedDelegation, WalletError> {
        self.last_error = None;
        let result = match (self.delegator.as_ref(), self.delegate) {
            (Some(delegator), Some(delegate)) => {
                let parties =
                    DelegationParties::new(delegator.address(), delegate, delegator.environment());
                preset
                    .build(&parties, token_address, now)
                    .and_then(|delegation| self.sign_and_store(delegator, delegation))
            }
            _ => Err(WalletError::MissingAccount),
        };
        self.remember(result)
    }

    fn sign_and_store(
        &self,
        delegator: &A,
        mut delegation: Delegation,
    ) -> Result<SignedDelegation, WalletError> {
        delegation.salt = rand::random();
        let signed = delegator.sign_delegation(delegation)?;
        self.storage.store_delegation(&signed)?;
        tracing::info!(
            delegator = %signed.delegator(),
            delegate = %signed.delegate(),
            scope = %signed.scope().kind(),
            "created delegation"
        );
        Ok(signed)
    }

    /// Create a hybrid smart account from `private_key` (hex), or from a
    /// freshly generated key when none is given.
    pub fn create_hybrid_smart_account(
        &mut self,
        private_key: Option<&str>,
        environment: ChainId,
    ) -> Result<SmartAccount, WalletError> {
        self.last_error = None;
        let result = match private_key {
            Some(raw) => SmartAccount::from_private_key_hex(raw, environment),
            None => Ok(SmartAccount::generate(environment)),
        };
        if let Ok(account) = &result {
            tracing::info!(
                address = %account.address(),
                signer = %account.signer_address(),
                "created hybrid smart account"
            );
        }
        self.remember(result)
    }

    /// All stored delegations.
    pub fn delegations(&self) -> Result<Vec<SignedDelegation>, WalletError> {
        Ok(self.storage.get_delegations()?)
    }

    fn remember<T>(&mut self, result: Result<T, WalletError>) -> Result<T, WalletError> {
        if let Err(e) = &result {
            tracing::warn!(error = %e, "spending-limit operation failed");
            self.last_error = Some(e.to_string());
        }
        result
    }
}
