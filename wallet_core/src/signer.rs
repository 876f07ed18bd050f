//! Delegation signing.

use ridepay_crypto::sign_delegation;
use ridepay_types::{Address, ChainId, Delegation, SignedDelegation};

use crate::account::SmartAccount;
use crate::error::WalletError;

/// An account able to sign delegations it grants.
pub trait DelegationSigner {
    /// The address delegations are granted from.
    fn address(&self) -> Address;
    fn environment(&self) -> ChainId;
    fn sign_delegation(&self, delegation: Delegation) -> Result<SignedDelegation, WalletError>;
}

impl DelegationSigner for SmartAccount {
    fn address(&self) -> Address {
        SmartAccount::address(self)
    }

    fn environment(&self) -> ChainId {
        SmartAccount::environment(self)
    }

    fn sign_delegation(&self, delegation: Delegation) -> Result<SignedDelegation, WalletError> {
        if delegation.delegator != self.address() {
            return Err(WalletError::Signing(format!(
                "delegation is granted by {}, not by this account ({})",
                delegation.delegator,
                self.address()
            )));
        }
        Ok(sign_delegation(delegation, self.private_key()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ridepay_crypto::{keypair_from_seed, verify_delegation};
    use ridepay_types::{Scope, TokenAmount};

    fn account() -> SmartAccount {
        SmartAccount::hybrid(keypair_from_seed(&[3; 32]), ChainId::Sepolia)
    }

    fn delegation_from(delegator: Address) -> Delegation {
        Delegation::new(
            delegator,
            Address::new([9; 20]),
            Scope::NativeTokenTransferAmount {
                max_amount: TokenAmount::new(1),
            },
            ChainId::Sepolia,
        )
    }

    #[test]
    fn signs_own_delegation() {
        let account = account();
        let signed = account
            .sign_delegation(delegation_from(account.address()))
            .unwrap();
        assert!(verify_delegation(&signed, account.public_key()));
    }

    #[test]
    fn refuses_foreign_delegation() {
        let account = account();
        assert!(matches!(
            account.sign_delegation(delegation_from(Address::new([1; 20]))),
            Err(WalletError::Signing(_))
        ));
    }
}
