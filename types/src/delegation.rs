//! Delegations: scoped spending permissions from a delegator to a delegate.

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::keys::Signature;
use crate::network::ChainId;
use crate::scope::Scope;

/// An unsigned delegation.
///
/// Serialized with the wire names `from` / `to` for delegator / delegate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delegation {
    /// The account granting the permission.
    #[serde(rename = "from")]
    pub delegator: Address,
    /// The account allowed to spend.
    #[serde(rename = "to")]
    pub delegate: Address,
    /// The spending policy.
    pub scope: Scope,
    /// Chain the delegation is valid on.
    #[serde(default)]
    pub environment: ChainId,
    /// Distinguishes otherwise identical delegations.
    #[serde(default)]
    pub salt: u64,
}

impl Delegation {
    pub fn new(delegator: Address, delegate: Address, scope: Scope, environment: ChainId) -> Self {
        Self {
            delegator,
            delegate,
            scope,
            environment,
            salt: 0,
        }
    }

    /// Bytes the delegator signs: the canonical JSON of the delegation.
    pub fn signing_payload(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }

    /// Attach a signature.
    pub fn into_signed(self, signature: Signature) -> SignedDelegation {
        SignedDelegation {
            delegation: self,
            signature,
        }
    }
}

/// A delegation together with the delegator's signature.
///
/// Serialized flat: the delegation's fields plus `signature`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedDelegation {
    #[serde(flatten)]
    pub delegation: Delegation,
    pub signature: Signature,
}

impl SignedDelegation {
    pub fn delegator(&self) -> Address {
        self.delegation.delegator
    }

    pub fn delegate(&self) -> Address {
        self.delegation.delegate
    }

    pub fn scope(&self) -> &Scope {
        &self.delegation.scope
    }
}
