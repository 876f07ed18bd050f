//! Hybrid smart accounts backed by an Ed25519 signer key.

use ridepay_crypto::{blake2b_256_multi, derive_address, generate_keypair, keypair_from_private};
use ridepay_store::LocalStorage;
use ridepay_types::{Address, ChainId, KeyPair, PrivateKey, PublicKey};
use serde::{Deserialize, Serialize};

use crate::error::WalletError;

/// Smart-account implementation flavour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Implementation {
    /// Controlled by an EOA key, extensible with passkeys.
    Hybrid,
}

/// A counterfactual smart account: its address is derived from the signer
/// and chain, whether or not it has been deployed.
pub struct SmartAccount {
    address: Address,
    signer_address: Address,
    implementation: Implementation,
    environment: ChainId,
    keys: KeyPair,
}

impl SmartAccount {
    /// A hybrid account controlled by `keys`.
    pub fn hybrid(keys: KeyPair, environment: ChainId) -> Self {
        let signer_address = derive_address(&keys.public);
        let address = counterfactual_address(&signer_address, environment);
        Self {
            address,
            signer_address,
            implementation: Implementation::Hybrid,
            environment,
            keys,
        }
    }

    /// A hybrid account with a freshly generated key.
    pub fn generate(environment: ChainId) -> Self {
        Self::hybrid(generate_keypair(), environment)
    }

    /// A hybrid account from a hex-encoded private key.
    pub fn from_private_key_hex(raw: &str, environment: ChainId) -> Result<Self, WalletError> {
        let private = PrivateKey::from_hex(raw)
            .ok_or_else(|| WalletError::Key("private key must be 32 bytes of hex".into()))?;
        Ok(Self::hybrid(keypair_from_private(private), environment))
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Address of the EOA key controlling the account.
    pub fn signer_address(&self) -> Address {
        self.signer_address
    }

    pub fn implementation(&self) -> Implementation {
        self.implementation
    }

    pub fn environment(&self) -> ChainId {
        self.environment
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.keys.public
    }

    pub(crate) fn private_key(&self) -> &PrivateKey {
        &self.keys.private
    }

    /// Hex of the signer's private key, for backup by its owner.
    pub fn export_private_key(&self) -> String {
        self.keys.private.to_hex()
    }
}

impl std::fmt::Debug for SmartAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmartAccount")
            .field("address", &self.address)
            .field("signer_address", &self.signer_address)
            .field("implementation", &self.implementation)
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

fn counterfactual_address(signer: &Address, environment: ChainId) -> Address {
    let digest = blake2b_256_multi(&[
        b"ridepay-hybrid-account",
        signer.as_bytes(),
        &environment.numeric().to_be_bytes(),
    ]);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest[12..]);
    Address::new(bytes)
}

// ── Persistence ─────────────────────────────────────────────────────────

/// Which side of a delegation an account plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccountRole {
    Delegator,
    Delegate,
}

impl AccountRole {
    pub fn storage_key(&self) -> &'static str {
        match self {
            Self::Delegator => "account-delegator",
            Self::Delegate => "account-delegate",
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredAccount {
    private_key: String,
    environment: ChainId,
}

/// Persist `account`'s key under its role.
pub fn save_account<S: LocalStorage>(
    storage: &S,
    role: AccountRole,
    account: &SmartAccount,
) -> Result<(), WalletError> {
    let stored = StoredAccount {
        private_key: account.export_private_key(),
        environment: account.environment(),
    };
    let json = serde_json::to_string(&stored).map_err(|e| WalletError::Other(e.to_string()))?;
    storage.set_item(role.storage_key(), &json)?;
    tracing::debug!(role = role.storage_key(), address = %account.address(), "saved account");
    Ok(())
}

/// Load the account saved under `role`, if any.
pub fn load_account<S: LocalStorage>(
    storage: &S,
    role: AccountRole,
) -> Result<Option<SmartAccount>, WalletError> {
    let Some(json) = storage.get_item(role.storage_key())? else {
        return Ok(None);
    };
    let stored: StoredAccount = serde_json::from_str(&json)
        .map_err(|e| WalletError::Key(format!("{}: {e}", role.storage_key())))?;
    SmartAccount::from_private_key_hex(&stored.private_key, stored.environment).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ridepay_crypto::keypair_from_seed;

    #[test]
    fn address_is_deterministic_per_key_and_chain() {
        let a = SmartAccount::hybrid(keypair_from_seed(&[7; 32]), ChainId::Sepolia);
        let b = SmartAccount::hybrid(keypair_from_seed(&[7; 32]), ChainId::Sepolia);
        let c = SmartAccount::hybrid(keypair_from_seed(&[7; 32]), ChainId::Mainnet);
        assert_eq!(a.address(), b.address());
        assert_ne!(a.address(), c.address());
        assert_ne!(a.address(), a.signer_address());
        assert_eq!(a.implementation(), Implementation::Hybrid);
    }

    #[test]
    fn private_key_roundtrip() {
        let a = SmartAccount::generate(ChainId::Sepolia);
        let b = SmartAccount::from_private_key_hex(&a.export_private_key(), ChainId::Sepolia).unwrap();
        assert_eq!(a.address(), b.address());
    }

    #[test]
    fn bad_private_key() {
        assert!(matches!(
            SmartAccount::from_private_key_hex("0x1234", ChainId::Sepolia),
            Err(WalletError::Key(_))
        ));
    }

    #[test]
    fn debug_hides_key() {
        let a = SmartAccount::hybrid(keypair_from_seed(&[7; 32]), ChainId::Sepolia);
        assert!(!format!("{a:?}").contains(&a.export_private_key()[2..]));
    }
}
