//! Ed25519 signing of messages and delegations.

use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use ridepay_types::{Delegation, PrivateKey, PublicKey, Signature, SignedDelegation};

/// Sign a message with a private key, returning the signature.
pub fn sign_message(message: &[u8], private_key: &PrivateKey) -> Signature {
    let signing_key = SigningKey::from_bytes(&private_key.0);
    Signature(signing_key.sign(message).to_bytes())
}

/// Verify a signature against a message and public key.
///
/// Returns `true` if the signature is valid, `false` otherwise.
pub fn verify_signature(message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_bytes(&public_key.0) else {
        return false;
    };
    let dalek_sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    verifying_key.verify(message, &dalek_sig).is_ok()
}

/// Sign a delegation's canonical payload.
pub fn sign_delegation(delegation: Delegation, private_key: &PrivateKey) -> SignedDelegation {
    let signature = sign_message(&delegation.signing_payload(), private_key);
    delegation.into_signed(signature)
}

/// Check a signed delegation against the delegator's public key.
pub fn verify_delegation(signed: &SignedDelegation, public_key: &PublicKey) -> bool {
    verify_signature(
        &signed.delegation.signing_payload(),
        &signed.signature,
        public_key,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::derive_address;
    use crate::keys::{generate_keypair, keypair_from_seed};
    use ridepay_types::{Address, ChainId, Scope, TokenAmount};

    fn delegation_from(delegator: Address) -> Delegation {
        Delegation::new(
            delegator,
            Address::new([9; 20]),
            Scope::NativeTokenTransferAmount {
                max_amount: TokenAmount::new(1_000),
            },
            ChainId::Sepolia,
        )
    }

    #[test]
    fn sign_and_verify() {
        let kp = generate_keypair();
        let sig = sign_message(b"ride fare", &kp.private);
        assert!(verify_signature(b"ride fare", &sig, &kp.public));
        assert!(!verify_signature(b"other fare", &sig, &kp.public));
    }

    #[test]
    fn wrong_key_fails() {
        let kp1 = generate_keypair();
        let kp2 = generate_keypair();
        let sig = sign_message(b"test", &kp1.private);
        assert!(!verify_signature(b"test", &sig, &kp2.public));
    }

    #[test]
    fn signed_delegation_verifies() {
        let kp = keypair_from_seed(&[5u8; 32]);
        let signed = sign_delegation(delegation_from(derive_address(&kp.public)), &kp.private);
        assert!(verify_delegation(&signed, &kp.public));
    }

    #[test]
    fn tampered_scope_fails_verification() {
        let kp = keypair_from_seed(&[5u8; 32]);
        let mut signed = sign_delegation(delegation_from(derive_address(&kp.public)), &kp.private);
        signed.delegation.scope = Scope::NativeTokenTransferAmount {
            max_amount: TokenAmount::new(1_000_000),
        };
        assert!(!verify_delegation(&signed, &kp.public));
    }

    #[test]
    fn invalid_public_key() {
        let kp = generate_keypair();
        let sig = sign_message(b"test", &kp.private);
        assert!(!verify_signature(b"test", &sig, &PublicKey([0xFF; 32])));
    }
}
