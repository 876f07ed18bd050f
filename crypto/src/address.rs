//! Account address derivation from public keys.
//!
//! Address = last 20 bytes of Blake2b-256(public_key), rendered as `0x` + 40
//! lowercase hex characters.

use ridepay_types::{Address, PublicKey};

use crate::hash::blake2b_256;

/// Derive the account address for a public key.
pub fn derive_address(public_key: &PublicKey) -> Address {
    let digest = blake2b_256(public_key.as_bytes());
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&digest[12..]);
    Address::new(bytes)
}
