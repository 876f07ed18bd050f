//! Blake2b hashing and delegation id derivation.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use ridepay_types::{Address, DelegationId, Scope};

type Blake2b256 = Blake2b<U32>;

/// Compute a 256-bit Blake2b hash of arbitrary data.
pub fn blake2b_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Hash multiple byte slices in sequence (avoids concatenation allocation).
pub fn blake2b_256_multi(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Derive the ledger id of a delegation.
///
/// Hashes delegator, delegate and the canonical scope encoding. Two
/// delegations between the same accounts with identical scopes share an id.
pub fn delegation_id(delegator: &Address, delegate: &Address, scope: &Scope) -> DelegationId {
    let scope_bytes = scope.canonical_bytes();
    DelegationId::new(blake2b_256_multi(&[
        delegator.as_bytes(),
        delegate.as_bytes(),
        &scope_bytes,
    ]))
}
