//! Cryptographic primitives for ridepay.
//!
//! - **Ed25519** for delegation signing and signature verification
//! - **Blake2b** for hashing (delegation ids, call data digests)
//! - Address derivation: last 20 bytes of Blake2b-256(public key), `0x` hex

pub mod address;
pub mod hash;
pub mod keys;
pub mod sign;

pub use address::derive_address;
pub use hash::{blake2b_256, blake2b_256_multi, delegation_id};
pub use keys::{generate_keypair, keypair_from_private, keypair_from_seed, public_from_private};
pub use sign::{sign_delegation, sign_message, verify_delegation, verify_signature};
