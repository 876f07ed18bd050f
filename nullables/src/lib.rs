//! Nullable infrastructure for deterministic testing.
//!
//! External dependencies (clock, browser-style storage, bundler) are
//! abstracted behind traits. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod bundler;
pub mod clock;
pub mod storage;

pub use bundler::NullBundler;
pub use clock::NullClock;
pub use storage::NullStorage;
