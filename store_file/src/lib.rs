//! JSON-file storage backend.
//!
//! Implements [`ridepay_store::LocalStorage`] over a single JSON object file,
//! the on-disk counterpart of browser `localStorage`.

pub mod storage;

pub use storage::FileStorage;
