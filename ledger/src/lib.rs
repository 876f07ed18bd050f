//! Delegation usage ledger.
//!
//! Tracks, per delegation, how much of its allowance has been spent and what
//! remains, resetting periodic allowances when their period rolls over. The
//! ledger is advisory: it never talks to a chain, and lives only as long as
//! the [`DelegationMonitor`] that owns it.

pub mod monitor;
pub mod usage;

pub use monitor::{DelegationMonitor, LedgerSummary};
pub use usage::DelegationUsage;
