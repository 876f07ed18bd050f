//! Usage status of a tracked delegation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a tracked delegation stands in its lifecycle.
///
/// `Active -> Exhausted` when the allowance runs out, `Active | Exhausted ->
/// Revoked` on explicit revocation. `Revoked` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DelegationStatus {
    /// Payments may be made against the allowance.
    Active,
    /// The allowance is used up.
    Exhausted,
    /// The delegator withdrew the permission.
    Revoked,
}

impl DelegationStatus {
    /// Whether new payments may be attempted.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Whether no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Revoked)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Exhausted => "EXHAUSTED",
            Self::Revoked => "REVOKED",
        }
    }
}

impl fmt::Display for DelegationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
