//! Per-delegation usage record.

use ridepay_types::{
    Address, Allowance, DelegationId, DelegationStatus, Scope, ScopeKind, Timestamp, TokenAmount,
};
use serde::{Deserialize, Serialize};

/// What has been spent under one delegation and what remains.
///
/// `remaining_allowance` is signed: a payment larger than the remaining
/// allowance is still recorded and leaves the balance negative.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationUsage {
    pub delegation_id: DelegationId,
    pub delegator: Address,
    pub delegate: Address,
    /// Token contract, zero address for native-token scopes.
    pub token_address: Address,
    pub scope: Scope,
    pub scope_type: ScopeKind,
    /// Spent in the current period (or in total, for non-periodic scopes).
    pub total_spent: TokenAmount,
    pub remaining_allowance: Allowance,
    /// When the current period ends. Periodic scopes only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_reset_time: Option<Timestamp>,
    pub last_updated: Timestamp,
    pub status: DelegationStatus,
}

impl DelegationUsage {
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Whether the current period has ended at `now`.
    pub fn period_elapsed(&self, now: Timestamp) -> bool {
        self.period_reset_time
            .is_some_and(|reset| reset.has_passed(now))
    }

    /// Start a new period at `now`: the allowance is refilled and spending
    /// restarts from zero. No-op for non-periodic scopes.
    pub(crate) fn roll_period(&mut self, now: Timestamp) {
        let Some(terms) = self.scope.period() else {
            return;
        };
        self.period_reset_time = Some(now.plus(terms.period_duration));
        self.remaining_allowance = terms.period_amount.into();
        self.total_spent = TokenAmount::ZERO;
    }

    /// Record `amount` as spent. Status is left to [`Self::settle_status`].
    pub(crate) fn debit(&mut self, amount: TokenAmount) {
        self.total_spent = self.total_spent.saturating_add(amount);
        self.remaining_allowance = self.remaining_allowance.debit(amount);
    }

    /// Mark the delegation exhausted once nothing remains. Revocation is
    /// final and is never overwritten.
    pub(crate) fn settle_status(&mut self) {
        if self.remaining_allowance.is_depleted() && self.status != DelegationStatus::Revoked {
            self.status = DelegationStatus::Exhausted;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn periodic_usage(reset: u64) -> DelegationUsage {
        let scope = Scope::Erc20PeriodTransfer {
            token_address: Address::new([3; 20]),
            period_amount: TokenAmount::from_tokens(10),
            period_duration: 100,
            start_date: Timestamp::new(reset - 100),
        };
        DelegationUsage {
            delegation_id: DelegationId::new([1; 32]),
            delegator: Address::new([1; 20]),
            delegate: Address::new([2; 20]),
            token_address: scope.token_address(),
            scope_type: scope.kind(),
            scope,
            total_spent: TokenAmount::from_tokens(4),
            remaining_allowance: Allowance::from(TokenAmount::from_tokens(6)),
            period_reset_time: Some(Timestamp::new(reset)),
            last_updated: Timestamp::new(reset - 50),
            status: DelegationStatus::Active,
        }
    }

    #[test]
    fn period_elapsed_is_strict() {
        let usage = periodic_usage(1_000);
        assert!(!usage.period_elapsed(Timestamp::new(1_000)));
        assert!(usage.period_elapsed(Timestamp::new(1_001)));
    }

    #[test]
    fn roll_period_refills() {
        let mut usage = periodic_usage(1_000);
        usage.roll_period(Timestamp::new(1_500));
        assert_eq!(usage.period_reset_time, Some(Timestamp::new(1_600)));
        assert_eq!(usage.total_spent, TokenAmount::ZERO);
        assert_eq!(
            usage.remaining_allowance,
            Allowance::from(TokenAmount::from_tokens(10))
        );
    }

    #[test]
    fn settle_does_not_unrevoke() {
        let mut usage = periodic_usage(1_000);
        usage.status = DelegationStatus::Revoked;
        usage.debit(TokenAmount::from_tokens(6));
        usage.settle_status();
        assert_eq!(usage.status, DelegationStatus::Revoked);
        assert!(usage.remaining_allowance.is_depleted());
    }

    #[test]
    fn debit_leaves_status_alone() {
        let mut usage = periodic_usage(1_000);
        usage.debit(TokenAmount::from_tokens(7));
        assert_eq!(usage.total_spent, TokenAmount::from_tokens(11));
        assert!(usage.remaining_allowance.is_depleted());
        assert_eq!(usage.status, DelegationStatus::Active);
        usage.settle_status();
        assert_eq!(usage.status, DelegationStatus::Exhausted);
    }

    #[test]
    fn serializes_amounts_as_strings() {
        let json = serde_json::to_string(&periodic_usage(1_000)).unwrap();
        assert!(json.contains("\"totalSpent\":\"4000000000000000000\""));
        assert!(json.contains("\"scopeType\":\"erc20PeriodTransfer\""));
        assert!(json.contains("\"status\":\"ACTIVE\""));
    }
}
