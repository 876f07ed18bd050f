//! The delegation monitor: tracks usage and answers "can this be paid?".

use std::collections::HashMap;

use ridepay_crypto::delegation_id;
use ridepay_types::{
    Address, Allowance, Clock, Delegation, DelegationId, DelegationStatus, SystemClock,
    TokenAmount,
};
use serde::Serialize;

use crate::usage::DelegationUsage;

/// Counts of tracked delegations by status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub tracked: usize,
    pub active: usize,
    pub exhausted: usize,
    pub revoked: usize,
}

/// In-memory usage ledger keyed by delegation id.
///
/// Time comes from the injected [`Clock`] so period rollover can be driven
/// deterministically. Nothing here is persisted.
pub struct DelegationMonitor<C: Clock = SystemClock> {
    clock: C,
    usages: HashMap<DelegationId, DelegationUsage>,
}

impl DelegationMonitor<SystemClock> {
    pub fn with_system_clock() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> DelegationMonitor<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            usages: HashMap::new(),
        }
    }

    /// Start tracking a delegation with `initial_allowance` available.
    ///
    /// Tracking the same delegation again replaces its record.
    pub fn track_delegation(
        &mut self,
        delegation: &Delegation,
        initial_allowance: TokenAmount,
    ) -> DelegationUsage {
        let id = delegation_id(&delegation.delegator, &delegation.delegate, &delegation.scope);
        let usage = DelegationUsage {
            delegation_id: id,
            delegator: delegation.delegator,
            delegate: delegation.delegate,
            token_address: delegation.scope.token_address(),
            scope: delegation.scope.clone(),
            scope_type: delegation.scope.kind(),
            total_spent: TokenAmount::ZERO,
            remaining_allowance: Allowance::from(initial_allowance),
            period_reset_time: delegation.scope.period().map(|p| p.first_reset_time()),
            last_updated: self.clock.now(),
            status: DelegationStatus::Active,
        };

        if self.usages.insert(id, usage.clone()).is_some() {
            tracing::debug!(%id, "re-tracking delegation, previous usage discarded");
        }
        tracing::debug!(
            %id,
            scope = %usage.scope_type,
            allowance = %usage.remaining_allowance,
            "tracking delegation"
        );
        usage
    }

    /// Whether a payment of `amount` is currently permitted.
    ///
    /// Unknown and non-active delegations never are. Once a periodic
    /// delegation's period has ended any amount is permitted, since the
    /// allowance will be refilled when the payment is recorded.
    pub fn can_execute_payment(&self, id: &DelegationId, amount: TokenAmount) -> bool {
        let Some(usage) = self.usages.get(id) else {
            return false;
        };
        if !usage.is_active() {
            return false;
        }
        if usage.period_elapsed(self.clock.now()) {
            return true;
        }
        usage.remaining_allowance.covers(amount)
    }

    /// Record a payment of `amount` and return the updated usage.
    ///
    /// The payment is charged first. If the period has then ended, the
    /// allowance is refilled and spending restarts from zero, so the payment
    /// that crossed the boundary is not counted against the new period. The
    /// payment is recorded whatever the status; a revoked delegation stays
    /// revoked. Returns `None` for unknown delegations.
    pub fn record_delegation_payment(
        &mut self,
        id: &DelegationId,
        amount: TokenAmount,
    ) -> Option<DelegationUsage> {
        let now = self.clock.now();
        let Some(usage) = self.usages.get_mut(id) else {
            tracing::warn!(%id, "payment recorded for untracked delegation");
            return None;
        };

        usage.debit(amount);
        usage.last_updated = now;
        if usage.period_elapsed(now) {
            usage.roll_period(now);
            tracing::debug!(%id, next_reset = ?usage.period_reset_time, "period rolled over");
        }
        usage.settle_status();

        if usage.status == DelegationStatus::Exhausted {
            tracing::info!(%id, remaining = %usage.remaining_allowance, "delegation exhausted");
        }
        tracing::debug!(
            %id,
            %amount,
            spent = %usage.total_spent,
            remaining = %usage.remaining_allowance,
            "recorded payment"
        );
        Some(usage.clone())
    }

    /// Mark a delegation revoked. Returns `false` if it is not tracked.
    pub fn revoke_delegation(&mut self, id: &DelegationId) -> bool {
        let now = self.clock.now();
        match self.usages.get_mut(id) {
            Some(usage) => {
                usage.status = DelegationStatus::Revoked;
                usage.last_updated = now;
                tracing::info!(%id, "delegation revoked");
                true
            }
            None => false,
        }
    }

    pub fn get_delegation_usage(&self, id: &DelegationId) -> Option<&DelegationUsage> {
        self.usages.get(id)
    }

    /// Every usage granted by `delegator`, in no particular order.
    pub fn get_delegator_usage(&self, delegator: &Address) -> Vec<&DelegationUsage> {
        self.usages
            .values()
            .filter(|u| u.delegator == *delegator)
            .collect()
    }

    /// Every usage granted to `delegate`, in no particular order.
    pub fn get_delegate_usage(&self, delegate: &Address) -> Vec<&DelegationUsage> {
        self.usages
            .values()
            .filter(|u| u.delegate == *delegate)
            .collect()
    }

    pub fn summary(&self) -> LedgerSummary {
        self.usages
            .values()
            .fold(LedgerSummary::default(), |mut s, usage| {
                s.tracked += 1;
                match usage.status {
                    DelegationStatus::Active => s.active += 1,
                    DelegationStatus::Exhausted => s.exhausted += 1,
                    DelegationStatus::Revoked => s.revoked += 1,
                }
                s
            })
    }

    pub fn len(&self) -> usize {
        self.usages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.usages.is_empty()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}
