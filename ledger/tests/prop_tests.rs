//! Property-based tests for the delegation usage ledger.

use proptest::prelude::*;
use ridepay_ledger::DelegationMonitor;
use ridepay_nullables::NullClock;
use ridepay_types::{
    Address, Allowance, ChainId, Delegation, DelegationStatus, Scope, Timestamp, TokenAmount,
};

const T0: u64 = 1_700_000_000;

fn fixed_delegation(max: u128) -> Delegation {
    Delegation::new(
        Address::new([1; 20]),
        Address::new([2; 20]),
        Scope::Erc20TransferAmount {
            token_address: Address::new([3; 20]),
            max_amount: TokenAmount::new(max),
        },
        ChainId::Sepolia,
    )
}

fn periodic_delegation(period_amount: u128, period: u64) -> Delegation {
    Delegation::new(
        Address::new([1; 20]),
        Address::new([2; 20]),
        Scope::NativeTokenPeriodTransfer {
            period_amount: TokenAmount::new(period_amount),
            period_duration: period,
            start_date: Timestamp::new(T0),
        },
        ChainId::Sepolia,
    )
}

proptest! {
    /// Without rollover, spent plus remaining always equals the initial allowance.
    #[test]
    fn spent_plus_remaining_is_conserved(
        initial in 1u128..1_000_000_000_000_000_000_000,
        payments in prop::collection::vec(0u128..100_000_000_000_000_000_000, 0..20),
    ) {
        let clock = NullClock::new(T0);
        let mut monitor = DelegationMonitor::new(&clock);
        let id = monitor
            .track_delegation(&fixed_delegation(initial), TokenAmount::new(initial))
            .delegation_id;

        for p in payments {
            let usage = monitor.record_delegation_payment(&id, TokenAmount::new(p)).unwrap();
            prop_assert_eq!(
                usage.total_spent.raw() as i128 + usage.remaining_allowance.raw(),
                initial as i128
            );
        }
    }

    /// A payment the monitor approves within a period never overdraws.
    #[test]
    fn approved_payments_never_overdraw(
        initial in 1u128..1_000_000,
        payments in prop::collection::vec(1u128..500_000, 1..30),
    ) {
        let clock = NullClock::new(T0);
        let mut monitor = DelegationMonitor::new(&clock);
        let id = monitor
            .track_delegation(&fixed_delegation(initial), TokenAmount::new(initial))
            .delegation_id;

        for p in payments {
            let amount = TokenAmount::new(p);
            if monitor.can_execute_payment(&id, amount) {
                let usage = monitor.record_delegation_payment(&id, amount).unwrap();
                prop_assert!(usage.remaining_allowance >= Allowance::ZERO);
            }
        }
    }

    /// Status becomes exhausted exactly when the remaining allowance is depleted.
    #[test]
    fn exhausted_iff_depleted(
        initial in 1u128..1_000,
        payments in prop::collection::vec(0u128..400, 1..10),
    ) {
        let clock = NullClock::new(T0);
        let mut monitor = DelegationMonitor::new(&clock);
        let id = monitor
            .track_delegation(&fixed_delegation(initial), TokenAmount::new(initial))
            .delegation_id;

        for p in payments {
            let usage = monitor.record_delegation_payment(&id, TokenAmount::new(p)).unwrap();
            prop_assert_eq!(
                usage.status == DelegationStatus::Exhausted,
                usage.remaining_allowance.is_depleted()
            );
        }
    }

    /// Revocation survives any sequence of payments and clock movement.
    #[test]
    fn revoked_is_terminal(
        payments in prop::collection::vec((0u128..2_000, 0u64..200), 0..15),
    ) {
        let clock = NullClock::new(T0);
        let mut monitor = DelegationMonitor::new(&clock);
        let id = monitor
            .track_delegation(&periodic_delegation(1_000, 100), TokenAmount::new(1_000))
            .delegation_id;
        prop_assert!(monitor.revoke_delegation(&id));

        for (p, dt) in payments {
            clock.advance(dt);
            prop_assert!(!monitor.can_execute_payment(&id, TokenAmount::new(p)));
            let usage = monitor.record_delegation_payment(&id, TokenAmount::new(p)).unwrap();
            prop_assert_eq!(usage.status, DelegationStatus::Revoked);
        }
    }

    /// A payment that crosses the period end leaves a fresh, untouched period.
    #[test]
    fn rollover_restarts_spending(
        period_amount in 1u128..1_000_000,
        first in 0u128..1_000_000,
        second in 0u128..1_000_000,
        period in 1u64..10_000,
        late in 1u64..10_000,
    ) {
        let clock = NullClock::new(T0);
        let mut monitor = DelegationMonitor::new(&clock);
        let id = monitor
            .track_delegation(&periodic_delegation(period_amount, period), TokenAmount::new(period_amount))
            .delegation_id;
        monitor.record_delegation_payment(&id, TokenAmount::new(first));

        clock.set(T0 + period + late);
        let usage = monitor.record_delegation_payment(&id, TokenAmount::new(second)).unwrap();
        prop_assert_eq!(usage.total_spent, TokenAmount::ZERO);
        prop_assert_eq!(
            usage.remaining_allowance,
            Allowance::from(TokenAmount::new(period_amount))
        );
        if first < period_amount {
            prop_assert_eq!(usage.status, DelegationStatus::Active);
        }
        prop_assert_eq!(
            usage.period_reset_time,
            Some(Timestamp::new(T0 + period + late + period))
        );
    }

    /// Per-party queries partition exactly the tracked delegations.
    #[test]
    fn party_queries_match_tracked(delegates in prop::collection::vec(0u8..4, 1..12)) {
        let clock = NullClock::new(T0);
        let mut monitor = DelegationMonitor::new(&clock);
        for (i, d) in delegates.iter().enumerate() {
            let delegation = Delegation::new(
                Address::new([0xAA; 20]),
                Address::new([*d; 20]),
                Scope::NativeTokenTransferAmount { max_amount: TokenAmount::new(i as u128 + 1) },
                ChainId::Sepolia,
            );
            monitor.track_delegation(&delegation, TokenAmount::new(i as u128 + 1));
        }

        let per_delegate: usize = (0u8..4)
            .map(|d| monitor.get_delegate_usage(&Address::new([d; 20])).len())
            .sum();
        prop_assert_eq!(per_delegate, monitor.len());
        prop_assert_eq!(monitor.get_delegator_usage(&Address::new([0xAA; 20])).len(), monitor.len());
    }
}
