//! Ride payment simulator: pay random rides from a tracked delegation.

use std::fmt;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use ridepay_ledger::{DelegationMonitor, DelegationUsage};
use ridepay_types::{
    Address, Clock, DelegationId, DelegationStatus, Scope, SignedDelegation, TokenAmount,
};
use ridepay_utils::{format_allowance, format_ether};

pub const DESTINATIONS: [&str; 6] = [
    "Downtown Metro Station",
    "Central Park",
    "Airport Terminal",
    "Shopping Mall",
    "University Campus",
    "Business District",
];

/// One tenth of a token.
const TENTH: u128 = TokenAmount::ONE_TOKEN.raw() / 10;

/// A ride to be paid for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ride {
    pub destination: &'static str,
    /// Distance in tenths of a mile.
    pub distance_tenths: u32,
    pub price: TokenAmount,
    pub recipient: Address,
}

impl Ride {
    /// A ride of `distance_tenths` costing 1.5 tokens per mile, rounded to a
    /// tenth of a token.
    pub fn new(destination: &'static str, distance_tenths: u32, recipient: Address) -> Self {
        let price_tenths = (u128::from(distance_tenths) * 15 + 5) / 10;
        Self {
            destination,
            distance_tenths,
            price: TokenAmount::new(price_tenths * TENTH),
            recipient,
        }
    }

    /// A random destination, 1.0 to 16.0 miles away.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, recipient: Address) -> Self {
        let destination = DESTINATIONS.choose(rng).copied().unwrap_or(DESTINATIONS[0]);
        Self::new(destination, rng.gen_range(10..=160), recipient)
    }
}

impl fmt::Display for Ride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}.{} miles, {} tokens)",
            self.destination,
            self.distance_tenths / 10,
            self.distance_tenths % 10,
            format_ether(self.price)
        )
    }
}

/// Delegations the simulator can pay from: those with an ERC-20 scope.
pub fn payable_delegations(delegations: Vec<SignedDelegation>) -> Vec<SignedDelegation> {
    delegations
        .into_iter()
        .filter(|d| d.scope().kind().is_erc20())
        .collect()
}

/// How a simulated payment went.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RideOutcome {
    Paid {
        usage: DelegationUsage,
        period_reset: bool,
    },
    /// Not enough allowance, or the delegation is not active.
    Declined,
    NoDelegationSelected,
}

/// Drives the usage ledger for one selected delegation at a time and keeps
/// a human-readable session log.
pub struct RideSimulator<C: Clock> {
    monitor: DelegationMonitor<C>,
    selected: Option<DelegationId>,
    processing_delay: Duration,
    log: Vec<String>,
}

impl<C: Clock> RideSimulator<C> {
    pub fn new(clock: C, processing_delay: Duration) -> Self {
        Self {
            monitor: DelegationMonitor::new(clock),
            selected: None,
            processing_delay,
            log: Vec::new(),
        }
    }

    /// Select `delegation` and start tracking it with its scope's initial
    /// allowance.
    pub fn select(&mut self, delegation: &SignedDelegation) -> DelegationUsage {
        let allowance = delegation.scope().initial_allowance();
        let usage = self
            .monitor
            .track_delegation(&delegation.delegation, allowance);
        self.selected = Some(usage.delegation_id);

        self.note(format!(
            "Delegation selected: {}",
            delegation.scope().kind().payment_label()
        ));
        self.note(format!("Initial allowance: {} tokens", format_ether(allowance)));
        let now = self.monitor.clock().now();
        if let Some(accrued) = delegation.scope().streaming_allowance_at(now) {
            self.note(format!("Streamed so far: {} tokens", format_ether(accrued)));
        }
        usage
    }

    /// Try to pay for `ride` from the selected delegation.
    pub async fn pay(&mut self, ride: &Ride) -> RideOutcome {
        let Some(id) = self.selected else {
            self.note("Error: No delegation selected".into());
            return RideOutcome::NoDelegationSelected;
        };

        if !self.monitor.can_execute_payment(&id, ride.price) {
            tracing::warn!(%id, price = %ride.price, "ride payment declined");
            self.note("Payment failed: insufficient allowance or delegation inactive".into());
            return RideOutcome::Declined;
        }

        self.note(format!(
            "Processing payment of {} tokens...",
            format_ether(ride.price)
        ));
        if !self.processing_delay.is_zero() {
            tokio::time::sleep(self.processing_delay).await;
        }

        let previous_reset = self
            .monitor
            .get_delegation_usage(&id)
            .and_then(|u| u.period_reset_time);
        let Some(usage) = self.monitor.record_delegation_payment(&id, ride.price) else {
            self.note("Payment failed: delegation not found".into());
            return RideOutcome::Declined;
        };
        let period_reset = previous_reset.is_some_and(|reset| usage.last_updated > reset);

        self.note(format!("Payment successful! Ride to {ride}"));
        self.note(format!(
            "Remaining allowance: {} tokens",
            format_allowance(usage.remaining_allowance)
        ));
        if period_reset {
            self.note("Period reset: allowance refreshed for new period".into());
        }
        if usage.status == DelegationStatus::Exhausted {
            self.note("Delegation exhausted: no more payments can be made".into());
        }
        RideOutcome::Paid {
            usage,
            period_reset,
        }
    }

    /// Revoke the selected delegation.
    pub fn revoke(&mut self) -> bool {
        let revoked = self
            .selected
            .is_some_and(|id| self.monitor.revoke_delegation(&id));
        if revoked {
            self.note("Delegation has been revoked".into());
        }
        revoked
    }

    pub fn usage(&self) -> Option<&DelegationUsage> {
        self.selected
            .as_ref()
            .and_then(|id| self.monitor.get_delegation_usage(id))
    }

    pub fn monitor(&self) -> &DelegationMonitor<C> {
        &self.monitor
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    fn note(&mut self, message: String) {
        tracing::debug!("{message}");
        self.log.push(message);
    }
}

/// A short description of a scope's limits.
pub fn describe_scope(delegation: &SignedDelegation) -> String {
    match delegation.scope() {
        Scope::NativeTokenPeriodTransfer {
            period_amount,
            period_duration,
            ..
        }
        | Scope::Erc20PeriodTransfer {
            period_amount,
            period_duration,
            ..
        } => format!(
            "{} tokens per {} day(s)",
            format_ether(*period_amount),
            *period_duration as f64 / 86_400.0
        ),
        Scope::NativeTokenStreaming {
            amount_per_second,
            max_amount,
            ..
        }
        | Scope::Erc20Streaming {
            amount_per_second,
            max_amount,
            ..
        } => format!(
            "{} tokens per second (max: {})",
            format_ether(*amount_per_second),
            format_ether(*max_amount)
        ),
        Scope::NativeTokenTransferAmount { max_amount }
        | Scope::Erc20TransferAmount { max_amount, .. } => {
            format!("Max: {} tokens", format_ether(*max_amount))
        }
        Scope::Erc721Transfer { token_id, .. } => format!("NFT #{token_id}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use ridepay_nullables::NullClock;
    use ridepay_types::{ChainId, Delegation, ScopeKind, Signature, Timestamp};

    const T0: u64 = 1_700_000_000;

    fn signed(scope: Scope) -> SignedDelegation {
        Delegation::new(Address::new([1; 20]), Address::new([2; 20]), scope, ChainId::Sepolia)
            .into_signed(Signature([0; 64]))
    }

    fn daily(amount: u128) -> SignedDelegation {
        signed(Scope::Erc20PeriodTransfer {
            token_address: Address::new([3; 20]),
            period_amount: TokenAmount::from_tokens(amount),
            period_duration: 86_400,
            start_date: Timestamp::new(T0),
        })
    }

    fn ride(tenths: u32) -> Ride {
        Ride::new(DESTINATIONS[0], tenths, Address::new([9; 20]))
    }

    #[test]
    fn price_is_one_and_a_half_per_mile() {
        assert_eq!(ride(50).price, TokenAmount::new(75 * TENTH));
        assert_eq!(ride(10).price, TokenAmount::new(15 * TENTH));
        // 3.3 miles -> 4.95 -> 5.0
        assert_eq!(ride(33).price, TokenAmount::from_tokens(5));
        assert_eq!(ride(50).to_string(), "Downtown Metro Station (5.0 miles, 7.5 tokens)");
    }

    #[test]
    fn random_rides_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let r = Ride::random(&mut rng, Address::new([9; 20]));
            assert!((10..=160).contains(&r.distance_tenths));
            assert!(DESTINATIONS.contains(&r.destination));
            assert!(r.price >= TokenAmount::new(15 * TENTH));
            assert!(r.price <= TokenAmount::from_tokens(24));
        }
    }

    #[test]
    fn only_erc20_delegations_are_payable() {
        let all = vec![
            daily(10),
            signed(Scope::NativeTokenTransferAmount {
                max_amount: TokenAmount::from_tokens(1),
            }),
            signed(Scope::Erc721Transfer {
                token_address: Address::new([3; 20]),
                token_id: ridepay_types::TokenId(1),
            }),
        ];
        let payable = payable_delegations(all);
        assert_eq!(payable.len(), 1);
        assert_eq!(payable[0].scope().kind(), ScopeKind::Erc20PeriodTransfer);
    }

    #[test]
    fn streaming_selection_reports_accrual() {
        let clock = NullClock::new(T0 + 10);
        let mut sim = RideSimulator::new(&clock, Duration::ZERO);
        sim.select(&signed(Scope::Erc20Streaming {
            token_address: Address::new([3; 20]),
            amount_per_second: TokenAmount::from_tokens(1),
            initial_amount: TokenAmount::from_tokens(2),
            max_amount: TokenAmount::from_tokens(100),
            start_time: Timestamp::new(T0),
        }));
        assert!(sim.log().iter().any(|l| l == "Streamed so far: 12 tokens"));

        sim.select(&daily(10));
        assert!(!sim.log().iter().skip(3).any(|l| l.starts_with("Streamed")));
    }

    #[tokio::test]
    async fn pays_until_declined() {
        let clock = NullClock::new(T0);
        let mut sim = RideSimulator::new(&clock, Duration::ZERO);
        sim.select(&daily(10));

        // 4.0 miles -> 6 tokens
        assert!(matches!(sim.pay(&ride(40)).await, RideOutcome::Paid { .. }));
        assert_eq!(sim.pay(&ride(40)).await, RideOutcome::Declined);

        let usage = sim.usage().unwrap();
        assert_eq!(usage.total_spent, TokenAmount::from_tokens(6));
        assert_eq!(usage.status, DelegationStatus::Active);
        assert!(sim.log().iter().any(|l| l.contains("Remaining allowance: 4 tokens")));
    }

    #[tokio::test]
    async fn period_reset_is_reported() {
        let clock = NullClock::new(T0);
        let mut sim = RideSimulator::new(&clock, Duration::ZERO);
        sim.select(&daily(10));
        sim.pay(&ride(40)).await;

        clock.advance(86_401);
        match sim.pay(&ride(40)).await {
            RideOutcome::Paid {
                usage,
                period_reset,
            } => {
                assert!(period_reset);
                assert_eq!(usage.total_spent, TokenAmount::ZERO);
                assert_eq!(usage.remaining_allowance, TokenAmount::from_tokens(10).into());
            }
            other => panic!("expected payment, got {other:?}"),
        }
        assert!(sim.log().iter().any(|l| l.starts_with("Period reset")));
    }

    #[tokio::test]
    async fn exhaustion_and_revocation() {
        let clock = NullClock::new(T0);
        let mut sim = RideSimulator::new(&clock, Duration::ZERO);
        sim.select(&signed(Scope::Erc20TransferAmount {
            token_address: Address::new([3; 20]),
            max_amount: TokenAmount::from_tokens(6),
        }));

        assert!(matches!(sim.pay(&ride(40)).await, RideOutcome::Paid { .. }));
        assert_eq!(sim.usage().unwrap().status, DelegationStatus::Exhausted);
        assert!(sim.log().iter().any(|l| l.starts_with("Delegation exhausted")));

        assert!(sim.revoke());
        assert_eq!(sim.usage().unwrap().status, DelegationStatus::Revoked);
        assert_eq!(sim.pay(&ride(10)).await, RideOutcome::Declined);
    }

    #[tokio::test]
    async fn nothing_selected() {
        let mut sim = RideSimulator::new(NullClock::new(T0), Duration::ZERO);
        assert_eq!(sim.pay(&ride(10)).await, RideOutcome::NoDelegationSelected);
        assert!(!sim.revoke());
        assert!(sim.usage().is_none());
    }

    #[test]
    fn scope_descriptions() {
        let d = daily(10);
        assert_eq!(describe_scope(&d), "10 tokens per 1 day(s)");
    }
}
