use proptest::prelude::*;

use ridepay_types::{Address, Allowance, Scope, Timestamp, TokenAmount};

proptest! {
    /// Address display/parse roundtrip.
    #[test]
    fn address_roundtrip(bytes in prop::array::uniform20(0u8..)) {
        let addr = Address::new(bytes);
        let parsed = Address::parse(&addr.to_string()).unwrap();
        prop_assert_eq!(parsed, addr);
    }

    /// Address::is_zero is true only for all-zero bytes.
    #[test]
    fn address_is_zero_correct(bytes in prop::array::uniform20(0u8..)) {
        prop_assert_eq!(Address::new(bytes).is_zero(), bytes == [0u8; 20]);
    }

    /// TokenAmount JSON keeps full u128 precision.
    #[test]
    fn token_amount_json_precision(raw in any::<u128>()) {
        let amount = TokenAmount::new(raw);
        let json = serde_json::to_string(&amount).unwrap();
        let back: TokenAmount = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, amount);
    }

    /// Allowance::debit subtracts exactly when no saturation occurs.
    #[test]
    fn allowance_debit_exact(start in 0i128..1_000_000_000_000, amount in 0u128..1_000_000_000_000) {
        let left = Allowance::new(start).debit(TokenAmount::new(amount));
        prop_assert_eq!(left.raw(), start - amount as i128);
        prop_assert_eq!(left.is_depleted(), start - (amount as i128) <= 0);
    }

    /// Allowance::covers agrees with integer comparison.
    #[test]
    fn allowance_covers_correct(left in -1_000_000i128..1_000_000, amount in 0u128..1_000_000) {
        prop_assert_eq!(Allowance::new(left).covers(TokenAmount::new(amount)), left >= amount as i128);
    }

    /// Timestamp::has_passed is strict ordering.
    #[test]
    fn timestamp_has_passed(a in 0u64..u64::MAX, b in 0u64..u64::MAX) {
        prop_assert_eq!(Timestamp::new(a).has_passed(Timestamp::new(b)), a < b);
    }

    /// Streaming accrual never exceeds the cap and never drops below the initial amount.
    #[test]
    fn streaming_within_bounds(
        rate in 0u128..1_000_000,
        initial in 0u128..1_000_000,
        extra in 0u128..1_000_000,
        start in 0u64..1_000_000,
        offset in 0u64..1_000_000,
    ) {
        let max = initial + extra;
        let scope = Scope::NativeTokenStreaming {
            amount_per_second: TokenAmount::new(rate),
            initial_amount: TokenAmount::new(initial),
            max_amount: TokenAmount::new(max),
            start_time: Timestamp::new(start),
        };
        let accrued = scope.streaming_allowance_at(Timestamp::new(start + offset)).unwrap();
        prop_assert!(accrued.raw() <= max);
        prop_assert!(accrued.raw() >= initial);
    }

    /// Periodic scopes survive a JSON roundtrip unchanged.
    #[test]
    fn periodic_scope_json_roundtrip(
        token in prop::array::uniform20(0u8..),
        amount in any::<u128>(),
        duration in 1u64..10_000_000,
        start in 0u64..4_000_000_000,
    ) {
        let scope = Scope::Erc20PeriodTransfer {
            token_address: Address::new(token),
            period_amount: TokenAmount::new(amount),
            period_duration: duration,
            start_date: Timestamp::new(start),
        };
        let json = serde_json::to_string(&scope).unwrap();
        let back: Scope = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back, scope);
    }
}
