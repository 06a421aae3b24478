//! Property-based tests for currency conversion.
//!
//! These tests verify that the conversion invariants hold across all valid
//! inputs, using the `proptest` crate for random test case generation.

use chrono::{TimeZone, Utc};
use finbooks_core::fx::{currency_converter, ExchangeRate, RateBook, RateSource};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// =============================================================================
// Generators
// =============================================================================

/// Generates an amount with cent precision in [-10_000.00, 10_000.00].
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (-1_000_000i64..=1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Generates a positive rate with 4 decimal places in (0, 2.0].
fn arb_rate() -> impl Strategy<Value = Decimal> {
    (1i64..=20_000).prop_map(|ten_thousandths| Decimal::new(ten_thousandths, 4))
}

/// Generates a syntactically valid currency code.
fn arb_code() -> impl Strategy<Value = String> {
    "[A-Z]{3}"
}

fn make_rate(base: &str, target: &str, rate: Decimal) -> ExchangeRate {
    ExchangeRate {
        base_currency: base.to_string(),
        target_currency: target.to_string(),
        rate,
        source: RateSource::Online,
        last_updated: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
    }
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    /// convert(amount, c, c) == amount, for any currency and amount.
    #[test]
    fn identity_conversion_returns_amount(amount in arb_amount(), code in arb_code()) {
        let book = RateBook::new();

        let result = currency_converter::convert(&book, amount, &code, &code, "USD").unwrap();

        prop_assert_eq!(result.converted_amount, amount);
        prop_assert_eq!(result.exchange_rate, Decimal::ONE);
        prop_assert_eq!(result.rate_source, RateSource::Identity);
    }

    /// Converting a -> b directly agrees with hopping a -> base -> b, up to
    /// the rounding applied at each display boundary.
    #[test]
    fn cross_rate_agrees_with_two_step_conversion(
        amount in arb_amount(),
        rate_a in arb_rate(),
        rate_b in arb_rate(),
    ) {
        let mut book = RateBook::new();
        book.replace_all(vec![
            make_rate("USD", "EUR", rate_a),
            make_rate("USD", "GBP", rate_b),
        ]);

        let direct = currency_converter::convert(&book, amount, "EUR", "GBP", "USD")
            .unwrap()
            .converted_amount;

        let to_base = currency_converter::convert(&book, amount, "EUR", "USD", "USD")
            .unwrap()
            .converted_amount;
        let two_step = currency_converter::convert(&book, to_base, "USD", "GBP", "USD")
            .unwrap()
            .converted_amount;

        // Each 2-decimal rounding contributes at most 0.005, scaled by the
        // second leg's rate for the intermediate one.
        let tolerance = dec!(0.005) * rate_b + dec!(0.011);
        let diff = (direct - two_step).abs();
        prop_assert!(
            diff <= tolerance,
            "direct {} vs two-step {} differ by {} (tolerance {})",
            direct,
            two_step,
            diff,
            tolerance
        );
    }

    /// A loaded direct rate is applied exactly: amount * rate, rounded to
    /// the target currency's display precision.
    #[test]
    fn direct_conversion_is_amount_times_rate(amount in arb_amount(), rate in arb_rate()) {
        let mut book = RateBook::new();
        book.replace_all(vec![make_rate("USD", "EUR", rate)]);

        let result = currency_converter::convert(&book, amount, "USD", "EUR", "USD").unwrap();

        prop_assert_eq!(result.converted_amount, (amount * rate).round_dp(2));
        prop_assert_eq!(result.exchange_rate, rate);
    }
}
