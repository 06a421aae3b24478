use crate::fx::fx_errors::FxError;
use rust_decimal::Decimal;
use std::collections::HashSet;
use std::sync::OnceLock;

/// Currencies quoted without a minor unit (ISO 4217 exponent 0).
/// Amounts in these currencies display with zero decimal places.
static ZERO_DECIMAL_CURRENCIES: OnceLock<HashSet<&'static str>> = OnceLock::new();

fn zero_decimal_currencies() -> &'static HashSet<&'static str> {
    ZERO_DECIMAL_CURRENCIES.get_or_init(|| {
        [
            "BIF", "CLP", "DJF", "GNF", "ISK", "JPY", "KMF", "KRW", "PYG", "RWF", "UGX", "VND",
            "VUV", "XAF", "XOF", "XPF",
        ]
        .into_iter()
        .collect()
    })
}

/// Returns the display precision for a currency: 0 for the zero-decimal set,
/// 2 otherwise.
pub fn decimal_places(code: &str) -> u32 {
    if zero_decimal_currencies().contains(code) {
        0
    } else {
        2
    }
}

/// Rounds an amount to the currency's display precision.
pub fn round_amount(amount: Decimal, currency: &str) -> Decimal {
    amount.round_dp(decimal_places(currency))
}

/// Validates a currency code (three ASCII letters) and returns it uppercased.
pub fn validate_currency_code(code: &str) -> Result<String, FxError> {
    let trimmed = code.trim();
    if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(FxError::InvalidCurrencyCode(code.to_string()));
    }
    Ok(trimmed.to_ascii_uppercase())
}
