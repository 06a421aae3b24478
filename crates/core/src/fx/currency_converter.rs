use crate::fx::currency::{round_amount, validate_currency_code};
use crate::fx::fx_errors::FxError;
use crate::fx::fx_model::{ConversionResult, RateSource};
use crate::fx::rate_book::RateBook;
use rust_decimal::Decimal;

/// Converts an amount between two currencies over the currently loaded rates.
///
/// Same-currency conversions return the amount unchanged with rate 1 and
/// source `identity`. Everything else resolves a direct or cross rate via
/// the company base currency and rounds to the target currency's display
/// precision (0 decimal places for JPY-style currencies, 2 otherwise).
/// Pure computation, no side effects.
pub fn convert(
    book: &RateBook,
    amount: Decimal,
    from_currency: &str,
    to_currency: &str,
    base_currency: &str,
) -> Result<ConversionResult, FxError> {
    let from = validate_currency_code(from_currency)?;
    let to = validate_currency_code(to_currency)?;
    let base = validate_currency_code(base_currency)?;

    if from == to {
        return Ok(ConversionResult {
            original_amount: amount,
            from_currency: from,
            to_currency: to,
            converted_amount: amount,
            exchange_rate: Decimal::ONE,
            rate_source: RateSource::Identity,
            last_updated: None,
        });
    }

    let resolved = book.resolve(&from, &to, &base)?;
    let converted_amount = round_amount(amount * resolved.rate, &to);

    Ok(ConversionResult {
        original_amount: amount,
        from_currency: from,
        to_currency: to,
        converted_amount,
        exchange_rate: resolved.rate,
        rate_source: resolved.source,
        last_updated: Some(resolved.last_updated),
    })
}
