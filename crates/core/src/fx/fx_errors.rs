use thiserror::Error;

/// Errors raised by rate lookup and conversion.
#[derive(Error, Debug)]
pub enum FxError {
    /// Neither a direct rate nor both cross-rate legs via the base currency
    /// are loaded for this pair. The conversion is aborted; nothing changes.
    #[error("Exchange rate not available for {from}/{to}")]
    RateUnavailable { from: String, to: String },

    #[error("Invalid currency code: {0}")]
    InvalidCurrencyCode(String),

    #[error("Invalid currency pair: {0}")]
    InvalidCurrencyPair(String),

    #[error("Currency conversion error: {0}")]
    ConversionError(String),

    /// The shared rate state lock was poisoned.
    #[error("Rate state error: {0}")]
    StateError(String),
}
