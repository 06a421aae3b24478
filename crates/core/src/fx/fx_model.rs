use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Where an exchange rate value came from.
///
/// Stored rates carry `Online`, `Manual`, or `System`. `Identity` only ever
/// appears on a [`ConversionResult`] for same-currency conversions.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RateSource {
    Online,
    Manual,
    System,
    Identity,
}

impl RateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateSource::Online => "online",
            RateSource::Manual => "manual",
            RateSource::System => "system",
            RateSource::Identity => "identity",
        }
    }
}

/// A single exchange rate, unique per (base, target) pair.
///
/// Rates are overwritten by refreshes and manual edits, never deleted.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ExchangeRate {
    pub base_currency: String,
    pub target_currency: String,
    #[serde(serialize_with = "serialize_decimal_6")]
    pub rate: Decimal,
    pub source: RateSource,
    pub last_updated: DateTime<Utc>,
}

impl ExchangeRate {
    /// Lookup key for the rate book.
    pub fn pair(&self) -> (String, String) {
        (self.base_currency.clone(), self.target_currency.clone())
    }
}

/// A user-entered manual override, validated before it is sent anywhere.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct NewManualRate {
    pub base_currency: String,
    pub target_currency: String,
    #[serde(serialize_with = "serialize_decimal_6")]
    pub rate: Decimal,
}

/// The outcome of one conversion request. Ephemeral, never persisted.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ConversionResult {
    pub original_amount: Decimal,
    pub from_currency: String,
    pub to_currency: String,
    pub converted_amount: Decimal,
    pub exchange_rate: Decimal,
    pub rate_source: RateSource,
    /// `None` for identity conversions, which use no stored rate.
    pub last_updated: Option<DateTime<Utc>>,
}

/// A currency the backend offers for selection.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CurrencyInfo {
    pub code: String,
    pub symbol: String,
    pub name: String,
}

fn serialize_decimal_6<S>(decimal: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let rounded = decimal.round_dp(6);
    serializer.serialize_str(&rounded.to_string())
}
