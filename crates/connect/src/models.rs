//! Wire types for the backend API and their normalization into domain types.
//!
//! Two generations of the backend expose the rate endpoints with different
//! shapes (an array of rate objects vs a flat `code -> rate` map; a refresh
//! response carrying either the refreshed rates or just a count). Every
//! shape deserializes here, once, into the same domain types — call sites
//! never branch on payload shape.

use chrono::{DateTime, Utc};
use finbooks_core::fx::{validate_currency_code, ExchangeRate, RateSource};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One rate object as the backend serializes it.
#[derive(Debug, Deserialize)]
pub(crate) struct RateDto {
    pub base_currency: String,
    pub target_currency: String,
    pub rate: Decimal,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

impl RateDto {
    /// Converts into the domain type. Rates fetched without a source are
    /// online-sourced by definition; a missing timestamp means "as of now".
    pub fn into_domain(self) -> Option<ExchangeRate> {
        let base = match validate_currency_code(&self.base_currency) {
            Ok(code) => code,
            Err(e) => {
                log::warn!("[ApiClient] Skipping rate with bad base currency: {}", e);
                return None;
            }
        };
        let target = match validate_currency_code(&self.target_currency) {
            Ok(code) => code,
            Err(e) => {
                log::warn!("[ApiClient] Skipping rate with bad target currency: {}", e);
                return None;
            }
        };

        Some(ExchangeRate {
            base_currency: base,
            target_currency: target,
            rate: self.rate,
            source: parse_source(self.source.as_deref()),
            last_updated: self.last_updated.unwrap_or_else(Utc::now),
        })
    }
}

fn parse_source(source: Option<&str>) -> RateSource {
    match source {
        Some("manual") => RateSource::Manual,
        Some("system") => RateSource::System,
        _ => RateSource::Online,
    }
}

/// `GET /api/currency/rates` payload: either shape the backend may send.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RatesPayload {
    List(Vec<RateDto>),
    Map(HashMap<String, Decimal>),
}

impl RatesPayload {
    /// Normalizes to domain rates. Flat-map entries are read as
    /// `base -> code` pairs against the company base currency; entries with
    /// invalid codes (or the base itself) are skipped with a warning.
    pub fn into_domain(self, base_currency: &str) -> Vec<ExchangeRate> {
        match self {
            RatesPayload::List(rates) => rates.into_iter().filter_map(RateDto::into_domain).collect(),
            RatesPayload::Map(rates) => {
                let now = Utc::now();
                rates
                    .into_iter()
                    .filter_map(|(code, rate)| {
                        let target = match validate_currency_code(&code) {
                            Ok(code) => code,
                            Err(e) => {
                                log::warn!("[ApiClient] Skipping rate entry: {}", e);
                                return None;
                            }
                        };
                        if target == base_currency {
                            return None;
                        }
                        Some(ExchangeRate {
                            base_currency: base_currency.to_string(),
                            target_currency: target,
                            rate,
                            source: RateSource::Online,
                            last_updated: now,
                        })
                    })
                    .collect()
            }
        }
    }
}

/// `POST /api/currency/update-rates` response: refreshed rates, or only a
/// count when the backend does not echo the new set.
#[derive(Debug, Deserialize)]
pub(crate) struct UpdateRatesResponse {
    #[serde(default)]
    pub updated_rates: Option<RatesPayload>,
    #[serde(default)]
    pub updated_count: Option<u64>,
}

/// `POST /api/currency/set-manual-rate` request body.
#[derive(Debug, Serialize)]
pub(crate) struct SetManualRateRequest<'a> {
    pub base_currency: &'a str,
    pub target_currency: &'a str,
    pub rate: Decimal,
    pub source: RateSource,
}

/// Error envelope the backend uses for non-success responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}
