use crate::fx::fx_errors::FxError;
use crate::fx::fx_model::{ExchangeRate, RateSource};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// The rate a lookup settled on, with its provenance.
///
/// Direct hits carry the stored rate's source and timestamp. Cross-derived
/// rates are tagged [`RateSource::System`] and stamped with the older of the
/// two legs, the conservative choice for staleness display.
#[derive(Debug, Clone)]
pub struct ResolvedRate {
    pub rate: Decimal,
    pub source: RateSource,
    pub last_updated: DateTime<Utc>,
}

/// In-memory set of exchange rates, one per (base, target) pair.
///
/// This is the client-side mirror of the backend-held rate store. Refreshes
/// swap the whole set; manual edits overwrite single pairs. Lookups are
/// direct first, then cross-rate via the company base currency.
#[derive(Debug, Default, Clone)]
pub struct RateBook {
    rates: HashMap<(String, String), ExchangeRate>,
}

impl RateBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// All loaded rates, ordered by pair for stable display.
    pub fn all(&self) -> Vec<ExchangeRate> {
        let mut rates: Vec<ExchangeRate> = self.rates.values().cloned().collect();
        rates.sort_by(|a, b| a.pair().cmp(&b.pair()));
        rates
    }

    pub fn get(&self, base: &str, target: &str) -> Option<&ExchangeRate> {
        self.rates.get(&(base.to_string(), target.to_string()))
    }

    /// Overwrites the rate for a single pair (manual edits).
    pub fn upsert(&mut self, rate: ExchangeRate) {
        self.rates.insert(rate.pair(), rate);
    }

    /// Replaces the whole set (online refresh).
    pub fn replace_all(&mut self, rates: Vec<ExchangeRate>) {
        self.rates = rates.into_iter().map(|r| (r.pair(), r)).collect();
    }

    /// Resolves the rate `from -> to`: the direct rate if loaded, otherwise
    /// the cross-rate via `base`: `rate(base->to) / rate(base->from)`.
    ///
    /// A leg whose currency equals `base` counts as 1. Fails with
    /// [`FxError::RateUnavailable`] if either remaining leg is missing.
    /// Callers short-circuit `from == to` before reaching the book.
    pub fn resolve(&self, from: &str, to: &str, base: &str) -> Result<ResolvedRate, FxError> {
        if from == to {
            return Err(FxError::InvalidCurrencyPair(format!(
                "{}/{} requires no rate",
                from, to
            )));
        }

        if let Some(direct) = self.get(from, to) {
            return Ok(ResolvedRate {
                rate: direct.rate,
                source: direct.source,
                last_updated: direct.last_updated,
            });
        }

        let numerator = self.base_leg(base, to);
        let denominator = self.base_leg(base, from);

        match (numerator, denominator) {
            (Some(num), Some(den)) => {
                if den.rate.is_zero() {
                    return Err(FxError::ConversionError(format!(
                        "Zero rate for {}/{} makes the cross-rate undefined",
                        base, from
                    )));
                }

                // At least one leg is a stored rate: from != to, so at most
                // one of them can be the base itself.
                let last_updated = match (num.last_updated, den.last_updated) {
                    (Some(a), Some(b)) => a.min(b),
                    (Some(a), None) | (None, Some(a)) => a,
                    (None, None) => {
                        return Err(FxError::InvalidCurrencyPair(format!(
                            "{}/{} requires no rate",
                            from, to
                        )))
                    }
                };

                Ok(ResolvedRate {
                    rate: num.rate / den.rate,
                    source: RateSource::System,
                    last_updated,
                })
            }
            _ => Err(FxError::RateUnavailable {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }

    /// One cross-rate leg `base -> currency`; identity when the currency is
    /// the base itself.
    fn base_leg(&self, base: &str, currency: &str) -> Option<Leg> {
        if currency == base {
            return Some(Leg {
                rate: Decimal::ONE,
                last_updated: None,
            });
        }
        self.get(base, currency).map(|r| Leg {
            rate: r.rate,
            last_updated: Some(r.last_updated),
        })
    }
}

struct Leg {
    rate: Decimal,
    last_updated: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn make_rate(base: &str, target: &str, rate: Decimal, day: u32) -> ExchangeRate {
        ExchangeRate {
            base_currency: base.to_string(),
            target_currency: target.to_string(),
            rate,
            source: RateSource::Online,
            last_updated: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_direct_rate_wins() {
        let mut book = RateBook::new();
        book.replace_all(vec![
            make_rate("USD", "INR", dec!(83.0), 1),
            make_rate("USD", "EUR", dec!(0.9), 1),
        ]);

        let resolved = book.resolve("USD", "INR", "USD").unwrap();
        assert_eq!(resolved.rate, dec!(83.0));
        assert_eq!(resolved.source, RateSource::Online);
    }

    #[test]
    fn test_cross_rate_via_base() {
        let mut book = RateBook::new();
        book.replace_all(vec![
            make_rate("USD", "EUR", dec!(0.8), 3),
            make_rate("USD", "GBP", dec!(0.6), 5),
        ]);

        // EUR -> GBP = rate(USD->GBP) / rate(USD->EUR) = 0.6 / 0.8
        let resolved = book.resolve("EUR", "GBP", "USD").unwrap();
        assert_eq!(resolved.rate, dec!(0.75));
        assert_eq!(resolved.source, RateSource::System);
        // Stamped with the older leg.
        assert_eq!(
            resolved.last_updated,
            Utc.with_ymd_and_hms(2024, 3, 3, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_cross_rate_from_base_without_direct() {
        let mut book = RateBook::new();
        book.replace_all(vec![make_rate("USD", "EUR", dec!(0.8), 1)]);

        // USD -> EUR exists only as the stored pair; USD -> GBP has no leg.
        let err = book.resolve("USD", "GBP", "USD").unwrap_err();
        assert!(matches!(err, FxError::RateUnavailable { .. }));

        // EUR -> USD derives from the single leg: 1 / 0.8.
        let resolved = book.resolve("EUR", "USD", "USD").unwrap();
        assert_eq!(resolved.rate, dec!(1.25));
    }

    #[test]
    fn test_missing_leg_is_unavailable() {
        let mut book = RateBook::new();
        book.replace_all(vec![make_rate("USD", "EUR", dec!(0.9), 1)]);

        let err = book.resolve("EUR", "JPY", "USD").unwrap_err();
        match err {
            FxError::RateUnavailable { from, to } => {
                assert_eq!(from, "EUR");
                assert_eq!(to, "JPY");
            }
            other => panic!("expected RateUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_zero_denominator_leg() {
        let mut book = RateBook::new();
        book.replace_all(vec![
            make_rate("USD", "EUR", dec!(0), 1),
            make_rate("USD", "GBP", dec!(0.6), 1),
        ]);

        let err = book.resolve("EUR", "GBP", "USD").unwrap_err();
        assert!(matches!(err, FxError::ConversionError(_)));
    }

    #[test]
    fn test_upsert_overwrites_pair() {
        let mut book = RateBook::new();
        book.upsert(make_rate("USD", "EUR", dec!(0.9), 1));
        book.upsert(make_rate("USD", "EUR", dec!(0.95), 2));

        assert_eq!(book.len(), 1);
        assert_eq!(book.get("USD", "EUR").unwrap().rate, dec!(0.95));
    }

    #[test]
    fn test_replace_all_drops_previous_set() {
        let mut book = RateBook::new();
        book.replace_all(vec![make_rate("USD", "EUR", dec!(0.9), 1)]);
        book.replace_all(vec![make_rate("USD", "GBP", dec!(0.6), 2)]);

        assert!(book.get("USD", "EUR").is_none());
        assert!(book.get("USD", "GBP").is_some());
    }
}
