use super::currency::validate_currency_code;
use super::currency_converter;
use super::fx_errors::FxError;
use super::fx_model::{ConversionResult, CurrencyInfo, ExchangeRate, NewManualRate, RateSource};
use super::fx_traits::{FxServiceTrait, RateGatewayTrait};
use super::rate_book::RateBook;
use crate::errors::{Result, ValidationError};
use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Rate set plus the sequence number of the fetch that produced it.
struct RateState {
    book: RateBook,
    applied_seq: u64,
}

/// Orchestrates rate loading, refreshing, manual overrides, and conversion.
///
/// Overlapping fetches are resolved most-recent-request-wins: every fetch
/// takes a ticket from a monotonic counter, and a response whose ticket is
/// lower than the last applied one is discarded instead of clobbering newer
/// data. Any fetch failure leaves the prior rates intact.
pub struct FxService {
    gateway: Arc<dyn RateGatewayTrait>,
    state: Arc<RwLock<RateState>>,
    base_currency: String,
    fetch_seq: AtomicU64,
}

impl FxService {
    pub fn new(gateway: Arc<dyn RateGatewayTrait>, base_currency: &str) -> Result<Self> {
        let base_currency = validate_currency_code(base_currency)?;
        Ok(Self {
            gateway,
            state: Arc::new(RwLock::new(RateState {
                book: RateBook::new(),
                applied_seq: 0,
            })),
            base_currency,
            fetch_seq: AtomicU64::new(0),
        })
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    fn next_ticket(&self) -> u64 {
        self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Swaps in a fetched rate set unless a newer fetch already landed.
    /// Returns the number of rates now loaded, or the unchanged count when
    /// the response was stale.
    fn apply_rates(&self, ticket: u64, rates: Vec<ExchangeRate>) -> Result<usize> {
        let mut state = self
            .state
            .write()
            .map_err(|e| FxError::StateError(e.to_string()))?;

        if ticket < state.applied_seq {
            log::warn!(
                "Discarding stale rate response (ticket {} < applied {})",
                ticket,
                state.applied_seq
            );
            return Ok(state.book.len());
        }

        state.book.replace_all(rates);
        state.applied_seq = ticket;
        Ok(state.book.len())
    }
}

#[async_trait]
impl FxServiceTrait for FxService {
    async fn load_rates(&self) -> Result<usize> {
        let ticket = self.next_ticket();
        let rates = self.gateway.fetch_rates(&self.base_currency).await?;
        let count = self.apply_rates(ticket, rates)?;
        log::debug!("Loaded {} exchange rates", count);
        Ok(count)
    }

    async fn refresh_rates(&self) -> Result<usize> {
        let ticket = self.next_ticket();
        let rates = self.gateway.trigger_rate_update(&self.base_currency).await?;
        let count = self.apply_rates(ticket, rates)?;
        log::info!("Refreshed exchange rates, {} pairs loaded", count);
        Ok(count)
    }

    async fn set_manual_rate(&self, new_rate: NewManualRate) -> Result<ExchangeRate> {
        let base = validate_currency_code(&new_rate.base_currency)?;
        let target = validate_currency_code(&new_rate.target_currency)?;

        if base == target {
            return Err(FxError::InvalidCurrencyPair(format!(
                "Cannot set a rate from {} to itself",
                base
            ))
            .into());
        }
        if new_rate.rate <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveRate(new_rate.rate).into());
        }

        let validated = NewManualRate {
            base_currency: base,
            target_currency: target,
            rate: new_rate.rate,
        };

        let saved = self.gateway.save_manual_rate(&validated).await?;

        let mut state = self
            .state
            .write()
            .map_err(|e| FxError::StateError(e.to_string()))?;
        state.book.upsert(saved.clone());

        log::info!(
            "Manual rate {}/{} set to {}",
            saved.base_currency,
            saved.target_currency,
            saved.rate
        );
        Ok(saved)
    }

    fn convert(
        &self,
        amount: Decimal,
        from_currency: &str,
        to_currency: &str,
    ) -> Result<ConversionResult> {
        let state = self
            .state
            .read()
            .map_err(|e| FxError::StateError(e.to_string()))?;
        let result = currency_converter::convert(
            &state.book,
            amount,
            from_currency,
            to_currency,
            &self.base_currency,
        )?;
        Ok(result)
    }

    async fn convert_remote(
        &self,
        amount: Decimal,
        from_currency: &str,
        to_currency: &str,
    ) -> Result<ConversionResult> {
        let from = validate_currency_code(from_currency)?;
        let to = validate_currency_code(to_currency)?;
        self.gateway.convert_remote(amount, &from, &to).await
    }

    fn latest_rates(&self) -> Result<Vec<ExchangeRate>> {
        let state = self
            .state
            .read()
            .map_err(|e| FxError::StateError(e.to_string()))?;
        Ok(state.book.all())
    }

    async fn available_currencies(&self) -> Result<Vec<CurrencyInfo>> {
        self.gateway.fetch_available_currencies().await
    }
}

/// Builds the `ExchangeRate` a backend would echo for a manual save. Used by
/// gateway implementations that receive an empty-body acknowledgement.
pub fn manual_rate_record(new_rate: &NewManualRate) -> ExchangeRate {
    ExchangeRate {
        base_currency: new_rate.base_currency.clone(),
        target_currency: new_rate.target_currency.clone(),
        rate: new_rate.rate,
        source: RateSource::Manual,
        last_updated: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use rust_decimal_macros::dec;
    use std::sync::atomic::AtomicBool;
    use std::sync::Mutex;

    struct StubGateway {
        rates: Vec<ExchangeRate>,
        fail: AtomicBool,
        saved: Mutex<Vec<NewManualRate>>,
    }

    impl StubGateway {
        fn with_rates(rates: Vec<ExchangeRate>) -> Self {
            Self {
                rates,
                fail: AtomicBool::new(false),
                saved: Mutex::new(Vec::new()),
            }
        }

        fn set_failing(&self, failing: bool) {
            self.fail.store(failing, Ordering::SeqCst);
        }

        fn check_failure(&self) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(Error::Network("connection reset".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl RateGatewayTrait for StubGateway {
        async fn fetch_rates(&self, _base_currency: &str) -> Result<Vec<ExchangeRate>> {
            self.check_failure()?;
            Ok(self.rates.clone())
        }

        async fn trigger_rate_update(&self, _base_currency: &str) -> Result<Vec<ExchangeRate>> {
            self.check_failure()?;
            Ok(self.rates.clone())
        }

        async fn save_manual_rate(&self, new_rate: &NewManualRate) -> Result<ExchangeRate> {
            self.check_failure()?;
            self.saved.lock().unwrap().push(new_rate.clone());
            Ok(manual_rate_record(new_rate))
        }

        async fn fetch_available_currencies(&self) -> Result<Vec<CurrencyInfo>> {
            self.check_failure()?;
            Ok(Vec::new())
        }

        async fn convert_remote(
            &self,
            _amount: Decimal,
            from: &str,
            to: &str,
        ) -> Result<ConversionResult> {
            Err(FxError::RateUnavailable {
                from: from.to_string(),
                to: to.to_string(),
            }
            .into())
        }
    }

    fn make_rate(base: &str, target: &str, rate: Decimal) -> ExchangeRate {
        ExchangeRate {
            base_currency: base.to_string(),
            target_currency: target.to_string(),
            rate,
            source: RateSource::Online,
            last_updated: Utc::now(),
        }
    }

    fn usd_service(gateway: Arc<StubGateway>) -> FxService {
        FxService::new(gateway, "USD").unwrap()
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_prior_rates() {
        let gateway = Arc::new(StubGateway::with_rates(vec![make_rate(
            "USD",
            "EUR",
            dec!(0.9),
        )]));
        let service = usd_service(gateway.clone());

        service.load_rates().await.unwrap();
        let before = service.latest_rates().unwrap();
        assert_eq!(before.len(), 1);

        gateway.set_failing(true);
        let err = service.refresh_rates().await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));

        let after = service.latest_rates().unwrap();
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].rate, dec!(0.9));
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let gateway = Arc::new(StubGateway::with_rates(Vec::new()));
        let service = usd_service(gateway);

        let first = service.next_ticket();
        let second = service.next_ticket();

        // The newer request resolves first; the older response must not win.
        service
            .apply_rates(second, vec![make_rate("USD", "EUR", dec!(0.95))])
            .unwrap();
        service
            .apply_rates(first, vec![make_rate("USD", "EUR", dec!(0.90))])
            .unwrap();

        let rates = service.latest_rates().unwrap();
        assert_eq!(rates[0].rate, dec!(0.95));
    }

    #[tokio::test]
    async fn test_non_positive_manual_rate_rejected_without_side_effects() {
        let gateway = Arc::new(StubGateway::with_rates(Vec::new()));
        let service = usd_service(gateway.clone());

        for rate in [dec!(0), dec!(-1.5)] {
            let err = service
                .set_manual_rate(NewManualRate {
                    base_currency: "USD".to_string(),
                    target_currency: "EUR".to_string(),
                    rate,
                })
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                Error::Validation(ValidationError::NonPositiveRate(_))
            ));
        }

        assert!(gateway.saved.lock().unwrap().is_empty());
        assert!(service.latest_rates().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_manual_rate_same_pair_rejected() {
        let gateway = Arc::new(StubGateway::with_rates(Vec::new()));
        let service = usd_service(gateway.clone());

        let err = service
            .set_manual_rate(NewManualRate {
                base_currency: "usd".to_string(),
                target_currency: "USD".to_string(),
                rate: dec!(1.0),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Fx(FxError::InvalidCurrencyPair(_))));
        assert!(gateway.saved.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_manual_rate_overrides_until_refresh() {
        let gateway = Arc::new(StubGateway::with_rates(vec![make_rate(
            "USD",
            "EUR",
            dec!(0.90),
        )]));
        let service = usd_service(gateway.clone());
        service.load_rates().await.unwrap();

        let saved = service
            .set_manual_rate(NewManualRate {
                base_currency: "USD".to_string(),
                target_currency: "EUR".to_string(),
                rate: dec!(0.85),
            })
            .await
            .unwrap();
        assert_eq!(saved.source, RateSource::Manual);

        let result = service.convert(dec!(100), "USD", "EUR").unwrap();
        assert_eq!(result.converted_amount, dec!(85.00));
        assert_eq!(result.rate_source, RateSource::Manual);

        // The next online refresh replaces the override.
        service.refresh_rates().await.unwrap();
        let result = service.convert(dec!(100), "USD", "EUR").unwrap();
        assert_eq!(result.converted_amount, dec!(90.00));
        assert_eq!(result.rate_source, RateSource::Online);
    }

    #[tokio::test]
    async fn test_convert_uses_base_for_cross_rates() {
        let gateway = Arc::new(StubGateway::with_rates(vec![
            make_rate("USD", "EUR", dec!(0.8)),
            make_rate("USD", "GBP", dec!(0.6)),
        ]));
        let service = usd_service(gateway);
        service.load_rates().await.unwrap();

        let result = service.convert(dec!(100), "EUR", "GBP").unwrap();
        assert_eq!(result.converted_amount, dec!(75.00));
        assert_eq!(result.rate_source, RateSource::System);
    }
}
