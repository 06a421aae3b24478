use super::fx_model::{ConversionResult, CurrencyInfo, ExchangeRate, NewManualRate};
use crate::errors::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// Contract for the backend rate endpoints.
///
/// Implemented over HTTP by the connect crate; tests substitute in-memory
/// stubs. The backend owns the persistent rate store; this side only mirrors
/// it.
#[async_trait]
pub trait RateGatewayTrait: Send + Sync {
    /// `GET /api/currency/rates`. `base_currency` anchors flat code->rate
    /// payloads during normalization.
    async fn fetch_rates(&self, base_currency: &str) -> Result<Vec<ExchangeRate>>;

    /// `POST /api/currency/update-rates`, returning the refreshed set.
    async fn trigger_rate_update(&self, base_currency: &str) -> Result<Vec<ExchangeRate>>;

    /// `POST /api/currency/set-manual-rate`.
    async fn save_manual_rate(&self, new_rate: &NewManualRate) -> Result<ExchangeRate>;

    /// `GET /api/currency/available`.
    async fn fetch_available_currencies(&self) -> Result<Vec<CurrencyInfo>>;

    /// `POST /api/currency/convert` (server-side conversion).
    async fn convert_remote(
        &self,
        amount: Decimal,
        from_currency: &str,
        to_currency: &str,
    ) -> Result<ConversionResult>;
}

/// Contract for FX service operations.
#[async_trait]
pub trait FxServiceTrait: Send + Sync {
    /// Populates the rate set from the backend. Returns the number of rates
    /// loaded.
    async fn load_rates(&self) -> Result<usize>;

    /// Triggers an online refresh and replaces the rate set on success.
    /// On failure the prior rates remain intact.
    async fn refresh_rates(&self) -> Result<usize>;

    /// Validates and persists a manual override, then mirrors it locally.
    async fn set_manual_rate(&self, new_rate: NewManualRate) -> Result<ExchangeRate>;

    /// Client-side conversion over the currently loaded rates.
    fn convert(
        &self,
        amount: Decimal,
        from_currency: &str,
        to_currency: &str,
    ) -> Result<ConversionResult>;

    /// Backend-side conversion.
    async fn convert_remote(
        &self,
        amount: Decimal,
        from_currency: &str,
        to_currency: &str,
    ) -> Result<ConversionResult>;

    /// The currently loaded rates, ordered by pair.
    fn latest_rates(&self) -> Result<Vec<ExchangeRate>>;

    async fn available_currencies(&self) -> Result<Vec<CurrencyInfo>>;
}
