//! HTTP client for the Finbooks backend API.
//!
//! One shared client for every front end: the base URL and bearer token are
//! injected at construction, never read from module state, so tests and
//! multiple environments can point it anywhere.

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use finbooks_core::errors::{Error, Result};
use finbooks_core::fx::{
    manual_rate_record, ConversionResult, CurrencyInfo, ExchangeRate, NewManualRate,
    RateGatewayTrait, RateSource,
};
use finbooks_core::settings::{CompanyCurrencyConfig, CompanySetupGatewayTrait};

use crate::models::{ApiErrorResponse, RateDto, RatesPayload, SetManualRateRequest, UpdateRatesResponse};

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ─────────────────────────────────────────────────────────────────────────────
// API Client
// ─────────────────────────────────────────────────────────────────────────────

/// HTTP client for the Finbooks backend.
///
/// This client provides methods for:
/// - Fetching and refreshing exchange rates
/// - Saving manual rate overrides
/// - Server-side conversion
/// - Reading and updating the company currency setup
///
/// # Example
///
/// ```ignore
/// let client = ApiClient::new("https://api.finbooks.example", "your-token")?;
/// let rates = client.get_rates("USD").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    auth_header: HeaderValue,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the backend (e.g., "https://api.finbooks.example")
    /// * `access_token` - A valid bearer token
    ///
    /// # Errors
    ///
    /// Returns an error if the access token format is invalid or the HTTP
    /// client cannot be initialized.
    pub fn new(base_url: &str, access_token: &str) -> Result<Self> {
        let auth_header = HeaderValue::from_str(&format!("Bearer {}", access_token))
            .map_err(|e| Error::Unexpected(format!("Invalid access token format: {}", e)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Unexpected(format!("Failed to initialize HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header,
        })
    }

    /// Create default headers for API requests.
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(AUTHORIZATION, self.auth_header.clone());
        headers
    }

    /// Make a GET request and parse the response.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("[ApiClient] GET {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers())
            .send()
            .await
            .map_err(|e| Error::Network(format!("Request failed: {}", e)))?;

        self.parse_response(response).await
    }

    /// Make a POST request with a JSON body and parse the response.
    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("[ApiClient] POST {}", url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Request failed: {}", e)))?;

        self.parse_response(response).await
    }

    /// Make a PUT request with a JSON body and return the success body.
    async fn put_raw<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        debug!("[ApiClient] PUT {}", url);

        let response = self
            .client
            .put(&url)
            .headers(self.headers())
            .json(body)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Request failed: {}", e)))?;

        self.read_success_body(response).await
    }

    /// Check the response status and read the body. 401 means the session
    /// is no longer valid; the logout flow belongs to the auth collaborator.
    async fn read_success_body(&self, response: reqwest::Response) -> Result<String> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read response: {}", e)))?;

        if status.as_u16() == 401 {
            return Err(Error::Auth("Session expired or token invalid".to_string()));
        }

        if !status.is_success() {
            // Try to parse the error envelope for a better message
            if let Ok(err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                if let Some(msg) = err.message.or(err.error) {
                    return Err(Error::Api {
                        status: status.as_u16(),
                        message: msg,
                    });
                }
            }
            return Err(Error::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        Ok(body)
    }

    /// Parse an HTTP response, handling errors appropriately.
    async fn parse_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let body = self.read_success_body(response).await?;

        serde_json::from_str(&body)
            .map_err(|e| Error::Unexpected(format!("Failed to parse response: {} - {}", e, body)))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Currency Endpoints
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch the current exchange rates.
    ///
    /// `base_currency` anchors flat `code -> rate` payloads during
    /// normalization; list payloads carry their own pairs.
    pub async fn get_rates(&self, base_currency: &str) -> Result<Vec<ExchangeRate>> {
        let payload: RatesPayload = self.get("/api/currency/rates").await?;
        let rates = payload.into_domain(base_currency);
        debug!("[ApiClient] Fetched {} exchange rates", rates.len());
        Ok(rates)
    }

    /// Fetch the currencies available for selection.
    pub async fn get_available_currencies(&self) -> Result<Vec<CurrencyInfo>> {
        self.get("/api/currency/available").await
    }

    /// Trigger an online rate refresh and return the refreshed set.
    ///
    /// When the backend answers with only an updated count, a follow-up
    /// rates fetch retrieves the new set so callers always see full data.
    pub async fn update_rates(&self, base_currency: &str) -> Result<Vec<ExchangeRate>> {
        let response: UpdateRatesResponse = self
            .post("/api/currency/update-rates", &serde_json::json!({}))
            .await?;

        if let Some(payload) = response.updated_rates {
            let rates = payload.into_domain(base_currency);
            info!("[ApiClient] Refresh returned {} rates", rates.len());
            return Ok(rates);
        }

        debug!(
            "[ApiClient] Refresh returned a count only ({:?}), fetching rates",
            response.updated_count
        );
        self.get_rates(base_currency).await
    }

    /// Save a manual rate override.
    ///
    /// The caller has already validated the input; the backend stores it
    /// with `source = "manual"`. Backends that acknowledge without echoing
    /// the saved rate get a locally built record instead.
    pub async fn set_manual_rate(&self, new_rate: &NewManualRate) -> Result<ExchangeRate> {
        let request = SetManualRateRequest {
            base_currency: &new_rate.base_currency,
            target_currency: &new_rate.target_currency,
            rate: new_rate.rate,
            source: RateSource::Manual,
        };

        let url = format!("{}/api/currency/set-manual-rate", self.base_url);
        debug!("[ApiClient] POST {}", url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Network(format!("Request failed: {}", e)))?;

        let body = self.read_success_body(response).await?;
        match serde_json::from_str::<RateDto>(&body) {
            Ok(dto) => dto.into_domain().ok_or_else(|| {
                Error::Unexpected("Backend echoed a rate with invalid currency codes".to_string())
            }),
            Err(_) => {
                warn!("[ApiClient] Manual rate saved without echo, using local record");
                Ok(manual_rate_record(new_rate))
            }
        }
    }

    /// Server-side conversion.
    pub async fn convert(
        &self,
        amount: Decimal,
        from_currency: &str,
        to_currency: &str,
    ) -> Result<ConversionResult> {
        let url = format!("{}/api/currency/convert", self.base_url);
        debug!("[ApiClient] POST {}", url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .query(&[
                ("amount", amount.to_string().as_str()),
                ("from_currency", from_currency),
                ("to_currency", to_currency),
            ])
            .send()
            .await
            .map_err(|e| Error::Network(format!("Request failed: {}", e)))?;

        self.parse_response(response).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Company Setup Endpoints
    // ─────────────────────────────────────────────────────────────────────────

    /// Read the company currency setup.
    pub async fn get_company_setup(&self) -> Result<CompanyCurrencyConfig> {
        self.get("/api/setup/company").await
    }

    /// Replace the company currency setup with the given config.
    pub async fn put_company_setup(
        &self,
        config: &CompanyCurrencyConfig,
    ) -> Result<CompanyCurrencyConfig> {
        let body = self.put_raw("/api/setup/company", config).await?;

        // Some backend versions echo the saved config, others acknowledge
        // with an empty body.
        match serde_json::from_str::<CompanyCurrencyConfig>(&body) {
            Ok(saved) => Ok(saved),
            Err(_) => Ok(config.clone()),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Gateway Trait Implementations
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl RateGatewayTrait for ApiClient {
    async fn fetch_rates(&self, base_currency: &str) -> Result<Vec<ExchangeRate>> {
        self.get_rates(base_currency).await
    }

    async fn trigger_rate_update(&self, base_currency: &str) -> Result<Vec<ExchangeRate>> {
        self.update_rates(base_currency).await
    }

    async fn save_manual_rate(&self, new_rate: &NewManualRate) -> Result<ExchangeRate> {
        self.set_manual_rate(new_rate).await
    }

    async fn fetch_available_currencies(&self) -> Result<Vec<CurrencyInfo>> {
        self.get_available_currencies().await
    }

    async fn convert_remote(
        &self,
        amount: Decimal,
        from_currency: &str,
        to_currency: &str,
    ) -> Result<ConversionResult> {
        self.convert(amount, from_currency, to_currency).await
    }
}

#[async_trait]
impl CompanySetupGatewayTrait for ApiClient {
    async fn fetch_company_setup(&self) -> Result<CompanyCurrencyConfig> {
        self.get_company_setup().await
    }

    async fn save_company_setup(
        &self,
        config: &CompanyCurrencyConfig,
    ) -> Result<CompanyCurrencyConfig> {
        self.put_company_setup(config).await
    }
}
