//! Gateway and service traits for the company currency setup.

use async_trait::async_trait;

use crate::errors::Result;
use crate::settings::CompanyCurrencyConfig;

/// Contract for the backend company-setup endpoints
/// (`GET`/`PUT /api/setup/company`).
#[async_trait]
pub trait CompanySetupGatewayTrait: Send + Sync {
    async fn fetch_company_setup(&self) -> Result<CompanyCurrencyConfig>;

    /// Persists the full config and returns the backend's saved version.
    async fn save_company_setup(
        &self,
        config: &CompanyCurrencyConfig,
    ) -> Result<CompanyCurrencyConfig>;
}

/// Service trait for managing the company currency setup.
#[async_trait]
pub trait SettingsServiceTrait: Send + Sync {
    async fn load_company_setup(&self) -> Result<CompanyCurrencyConfig>;

    async fn save_company_setup(
        &self,
        config: CompanyCurrencyConfig,
    ) -> Result<CompanyCurrencyConfig>;

    /// Changes the base currency, removing the new base from the additional
    /// set before persisting.
    async fn update_base_currency(&self, new_base_currency: &str)
        -> Result<CompanyCurrencyConfig>;
}
