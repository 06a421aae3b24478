use super::{CompanyCurrencyConfig, CompanySetupGatewayTrait, SettingsServiceTrait};
use crate::errors::Result;
use crate::fx::validate_currency_code;
use async_trait::async_trait;
use log::debug;
use std::sync::Arc;

/// Reads and writes the company currency setup through the backend gateway.
///
/// Stateless: every call goes to the backend, and the
/// base-not-in-additional invariant is re-established on each load and save
/// by [`CompanyCurrencyConfig`] itself.
pub struct SettingsService {
    gateway: Arc<dyn CompanySetupGatewayTrait>,
}

impl SettingsService {
    pub fn new(gateway: Arc<dyn CompanySetupGatewayTrait>) -> Self {
        SettingsService { gateway }
    }
}

#[async_trait]
impl SettingsServiceTrait for SettingsService {
    async fn load_company_setup(&self) -> Result<CompanyCurrencyConfig> {
        self.gateway.fetch_company_setup().await
    }

    async fn save_company_setup(
        &self,
        config: CompanyCurrencyConfig,
    ) -> Result<CompanyCurrencyConfig> {
        // Rebuild through the constructor in case the caller assembled the
        // struct manually.
        let config = CompanyCurrencyConfig::new(config.base_currency, config.additional_currencies);
        self.gateway.save_company_setup(&config).await
    }

    async fn update_base_currency(
        &self,
        new_base_currency: &str,
    ) -> Result<CompanyCurrencyConfig> {
        let new_base = validate_currency_code(new_base_currency)?;
        let current = self.gateway.fetch_company_setup().await?;

        if current.base_currency == new_base {
            debug!("Base currency already {}, nothing to do", new_base);
            return Ok(current);
        }

        let updated = CompanyCurrencyConfig::new(new_base, current.additional_currencies);
        self.gateway.save_company_setup(&updated).await
    }
}
