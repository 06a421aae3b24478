pub mod selection;
pub mod settings_model;
pub mod settings_service;
pub mod settings_traits;
pub use selection::{CurrencySelectionManager, SelectionState};
pub use settings_model::CompanyCurrencyConfig;
pub use settings_service::SettingsService;
pub use settings_traits::{CompanySetupGatewayTrait, SettingsServiceTrait};
