//! FX (Foreign Exchange) module - domain models, services, and traits.

pub mod currency;
pub mod currency_converter;
mod fx_errors;
mod fx_model;
mod fx_service;
mod fx_traits;
pub mod rate_book;

pub use currency::{decimal_places, round_amount, validate_currency_code};
pub use fx_errors::FxError;
pub use fx_model::{ConversionResult, CurrencyInfo, ExchangeRate, NewManualRate, RateSource};
pub use fx_service::{manual_rate_record, FxService};
pub use fx_traits::{FxServiceTrait, RateGatewayTrait};
pub use rate_book::{RateBook, ResolvedRate};
