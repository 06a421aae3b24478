use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The currencies a company tracks: one base currency plus a set of
/// additional ones.
///
/// Invariant: the base currency is never a member of
/// `additional_currencies`. The constructor and the deserializer both
/// re-establish it, so a config observed anywhere in the process upholds it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(from = "RawCompanyCurrencyConfig")]
pub struct CompanyCurrencyConfig {
    pub base_currency: String,
    pub additional_currencies: BTreeSet<String>,
}

impl CompanyCurrencyConfig {
    pub fn new(base_currency: String, mut additional_currencies: BTreeSet<String>) -> Self {
        additional_currencies.remove(&base_currency);
        Self {
            base_currency,
            additional_currencies,
        }
    }

    /// Every currency the company tracks, base first.
    pub fn tracked_currencies(&self) -> Vec<String> {
        let mut all = vec![self.base_currency.clone()];
        all.extend(self.additional_currencies.iter().cloned());
        all
    }

    pub fn tracks(&self, code: &str) -> bool {
        self.base_currency == code || self.additional_currencies.contains(code)
    }
}

#[derive(Deserialize)]
struct RawCompanyCurrencyConfig {
    base_currency: String,
    #[serde(default)]
    additional_currencies: BTreeSet<String>,
}

impl From<RawCompanyCurrencyConfig> for CompanyCurrencyConfig {
    fn from(raw: RawCompanyCurrencyConfig) -> Self {
        CompanyCurrencyConfig::new(raw.base_currency, raw.additional_currencies)
    }
}
