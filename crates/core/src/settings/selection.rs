use super::{CompanyCurrencyConfig, CompanySetupGatewayTrait};
use crate::errors::{Error, Result};
use crate::fx::validate_currency_code;
use async_trait::async_trait;
use log::debug;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Where the selection dialog is in its lifecycle:
/// `Closed -> Editing -> {saved, cancelled} -> Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Closed,
    Editing,
}

/// Edit session for the set of additional currencies a company tracks.
///
/// `open` clones the last persisted selection into a draft; toggles only
/// touch the draft. `save` persists the full set in one request — there is
/// no partial or optimistic persistence. A failed save reverts the draft to
/// the last persisted value and leaves the editor open so the error can be
/// surfaced; `cancel` drops the draft.
pub struct CurrencySelectionManager {
    gateway: Arc<dyn CompanySetupGatewayTrait>,
    persisted: CompanyCurrencyConfig,
    draft: BTreeSet<String>,
    state: SelectionState,
}

impl CurrencySelectionManager {
    pub fn new(gateway: Arc<dyn CompanySetupGatewayTrait>, persisted: CompanyCurrencyConfig) -> Self {
        Self {
            gateway,
            persisted,
            draft: BTreeSet::new(),
            state: SelectionState::Closed,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    /// The last successfully persisted config.
    pub fn persisted(&self) -> &CompanyCurrencyConfig {
        &self.persisted
    }

    /// The selection as currently displayed: the draft while editing, the
    /// persisted set otherwise.
    pub fn selection(&self) -> &BTreeSet<String> {
        match self.state {
            SelectionState::Editing => &self.draft,
            SelectionState::Closed => &self.persisted.additional_currencies,
        }
    }

    pub fn open(&mut self) -> Result<()> {
        if self.state == SelectionState::Editing {
            return Err(Error::ConstraintViolation(
                "Currency selection is already being edited".to_string(),
            ));
        }
        self.draft = self.persisted.additional_currencies.clone();
        self.state = SelectionState::Editing;
        Ok(())
    }

    /// Adds or removes a currency in the draft. Toggling the base currency
    /// is a no-op; returns whether the draft changed.
    pub fn toggle(&mut self, code: &str) -> Result<bool> {
        self.require_editing()?;
        let code = validate_currency_code(code)?;

        if code == self.persisted.base_currency {
            debug!("Ignoring toggle of base currency {}", code);
            return Ok(false);
        }

        if !self.draft.remove(&code) {
            self.draft.insert(code);
        }
        Ok(true)
    }

    /// Persists the full draft. On failure the draft reverts to the last
    /// persisted selection and the editor stays open.
    pub async fn save(&mut self) -> Result<&CompanyCurrencyConfig> {
        self.require_editing()?;

        let candidate = CompanyCurrencyConfig::new(
            self.persisted.base_currency.clone(),
            self.draft.clone(),
        );

        match self.gateway.save_company_setup(&candidate).await {
            Ok(saved) => {
                self.persisted = saved;
                self.draft.clear();
                self.state = SelectionState::Closed;
                Ok(&self.persisted)
            }
            Err(e) => {
                self.draft = self.persisted.additional_currencies.clone();
                Err(e)
            }
        }
    }

    /// Discards the draft without persisting anything.
    pub fn cancel(&mut self) -> Result<()> {
        self.require_editing()?;
        self.draft.clear();
        self.state = SelectionState::Closed;
        Ok(())
    }

    fn require_editing(&self) -> Result<()> {
        if self.state != SelectionState::Editing {
            return Err(Error::ConstraintViolation(
                "Currency selection is not open for editing".to_string(),
            ));
        }
        Ok(())
    }
}
