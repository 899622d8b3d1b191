//! Step sequencer for the aggregator account-linking flow.
//!
//! Unlike the linear checkout flow, method selection branches into one of
//! three verification screens, each of which retreats back to the selection
//! screen. The error screen offers only a restart.

use serde::{Deserialize, Serialize};
use shared::domain::{Institution, LinkingMethod};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStep {
    InstitutionSearch,
    MethodSelection,
    OAuth,
    InstantLinking,
    MicroDeposit,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LinkAction {
    ChooseInstitution(Institution),
    ChooseMethod(LinkingMethod),
    Linked(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LinkState {
    pub step: LinkStep,
    pub institution: Option<Institution>,
    pub chosen_method: Option<LinkingMethod>,
    pub completion_message: Option<String>,
    pub failure_message: Option<String>,
}

impl Default for LinkStep {
    fn default() -> Self {
        Self::InstitutionSearch
    }
}

fn method_screen(method: LinkingMethod) -> LinkStep {
    match method {
        LinkingMethod::OAuth => LinkStep::OAuth,
        LinkingMethod::Instant => LinkStep::InstantLinking,
        LinkingMethod::MicroDeposit => LinkStep::MicroDeposit,
    }
}

impl LinkState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn institution_name(&self) -> Option<&str> {
        self.institution.as_ref().map(|inst| inst.name.as_str())
    }

    /// Applies one action through the transition table. Institutions without
    /// any linking capability and methods the selected institution does not
    /// support leave the state unchanged; the session surfaces those as
    /// validation events.
    pub fn advance(&mut self, action: LinkAction) {
        use LinkAction as A;
        use LinkStep as S;

        match (self.step, action) {
            (S::InstitutionSearch, A::ChooseInstitution(institution)) => {
                if institution.capabilities.supports_any() {
                    self.institution = Some(institution);
                    self.step = S::MethodSelection;
                }
            }
            (S::MethodSelection, A::ChooseMethod(method)) => {
                let supported = self
                    .institution
                    .as_ref()
                    .is_some_and(|inst| inst.capabilities.supports(method));
                if supported {
                    self.chosen_method = Some(method);
                    self.step = method_screen(method);
                }
            }
            (S::OAuth | S::InstantLinking | S::MicroDeposit, A::Linked(message)) => {
                self.completion_message = Some(message);
                self.failure_message = None;
                self.step = S::Success;
            }
            (S::OAuth | S::InstantLinking | S::MicroDeposit, A::Failed(message)) => {
                self.failure_message = Some(message);
                self.step = S::Error;
            }
            _ => {}
        }
    }

    /// Moves to the previous screen: each verification screen retreats to
    /// method selection. Terminal screens and the first screen stay put.
    pub fn retreat(&mut self) {
        use LinkStep as S;
        self.step = match self.step {
            S::InstitutionSearch => S::InstitutionSearch,
            S::MethodSelection => S::InstitutionSearch,
            S::OAuth | S::InstantLinking | S::MicroDeposit => S::MethodSelection,
            S::Success => S::Success,
            S::Error => S::Error,
        };
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
#[path = "tests/linking_tests.rs"]
mod tests;
