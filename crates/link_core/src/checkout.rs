//! Step sequencer for the pay-by-bank checkout flow.
//!
//! The flow is a closed enum of screens with an explicit transition table:
//! every (step, action) pair either produces the next step, merging any
//! payload into the state first, or leaves the state untouched. Required-field
//! validation happens in the session before an action is dispatched, never
//! here.

use serde::{Deserialize, Serialize};
use shared::{
    domain::{Account, Institution, PaymentMethod},
    protocol::MfaChallenge,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    OrderSummary,
    PaymentMethod,
    BankSelection,
    Login,
    Mfa,
    AccountSelection,
    MicroDeposit,
    Success,
    ConnectionFailed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutAction {
    ProceedToPayment,
    ChoosePaymentMethod(PaymentMethod),
    ChooseInstitution(Institution),
    /// Login accepted; a challenge routes through the MFA screen, otherwise
    /// the flow moves straight to account selection.
    CredentialsAccepted(Option<MfaChallenge>),
    MfaPassed,
    ChooseAccounts(Vec<Account>),
    DepositsVerified,
    GatewayFailed(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CheckoutState {
    pub step: CheckoutStep,
    pub institution: Option<Institution>,
    pub accounts: Vec<Account>,
    pub mfa_challenge: Option<MfaChallenge>,
    /// Whether the most recent login routed through the MFA screen. Retreat
    /// skips that screen again when it was never shown.
    pub mfa_visited: bool,
    pub last_failure: Option<String>,
}

impl Default for CheckoutStep {
    fn default() -> Self {
        Self::OrderSummary
    }
}

impl CheckoutState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Institution name for screen titles, once bank selection completed.
    pub fn bank_name(&self) -> Option<&str> {
        self.institution.as_ref().map(|inst| inst.name.as_str())
    }

    /// Applies one action through the transition table. Unmatched
    /// (step, action) pairs leave the state unchanged.
    pub fn advance(&mut self, action: CheckoutAction) {
        use CheckoutAction as A;
        use CheckoutStep as S;

        // A gateway failure ends the flow from any in-flight screen.
        if let A::GatewayFailed(message) = &action {
            if matches!(
                self.step,
                S::BankSelection | S::Login | S::Mfa | S::AccountSelection | S::MicroDeposit
            ) {
                self.last_failure = Some(message.clone());
                self.step = S::ConnectionFailed;
            }
            return;
        }

        match (self.step, action) {
            (S::OrderSummary, A::ProceedToPayment) => {
                self.step = S::PaymentMethod;
            }
            (S::PaymentMethod, A::ChoosePaymentMethod(PaymentMethod::Bank)) => {
                self.step = S::BankSelection;
            }
            // Card payment is acknowledged by the session; the screen stays.
            (S::PaymentMethod, A::ChoosePaymentMethod(PaymentMethod::Card)) => {}
            (S::BankSelection, A::ChooseInstitution(institution)) => {
                self.institution = Some(institution);
                self.step = S::Login;
            }
            (S::Login, A::CredentialsAccepted(Some(challenge))) => {
                self.mfa_challenge = Some(challenge);
                self.mfa_visited = true;
                self.step = S::Mfa;
            }
            (S::Login, A::CredentialsAccepted(None)) => {
                self.mfa_visited = false;
                self.step = S::AccountSelection;
            }
            (S::Mfa, A::MfaPassed) => {
                self.mfa_challenge = None;
                self.step = S::AccountSelection;
            }
            (S::AccountSelection, A::ChooseAccounts(accounts)) => {
                self.accounts = accounts;
                self.step = S::MicroDeposit;
            }
            (S::MicroDeposit, A::DepositsVerified) => {
                self.step = S::Success;
            }
            _ => {}
        }
    }

    /// Moves to the previous screen. The payment-method decision screen
    /// retreats to the order-summary screen, and account selection retreats
    /// past the MFA screen when the login never issued a challenge.
    /// Retreating from the first screen or a terminal screen is a no-op.
    pub fn retreat(&mut self) {
        use CheckoutStep as S;
        self.step = match self.step {
            S::OrderSummary => S::OrderSummary,
            S::PaymentMethod => S::OrderSummary,
            S::BankSelection => S::PaymentMethod,
            S::Login => S::BankSelection,
            S::Mfa => S::Login,
            S::AccountSelection if self.mfa_visited => S::Mfa,
            S::AccountSelection => S::Login,
            S::MicroDeposit => S::AccountSelection,
            S::Success => S::Success,
            S::ConnectionFailed => S::ConnectionFailed,
        };
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Progress through the bank-connection portion of the flow, as a
    /// percentage. The order-summary and payment-method screens sit before
    /// the connection begins and report no progress; the failure screen
    /// reports none either.
    pub fn progress_percent(&self) -> Option<u8> {
        use CheckoutStep as S;
        let position: u16 = match self.step {
            S::OrderSummary | S::PaymentMethod | S::ConnectionFailed => return None,
            S::BankSelection => 0,
            S::Login => 1,
            S::Mfa => 2,
            S::AccountSelection => 3,
            S::MicroDeposit => 4,
            S::Success => 5,
        };
        Some((position * 100 / 5) as u8)
    }
}

#[cfg(test)]
#[path = "tests/checkout_tests.rs"]
mod tests;
