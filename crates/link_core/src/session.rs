//! Async orchestrators that drive the step sequencers against a
//! [`BankGateway`] and fan flow events out to observers.
//!
//! Operations return `Result<()>`; everything observable (step changes,
//! inline validation failures, gateway-declined outcomes) flows through the
//! broadcast channel, and `snapshot()` exposes the current state. A gateway
//! transport error ends the checkout flow on the connection-failed screen;
//! business failures never do.

use std::sync::Arc;

use anyhow::{Context, Result};
use sandbox::{BankGateway, LoginOutcome};
use shared::{
    domain::{Account, Institution, LinkingMethod, Order, PaymentMethod},
    protocol::{PaymentAmount, PaymentCreateRequest, PaymentCreateResponse},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

use crate::{
    checkout::{CheckoutAction, CheckoutState, CheckoutStep},
    linking::{LinkAction, LinkState, LinkStep},
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

pub const CARD_PAYMENT_MESSAGE: &str =
    "Card payment selected. This demo focuses on bank payments.";
pub const MISSING_CREDENTIALS_MESSAGE: &str = "Please enter both username and password.";
pub const MISSING_MFA_ANSWER_MESSAGE: &str = "Please enter the verification code.";
pub const NO_INSTITUTION_MESSAGE: &str = "No institution selected.";
pub const NO_ACCOUNTS_MESSAGE: &str = "Please select at least one account.";
pub const INVALID_DEPOSIT_AMOUNTS_MESSAGE: &str =
    "Please enter valid positive amounts for both deposits.";
pub const UNSUPPORTED_INSTITUTION_MESSAGE: &str =
    "Selected institution does not support any linking methods.";
pub const MFA_UNAVAILABLE_MESSAGE: &str =
    "Multi-factor authentication is required for this institution.";
pub const PAYMENT_REFERENCE: &str = "Order #XYZ-789 Payment";

#[derive(Debug, Clone, PartialEq)]
pub enum FlowEvent {
    CheckoutStepChanged(CheckoutStep),
    LinkStepChanged(LinkStep),
    /// Inline validation failed before any gateway call was made.
    ValidationFailed { message: String },
    /// The gateway resolved, but with a business failure payload.
    OperationDeclined { message: String },
    /// The gateway itself failed; the checkout flow ends here.
    ConnectionFailed { message: String },
    Info { message: String },
    FlowCompleted { message: String },
}

/// Parses a user-typed deposit amount into cents. Rejects anything that is
/// not a finite positive number.
fn parse_deposit_cents(input: &str) -> Option<i64> {
    let amount: f64 = input.trim().parse().ok()?;
    if !amount.is_finite() || amount <= 0.0 {
        return None;
    }
    Some((amount * 100.0).round() as i64)
}

pub struct CheckoutSession {
    gateway: Arc<dyn BankGateway>,
    state: Mutex<CheckoutState>,
    events: broadcast::Sender<FlowEvent>,
}

impl CheckoutSession {
    pub fn new(gateway: Arc<dyn BankGateway>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            gateway,
            state: Mutex::new(CheckoutState::new()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<FlowEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> CheckoutState {
        self.state.lock().await.clone()
    }

    /// The fixed order this checkout collects payment for.
    pub fn order(&self) -> Order {
        Order::demo()
    }

    fn emit(&self, event: FlowEvent) {
        let _ = self.events.send(event);
    }

    async fn dispatch(&self, action: CheckoutAction) {
        let mut state = self.state.lock().await;
        let before = state.step;
        state.advance(action);
        let after = state.step;
        drop(state);
        if before != after {
            self.emit(FlowEvent::CheckoutStepChanged(after));
            if after == CheckoutStep::Success {
                self.emit(FlowEvent::FlowCompleted {
                    message: "Bank account connected and verified.".to_string(),
                });
            }
        }
    }

    async fn fail_connection(&self, err: &anyhow::Error) {
        let message = format!("{err:#}");
        warn!(%message, "checkout gateway failure");
        self.dispatch(CheckoutAction::GatewayFailed(message.clone()))
            .await;
        self.emit(FlowEvent::ConnectionFailed { message });
    }

    pub async fn proceed_to_payment(&self) {
        self.dispatch(CheckoutAction::ProceedToPayment).await;
    }

    pub async fn choose_payment_method(&self, method: PaymentMethod) {
        if method == PaymentMethod::Card {
            self.emit(FlowEvent::Info {
                message: CARD_PAYMENT_MESSAGE.to_string(),
            });
            return;
        }
        self.dispatch(CheckoutAction::ChoosePaymentMethod(method))
            .await;
    }

    pub async fn list_institutions(&self) -> Result<Vec<Institution>> {
        match self.gateway.list_institutions().await {
            Ok(institutions) => Ok(institutions),
            Err(err) => {
                self.fail_connection(&err).await;
                Err(err)
            }
        }
    }

    pub async fn choose_institution(&self, institution: Institution) {
        info!(institution = %institution.name, "bank selected");
        self.dispatch(CheckoutAction::ChooseInstitution(institution))
            .await;
    }

    pub async fn submit_credentials(&self, username: &str, password: &str) -> Result<()> {
        if username.trim().is_empty() || password.is_empty() {
            self.emit(FlowEvent::ValidationFailed {
                message: MISSING_CREDENTIALS_MESSAGE.to_string(),
            });
            return Ok(());
        }
        let institution_id = match self.state.lock().await.institution.as_ref() {
            Some(institution) => institution.institution_id,
            None => {
                self.emit(FlowEvent::ValidationFailed {
                    message: NO_INSTITUTION_MESSAGE.to_string(),
                });
                return Ok(());
            }
        };

        match self.gateway.login(institution_id, username, password).await {
            Ok(LoginOutcome::MfaRequired(challenge)) => {
                self.dispatch(CheckoutAction::CredentialsAccepted(Some(challenge)))
                    .await;
                Ok(())
            }
            Ok(LoginOutcome::Linked(result)) => {
                self.emit(FlowEvent::Info {
                    message: result.message,
                });
                self.dispatch(CheckoutAction::CredentialsAccepted(None)).await;
                Ok(())
            }
            Ok(LoginOutcome::Rejected(result)) => {
                self.emit(FlowEvent::OperationDeclined {
                    message: result.message,
                });
                Ok(())
            }
            Err(err) => {
                self.fail_connection(&err).await;
                Err(err)
            }
        }
    }

    pub async fn submit_mfa_answer(&self, answer: &str) -> Result<()> {
        if answer.trim().is_empty() {
            self.emit(FlowEvent::ValidationFailed {
                message: MISSING_MFA_ANSWER_MESSAGE.to_string(),
            });
            return Ok(());
        }
        let challenge_id = match self.state.lock().await.mfa_challenge.as_ref() {
            Some(challenge) => challenge.challenge_id,
            None => {
                self.emit(FlowEvent::ValidationFailed {
                    message: "No verification is pending.".to_string(),
                });
                return Ok(());
            }
        };

        match self.gateway.answer_mfa(challenge_id, answer).await {
            Ok(result) if result.success => {
                self.dispatch(CheckoutAction::MfaPassed).await;
                Ok(())
            }
            Ok(result) => {
                self.emit(FlowEvent::OperationDeclined {
                    message: result.message,
                });
                Ok(())
            }
            Err(err) => {
                self.fail_connection(&err).await;
                Err(err)
            }
        }
    }

    pub async fn load_accounts(&self) -> Result<Vec<Account>> {
        let institution_id = self
            .state
            .lock()
            .await
            .institution
            .as_ref()
            .map(|institution| institution.institution_id)
            .context("no institution selected")?;
        match self.gateway.list_accounts(institution_id).await {
            Ok(accounts) => Ok(accounts),
            Err(err) => {
                self.fail_connection(&err).await;
                Err(err)
            }
        }
    }

    pub async fn choose_accounts(&self, accounts: Vec<Account>) {
        if accounts.is_empty() {
            self.emit(FlowEvent::ValidationFailed {
                message: NO_ACCOUNTS_MESSAGE.to_string(),
            });
            return;
        }
        self.dispatch(CheckoutAction::ChooseAccounts(accounts)).await;
    }

    pub async fn verify_deposits(&self, first: &str, second: &str) -> Result<()> {
        let amounts = match (parse_deposit_cents(first), parse_deposit_cents(second)) {
            (Some(first_cents), Some(second_cents)) => (first_cents, second_cents),
            _ => {
                self.emit(FlowEvent::ValidationFailed {
                    message: INVALID_DEPOSIT_AMOUNTS_MESSAGE.to_string(),
                });
                return Ok(());
            }
        };
        let institution_id = match self.state.lock().await.institution.as_ref() {
            Some(institution) => institution.institution_id,
            None => {
                self.emit(FlowEvent::ValidationFailed {
                    message: NO_INSTITUTION_MESSAGE.to_string(),
                });
                return Ok(());
            }
        };

        match self
            .gateway
            .verify_micro_deposits(institution_id, amounts.0, amounts.1)
            .await
        {
            Ok(result) if result.success => {
                self.dispatch(CheckoutAction::DepositsVerified).await;
                Ok(())
            }
            Ok(result) => {
                self.emit(FlowEvent::OperationDeclined {
                    message: result.message,
                });
                Ok(())
            }
            Err(err) => {
                self.fail_connection(&err).await;
                Err(err)
            }
        }
    }

    /// Initiates the pay-by-bank payment for the demo order once the
    /// connection flow has succeeded.
    pub async fn initiate_payment(&self) -> Result<PaymentCreateResponse> {
        let order = Order::demo();
        let request = PaymentCreateRequest {
            recipient_id: PaymentCreateRequest::sample().recipient_id,
            amount: PaymentAmount {
                value_cents: order.total_cents(),
                currency: "USD".to_string(),
            },
            reference: PAYMENT_REFERENCE.to_string(),
        };
        match self.gateway.initiate_payment(request).await {
            Ok(response) => {
                info!(payment_id = response.payment_id.0, "payment initiated");
                Ok(response)
            }
            Err(err) => {
                self.fail_connection(&err).await;
                Err(err)
            }
        }
    }

    pub async fn retreat(&self) {
        let mut state = self.state.lock().await;
        let before = state.step;
        state.retreat();
        let after = state.step;
        drop(state);
        if before != after {
            self.emit(FlowEvent::CheckoutStepChanged(after));
        }
    }

    pub async fn reset(&self) {
        self.state.lock().await.reset();
        self.emit(FlowEvent::CheckoutStepChanged(CheckoutStep::OrderSummary));
    }
}

pub struct LinkSession {
    gateway: Arc<dyn BankGateway>,
    state: Mutex<LinkState>,
    events: broadcast::Sender<FlowEvent>,
}

impl LinkSession {
    pub fn new(gateway: Arc<dyn BankGateway>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            gateway,
            state: Mutex::new(LinkState::new()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<FlowEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> LinkState {
        self.state.lock().await.clone()
    }

    fn emit(&self, event: FlowEvent) {
        let _ = self.events.send(event);
    }

    async fn dispatch(&self, action: LinkAction) {
        let mut state = self.state.lock().await;
        let before = state.step;
        state.advance(action);
        let after = state.step;
        let completion = state.completion_message.clone();
        drop(state);
        if before != after {
            self.emit(FlowEvent::LinkStepChanged(after));
            if after == LinkStep::Success {
                self.emit(FlowEvent::FlowCompleted {
                    message: completion
                        .unwrap_or_else(|| "Account linked successfully.".to_string()),
                });
            }
        }
    }

    async fn selected_institution(&self) -> Option<Institution> {
        self.state.lock().await.institution.clone()
    }

    pub async fn load_institutions(&self) -> Result<Vec<Institution>> {
        self.gateway
            .list_institutions()
            .await
            .context("failed to load institutions")
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Institution>> {
        self.gateway
            .search_institutions(query)
            .await
            .context("institution search failed")
    }

    pub async fn choose_institution(&self, institution: Institution) {
        if !institution.capabilities.supports_any() {
            self.emit(FlowEvent::ValidationFailed {
                message: UNSUPPORTED_INSTITUTION_MESSAGE.to_string(),
            });
            return;
        }
        info!(institution = %institution.name, "institution selected");
        self.dispatch(LinkAction::ChooseInstitution(institution)).await;
    }

    pub async fn choose_method(&self, method: LinkingMethod) {
        let supported = self
            .selected_institution()
            .await
            .is_some_and(|institution| institution.capabilities.supports(method));
        if !supported {
            self.emit(FlowEvent::ValidationFailed {
                message: format!("Selected institution does not support {method:?} linking."),
            });
            return;
        }
        self.dispatch(LinkAction::ChooseMethod(method)).await;
    }

    /// Runs the simulated OAuth redirect for the selected institution.
    pub async fn run_oauth(&self) -> Result<()> {
        let institution = match self.selected_institution().await {
            Some(institution) => institution,
            None => {
                self.emit(FlowEvent::ValidationFailed {
                    message: NO_INSTITUTION_MESSAGE.to_string(),
                });
                return Ok(());
            }
        };
        match self.gateway.authorize_oauth(institution.institution_id).await {
            Ok(result) if result.success => {
                self.emit(FlowEvent::Info {
                    message: result.message.clone(),
                });
                self.dispatch(LinkAction::Linked(result.message)).await;
                Ok(())
            }
            Ok(result) => {
                self.dispatch(LinkAction::Failed(result.message)).await;
                Ok(())
            }
            Err(err) => {
                self.dispatch(LinkAction::Failed(format!("{err:#}"))).await;
                Err(err)
            }
        }
    }

    pub async fn submit_credentials(&self, username: &str, password: &str) -> Result<()> {
        if username.trim().is_empty() || password.is_empty() {
            self.emit(FlowEvent::ValidationFailed {
                message: MISSING_CREDENTIALS_MESSAGE.to_string(),
            });
            return Ok(());
        }
        let institution = match self.selected_institution().await {
            Some(institution) => institution,
            None => {
                self.emit(FlowEvent::ValidationFailed {
                    message: NO_INSTITUTION_MESSAGE.to_string(),
                });
                return Ok(());
            }
        };

        match self
            .gateway
            .login(institution.institution_id, username, password)
            .await
        {
            Ok(LoginOutcome::Linked(result)) => {
                self.dispatch(LinkAction::Linked(result.message)).await;
                Ok(())
            }
            // Instant linking carries no MFA screen; a challenge ends the
            // attempt on the error screen.
            Ok(LoginOutcome::MfaRequired(_)) => {
                self.dispatch(LinkAction::Failed(MFA_UNAVAILABLE_MESSAGE.to_string()))
                    .await;
                Ok(())
            }
            Ok(LoginOutcome::Rejected(result)) => {
                self.emit(FlowEvent::OperationDeclined {
                    message: result.message,
                });
                Ok(())
            }
            Err(err) => {
                self.dispatch(LinkAction::Failed(format!("{err:#}"))).await;
                Err(err)
            }
        }
    }

    pub async fn verify_deposits(&self, first: &str, second: &str) -> Result<()> {
        let amounts = match (parse_deposit_cents(first), parse_deposit_cents(second)) {
            (Some(first_cents), Some(second_cents)) => (first_cents, second_cents),
            _ => {
                self.emit(FlowEvent::ValidationFailed {
                    message: INVALID_DEPOSIT_AMOUNTS_MESSAGE.to_string(),
                });
                return Ok(());
            }
        };
        let institution = match self.selected_institution().await {
            Some(institution) => institution,
            None => {
                self.emit(FlowEvent::ValidationFailed {
                    message: NO_INSTITUTION_MESSAGE.to_string(),
                });
                return Ok(());
            }
        };

        match self
            .gateway
            .verify_micro_deposits(institution.institution_id, amounts.0, amounts.1)
            .await
        {
            Ok(result) if result.success => {
                self.dispatch(LinkAction::Linked(result.message)).await;
                Ok(())
            }
            // Wrong amounts keep the user on the form with an inline error.
            Ok(result) => {
                self.emit(FlowEvent::OperationDeclined {
                    message: result.message,
                });
                Ok(())
            }
            Err(err) => {
                self.dispatch(LinkAction::Failed(format!("{err:#}"))).await;
                Err(err)
            }
        }
    }

    pub async fn retreat(&self) {
        let mut state = self.state.lock().await;
        let before = state.step;
        state.retreat();
        let after = state.step;
        drop(state);
        if before != after {
            self.emit(FlowEvent::LinkStepChanged(after));
        }
    }

    /// Restarts from the beginning; the error screen offers only this.
    pub async fn restart(&self) {
        self.state.lock().await.reset();
        self.emit(FlowEvent::LinkStepChanged(LinkStep::InstitutionSearch));
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
