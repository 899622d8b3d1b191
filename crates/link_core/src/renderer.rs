//! Pure lookup from a flow state to its screen descriptor and, for the
//! checkout demo, the API-explainer panel data shown alongside each step.
//!
//! Total over the closed step enums; no state, no side effects.

use serde::Serialize;
use serde_json::{json, Value};
use shared::error::{ApiError, ApiException, ErrorCode};
use shared::protocol::{
    AccountsRequest, AccountsResponse, ExchangeTokenRequest, ExchangeTokenResponse,
    LinkTokenRequest, LinkTokenResponse, MicroDepositVerifyRequest, MicroDepositVerifyResponse,
    PaymentCreateRequest, PaymentCreateResponse, PaymentStatusWebhook,
};

use crate::{
    checkout::{CheckoutState, CheckoutStep},
    linking::{LinkState, LinkStep},
};

/// What the active screen displays: title, body copy, whether a back control
/// is offered, and the connection progress where the flow shows one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Screen {
    pub title: String,
    pub body: String,
    pub shows_back: bool,
    pub progress_percent: Option<u8>,
}

/// Side-panel data describing the backend interaction a step stands in for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiStepDetails {
    pub description: String,
    pub endpoint: Option<String>,
    pub method: Option<String>,
    pub sample_request: Option<Value>,
    pub sample_response: Option<Value>,
    pub webhook_example: Option<Value>,
}

impl ApiStepDetails {
    fn narrative(description: &str) -> Self {
        Self {
            description: description.to_string(),
            endpoint: None,
            method: None,
            sample_request: None,
            sample_response: None,
            webhook_example: None,
        }
    }
}

pub fn checkout_screen(state: &CheckoutState) -> Screen {
    let bank = state.bank_name().unwrap_or("your bank");
    let progress_percent = state.progress_percent();
    let (title, body, shows_back) = match state.step {
        CheckoutStep::OrderSummary => (
            "Order Summary".to_string(),
            "Review your order before proceeding to payment.".to_string(),
            false,
        ),
        CheckoutStep::PaymentMethod => (
            "Select Payment Method".to_string(),
            "Choose how you'd like to pay for your order.".to_string(),
            true,
        ),
        CheckoutStep::BankSelection => (
            "Select your bank".to_string(),
            "Choose your financial institution to continue.".to_string(),
            true,
        ),
        CheckoutStep::Login => (
            format!("Log in to {bank}"),
            "Enter your online banking credentials. Your information is encrypted and never stored."
                .to_string(),
            true,
        ),
        CheckoutStep::Mfa => (
            format!("Verify your identity at {bank}"),
            state
                .mfa_challenge
                .as_ref()
                .map(|challenge| challenge.prompt.clone())
                .unwrap_or_else(|| "Please enter the code sent to your device.".to_string()),
            true,
        ),
        CheckoutStep::AccountSelection => (
            format!("Select accounts from {bank}"),
            "Select the accounts you wish to connect.".to_string(),
            true,
        ),
        CheckoutStep::MicroDeposit => (
            format!("Verify Microdeposits for {bank}"),
            "We've sent two small deposits to your account. Please enter the exact amounts below to verify."
                .to_string(),
            true,
        ),
        CheckoutStep::Success => (
            "Success!".to_string(),
            format!("Your account from {bank} has been successfully connected and verified. You can now proceed with your payment."),
            false,
        ),
        CheckoutStep::ConnectionFailed => (
            "Connection Failed".to_string(),
            state
                .last_failure
                .clone()
                .unwrap_or_else(|| "We could not reach your bank. Please start over.".to_string()),
            false,
        ),
    };
    Screen {
        title,
        body,
        shows_back,
        progress_percent,
    }
}

pub fn link_screen(state: &LinkState) -> Screen {
    let institution = state.institution_name().unwrap_or("your institution");
    let (title, body, shows_back) = match state.step {
        LinkStep::InstitutionSearch => (
            "Connect Your Bank Account".to_string(),
            "Search for your financial institution to securely link your account.".to_string(),
            false,
        ),
        LinkStep::MethodSelection => (
            format!("Link with {institution}"),
            "Choose the most convenient way to connect your account.".to_string(),
            true,
        ),
        LinkStep::OAuth => (
            format!("Connecting with {institution}"),
            format!(
                "You will be securely redirected to {institution}'s website to authorize access."
            ),
            true,
        ),
        LinkStep::InstantLinking => (
            format!("Instant Link with {institution}"),
            "Enter your online banking credentials. Your information is encrypted and never stored."
                .to_string(),
            true,
        ),
        LinkStep::MicroDeposit => (
            format!("Verify Micro-Deposits for {institution}"),
            "We've sent two small deposits to your account. Please enter the exact amounts below to verify. This may take 1-2 business days to appear in your bank statement."
                .to_string(),
            true,
        ),
        LinkStep::Success => (
            "Account Linked!".to_string(),
            format!("Your account with {institution} has been successfully linked. You can now proceed with your application."),
            false,
        ),
        LinkStep::Error => (
            "Connection Failed".to_string(),
            state.failure_message.clone().unwrap_or_else(|| {
                "We encountered an issue while trying to link your account. Please check your details and try again."
                    .to_string()
            }),
            false,
        ),
    };
    Screen {
        title,
        body,
        shows_back,
        progress_percent: None,
    }
}

/// The simulated backend interaction behind each checkout step.
pub fn checkout_api_details(step: CheckoutStep) -> ApiStepDetails {
    match step {
        CheckoutStep::OrderSummary => ApiStepDetails::narrative(
            "The user reviews their order before proceeding to payment. No backend calls are made here; the application is preparing for the payment initiation flow.",
        ),
        CheckoutStep::PaymentMethod => ApiStepDetails::narrative(
            "The user selects their preferred payment method. Choosing bank payment starts the account-linking flow; no backend calls are made at this decision point.",
        ),
        CheckoutStep::BankSelection => ApiStepDetails {
            description: "The user selects their financial institution. The backend will already have created a link token for this session to initialize the linking widget.".to_string(),
            endpoint: Some("/link/token/create".to_string()),
            method: Some("POST".to_string()),
            sample_request: Some(json!(LinkTokenRequest::sample())),
            sample_response: Some(json!(LinkTokenResponse::sample())),
            webhook_example: None,
        },
        CheckoutStep::Login => ApiStepDetails {
            description: "The user authenticates with their institution inside the secure widget. On success a public token is returned, which the backend exchanges for an access token.".to_string(),
            endpoint: Some("/item/public_token/exchange".to_string()),
            method: Some("POST".to_string()),
            sample_request: Some(json!(ExchangeTokenRequest::sample())),
            sample_response: Some(json!(ExchangeTokenResponse::sample())),
            webhook_example: None,
        },
        CheckoutStep::Mfa => ApiStepDetails::narrative(
            "If the institution requires multi-factor authentication, the challenge is presented and completed inside the secure widget. Success leads to the public token being issued.",
        ),
        CheckoutStep::AccountSelection => ApiStepDetails {
            description: "With an access token in hand, the backend fetches the user's accounts and the user selects which to connect.".to_string(),
            endpoint: Some("/accounts/get".to_string()),
            method: Some("POST".to_string()),
            sample_request: Some(json!(AccountsRequest::sample())),
            sample_response: Some(json!(AccountsResponse::sample())),
            webhook_example: None,
        },
        CheckoutStep::MicroDeposit => ApiStepDetails {
            description: "When instant verification is not available, two small deposits are sent to the account. The user reports the amounts and the backend verifies them.".to_string(),
            endpoint: Some("/auth/verify".to_string()),
            method: Some("POST".to_string()),
            sample_request: Some(json!(MicroDepositVerifyRequest::sample())),
            sample_response: Some(json!(MicroDepositVerifyResponse::sample())),
            webhook_example: None,
        },
        CheckoutStep::Success => ApiStepDetails {
            description: "Connection and verification are complete. The backend initiates the payment; webhooks then report status transitions such as PAYMENT_STATUS_EXECUTED.".to_string(),
            endpoint: Some("/payment_initiation/payment/create".to_string()),
            method: Some("POST".to_string()),
            sample_request: Some(json!(PaymentCreateRequest::sample())),
            sample_response: Some(json!(PaymentCreateResponse::sample())),
            webhook_example: Some(json!(PaymentStatusWebhook::sample())),
        },
        CheckoutStep::ConnectionFailed => ApiStepDetails {
            description: "The connection to the institution failed. The backend reports a structured error payload; no linking state was created and the user can only start over.".to_string(),
            endpoint: None,
            method: None,
            sample_request: None,
            sample_response: Some(json!(ApiError::from(ApiException::new(
                ErrorCode::Internal,
                "The connection to the institution was lost."
            )))),
            webhook_example: None,
        },
    }
}

#[cfg(test)]
#[path = "tests/renderer_tests.rs"]
mod tests;
