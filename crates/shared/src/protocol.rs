//! Illustrative request/response payload shapes for the sandbox services.
//!
//! No wire protocol exists in this demo; these shapes document what a real
//! integration would exchange and feed the API-explainer panel. Each shape
//! carries a `sample()` with the canned values shown there.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Account, AccountId, AccountKind, ChallengeId, InstitutionId, PaymentId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MfaChallengeKind {
    Text,
    Choice,
}

/// Descriptor for a pending multi-factor challenge, shaped after the
/// aggregator SDK's challenge form payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MfaChallenge {
    pub challenge_id: ChallengeId,
    pub event_stream_id: Uuid,
    pub kind: MfaChallengeKind,
    pub prompt: String,
    pub choice_ids: Vec<String>,
}

/// Outcome payload shared by login, MFA, micro-deposit, and OAuth calls.
/// Business failures resolve successfully with `success: false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkResult {
    pub success: bool,
    pub message: String,
}

impl LinkResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkTokenRequest {
    pub client_user_id: String,
    pub client_name: String,
    pub products: Vec<String>,
    pub country_codes: Vec<String>,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkTokenResponse {
    pub link_token: String,
    pub expiration: DateTime<Utc>,
    pub request_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeTokenRequest {
    pub public_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeTokenResponse {
    pub access_token: String,
    pub item_id: String,
    pub request_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountsRequest {
    pub access_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountsResponse {
    pub accounts: Vec<Account>,
    pub institution_id: InstitutionId,
    pub request_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MicroDepositVerifyRequest {
    pub access_token: String,
    pub account_id: AccountId,
    pub amounts: [f64; 2],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MicroDepositVerifyResponse {
    pub account_id: AccountId,
    pub status: String,
    pub request_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentAmount {
    pub value_cents: i64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCreateRequest {
    pub recipient_id: String,
    pub amount: PaymentAmount,
    pub reference: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    PaymentStatusInputNeeded,
    PaymentStatusExecuted,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCreateResponse {
    pub payment_id: PaymentId,
    pub status: PaymentStatus,
    pub request_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentStatusWebhook {
    pub webhook_type: String,
    pub webhook_code: String,
    pub payment_id: PaymentId,
    pub new_payment_status: PaymentStatus,
    pub old_payment_status: PaymentStatus,
    pub timestamp: DateTime<Utc>,
}

impl LinkTokenRequest {
    pub fn sample() -> Self {
        Self {
            client_user_id: "user-unique-id-123".to_string(),
            client_name: "Demo Checkout".to_string(),
            products: vec![
                "auth".to_string(),
                "transactions".to_string(),
                "payment_initiation".to_string(),
            ],
            country_codes: vec!["US".to_string()],
            language: "en".to_string(),
            webhook: Some("https://demo.example/webhook".to_string()),
        }
    }
}

impl LinkTokenResponse {
    pub fn sample() -> Self {
        Self {
            link_token: "link-token-sandbox-abcdef1234567890".to_string(),
            expiration: sample_timestamp(),
            request_id: "req-id-xyz".to_string(),
        }
    }
}

impl ExchangeTokenRequest {
    pub fn sample() -> Self {
        Self {
            public_token: "public-token-sandbox-abcdef1234567890".to_string(),
        }
    }
}

impl ExchangeTokenResponse {
    pub fn sample() -> Self {
        Self {
            access_token: "access-token-sandbox-0987654321fedcba".to_string(),
            item_id: "item-id-1234567890abcdef".to_string(),
            request_id: "req-id-abc".to_string(),
        }
    }
}

impl AccountsRequest {
    pub fn sample() -> Self {
        Self {
            access_token: ExchangeTokenResponse::sample().access_token,
        }
    }
}

impl AccountsResponse {
    pub fn sample() -> Self {
        Self {
            accounts: vec![
                Account {
                    account_id: AccountId(1),
                    name: "Checking Account".to_string(),
                    kind: AccountKind::Checking,
                    balance_cents: 123_456,
                },
                Account {
                    account_id: AccountId(2),
                    name: "Savings Account".to_string(),
                    kind: AccountKind::Savings,
                    balance_cents: 567_890,
                },
            ],
            institution_id: InstitutionId(3),
            request_id: "req-id-def".to_string(),
        }
    }
}

impl MicroDepositVerifyRequest {
    pub fn sample() -> Self {
        Self {
            access_token: ExchangeTokenResponse::sample().access_token,
            account_id: AccountId(1),
            amounts: [0.12, 0.34],
        }
    }
}

impl MicroDepositVerifyResponse {
    pub fn sample() -> Self {
        Self {
            account_id: AccountId(1),
            status: "successfully_verified".to_string(),
            request_id: "req-id-jkl".to_string(),
        }
    }
}

impl PaymentCreateRequest {
    pub fn sample() -> Self {
        Self {
            recipient_id: "rec-id-abcdef1234567890".to_string(),
            amount: PaymentAmount {
                value_cents: 10_000,
                currency: "USD".to_string(),
            },
            reference: "Order #XYZ-789 Payment".to_string(),
        }
    }
}

impl PaymentCreateResponse {
    pub fn sample() -> Self {
        Self {
            payment_id: PaymentId(481_516),
            status: PaymentStatus::PaymentStatusInputNeeded,
            request_id: "req-id-ghi".to_string(),
        }
    }
}

impl PaymentStatusWebhook {
    pub fn sample() -> Self {
        Self {
            webhook_type: "PAYMENT_INITIATION".to_string(),
            webhook_code: "PAYMENT_STATUS_UPDATE".to_string(),
            payment_id: PaymentId(481_516),
            new_payment_status: PaymentStatus::PaymentStatusExecuted,
            old_payment_status: PaymentStatus::PaymentStatusInputNeeded,
            timestamp: sample_timestamp(),
        }
    }
}

fn sample_timestamp() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2025-08-05T12:00:00Z")
        .expect("static sample timestamp")
        .with_timezone(&Utc)
}
