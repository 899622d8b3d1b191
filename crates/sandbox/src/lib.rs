//! Simulated institution backend: canned data behind artificial delays.
//!
//! Every operation resolves exactly once after its fixed delay. Business
//! failures (bad credentials, wrong deposit amounts) resolve with a failure
//! payload; unknown ids, blank MFA answers, and OAuth against an institution
//! that lacks it surface as typed errors.

use std::{
    sync::atomic::{AtomicI64, Ordering},
    sync::Arc,
    time::Duration,
};

use anyhow::Result;
use async_trait::async_trait;
use shared::{
    domain::{Account, ChallengeId, Institution, InstitutionId, PaymentId},
    error::ApiException,
    protocol::{
        LinkResult, MfaChallenge, MfaChallengeKind, PaymentCreateRequest, PaymentCreateResponse,
        PaymentStatus,
    },
};
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

pub mod directory;

pub const INSTITUTION_LIST_DELAY: Duration = Duration::from_millis(500);
pub const INSTITUTION_SEARCH_DELAY: Duration = Duration::from_millis(300);
pub const LOGIN_DELAY: Duration = Duration::from_millis(1500);
pub const MFA_DELAY: Duration = Duration::from_millis(1500);
pub const ACCOUNT_LIST_DELAY: Duration = Duration::from_millis(1500);
pub const MICRO_DEPOSIT_DELAY: Duration = Duration::from_millis(2000);
pub const OAUTH_DELAY: Duration = Duration::from_millis(3000);
pub const PAYMENT_DELAY: Duration = Duration::from_millis(1000);

/// The only credential pair the sandbox accepts.
pub const SANDBOX_USERNAME: &str = "user";
pub const SANDBOX_PASSWORD: &str = "pass";

pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid credentials. Please try again.";
pub const INSTANT_LINK_SUCCESS_MESSAGE: &str = "Account linked successfully via Instant Linking!";
pub const MFA_SUCCESS_MESSAGE: &str = "MFA passed, account linked!";
pub const DEPOSITS_VERIFIED_MESSAGE: &str = "Micro-deposits verified successfully!";
pub const DEPOSITS_MISMATCH_MESSAGE: &str =
    "Incorrect micro-deposit amounts. Please check your bank statement.";
pub const DEPOSITS_NOT_POSITIVE_MESSAGE: &str =
    "Please enter valid positive amounts for both deposits.";

/// Timing seam for the artificial delays, so tests run instantly.
#[async_trait]
pub trait Delay: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// No-op delay for deterministic tests.
pub struct InstantDelay;

#[async_trait]
impl Delay for InstantDelay {
    async fn sleep(&self, _duration: Duration) {}
}

/// The two upstream micro-deposit predicates, kept explicit instead of
/// silently picking one: the aggregator flow demands the exact literal pair,
/// the checkout flow accepts any positive amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepositPolicy {
    ExactAmounts {
        first_cents: i64,
        second_cents: i64,
    },
    AnyPositive,
}

impl DepositPolicy {
    /// The aggregator flow's literal pair: $0.10 and $0.15.
    pub fn exact_sandbox_amounts() -> Self {
        Self::ExactAmounts {
            first_cents: 10,
            second_cents: 15,
        }
    }

    pub fn verify(&self, first_cents: i64, second_cents: i64) -> LinkResult {
        match self {
            Self::ExactAmounts {
                first_cents: expected_first,
                second_cents: expected_second,
            } => {
                if first_cents == *expected_first && second_cents == *expected_second {
                    LinkResult::ok(DEPOSITS_VERIFIED_MESSAGE)
                } else {
                    LinkResult::failed(DEPOSITS_MISMATCH_MESSAGE)
                }
            }
            Self::AnyPositive => {
                if first_cents > 0 && second_cents > 0 {
                    LinkResult::ok(DEPOSITS_VERIFIED_MESSAGE)
                } else {
                    LinkResult::failed(DEPOSITS_NOT_POSITIVE_MESSAGE)
                }
            }
        }
    }
}

/// Result of a credential submission. A successful login either links the
/// account immediately or hands back a multi-factor challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Linked(LinkResult),
    MfaRequired(MfaChallenge),
    Rejected(LinkResult),
}

#[async_trait]
pub trait BankGateway: Send + Sync {
    async fn list_institutions(&self) -> Result<Vec<Institution>>;
    async fn search_institutions(&self, query: &str) -> Result<Vec<Institution>>;
    async fn login(
        &self,
        institution_id: InstitutionId,
        username: &str,
        password: &str,
    ) -> Result<LoginOutcome>;
    async fn answer_mfa(&self, challenge_id: ChallengeId, answer: &str) -> Result<LinkResult>;
    async fn list_accounts(&self, institution_id: InstitutionId) -> Result<Vec<Account>>;
    async fn verify_micro_deposits(
        &self,
        institution_id: InstitutionId,
        first_cents: i64,
        second_cents: i64,
    ) -> Result<LinkResult>;
    async fn authorize_oauth(&self, institution_id: InstitutionId) -> Result<LinkResult>;
    async fn initiate_payment(&self, request: PaymentCreateRequest)
        -> Result<PaymentCreateResponse>;
}

pub struct MissingBankGateway;

#[async_trait]
impl BankGateway for MissingBankGateway {
    async fn list_institutions(&self) -> Result<Vec<Institution>> {
        Err(anyhow::anyhow!("bank gateway is unavailable"))
    }

    async fn search_institutions(&self, _query: &str) -> Result<Vec<Institution>> {
        Err(anyhow::anyhow!("bank gateway is unavailable"))
    }

    async fn login(
        &self,
        institution_id: InstitutionId,
        _username: &str,
        _password: &str,
    ) -> Result<LoginOutcome> {
        Err(anyhow::anyhow!(
            "bank gateway is unavailable for institution {}",
            institution_id.0
        ))
    }

    async fn answer_mfa(&self, challenge_id: ChallengeId, _answer: &str) -> Result<LinkResult> {
        Err(anyhow::anyhow!(
            "bank gateway is unavailable for challenge {}",
            challenge_id.0
        ))
    }

    async fn list_accounts(&self, institution_id: InstitutionId) -> Result<Vec<Account>> {
        Err(anyhow::anyhow!(
            "bank gateway is unavailable for institution {}",
            institution_id.0
        ))
    }

    async fn verify_micro_deposits(
        &self,
        institution_id: InstitutionId,
        _first_cents: i64,
        _second_cents: i64,
    ) -> Result<LinkResult> {
        Err(anyhow::anyhow!(
            "bank gateway is unavailable for institution {}",
            institution_id.0
        ))
    }

    async fn authorize_oauth(&self, institution_id: InstitutionId) -> Result<LinkResult> {
        Err(anyhow::anyhow!(
            "bank gateway is unavailable for institution {}",
            institution_id.0
        ))
    }

    async fn initiate_payment(
        &self,
        _request: PaymentCreateRequest,
    ) -> Result<PaymentCreateResponse> {
        Err(anyhow::anyhow!("bank gateway is unavailable"))
    }
}

/// The sandbox gateway. Stateless apart from issued challenge ids; every
/// operation sleeps through the injected [`Delay`] before resolving.
pub struct SandboxGateway {
    delay: Arc<dyn Delay>,
    institutions: Vec<Institution>,
    deposit_policy: DepositPolicy,
    challenge_mfa: bool,
    next_id: AtomicI64,
    outstanding_challenges: Mutex<Vec<ChallengeId>>,
}

impl SandboxGateway {
    pub fn new() -> Self {
        Self::with_delay(Arc::new(TokioDelay))
    }

    pub fn with_delay(delay: Arc<dyn Delay>) -> Self {
        Self {
            delay,
            institutions: directory::institutions(),
            deposit_policy: DepositPolicy::exact_sandbox_amounts(),
            challenge_mfa: true,
            next_id: AtomicI64::new(1),
            outstanding_challenges: Mutex::new(Vec::new()),
        }
    }

    pub fn deposit_policy(mut self, policy: DepositPolicy) -> Self {
        self.deposit_policy = policy;
        self
    }

    /// When disabled, a correct login links immediately without an MFA step.
    pub fn challenge_mfa(mut self, challenge_mfa: bool) -> Self {
        self.challenge_mfa = challenge_mfa;
        self
    }

    fn find_institution(&self, institution_id: InstitutionId) -> Result<&Institution> {
        self.institutions
            .iter()
            .find(|inst| inst.institution_id == institution_id)
            .ok_or_else(|| {
                ApiException::not_found(format!("unknown institution {}", institution_id.0)).into()
            })
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for SandboxGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BankGateway for SandboxGateway {
    async fn list_institutions(&self) -> Result<Vec<Institution>> {
        self.delay.sleep(INSTITUTION_LIST_DELAY).await;
        Ok(self.institutions.clone())
    }

    async fn search_institutions(&self, query: &str) -> Result<Vec<Institution>> {
        self.delay.sleep(INSTITUTION_SEARCH_DELAY).await;
        let needle = query.to_lowercase();
        let matches: Vec<Institution> = self
            .institutions
            .iter()
            .filter(|inst| inst.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        info!(query, matches = matches.len(), "sandbox: institution search");
        Ok(matches)
    }

    async fn login(
        &self,
        institution_id: InstitutionId,
        username: &str,
        password: &str,
    ) -> Result<LoginOutcome> {
        let institution = self.find_institution(institution_id)?.clone();
        self.delay.sleep(LOGIN_DELAY).await;

        if username != SANDBOX_USERNAME || password != SANDBOX_PASSWORD {
            info!(
                institution_id = institution_id.0,
                "sandbox: login rejected"
            );
            return Ok(LoginOutcome::Rejected(LinkResult::failed(
                INVALID_CREDENTIALS_MESSAGE,
            )));
        }

        if self.challenge_mfa {
            let challenge_id = ChallengeId(self.allocate_id());
            self.outstanding_challenges.lock().await.push(challenge_id);
            info!(
                institution_id = institution_id.0,
                challenge_id = challenge_id.0,
                "sandbox: login accepted, issuing mfa challenge"
            );
            return Ok(LoginOutcome::MfaRequired(MfaChallenge {
                challenge_id,
                event_stream_id: Uuid::new_v4(),
                kind: MfaChallengeKind::Choice,
                prompt: "Please enter the code sent to your device.".to_string(),
                choice_ids: vec!["mfa-choice-1".to_string(), "mfa-choice-2".to_string()],
            }));
        }

        info!(
            institution = %institution.name,
            "sandbox: login accepted without mfa"
        );
        Ok(LoginOutcome::Linked(LinkResult::ok(
            INSTANT_LINK_SUCCESS_MESSAGE,
        )))
    }

    async fn answer_mfa(&self, challenge_id: ChallengeId, answer: &str) -> Result<LinkResult> {
        if answer.trim().is_empty() {
            return Err(ApiException::validation("mfa answer must not be empty").into());
        }
        {
            let mut outstanding = self.outstanding_challenges.lock().await;
            let index = outstanding
                .iter()
                .position(|id| *id == challenge_id)
                .ok_or_else(|| {
                    ApiException::not_found(format!("unknown mfa challenge {}", challenge_id.0))
                })?;
            outstanding.swap_remove(index);
        }
        self.delay.sleep(MFA_DELAY).await;

        // Any non-empty answer passes.
        info!(challenge_id = challenge_id.0, "sandbox: mfa accepted");
        Ok(LinkResult::ok(MFA_SUCCESS_MESSAGE))
    }

    async fn list_accounts(&self, institution_id: InstitutionId) -> Result<Vec<Account>> {
        self.find_institution(institution_id)?;
        self.delay.sleep(ACCOUNT_LIST_DELAY).await;
        Ok(directory::accounts())
    }

    async fn verify_micro_deposits(
        &self,
        institution_id: InstitutionId,
        first_cents: i64,
        second_cents: i64,
    ) -> Result<LinkResult> {
        self.find_institution(institution_id)?;
        self.delay.sleep(MICRO_DEPOSIT_DELAY).await;
        let result = self.deposit_policy.verify(first_cents, second_cents);
        info!(
            institution_id = institution_id.0,
            success = result.success,
            "sandbox: micro-deposit verification"
        );
        Ok(result)
    }

    async fn authorize_oauth(&self, institution_id: InstitutionId) -> Result<LinkResult> {
        let institution = self.find_institution(institution_id)?.clone();
        if !institution.capabilities.supports_oauth {
            return Err(ApiException::unsupported(format!(
                "{} does not support OAuth linking",
                institution.name
            ))
            .into());
        }
        self.delay.sleep(OAUTH_DELAY).await;
        info!(
            institution = %institution.name,
            "sandbox: oauth authorization granted"
        );
        Ok(LinkResult::ok(format!(
            "Redirecting to {} for OAuth... (simulated success)",
            institution.name
        )))
    }

    async fn initiate_payment(
        &self,
        request: PaymentCreateRequest,
    ) -> Result<PaymentCreateResponse> {
        self.delay.sleep(PAYMENT_DELAY).await;
        let payment_id = PaymentId(self.allocate_id());
        info!(
            payment_id = payment_id.0,
            reference = %request.reference,
            amount_cents = request.amount.value_cents,
            "sandbox: payment initiated"
        );
        Ok(PaymentCreateResponse {
            payment_id,
            status: PaymentStatus::PaymentStatusInputNeeded,
            request_id: format!("req-{}", Uuid::new_v4()),
        })
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
