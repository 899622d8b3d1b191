use std::sync::Arc;

use shared::domain::{InstitutionId, LinkingMethod};
use shared::protocol::{PaymentCreateRequest, PaymentStatus};

use crate::{
    BankGateway, DepositPolicy, InstantDelay, LoginOutcome, MissingBankGateway, SandboxGateway,
    DEPOSITS_MISMATCH_MESSAGE, INVALID_CREDENTIALS_MESSAGE, SANDBOX_PASSWORD, SANDBOX_USERNAME,
};

fn gateway() -> SandboxGateway {
    SandboxGateway::with_delay(Arc::new(InstantDelay))
}

#[tokio::test]
async fn lists_the_full_directory() {
    let gateway = gateway();
    let institutions = gateway.list_institutions().await.unwrap();
    assert_eq!(institutions.len(), 8);
    assert!(institutions
        .iter()
        .all(|inst| inst.capabilities.supports_any()));
}

#[tokio::test]
async fn search_is_case_insensitive_substring_match() {
    let gateway = gateway();
    let matches = gateway.search_institutions("bank").await.unwrap();
    let names: Vec<&str> = matches.iter().map(|inst| inst.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Bank of America", "Citibank", "US Bank", "PNC Bank", "TD Bank"]
    );

    let none = gateway.search_institutions("credit union").await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn wrong_credentials_are_rejected_not_errored() {
    let gateway = gateway();
    let outcome = gateway
        .login(InstitutionId(1), "user", "wrong")
        .await
        .unwrap();
    match outcome {
        LoginOutcome::Rejected(result) => {
            assert!(!result.success);
            assert_eq!(result.message, INVALID_CREDENTIALS_MESSAGE);
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn correct_credentials_issue_an_mfa_challenge() {
    let gateway = gateway();
    let outcome = gateway
        .login(InstitutionId(2), SANDBOX_USERNAME, SANDBOX_PASSWORD)
        .await
        .unwrap();
    let challenge = match outcome {
        LoginOutcome::MfaRequired(challenge) => challenge,
        other => panic!("expected mfa challenge, got {other:?}"),
    };
    assert!(!challenge.prompt.is_empty());

    let result = gateway
        .answer_mfa(challenge.challenge_id, "123456")
        .await
        .unwrap();
    assert!(result.success);

    // A challenge is consumed on first answer.
    let replay = gateway.answer_mfa(challenge.challenge_id, "123456").await;
    assert!(replay.is_err());
}

#[tokio::test]
async fn mfa_can_be_disabled_for_instant_linking() {
    let gateway = gateway().challenge_mfa(false);
    let outcome = gateway
        .login(InstitutionId(5), SANDBOX_USERNAME, SANDBOX_PASSWORD)
        .await
        .unwrap();
    match outcome {
        LoginOutcome::Linked(result) => assert!(result.success),
        other => panic!("expected immediate link, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_institution_is_an_error() {
    let gateway = gateway();
    assert!(gateway.list_accounts(InstitutionId(99)).await.is_err());
    assert!(gateway
        .login(InstitutionId(99), SANDBOX_USERNAME, SANDBOX_PASSWORD)
        .await
        .is_err());
    assert!(gateway.authorize_oauth(InstitutionId(99)).await.is_err());
}

#[tokio::test]
async fn exact_deposit_policy_requires_the_literal_pair() {
    let gateway = gateway();
    let ok = gateway
        .verify_micro_deposits(InstitutionId(3), 10, 15)
        .await
        .unwrap();
    assert!(ok.success);

    let wrong = gateway
        .verify_micro_deposits(InstitutionId(3), 11, 15)
        .await
        .unwrap();
    assert!(!wrong.success);
    assert_eq!(wrong.message, DEPOSITS_MISMATCH_MESSAGE);
}

#[tokio::test]
async fn any_positive_policy_accepts_arbitrary_positive_amounts() {
    let gateway = gateway().deposit_policy(DepositPolicy::AnyPositive);
    let ok = gateway
        .verify_micro_deposits(InstitutionId(7), 42, 7)
        .await
        .unwrap();
    assert!(ok.success);

    let zero = gateway
        .verify_micro_deposits(InstitutionId(7), 0, 7)
        .await
        .unwrap();
    assert!(!zero.success);
}

#[tokio::test]
async fn oauth_mentions_the_institution_by_name() {
    let gateway = gateway();
    let result = gateway.authorize_oauth(InstitutionId(4)).await.unwrap();
    assert!(result.success);
    assert!(result.message.contains("Citibank"));
}

#[tokio::test]
async fn oauth_requires_the_capability() {
    let gateway = gateway();
    // Wells Fargo links via instant or micro-deposit only.
    let err = gateway.authorize_oauth(InstitutionId(3)).await.unwrap_err();
    assert!(err.to_string().contains("Wells Fargo"));
}

#[tokio::test]
async fn blank_mfa_answer_is_an_error_and_keeps_the_challenge() {
    let gateway = gateway();
    let outcome = gateway
        .login(InstitutionId(2), SANDBOX_USERNAME, SANDBOX_PASSWORD)
        .await
        .unwrap();
    let challenge = match outcome {
        LoginOutcome::MfaRequired(challenge) => challenge,
        other => panic!("expected mfa challenge, got {other:?}"),
    };

    assert!(gateway
        .answer_mfa(challenge.challenge_id, "   ")
        .await
        .is_err());

    // The challenge is not consumed by the rejected answer.
    let result = gateway
        .answer_mfa(challenge.challenge_id, "123456")
        .await
        .unwrap();
    assert!(result.success);
}

#[tokio::test]
async fn payments_start_in_input_needed() {
    let gateway = gateway();
    let first = gateway
        .initiate_payment(PaymentCreateRequest::sample())
        .await
        .unwrap();
    let second = gateway
        .initiate_payment(PaymentCreateRequest::sample())
        .await
        .unwrap();
    assert_eq!(first.status, PaymentStatus::PaymentStatusInputNeeded);
    assert_ne!(first.payment_id, second.payment_id);
}

#[tokio::test]
async fn capability_matrix_drives_available_methods() {
    let gateway = gateway();
    let institutions = gateway.list_institutions().await.unwrap();
    let citibank = institutions
        .iter()
        .find(|inst| inst.name == "Citibank")
        .unwrap();
    assert_eq!(
        citibank.capabilities.available_methods(),
        vec![LinkingMethod::OAuth, LinkingMethod::MicroDeposit]
    );
    assert!(!citibank.capabilities.supports(LinkingMethod::Instant));
}

#[tokio::test]
async fn missing_gateway_refuses_everything() {
    let gateway = MissingBankGateway;
    assert!(gateway.list_institutions().await.is_err());
    assert!(gateway
        .login(InstitutionId(1), SANDBOX_USERNAME, SANDBOX_PASSWORD)
        .await
        .is_err());
    assert!(gateway
        .initiate_payment(PaymentCreateRequest::sample())
        .await
        .is_err());
}
