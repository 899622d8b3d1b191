use super::*;
use shared::domain::{
    Account, AccountId, AccountKind, Institution, InstitutionId, LinkCapabilities, PaymentMethod,
};
use shared::protocol::{MfaChallenge, MfaChallengeKind};

fn institution() -> Institution {
    Institution {
        institution_id: InstitutionId(2),
        name: "Chase".to_string(),
        logo_slug: "CH".to_string(),
        capabilities: LinkCapabilities {
            supports_oauth: true,
            supports_instant: true,
            supports_micro_deposit: false,
        },
    }
}

fn challenge() -> MfaChallenge {
    MfaChallenge {
        challenge_id: shared::domain::ChallengeId(7),
        event_stream_id: uuid::Uuid::nil(),
        kind: MfaChallengeKind::Choice,
        prompt: "Please enter the code sent to your device.".to_string(),
        choice_ids: vec!["mfa-choice-1".to_string()],
    }
}

fn account() -> Account {
    Account {
        account_id: AccountId(1),
        name: "Checking Account".to_string(),
        kind: AccountKind::Checking,
        balance_cents: 123_456,
    }
}

fn advance_to(step: CheckoutStep) -> CheckoutState {
    let mut state = CheckoutState::new();
    let script = [
        CheckoutAction::ProceedToPayment,
        CheckoutAction::ChoosePaymentMethod(PaymentMethod::Bank),
        CheckoutAction::ChooseInstitution(institution()),
        CheckoutAction::CredentialsAccepted(Some(challenge())),
        CheckoutAction::MfaPassed,
        CheckoutAction::ChooseAccounts(vec![account()]),
        CheckoutAction::DepositsVerified,
    ];
    for action in script {
        if state.step == step {
            return state;
        }
        state.advance(action);
    }
    assert_eq!(state.step, step);
    state
}

#[test]
fn happy_path_walks_every_screen_in_order() {
    let mut state = CheckoutState::new();
    assert_eq!(state.step, CheckoutStep::OrderSummary);

    state.advance(CheckoutAction::ProceedToPayment);
    assert_eq!(state.step, CheckoutStep::PaymentMethod);

    state.advance(CheckoutAction::ChoosePaymentMethod(PaymentMethod::Bank));
    assert_eq!(state.step, CheckoutStep::BankSelection);

    state.advance(CheckoutAction::ChooseInstitution(institution()));
    assert_eq!(state.step, CheckoutStep::Login);
    assert_eq!(state.bank_name(), Some("Chase"));

    state.advance(CheckoutAction::CredentialsAccepted(Some(challenge())));
    assert_eq!(state.step, CheckoutStep::Mfa);
    assert!(state.mfa_challenge.is_some());

    state.advance(CheckoutAction::MfaPassed);
    assert_eq!(state.step, CheckoutStep::AccountSelection);
    assert!(state.mfa_challenge.is_none());

    state.advance(CheckoutAction::ChooseAccounts(vec![account()]));
    assert_eq!(state.step, CheckoutStep::MicroDeposit);
    assert_eq!(state.accounts.len(), 1);

    state.advance(CheckoutAction::DepositsVerified);
    assert_eq!(state.step, CheckoutStep::Success);
}

#[test]
fn card_payment_leaves_the_decision_screen_active() {
    let mut state = advance_to(CheckoutStep::PaymentMethod);
    state.advance(CheckoutAction::ChoosePaymentMethod(PaymentMethod::Card));
    assert_eq!(state.step, CheckoutStep::PaymentMethod);
}

#[test]
fn login_without_challenge_skips_the_mfa_screen() {
    let mut state = advance_to(CheckoutStep::Login);
    state.advance(CheckoutAction::CredentialsAccepted(None));
    assert_eq!(state.step, CheckoutStep::AccountSelection);
    assert!(state.mfa_challenge.is_none());
}

#[test]
fn retreat_after_a_challenge_free_login_returns_to_login() {
    let mut state = advance_to(CheckoutStep::Login);
    state.advance(CheckoutAction::CredentialsAccepted(None));
    assert_eq!(state.step, CheckoutStep::AccountSelection);

    // The MFA screen was never shown, so going back must not land on it.
    state.retreat();
    assert_eq!(state.step, CheckoutStep::Login);

    // A challenge on the next login puts the MFA stop back on the path.
    state.advance(CheckoutAction::CredentialsAccepted(Some(challenge())));
    state.advance(CheckoutAction::MfaPassed);
    state.retreat();
    assert_eq!(state.step, CheckoutStep::Mfa);
}

#[test]
fn invalid_pairs_leave_the_state_unchanged() {
    let mut state = advance_to(CheckoutStep::Login);
    let before = state.clone();
    state.advance(CheckoutAction::ProceedToPayment);
    state.advance(CheckoutAction::MfaPassed);
    state.advance(CheckoutAction::DepositsVerified);
    assert_eq!(state, before);
}

#[test]
fn retreat_reverses_each_advance() {
    let pairs = [
        (CheckoutStep::BankSelection, CheckoutStep::PaymentMethod),
        (CheckoutStep::Login, CheckoutStep::BankSelection),
        (CheckoutStep::Mfa, CheckoutStep::Login),
        (CheckoutStep::AccountSelection, CheckoutStep::Mfa),
        (CheckoutStep::MicroDeposit, CheckoutStep::AccountSelection),
    ];
    for (from, expected) in pairs {
        let mut state = advance_to(from);
        state.retreat();
        assert_eq!(state.step, expected, "retreat from {from:?}");
    }
}

#[test]
fn payment_method_retreats_to_the_order_summary() {
    let mut state = advance_to(CheckoutStep::PaymentMethod);
    state.retreat();
    assert_eq!(state.step, CheckoutStep::OrderSummary);
}

#[test]
fn retreat_from_first_and_terminal_screens_is_a_no_op() {
    let mut state = CheckoutState::new();
    state.retreat();
    assert_eq!(state.step, CheckoutStep::OrderSummary);

    let mut success = advance_to(CheckoutStep::Success);
    success.retreat();
    assert_eq!(success.step, CheckoutStep::Success);
}

#[test]
fn gateway_failure_ends_any_in_flight_screen() {
    for step in [
        CheckoutStep::BankSelection,
        CheckoutStep::Login,
        CheckoutStep::Mfa,
        CheckoutStep::AccountSelection,
        CheckoutStep::MicroDeposit,
    ] {
        let mut state = advance_to(step);
        state.advance(CheckoutAction::GatewayFailed("timed out".to_string()));
        assert_eq!(state.step, CheckoutStep::ConnectionFailed);
        assert_eq!(state.last_failure.as_deref(), Some("timed out"));
    }

    // The failure action does not apply before the connection begins.
    let mut state = CheckoutState::new();
    state.advance(CheckoutAction::GatewayFailed("timed out".to_string()));
    assert_eq!(state.step, CheckoutStep::OrderSummary);
}

#[test]
fn reset_restores_initial_values_from_any_step() {
    let mut state = advance_to(CheckoutStep::MicroDeposit);
    state.reset();
    assert_eq!(state, CheckoutState::new());
}

#[test]
fn progress_only_shows_once_bank_connection_begins() {
    assert_eq!(
        advance_to(CheckoutStep::OrderSummary).progress_percent(),
        None
    );
    assert_eq!(
        advance_to(CheckoutStep::PaymentMethod).progress_percent(),
        None
    );
    assert_eq!(
        advance_to(CheckoutStep::BankSelection).progress_percent(),
        Some(0)
    );
    assert_eq!(advance_to(CheckoutStep::Mfa).progress_percent(), Some(40));
    assert_eq!(
        advance_to(CheckoutStep::Success).progress_percent(),
        Some(100)
    );
}
