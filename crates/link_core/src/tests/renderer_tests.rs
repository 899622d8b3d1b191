use super::*;
use crate::checkout::CheckoutAction;
use shared::domain::{Institution, InstitutionId, LinkCapabilities};
use shared::protocol::{MfaChallenge, MfaChallengeKind};

const CHECKOUT_STEPS: [CheckoutStep; 9] = [
    CheckoutStep::OrderSummary,
    CheckoutStep::PaymentMethod,
    CheckoutStep::BankSelection,
    CheckoutStep::Login,
    CheckoutStep::Mfa,
    CheckoutStep::AccountSelection,
    CheckoutStep::MicroDeposit,
    CheckoutStep::Success,
    CheckoutStep::ConnectionFailed,
];

const LINK_STEPS: [LinkStep; 7] = [
    LinkStep::InstitutionSearch,
    LinkStep::MethodSelection,
    LinkStep::OAuth,
    LinkStep::InstantLinking,
    LinkStep::MicroDeposit,
    LinkStep::Success,
    LinkStep::Error,
];

fn wells_fargo() -> Institution {
    Institution {
        institution_id: InstitutionId(3),
        name: "Wells Fargo".to_string(),
        logo_slug: "WF".to_string(),
        capabilities: LinkCapabilities {
            supports_oauth: false,
            supports_instant: true,
            supports_micro_deposit: true,
        },
    }
}

#[test]
fn every_checkout_step_renders_exactly_one_screen() {
    for step in CHECKOUT_STEPS {
        let state = CheckoutState {
            step,
            ..CheckoutState::new()
        };
        let screen = checkout_screen(&state);
        assert!(!screen.title.is_empty(), "title for {step:?}");
        assert!(!screen.body.is_empty(), "body for {step:?}");
    }
}

#[test]
fn every_link_step_renders_exactly_one_screen() {
    for step in LINK_STEPS {
        let state = LinkState {
            step,
            ..LinkState::new()
        };
        let screen = link_screen(&state);
        assert!(!screen.title.is_empty(), "title for {step:?}");
        assert!(!screen.body.is_empty(), "body for {step:?}");
        assert_eq!(screen.progress_percent, None);
    }
}

#[test]
fn bank_facing_titles_carry_the_selected_institution() {
    let mut state = CheckoutState::new();
    state.advance(CheckoutAction::ProceedToPayment);
    state.advance(CheckoutAction::ChoosePaymentMethod(
        shared::domain::PaymentMethod::Bank,
    ));
    state.advance(CheckoutAction::ChooseInstitution(wells_fargo()));
    let screen = checkout_screen(&state);
    assert_eq!(screen.title, "Log in to Wells Fargo");
    assert!(screen.shows_back);
    assert_eq!(screen.progress_percent, Some(20));
}

#[test]
fn mfa_screen_shows_the_challenge_prompt() {
    let state = CheckoutState {
        step: CheckoutStep::Mfa,
        mfa_challenge: Some(MfaChallenge {
            challenge_id: shared::domain::ChallengeId(1),
            event_stream_id: uuid::Uuid::nil(),
            kind: MfaChallengeKind::Text,
            prompt: "Enter the word on your card reader.".to_string(),
            choice_ids: Vec::new(),
        }),
        ..CheckoutState::new()
    };
    let screen = checkout_screen(&state);
    assert_eq!(screen.body, "Enter the word on your card reader.");
}

#[test]
fn terminal_screens_offer_no_back_control() {
    for step in [
        CheckoutStep::OrderSummary,
        CheckoutStep::Success,
        CheckoutStep::ConnectionFailed,
    ] {
        let state = CheckoutState {
            step,
            ..CheckoutState::new()
        };
        assert!(!checkout_screen(&state).shows_back, "{step:?}");
    }
}

#[test]
fn connection_failed_shows_the_recorded_failure() {
    let state = CheckoutState {
        step: CheckoutStep::ConnectionFailed,
        last_failure: Some("gateway unreachable".to_string()),
        ..CheckoutState::new()
    };
    let screen = checkout_screen(&state);
    assert_eq!(screen.body, "gateway unreachable");
}

#[test]
fn api_details_cover_every_step_and_reference_real_payloads() {
    for step in CHECKOUT_STEPS {
        let details = checkout_api_details(step);
        assert!(!details.description.is_empty(), "description for {step:?}");
        // An endpoint always comes with a method and sample payloads.
        if details.endpoint.is_some() {
            assert!(details.method.is_some(), "{step:?}");
            assert!(details.sample_request.is_some(), "{step:?}");
            assert!(details.sample_response.is_some(), "{step:?}");
        }
    }

    let success = checkout_api_details(CheckoutStep::Success);
    assert_eq!(
        success.endpoint.as_deref(),
        Some("/payment_initiation/payment/create")
    );
    let webhook = success.webhook_example.expect("webhook example");
    assert_eq!(webhook["new_payment_status"], "PAYMENT_STATUS_EXECUTED");
}

#[test]
fn connection_failed_details_show_an_error_payload() {
    let details = checkout_api_details(CheckoutStep::ConnectionFailed);
    assert!(details.endpoint.is_none());
    let payload = details.sample_response.expect("error payload");
    assert_eq!(payload["code"], "internal");
}

#[test]
fn link_token_details_back_the_bank_selection_step() {
    let details = checkout_api_details(CheckoutStep::BankSelection);
    assert_eq!(details.endpoint.as_deref(), Some("/link/token/create"));
    assert_eq!(details.method.as_deref(), Some("POST"));
    let request = details.sample_request.expect("sample request");
    assert_eq!(request["language"], "en");
}
