//! Flow engine for the account-linking and pay-by-bank checkout demo:
//! explicit step sequencers, a pure screen renderer, operator customization,
//! and async sessions that drive the sequencers against a bank gateway.

pub mod checkout;
pub mod customization;
pub mod linking;
pub mod renderer;
pub mod session;

pub use checkout::{CheckoutAction, CheckoutState, CheckoutStep};
pub use customization::{ButtonShape, Customization, FlowType, Preview, VerificationMethod};
pub use linking::{LinkAction, LinkState, LinkStep};
pub use renderer::{checkout_api_details, checkout_screen, link_screen, ApiStepDetails, Screen};
pub use session::{CheckoutSession, FlowEvent, LinkSession};
