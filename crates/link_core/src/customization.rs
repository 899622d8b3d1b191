//! Operator-facing customization of the linking widget, with live-preview
//! resolution. Held in memory only; saving just logs the configuration and
//! returns a transient confirmation.

use serde::{Deserialize, Serialize};
use shared::domain::AccountKind;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonShape {
    Rounded,
    Square,
    Pill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowType {
    Aggregator,
    PayByBank,
    Verification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    Instant,
    MicroDeposit,
}

/// Flat presentation configuration. Every field maps to exactly one visual
/// or behavioral effect in the preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customization {
    pub primary_color: String,
    pub secondary_color: String,
    pub button_text_color: String,
    pub font_family: String,
    pub logo_url: String,
    pub background_color: String,
    pub card_background_color: String,
    pub button_shape: ButtonShape,
    pub border_radius: String,
    pub shadows_enabled: bool,
    pub header_text: String,
    pub footer_text: String,
    pub welcome_message: String,
    pub institution_search_placeholder: String,
    pub mfa_prompt_text: String,
    pub account_selection_instruction: String,
    pub success_message: String,
    pub error_message: String,
    pub enable_mfa: bool,
    pub enable_account_selection: bool,
    pub flow_type: FlowType,
    pub allowed_account_types: Vec<AccountKind>,
    pub display_institution_logos: bool,
    pub hide_unsupported_institutions: bool,
    pub enable_transaction_history: bool,
    pub enable_statement_access: bool,
    pub default_language: String,
    pub verification_method: VerificationMethod,
    pub microdeposit_instructions: String,
    pub microdeposit_amount_placeholder: String,
}

impl Default for Customization {
    fn default() -> Self {
        Self {
            primary_color: "#4F46E5".to_string(),
            secondary_color: "#6366F1".to_string(),
            button_text_color: "#FFFFFF".to_string(),
            font_family: "Inter".to_string(),
            logo_url: "https://placehold.co/150x50/4F46E5/FFFFFF?text=Your+Logo".to_string(),
            background_color: "#F3F4F6".to_string(),
            card_background_color: "#FFFFFF".to_string(),
            button_shape: ButtonShape::Rounded,
            border_radius: "0.5rem".to_string(),
            shadows_enabled: true,
            header_text: "Connect Your Bank Account".to_string(),
            footer_text: "Powered by Finicity, a Mastercard Company".to_string(),
            welcome_message: "Connect your financial accounts securely.".to_string(),
            institution_search_placeholder: "Search for your bank or credit union...".to_string(),
            mfa_prompt_text: "Please enter the code sent to your device.".to_string(),
            account_selection_instruction: "Select the accounts you wish to connect.".to_string(),
            success_message: "Connection successful!".to_string(),
            error_message: "Failed to connect. Please try again.".to_string(),
            enable_mfa: true,
            enable_account_selection: true,
            flow_type: FlowType::Aggregator,
            allowed_account_types: vec![
                AccountKind::Checking,
                AccountKind::Savings,
                AccountKind::Credit,
            ],
            display_institution_logos: true,
            hide_unsupported_institutions: false,
            enable_transaction_history: true,
            enable_statement_access: false,
            default_language: "en-US".to_string(),
            verification_method: VerificationMethod::Instant,
            microdeposit_instructions: "Two small deposits will be sent to your account within 1-2 business days. Please return here to verify the amounts.".to_string(),
            microdeposit_amount_placeholder: "Enter the two microdeposit amounts (e.g., 0.12, 0.34)".to_string(),
        }
    }
}

/// Concrete preview effects derived from a [`Customization`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub button_corner_class: &'static str,
    pub card_shadow_class: &'static str,
    pub header_text: String,
    pub welcome_message: String,
    pub footer_text: String,
    pub shows_institution_search: bool,
    pub shows_institution_logos: bool,
    pub hides_unsupported_institutions: bool,
    pub shows_mfa_prompt: bool,
    pub shows_account_selection: bool,
    pub shows_micro_deposit_entry: bool,
    pub shows_verification_spinner: bool,
    pub primary_button_label: &'static str,
    pub visible_account_types: Vec<AccountKind>,
    pub grants_transaction_history: bool,
    pub grants_statement_access: bool,
}

impl Customization {
    pub fn resolve_preview(&self) -> Preview {
        let instant = self.verification_method == VerificationMethod::Instant;
        let searching = instant && self.flow_type != FlowType::Verification;
        Preview {
            button_corner_class: match self.button_shape {
                ButtonShape::Rounded => "rounded-md",
                ButtonShape::Square => "rounded-none",
                ButtonShape::Pill => "rounded-full",
            },
            card_shadow_class: if self.shadows_enabled {
                "shadow-xl"
            } else {
                "shadow-none"
            },
            header_text: self.header_text.clone(),
            welcome_message: self.welcome_message.clone(),
            footer_text: self.footer_text.clone(),
            shows_institution_search: searching,
            shows_institution_logos: searching && self.display_institution_logos,
            hides_unsupported_institutions: self.hide_unsupported_institutions,
            shows_mfa_prompt: searching && self.enable_mfa,
            shows_account_selection: searching && self.enable_account_selection,
            shows_micro_deposit_entry: !instant,
            shows_verification_spinner: instant && self.flow_type == FlowType::Verification,
            primary_button_label: if instant {
                "Connect Now"
            } else {
                "Continue Setup"
            },
            visible_account_types: self.allowed_account_types.clone(),
            grants_transaction_history: self.enable_transaction_history,
            grants_statement_access: self.enable_statement_access,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Logs the configuration and returns a transient confirmation. There is
    /// no backend to persist to.
    pub fn save(&self) -> String {
        info!(
            flow_type = ?self.flow_type,
            verification_method = ?self.verification_method,
            primary_color = %self.primary_color,
            "saving customization"
        );
        "Configuration saved successfully!".to_string()
    }
}
