//! Fixed in-memory institution directory and account listing for the sandbox.

use shared::domain::{
    Account, AccountId, AccountKind, Institution, InstitutionId, LinkCapabilities,
};

fn institution(
    id: i64,
    name: &str,
    logo_slug: &str,
    supports_oauth: bool,
    supports_instant: bool,
    supports_micro_deposit: bool,
) -> Institution {
    Institution {
        institution_id: InstitutionId(id),
        name: name.to_string(),
        logo_slug: logo_slug.to_string(),
        capabilities: LinkCapabilities {
            supports_oauth,
            supports_instant,
            supports_micro_deposit,
        },
    }
}

/// The eight sandbox institutions with their linking capability matrix.
pub fn institutions() -> Vec<Institution> {
    vec![
        institution(1, "Bank of America", "BA", true, true, false),
        institution(2, "Chase", "CH", true, true, false),
        institution(3, "Wells Fargo", "WF", false, true, true),
        institution(4, "Citibank", "CI", true, false, true),
        institution(5, "US Bank", "US", false, true, false),
        institution(6, "Capital One", "CO", true, true, false),
        institution(7, "PNC Bank", "PN", false, true, true),
        institution(8, "TD Bank", "TD", true, false, true),
    ]
}

/// Every linked institution exposes the same canned account listing.
pub fn accounts() -> Vec<Account> {
    vec![
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
        Account {
            account_id: AccountId(3),
            name: "Credit Card (1234)".to_string(),
            kind: AccountKind::Credit,
            balance_cents: -34_500,
        },
    ]
}
