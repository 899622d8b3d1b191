use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);
    };
}

id_newtype!(InstitutionId);
id_newtype!(AccountId);
id_newtype!(ChallengeId);
id_newtype!(PaymentId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    Checking,
    Savings,
    Credit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Bank,
    Card,
}

/// How an institution lets a user connect an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkingMethod {
    OAuth,
    Instant,
    MicroDeposit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkCapabilities {
    pub supports_oauth: bool,
    pub supports_instant: bool,
    pub supports_micro_deposit: bool,
}

impl LinkCapabilities {
    pub fn supports_any(&self) -> bool {
        self.supports_oauth || self.supports_instant || self.supports_micro_deposit
    }

    pub fn supports(&self, method: LinkingMethod) -> bool {
        match method {
            LinkingMethod::OAuth => self.supports_oauth,
            LinkingMethod::Instant => self.supports_instant,
            LinkingMethod::MicroDeposit => self.supports_micro_deposit,
        }
    }

    /// Methods in the order the selection screen offers them.
    pub fn available_methods(&self) -> Vec<LinkingMethod> {
        let mut methods = Vec::new();
        if self.supports_oauth {
            methods.push(LinkingMethod::OAuth);
        }
        if self.supports_instant {
            methods.push(LinkingMethod::Instant);
        }
        if self.supports_micro_deposit {
            methods.push(LinkingMethod::MicroDeposit);
        }
        methods
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Institution {
    pub institution_id: InstitutionId,
    pub name: String,
    pub logo_slug: String,
    pub capabilities: LinkCapabilities,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub account_id: AccountId,
    pub name: String,
    pub kind: AccountKind,
    /// Signed balance in cents; credit accounts carry a negative balance.
    pub balance_cents: i64,
}

impl Account {
    pub fn display_balance(&self) -> String {
        let cents = self.balance_cents;
        let sign = if cents < 0 { "-" } else { "" };
        let abs = cents.unsigned_abs();
        format!("{sign}${}.{:02}", abs / 100, abs % 100)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub name: String,
    pub unit_price_cents: i64,
    pub quantity: u32,
    pub is_service: bool,
}

impl OrderLine {
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * i64::from(self.quantity)
    }
}

/// Sales tax applied to the demo order, in basis points (8%).
pub const ORDER_TAX_BASIS_POINTS: i64 = 800;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// The fixed order reviewed on the checkout summary screen.
    pub fn demo() -> Self {
        Self {
            lines: vec![
                OrderLine {
                    name: "Product A".to_string(),
                    unit_price_cents: 2999,
                    quantity: 1,
                    is_service: false,
                },
                OrderLine {
                    name: "Product B".to_string(),
                    unit_price_cents: 1550,
                    quantity: 2,
                    is_service: false,
                },
                OrderLine {
                    name: "Shipping".to_string(),
                    unit_price_cents: 500,
                    quantity: 1,
                    is_service: true,
                },
            ],
        }
    }

    pub fn subtotal_cents(&self) -> i64 {
        self.lines.iter().map(OrderLine::line_total_cents).sum()
    }

    pub fn tax_cents(&self) -> i64 {
        self.subtotal_cents() * ORDER_TAX_BASIS_POINTS / 10_000
    }

    pub fn total_cents(&self) -> i64 {
        self.subtotal_cents() + self.tax_cents()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(name: &str, unit_price_cents: i64, quantity: u32) -> OrderLine {
        OrderLine {
            name: name.to_string(),
            unit_price_cents,
            quantity,
            is_service: false,
        }
    }

    #[test]
    fn order_totals_apply_eight_percent_tax() {
        let order = Order {
            lines: vec![line("Product A", 2999, 1), line("Product B", 1550, 2)],
        };
        assert_eq!(order.subtotal_cents(), 6099);
        assert_eq!(order.tax_cents(), 487);
        assert_eq!(order.total_cents(), 6586);
    }

    #[test]
    fn demo_order_totals_match_the_summary_screen() {
        let order = Order::demo();
        assert_eq!(order.subtotal_cents(), 6599);
        assert_eq!(order.tax_cents(), 527);
        assert_eq!(order.total_cents(), 7126);
        assert!(order.lines.iter().any(|line| line.is_service));
    }

    #[test]
    fn negative_balances_render_with_leading_sign() {
        let account = Account {
            account_id: AccountId(3),
            name: "Credit Card (1234)".to_string(),
            kind: AccountKind::Credit,
            balance_cents: -34_500,
        };
        assert_eq!(account.display_balance(), "-$345.00");
    }

    #[test]
    fn capabilities_list_methods_in_selection_order() {
        let caps = LinkCapabilities {
            supports_oauth: true,
            supports_instant: false,
            supports_micro_deposit: true,
        };
        assert_eq!(
            caps.available_methods(),
            vec![LinkingMethod::OAuth, LinkingMethod::MicroDeposit]
        );
        assert!(caps.supports_any());
        assert!(!caps.supports(LinkingMethod::Instant));
    }
}
