use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use link_core::{
    checkout_api_details, checkout_screen, link_screen, CheckoutSession, FlowEvent, LinkSession,
};
use sandbox::{BankGateway, DepositPolicy, InstantDelay, SandboxGateway, TokioDelay};
use shared::domain::{Institution, LinkingMethod, Order, PaymentMethod};
use tokio::sync::broadcast;
use tracing::info;

mod config;

use config::load_settings;

#[derive(Parser, Debug)]
struct Args {
    /// Flow to walk: "checkout" or "linking". Overrides demo.toml.
    #[arg(long)]
    flow: Option<String>,
    /// Institution to connect with. Overrides demo.toml.
    #[arg(long)]
    institution: Option<String>,
    /// Skip the artificial gateway delays.
    #[arg(long)]
    instant: bool,
}

fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}${}.{:02}", abs / 100, abs % 100)
}

fn spawn_event_logger(mut receiver: broadcast::Receiver<FlowEvent>) {
    tokio::spawn(async move {
        while let Ok(event) = receiver.recv().await {
            match event {
                FlowEvent::CheckoutStepChanged(step) => info!(?step, "checkout step"),
                FlowEvent::LinkStepChanged(step) => info!(?step, "linking step"),
                FlowEvent::ValidationFailed { message } => info!(%message, "validation failed"),
                FlowEvent::OperationDeclined { message } => info!(%message, "declined"),
                FlowEvent::ConnectionFailed { message } => info!(%message, "connection failed"),
                FlowEvent::Info { message } => info!(%message, "notice"),
                FlowEvent::FlowCompleted { message } => info!(%message, "flow completed"),
            }
        }
    });
}

fn find_institution(institutions: &[Institution], name: &str) -> Result<Institution> {
    institutions
        .iter()
        .find(|inst| inst.name.eq_ignore_ascii_case(name))
        .cloned()
        .with_context(|| format!("no institution named {name:?} in the sandbox directory"))
}

async fn print_checkout_screen(session: &CheckoutSession) {
    let state = session.snapshot().await;
    let screen = checkout_screen(&state);
    let details = checkout_api_details(state.step);
    println!();
    println!("== {} ==", screen.title);
    if let Some(percent) = screen.progress_percent {
        println!("   [{percent}% connected]");
    }
    println!("{}", screen.body);
    if let Some(endpoint) = details.endpoint {
        println!(
            "   simulated call: {} {}",
            details.method.as_deref().unwrap_or("POST"),
            endpoint
        );
    }
}

async fn run_checkout(
    gateway: Arc<dyn BankGateway>,
    institution_name: &str,
    username: &str,
    password: &str,
    mfa_code: &str,
) -> Result<()> {
    let session = CheckoutSession::new(gateway);
    spawn_event_logger(session.subscribe_events());

    let order = Order::demo();
    print_checkout_screen(&session).await;
    for line in &order.lines {
        let quantity = if line.quantity > 1 {
            format!(" (x{})", line.quantity)
        } else {
            String::new()
        };
        println!(
            "   {}{}  {}",
            line.name,
            quantity,
            format_cents(line.line_total_cents())
        );
    }
    println!("   Subtotal: {}", format_cents(order.subtotal_cents()));
    println!("   Tax (8%): {}", format_cents(order.tax_cents()));
    println!("   Total:    {}", format_cents(order.total_cents()));

    session.proceed_to_payment().await;
    print_checkout_screen(&session).await;

    session.choose_payment_method(PaymentMethod::Bank).await;
    print_checkout_screen(&session).await;

    let institutions = session.list_institutions().await?;
    let institution = find_institution(&institutions, institution_name)?;
    session.choose_institution(institution).await;
    print_checkout_screen(&session).await;

    session.submit_credentials(username, password).await?;
    print_checkout_screen(&session).await;

    session.submit_mfa_answer(mfa_code).await?;
    print_checkout_screen(&session).await;

    let accounts = session.load_accounts().await?;
    for account in &accounts {
        println!("   {} ({})", account.name, account.display_balance());
    }
    session.choose_accounts(accounts).await;
    print_checkout_screen(&session).await;

    session.verify_deposits("0.25", "0.50").await?;
    print_checkout_screen(&session).await;

    let payment = session.initiate_payment().await?;
    println!(
        "   payment {} created with status {:?}",
        payment.payment_id.0, payment.status
    );
    Ok(())
}

async fn print_link_screen(session: &LinkSession) {
    let state = session.snapshot().await;
    let screen = link_screen(&state);
    println!();
    println!("== {} ==", screen.title);
    println!("{}", screen.body);
}

async fn run_linking(gateway: Arc<dyn BankGateway>, institution_name: &str) -> Result<()> {
    let session = LinkSession::new(gateway);
    spawn_event_logger(session.subscribe_events());

    print_link_screen(&session).await;
    let institutions = session.load_institutions().await?;
    let institution = find_institution(&institutions, institution_name)?;
    let methods = institution.capabilities.available_methods();
    println!("   {} offers {:?}", institution.name, methods);

    session.choose_institution(institution).await;
    print_link_screen(&session).await;

    let method = *methods
        .first()
        .context("selected institution offers no linking methods")?;
    session.choose_method(method).await;
    print_link_screen(&session).await;

    match method {
        LinkingMethod::OAuth => session.run_oauth().await?,
        LinkingMethod::Instant => {
            session
                .submit_credentials(
                    sandbox::SANDBOX_USERNAME,
                    sandbox::SANDBOX_PASSWORD,
                )
                .await?
        }
        LinkingMethod::MicroDeposit => session.verify_deposits("0.10", "0.15").await?,
    }
    print_link_screen(&session).await;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(flow) = args.flow {
        settings.flow = flow;
    }
    if let Some(institution) = args.institution {
        settings.institution = institution;
    }
    if args.instant {
        settings.instant_delays = true;
    }

    let delay: Arc<dyn sandbox::Delay> = if settings.instant_delays {
        Arc::new(InstantDelay)
    } else {
        Arc::new(TokioDelay)
    };

    match settings.flow.as_str() {
        "checkout" => {
            let gateway = Arc::new(
                SandboxGateway::with_delay(delay).deposit_policy(DepositPolicy::AnyPositive),
            );
            run_checkout(
                gateway,
                &settings.institution,
                &settings.username,
                &settings.password,
                &settings.mfa_code,
            )
            .await
        }
        "linking" => {
            let gateway = Arc::new(SandboxGateway::with_delay(delay).challenge_mfa(false));
            run_linking(gateway, &settings.institution).await
        }
        other => bail!("unknown flow {other:?}; expected \"checkout\" or \"linking\""),
    }
}
