/*
[INPUT]:  App context and parsed command arguments
[OUTPUT]: Human-readable command results
[POS]:    Command layer - one function per CLI subcommand
[UPDATE]: When adding subcommands or changing their output
*/

use anyhow::{Context, Result, bail};
use carbonhub_adapter::format::{format_amount, format_balance, truncate_address};
use carbonhub_adapter::{
    AccountType, ConnectionState, GuardAction, GuardPolicy, OrderTicket, PriceTicker, RouteGuard,
    Side, SignInOutcome, SwapDirection, SwapPrice, WalletAdapter,
};
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::app::App;

pub fn keygen(app: &App) -> Result<String> {
    let wallet = app.create_wallet()?;
    Ok(format!(
        "Wallet address: {}\nKey file: {}",
        wallet.address(),
        app.key_path().display()
    ))
}

/// Challenge, sign and verify with the stored wallet key
pub async fn login(app: &App, account_type: AccountType) -> Result<String> {
    let wallet = app.require_wallet()?;
    match app.authenticator().sign_in(&wallet, account_type).await {
        SignInOutcome::Authenticated {
            session,
            redirect_to,
        } => Ok(format!(
            "Signed in as {} ({}). Continue at {}",
            truncate_address(&session.public_key),
            session.account_type,
            redirect_to
        )),
        SignInOutcome::Failed(notice) => bail!("{}", notice.message),
    }
}

pub fn logout(app: &App) -> Result<String> {
    app.authenticator().logout()?;
    Ok("Signed out.".to_string())
}

/// Wallet, session and protected-area access as the guard sees them
pub fn status(app: &App) -> Result<String> {
    let connection = app
        .wallet()?
        .map(|wallet| wallet.connection().borrow().clone())
        .unwrap_or_else(ConnectionState::default);

    let wallet_line = match &connection.public_key {
        Some(public_key) => format!("Wallet: {}", truncate_address(public_key)),
        None => "Wallet: not connected".to_string(),
    };
    let session_line = match app.sessions().current() {
        Some(session) => format!(
            "Session: {} ({})",
            truncate_address(&session.public_key),
            session.account_type
        ),
        None => "Session: none".to_string(),
    };

    let mut guard = RouteGuard::with_policy(GuardPolicy::RequireSession(app.sessions().clone()));
    let access_line = match guard.observe(&connection) {
        GuardAction::RenderChildren => "Dashboard: accessible".to_string(),
        GuardAction::Redirect(route) => format!("Dashboard: sign in required (redirect to {route})"),
        GuardAction::ShowWaiting => "Dashboard: connecting to wallet...".to_string(),
        GuardAction::ShowRedirecting => "Dashboard: authentication required".to_string(),
    };

    Ok([wallet_line, session_line, access_line].join("\n"))
}

pub async fn balance(app: &App) -> Result<String> {
    let balance = app.accounts().balance().await.context("fetch balance")?;
    Ok(format!(
        "SOL: {}\nCredits: {}",
        format_amount(balance.sol),
        format_amount(balance.credits)
    ))
}

pub fn describe_price(price: &SwapPrice) -> String {
    let ratio = price
        .ratio()
        .map(format_amount)
        .unwrap_or_else(|| "-".to_string());
    format!(
        "SOL: {} | Credit: {} | 1 SOL = {} credits",
        format_balance(Some(price.sol_usd)),
        format_balance(Some(price.credit_usd)),
        ratio
    )
}

pub async fn price(app: &App) -> Result<String> {
    let price = app.accounts().price().await.context("fetch price")?;
    Ok(describe_price(&price))
}

/// Print every refreshed price until `shutdown` fires
pub async fn watch_price(app: &App, shutdown: CancellationToken) -> Result<()> {
    let session = app.sessions().require()?;
    let ticker = PriceTicker::new(app.client().clone(), session, app.config().price_refresh());
    let mut subscription = ticker.spawn(shutdown.clone());

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            changed = subscription.receiver.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(price) = subscription.receiver.borrow_and_update().as_ref() {
                    println!("{}", describe_price(price));
                }
            }
        }
    }

    subscription
        .handle
        .await
        .context("price ticker task failed")?;
    info!("price watch stopped");
    Ok(())
}

pub async fn swap(app: &App, direction: SwapDirection, amount: Decimal) -> Result<String> {
    let wallet = app.require_wallet()?;
    let receipt = app.accounts().swap(&wallet, direction, amount).await?;
    let mut line = format!("Swap {} submitted", receipt.swap_id);
    if let Some(status) = &receipt.status {
        line.push_str(&format!(" ({status})"));
    }
    if let Some(signature) = &receipt.tx_signature {
        line.push_str(&format!("\nTransaction: {signature}"));
    }
    Ok(line)
}

pub async fn quota(app: &App) -> Result<String> {
    let quota = app.accounts().quota().await.context("fetch emission quota")?;
    Ok(format!(
        "Emission quota: {} total, {} used, {} remaining",
        format_amount(quota.total),
        format_amount(quota.used),
        format_amount(quota.remaining())
    ))
}

pub async fn withdraw(app: &App, amount: Decimal) -> Result<String> {
    let receipt = app.accounts().withdraw(amount).await?;
    let amount = receipt.amount.unwrap_or(amount);
    let mut line = format!("Withdrew {} credits", format_amount(amount));
    if let Some(signature) = &receipt.tx_signature {
        line.push_str(&format!("\nTransaction: {signature}"));
    }
    Ok(line)
}

/// Simulated order; nothing is sent to the service
pub fn order(side: Side, size: Decimal, limit_price: Option<Decimal>) -> Result<String> {
    let mut ticket = OrderTicket::new(side, size);
    if let Some(price) = limit_price {
        ticket = ticket.with_limit_price(price);
    }
    let receipt = ticket.place()?;
    info!(order_id = %receipt.id, "order recorded");
    Ok(receipt.summary())
}

#[cfg(test)]
mod tests {
    use super::*;

    use carbonhub_adapter::Session;
    use tempfile::TempDir;
    use tokio_test::{assert_err, assert_ok};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::config::AppConfig;

    fn app_for(dir: &TempDir, api_host: &str) -> App {
        App::new(AppConfig {
            api_host: api_host.to_string(),
            session_path: Some(dir.path().join("session.json")),
            key_path: Some(dir.path().join("wallet.key")),
            ..AppConfig::default()
        })
        .unwrap()
    }

    fn success(data: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "success",
            "message": "ok",
            "data": data,
        }))
    }

    #[tokio::test]
    async fn test_login_with_stored_key() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let app = app_for(&dir, &server.uri());
        let address = app.create_wallet().unwrap().address().to_string();

        Mock::given(method("POST"))
            .and(path("/auth/request-challenge"))
            .respond_with(success(serde_json::json!({ "challenge": "abc123" })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/verify-signature"))
            .respond_with(success(serde_json::json!({
                "publicKey": address,
                "token": "T1",
                "type": "company",
            })))
            .mount(&server)
            .await;

        let output = assert_ok!(login(&app, AccountType::Company).await);
        assert!(output.contains("(company)"));
        assert!(output.ends_with("/dashboard"));
        assert!(status(&app).unwrap().contains("Dashboard: accessible"));

        assert_ok!(logout(&app));
        assert!(status(&app).unwrap().contains("Session: none"));
    }

    #[tokio::test]
    async fn test_login_without_key_fails() {
        let dir = TempDir::new().unwrap();
        let app = app_for(&dir, "http://127.0.0.1:9");

        let err = assert_err!(login(&app, AccountType::User).await);
        assert!(err.to_string().contains("keygen"));
    }

    #[tokio::test]
    async fn test_login_mismatch_reports_notice() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let app = app_for(&dir, &server.uri());
        app.create_wallet().unwrap();

        Mock::given(method("POST"))
            .and(path("/auth/request-challenge"))
            .respond_with(success(serde_json::json!({ "challenge": "abc123" })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/verify-signature"))
            .respond_with(success(serde_json::json!({
                "publicKey": "PK1",
                "token": "T1",
                "type": "user",
            })))
            .mount(&server)
            .await;

        let err = assert_err!(login(&app, AccountType::Company).await);
        assert!(err.to_string().contains("company"));
        assert!(app.sessions().current().is_none());
    }

    #[test]
    fn test_status_without_wallet_redirects() {
        let dir = TempDir::new().unwrap();
        let app = app_for(&dir, "http://127.0.0.1:9");

        let output = assert_ok!(status(&app));
        assert!(output.contains("Wallet: not connected"));
        assert!(output.contains("redirect to /"));
    }

    #[tokio::test]
    async fn test_quota_output() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let app = app_for(&dir, &server.uri());
        app.sessions()
            .establish(Session::new("PK1", "T1", AccountType::Company))
            .unwrap();

        Mock::given(method("GET"))
            .and(path("/emission/quota"))
            .and(header("authorization", "Bearer T1"))
            .respond_with(success(serde_json::json!({ "total": "1500", "used": "250.5" })))
            .mount(&server)
            .await;

        let output = assert_ok!(quota(&app).await);
        assert_eq!(
            output,
            "Emission quota: 1,500 total, 250.5 used, 1,249.5 remaining"
        );
    }

    #[test]
    fn test_describe_price() {
        let price = SwapPrice {
            sol_usd: Decimal::from(150),
            credit_usd: Decimal::from(15),
            updated_at: None,
        };
        assert_eq!(
            describe_price(&price),
            "SOL: $150 | Credit: $15 | 1 SOL = 10 credits"
        );
    }

    #[test]
    fn test_order_summary_and_validation() {
        assert_eq!(
            order(Side::Buy, Decimal::from(5), Some(Decimal::new(125, 1))).unwrap(),
            "Order placed: BUY 5 credits (Price: $12.5)"
        );
        let err = assert_err!(order(Side::Sell, Decimal::ZERO, None));
        assert!(err.to_string().contains("Please enter a valid order size."));
    }
}
