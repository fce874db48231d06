/*
[INPUT]:  API host (CARBONHUB_API_HOST) and a local keypair wallet
[OUTPUT]: Signed-in session stored in a temporary session file
[POS]:    Examples - authentication flow demonstration
[UPDATE]: When auth flow changes
*/

use std::sync::Arc;

use carbonhub_adapter::format::truncate_address;
use carbonhub_adapter::*;

/// Example: challenge/response sign-in
///
/// 1. Create HTTP client
/// 2. Restore (or start) a session context backed by a file store
/// 3. Connect a keypair wallet
/// 4. Request challenge, sign it, verify, store the session
/// 5. Check the route guard against the connected wallet
#[tokio::main]
async fn main() {
    println!("=== CarbonHub Authentication Example ===\n");

    let api_host = std::env::var("CARBONHUB_API_HOST")
        .unwrap_or_else(|_| http::DEFAULT_API_HOST.to_string());
    let client = match CarbonHubClient::with_config(ClientConfig::with_api_host(&api_host)) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };
    println!("✓ HTTP client created for {}", client.base_url());

    let session_path = std::env::temp_dir().join("carbonhub-example-session.json");
    let sessions = SessionContext::init(Arc::new(FileSessionStore::new(&session_path)));
    println!("✓ Session context ready ({})", session_path.display());

    let wallet = KeypairWallet::generate();
    wallet.connect();
    println!("✓ Wallet connected: {}", truncate_address(wallet.address()));

    let auth = Authenticator::new(client, sessions.clone());
    match auth.sign_in(&wallet, AccountType::User).await {
        SignInOutcome::Authenticated {
            session,
            redirect_to,
        } => {
            println!(
                "✓ Signed in as {} ({})",
                truncate_address(&session.public_key),
                session.account_type
            );
            println!("  Redirect to: {}", redirect_to);
        }
        SignInOutcome::Failed(notice) => {
            println!("✗ {}", notice);
        }
    }

    let mut guard = RouteGuard::with_policy(GuardPolicy::RequireSession(sessions));
    let connection = wallet.connection().borrow().clone();
    let action = guard.observe(&connection);
    println!("\nGuard action for /dashboard: {:?}", action);

    if let Err(e) = auth.logout() {
        eprintln!("Failed to clear session: {}", e);
    }
    println!("\n=== Example Complete ===");
}
