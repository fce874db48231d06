/*
[INPUT]:  Wallet adapter, HTTP client and session context
[OUTPUT]: Stored session after challenge/sign/verify, or a user notice
[POS]:    Auth layer - orchestrates complete authentication flow
[UPDATE]: When auth endpoints or flow steps change
*/

use std::sync::{Mutex, MutexGuard, PoisonError};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::{info, warn};

use crate::auth::connection::wait_for_disconnect;
use crate::auth::notice::Notice;
use crate::auth::session::SessionContext;
use crate::auth::state::{LoginEvent, LoginPhase, LoginStateMachine};
use crate::auth::wallet::WalletAdapter;
use crate::http::{CarbonHubClient, CarbonHubError, Result};
use crate::types::{AccountType, Challenge, Session};

/// Route the caller navigates to after a successful sign-in
pub const PROTECTED_ROUTE: &str = "/dashboard";

/// Result of a sign-in attempt as seen by the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    Authenticated { session: Session, redirect_to: String },
    Failed(Notice),
}

/// Runs the challenge/verify sign-in flow
#[derive(Debug)]
pub struct Authenticator {
    client: CarbonHubClient,
    sessions: SessionContext,
    machine: Mutex<LoginStateMachine>,
}

impl Authenticator {
    pub fn new(client: CarbonHubClient, sessions: SessionContext) -> Self {
        Self {
            client,
            sessions,
            machine: Mutex::new(LoginStateMachine::new()),
        }
    }

    pub fn sessions(&self) -> &SessionContext {
        &self.sessions
    }

    pub fn client(&self) -> &CarbonHubClient {
        &self.client
    }

    pub fn phase(&self) -> LoginPhase {
        self.machine().phase()
    }

    pub fn last_error(&self) -> Option<String> {
        self.machine().last_error().map(str::to_string)
    }

    /// Whether the sign-in control should be enabled
    pub fn can_start(&self) -> bool {
        self.phase().accepts_new_attempt()
    }

    fn machine(&self) -> MutexGuard<'_, LoginStateMachine> {
        self.machine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn advance(&self, event: LoginEvent) -> Result<LoginPhase> {
        let phase = self.machine().transition(event)?;
        info!(%phase, "login phase changed");
        Ok(phase)
    }

    /// UI boundary: never fails, every error becomes one notice
    pub async fn sign_in(
        &self,
        wallet: &dyn WalletAdapter,
        account_type: AccountType,
    ) -> SignInOutcome {
        match self.login(wallet, account_type).await {
            Ok(session) => SignInOutcome::Authenticated {
                session,
                redirect_to: PROTECTED_ROUTE.to_string(),
            },
            Err(err) => {
                warn!(error = %err, %account_type, "sign-in failed");
                SignInOutcome::Failed(Notice::sign_in_failed(&err))
            }
        }
    }

    /// Complete authentication flow
    ///
    /// 1. Request challenge for (public key, account type)
    /// 2. Sign the challenge bytes with the wallet
    /// 3. Verify the signature
    /// 4. Check the returned account type
    /// 5. Store the session
    pub async fn login(
        &self,
        wallet: &dyn WalletAdapter,
        account_type: AccountType,
    ) -> Result<Session> {
        let public_key = match wallet.public_key() {
            Some(public_key) if wallet.is_connected() && wallet.can_sign() => public_key,
            _ => return Err(CarbonHubError::WalletNotConnected),
        };

        {
            let mut machine = self.machine();
            if !machine.can_transition(&LoginEvent::Start) {
                return Err(CarbonHubError::LoginInProgress);
            }
            machine.transition(LoginEvent::Start)?;
        }
        info!(public_key = %public_key, %account_type, "sign-in started");

        match self.run_flow(wallet, &public_key, account_type).await {
            Ok(session) => Ok(session),
            Err(err) => {
                self.settle_failure(&err);
                Err(err)
            }
        }
    }

    async fn run_flow(
        &self,
        wallet: &dyn WalletAdapter,
        public_key: &str,
        account_type: AccountType,
    ) -> Result<Session> {
        // Step 1: Request challenge
        let challenge = self.client.request_challenge(public_key, account_type).await?;
        self.advance(LoginEvent::ChallengeIssued)?;

        // Step 2: Sign, unless the wallet goes away first
        let signature = self.await_signature(wallet, &challenge).await?;
        self.advance(LoginEvent::Signed)?;

        // Step 3: Verify
        let verified = self
            .client
            .verify_signature(public_key, &challenge.message, &STANDARD.encode(&signature))
            .await?;

        // Step 4: Returned role must match the requested one
        if verified.account_type != account_type.as_str() {
            if let Err(err) = self.sessions.clear() {
                warn!(error = %err, "failed to clear session after account type mismatch");
            }
            return Err(CarbonHubError::AccountTypeMismatch {
                requested: account_type,
                returned: verified.account_type,
            });
        }
        if verified.public_key != public_key {
            warn!(
                requested = public_key,
                returned = %verified.public_key,
                "verify response names a different public key"
            );
        }

        // Step 5: Store session
        let session = Session::new(verified.public_key, verified.token, account_type);
        self.sessions.establish(session.clone())?;
        self.advance(LoginEvent::Verified)?;

        info!(public_key = %session.public_key, %account_type, "sign-in complete");
        Ok(session)
    }

    async fn await_signature(
        &self,
        wallet: &dyn WalletAdapter,
        challenge: &Challenge,
    ) -> Result<Vec<u8>> {
        let mut connection = wallet.connection();

        tokio::select! {
            signed = wallet.sign_message(challenge.message.as_bytes()) => signed.map_err(|err| match err {
                CarbonHubError::SignatureRejected { .. }
                | CarbonHubError::WalletNotConnected
                | CarbonHubError::WalletDisconnected => err,
                other => CarbonHubError::SignatureRejected { reason: other.to_string() },
            }),
            _ = wait_for_disconnect(&mut connection) => Err(CarbonHubError::WalletDisconnected),
        }
    }

    /// Failed attempts always end in Idle; a disconnect mid-signature aborts
    fn settle_failure(&self, err: &CarbonHubError) {
        let mut machine = self.machine();
        let aborted = matches!(err, CarbonHubError::WalletDisconnected)
            && machine.phase() == LoginPhase::AwaitingSignature;

        let settled = if aborted {
            machine.transition(LoginEvent::Abort)
        } else {
            machine
                .transition(LoginEvent::Fail(err.to_string()))
                .and_then(|_| machine.transition(LoginEvent::Reset))
        };

        if let Err(state_err) = settled {
            warn!(error = %state_err, "could not settle login state, forcing idle");
            *machine = LoginStateMachine::new();
        }
    }

    /// Explicit disconnect: forget the session and return to Idle
    pub fn logout(&self) -> Result<()> {
        self.sessions.clear()?;
        let mut machine = self.machine();
        if machine.phase() == LoginPhase::Authenticated {
            machine.transition(LoginEvent::Reset)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::time::Duration;

    use crate::auth::session::{MemorySessionStore, SessionStore};
    use crate::auth::wallet::MockWallet;
    use crate::http::ClientConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn authenticator(server: &MockServer) -> (Authenticator, Arc<MemorySessionStore>) {
        let client =
            CarbonHubClient::with_config(ClientConfig::with_api_host(server.uri())).unwrap();
        let store = Arc::new(MemorySessionStore::new());
        let sessions = SessionContext::new(store.clone());
        (Authenticator::new(client, sessions), store)
    }

    async fn mount_challenge(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/auth/request-challenge"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "message": "",
                "data": { "challenge": "abc123" },
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_wallet_not_connected_makes_no_request() {
        let server = MockServer::start().await;
        let (auth, store) = authenticator(&server);
        let wallet = MockWallet::disconnected("PK1");

        let err = auth.login(&wallet, AccountType::User).await.unwrap_err();
        assert!(matches!(err, CarbonHubError::WalletNotConnected));
        assert_eq!(auth.phase(), LoginPhase::Idle);
        assert!(store.load().is_none());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_while_awaiting_signature_aborts_to_idle() {
        let server = MockServer::start().await;
        mount_challenge(&server).await;
        Mock::given(method("POST"))
            .and(path("/auth/verify-signature"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let (auth, store) = authenticator(&server);
        let auth = Arc::new(auth);
        let wallet = Arc::new(MockWallet::pending("PK1"));

        let task = {
            let auth = auth.clone();
            let wallet = wallet.clone();
            tokio::spawn(async move { auth.login(wallet.as_ref(), AccountType::User).await })
        };

        for _ in 0..100 {
            if auth.phase() == LoginPhase::AwaitingSignature {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(auth.phase(), LoginPhase::AwaitingSignature);
        assert!(!auth.can_start());

        wallet.disconnect();
        let result = tokio::time::timeout(Duration::from_secs(2), task)
            .await
            .expect("login should abort")
            .unwrap();

        assert!(matches!(result, Err(CarbonHubError::WalletDisconnected)));
        assert_eq!(auth.phase(), LoginPhase::Idle);
        assert!(auth.last_error().is_none());
        assert!(store.load().is_none());
    }

    #[tokio::test]
    async fn test_challenge_failure_is_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/request-challenge"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let (auth, _store) = authenticator(&server);
        let wallet = MockWallet::new("PK1", b"sig".to_vec());

        let outcome = auth.sign_in(&wallet, AccountType::User).await;
        match outcome {
            SignInOutcome::Failed(notice) => assert!(notice.message.starts_with("Sign-in failed")),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(auth.phase(), LoginPhase::Idle);
        assert!(auth.can_start());
        assert!(auth.last_error().is_some());
        assert_eq!(wallet.sign_calls(), 0);
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let store = Arc::new(MemorySessionStore::new());
        store
            .save(&Session::new("PK1", "T1", AccountType::User))
            .unwrap();
        let sessions = SessionContext::init(store.clone());
        let auth = Authenticator::new(CarbonHubClient::new().unwrap(), sessions);

        auth.logout().unwrap();
        assert!(store.load().is_none());
        assert!(!auth.sessions().is_authenticated());
    }
}
