/*
[INPUT]:  ConnectionState observations (and optionally the session context)
[OUTPUT]: Render decisions and redirect actions for protected areas
[POS]:    Auth layer - route guard state machine
[UPDATE]: When guarding policy or redirect targets change
*/

use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::auth::session::SessionContext;
use crate::types::ConnectionState;

/// Public entry point unauthenticated users are sent to
pub const PUBLIC_ENTRY_ROUTE: &str = "/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Connecting,
    Authorized,
    Unauthorized,
}

/// What the protected area should do after an observation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardAction {
    /// "Connecting to wallet..." indicator
    ShowWaiting,
    RenderChildren,
    /// Navigate away; emitted once per transition into `Unauthorized`
    Redirect(String),
    /// "Authentication required" while the redirect is in progress
    ShowRedirecting,
}

/// How much the guard requires before rendering protected content
#[derive(Debug, Clone, Default)]
pub enum GuardPolicy {
    /// Wallet connectivity only
    #[default]
    WalletOnly,
    /// Connected wallet plus a stored session issued to that wallet
    RequireSession(SessionContext),
}

/// Client-side navigation performed by the guard
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Navigator that records routes, for tests and headless runs
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn routes(&self) -> Vec<String> {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route.to_string());
    }
}

/// Gate for protected subtrees, separated from rendering
#[derive(Debug)]
pub struct RouteGuard {
    state: GuardState,
    policy: GuardPolicy,
    redirect_to: String,
}

impl RouteGuard {
    pub fn new() -> Self {
        Self::with_policy(GuardPolicy::WalletOnly)
    }

    pub fn with_policy(policy: GuardPolicy) -> Self {
        Self {
            state: GuardState::Connecting,
            policy,
            redirect_to: PUBLIC_ENTRY_ROUTE.to_string(),
        }
    }

    pub fn redirect_to(mut self, route: impl Into<String>) -> Self {
        self.redirect_to = route.into();
        self
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    fn evaluate(&self, connection: &ConnectionState) -> GuardState {
        if connection.connecting {
            return GuardState::Connecting;
        }
        if !connection.connected {
            return GuardState::Unauthorized;
        }

        match &self.policy {
            GuardPolicy::WalletOnly => GuardState::Authorized,
            GuardPolicy::RequireSession(sessions) => match connection.public_key.as_deref() {
                Some(public_key) if sessions.matches_wallet(public_key) => GuardState::Authorized,
                _ => GuardState::Unauthorized,
            },
        }
    }

    /// Feed one connection observation through the machine
    pub fn observe(&mut self, connection: &ConnectionState) -> GuardAction {
        let next = self.evaluate(connection);
        let previous = std::mem::replace(&mut self.state, next);

        match next {
            GuardState::Connecting => GuardAction::ShowWaiting,
            GuardState::Authorized => {
                if previous != GuardState::Authorized {
                    debug!("guard authorized");
                }
                GuardAction::RenderChildren
            }
            GuardState::Unauthorized if previous != GuardState::Unauthorized => {
                info!(route = %self.redirect_to, "not authenticated, redirecting");
                GuardAction::Redirect(self.redirect_to.clone())
            }
            GuardState::Unauthorized => GuardAction::ShowRedirecting,
        }
    }

    /// Drive the guard from connection updates until `shutdown` fires.
    ///
    /// Redirects go to `navigator`; every action is passed to `on_action`.
    pub async fn run(
        mut self,
        mut connection: watch::Receiver<ConnectionState>,
        navigator: &dyn Navigator,
        shutdown: CancellationToken,
        mut on_action: impl FnMut(&GuardAction) + Send,
    ) -> GuardState {
        loop {
            let observed = connection.borrow_and_update().clone();
            let action = self.observe(&observed);
            if let GuardAction::Redirect(route) = &action {
                navigator.navigate(route);
            }
            on_action(&action);

            tokio::select! {
                _ = shutdown.cancelled() => break,
                changed = connection.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        self.state
    }
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use crate::auth::session::MemorySessionStore;
    use crate::types::{AccountType, Session};

    #[test]
    fn test_guard_waits_while_connecting() {
        let mut guard = RouteGuard::new();
        assert_eq!(guard.state(), GuardState::Connecting);
        assert_eq!(
            guard.observe(&ConnectionState::connecting()),
            GuardAction::ShowWaiting
        );
    }

    #[test]
    fn test_guard_renders_children_when_connected() {
        let mut guard = RouteGuard::new();
        guard.observe(&ConnectionState::connecting());
        assert_eq!(
            guard.observe(&ConnectionState::connected("PK1")),
            GuardAction::RenderChildren
        );
        assert_eq!(guard.state(), GuardState::Authorized);
    }

    #[test]
    fn test_guard_redirects_exactly_once_per_settle() {
        let mut guard = RouteGuard::new();
        let disconnected = ConnectionState::default();

        assert_eq!(
            guard.observe(&disconnected),
            GuardAction::Redirect("/".to_string())
        );
        assert_eq!(guard.observe(&disconnected), GuardAction::ShowRedirecting);
        assert_eq!(guard.observe(&disconnected), GuardAction::ShowRedirecting);

        guard.observe(&ConnectionState::connected("PK1"));
        assert_eq!(
            guard.observe(&disconnected),
            GuardAction::Redirect("/".to_string())
        );
    }

    #[test]
    fn test_wallet_only_policy_ignores_missing_session() {
        let mut guard = RouteGuard::with_policy(GuardPolicy::WalletOnly);
        assert_eq!(
            guard.observe(&ConnectionState::connected("never-verified")),
            GuardAction::RenderChildren
        );
    }

    #[test]
    fn test_require_session_policy() {
        let store = Arc::new(MemorySessionStore::new());
        let sessions = SessionContext::new(store);
        let mut guard = RouteGuard::with_policy(GuardPolicy::RequireSession(sessions.clone()))
            .redirect_to("/auth/signin");

        assert_eq!(
            guard.observe(&ConnectionState::connected("PK1")),
            GuardAction::Redirect("/auth/signin".to_string())
        );

        sessions
            .establish(Session::new("PK1", "T1", AccountType::User))
            .unwrap();
        assert_eq!(
            guard.observe(&ConnectionState::connected("PK1")),
            GuardAction::RenderChildren
        );
        assert_eq!(
            guard.observe(&ConnectionState::connected("PK2")),
            GuardAction::Redirect("/auth/signin".to_string())
        );
    }
}
