/*
[INPUT]:  Message bytes to sign and wallet connection events
[OUTPUT]: Raw signature bytes for challenge verification
[POS]:    Auth layer - wallet integration abstraction
[UPDATE]: When adding new wallet types or changing signature format
*/

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::watch;

use crate::auth::connection::ConnectionTracker;
use crate::http::{CarbonHubError, Result};
use crate::types::ConnectionState;

/// Contract consumed from a wallet adapter (Phantom, local keypair, ...)
///
/// The trait is async because signing may wait on user approval in the
/// wallet UI for an unbounded amount of time.
#[async_trait]
pub trait WalletAdapter: Send + Sync {
    /// Chain-native address of the connected account, if any
    fn public_key(&self) -> Option<String>;

    /// Observe connect/disconnect events
    fn connection(&self) -> watch::Receiver<ConnectionState>;

    /// Whether the wallet exposes a message-signing capability
    fn can_sign(&self) -> bool {
        true
    }

    fn is_connected(&self) -> bool {
        self.connection().borrow().connected
    }

    /// Sign raw bytes. User rejection is `CarbonHubError::SignatureRejected`.
    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>>;
}

/// Scripted response for [`MockWallet::sign_message`]
#[derive(Debug, Clone)]
pub enum MockSignBehavior {
    Sign(Vec<u8>),
    Reject(String),
    /// Never resolves, as if the approval popup was left open
    Pending,
}

/// Mock wallet for testing
#[derive(Debug)]
pub struct MockWallet {
    public_key: String,
    tracker: ConnectionTracker,
    behavior: MockSignBehavior,
    sign_calls: AtomicUsize,
    last_message: Mutex<Option<Vec<u8>>>,
}

impl MockWallet {
    /// Connected wallet that signs every message with `signature`
    pub fn new(public_key: &str, signature: impl Into<Vec<u8>>) -> Self {
        Self::with_behavior(public_key, MockSignBehavior::Sign(signature.into()))
    }

    /// Connected wallet whose user declines every signature request
    pub fn rejecting(public_key: &str, reason: &str) -> Self {
        Self::with_behavior(public_key, MockSignBehavior::Reject(reason.to_string()))
    }

    /// Connected wallet whose approval never arrives
    pub fn pending(public_key: &str) -> Self {
        Self::with_behavior(public_key, MockSignBehavior::Pending)
    }

    /// Wallet that has not connected yet
    pub fn disconnected(public_key: &str) -> Self {
        let wallet = Self::new(public_key, Vec::new());
        wallet.tracker.set_disconnected();
        wallet
    }

    fn with_behavior(public_key: &str, behavior: MockSignBehavior) -> Self {
        Self {
            public_key: public_key.to_string(),
            tracker: ConnectionTracker::with_state(ConnectionState::connected(public_key)),
            behavior,
            sign_calls: AtomicUsize::new(0),
            last_message: Mutex::new(None),
        }
    }

    pub fn tracker(&self) -> &ConnectionTracker {
        &self.tracker
    }

    pub fn connect(&self) {
        self.tracker.set_connected(self.public_key.clone());
    }

    pub fn disconnect(&self) {
        self.tracker.set_disconnected();
    }

    pub fn sign_calls(&self) -> usize {
        self.sign_calls.load(Ordering::SeqCst)
    }

    pub fn last_message(&self) -> Option<Vec<u8>> {
        self.last_message
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl WalletAdapter for MockWallet {
    fn public_key(&self) -> Option<String> {
        self.tracker
            .current()
            .connected
            .then(|| self.public_key.clone())
    }

    fn connection(&self) -> watch::Receiver<ConnectionState> {
        self.tracker.subscribe()
    }

    async fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>> {
        self.sign_calls.fetch_add(1, Ordering::SeqCst);
        *self
            .last_message
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(message.to_vec());

        match &self.behavior {
            MockSignBehavior::Sign(signature) => Ok(signature.clone()),
            MockSignBehavior::Reject(reason) => Err(CarbonHubError::SignatureRejected {
                reason: reason.clone(),
            }),
            MockSignBehavior::Pending => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_wallet_signs_and_records() {
        let wallet = MockWallet::new("PK1", b"sig".to_vec());

        assert!(wallet.is_connected());
        assert_eq!(wallet.public_key().as_deref(), Some("PK1"));

        let signature = wallet.sign_message(b"abc123").await.unwrap();
        assert_eq!(signature, b"sig".to_vec());
        assert_eq!(wallet.sign_calls(), 1);
        assert_eq!(wallet.last_message(), Some(b"abc123".to_vec()));
    }

    #[tokio::test]
    async fn test_mock_wallet_rejects() {
        let wallet = MockWallet::rejecting("PK1", "User rejected the request.");
        let err = wallet.sign_message(b"abc123").await.unwrap_err();
        assert!(matches!(err, CarbonHubError::SignatureRejected { .. }));
    }

    #[test]
    fn test_disconnected_wallet_has_no_public_key() {
        let wallet = MockWallet::disconnected("PK1");
        assert!(!wallet.is_connected());
        assert!(wallet.public_key().is_none());

        wallet.connect();
        assert_eq!(wallet.public_key().as_deref(), Some("PK1"));
    }
}
