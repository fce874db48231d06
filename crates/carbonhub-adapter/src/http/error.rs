/*
[INPUT]:  Error sources (wallet, HTTP, API envelopes, serialization, storage)
[OUTPUT]: Structured error types with classification helpers
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::auth::state::StateError;
use crate::types::AccountType;

/// Main error type for the CarbonHub adapter
#[derive(Error, Debug)]
pub enum CarbonHubError {
    /// Transport-level failure (DNS, TLS, connection reset, body read)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response without a usable envelope
    #[error("API error (code {code}): {message}")]
    Api { code: u16, message: String },

    /// Error envelope from a bearer endpoint
    #[error("Request rejected by service: {message}")]
    Rejected { message: String },

    /// No wallet, or the wallet cannot sign
    #[error("Wallet not connected")]
    WalletNotConnected,

    /// Wallet disconnected while a signature was pending
    #[error("Wallet disconnected before the signature was approved")]
    WalletDisconnected,

    #[error("Challenge request failed: {message}")]
    ChallengeRequestFailed { message: String },

    /// User declined in the wallet UI, or the wallet failed to sign
    #[error("Signature rejected: {reason}")]
    SignatureRejected { reason: String },

    #[error("Signature verification failed: {message}")]
    VerifyFailed { message: String },

    #[error("Account type mismatch: requested {requested}, service returned {returned}")]
    AccountTypeMismatch {
        requested: AccountType,
        returned: String,
    },

    #[error("A sign-in attempt is already in progress")]
    LoginInProgress,

    /// Bearer endpoint called without a stored session
    #[error("Not authenticated, sign in first")]
    NotAuthenticated,

    #[error("Amount {amount} is out of bounds (allowed: greater than 0, at most {max})")]
    OutOfBounds { amount: Decimal, max: Decimal },

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Invalid response from server
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Invalid login state: {0}")]
    State(#[from] StateError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CarbonHubError {
    /// Check if error belongs to the sign-in flow
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            CarbonHubError::WalletNotConnected
                | CarbonHubError::WalletDisconnected
                | CarbonHubError::ChallengeRequestFailed { .. }
                | CarbonHubError::SignatureRejected { .. }
                | CarbonHubError::VerifyFailed { .. }
                | CarbonHubError::AccountTypeMismatch { .. }
                | CarbonHubError::NotAuthenticated
        ) || matches!(self, CarbonHubError::Api { code: 401, .. })
    }

    /// The user has to act (connect a wallet, sign in) before retrying
    pub fn is_user_action_required(&self) -> bool {
        matches!(
            self,
            CarbonHubError::WalletNotConnected
                | CarbonHubError::WalletDisconnected
                | CarbonHubError::NotAuthenticated
        )
    }

    /// Failure talking to the service rather than a protocol-level refusal
    pub fn is_network_error(&self) -> bool {
        matches!(
            self,
            CarbonHubError::Network(_)
                | CarbonHubError::Api { .. }
                | CarbonHubError::InvalidResponse(_)
        )
    }

    /// Create an API error from status code and message
    pub fn api_error(status: StatusCode, message: impl Into<String>) -> Self {
        CarbonHubError::Api {
            code: status.as_u16(),
            message: message.into(),
        }
    }
}

/// Result type alias for CarbonHub operations
pub type Result<T> = std::result::Result<T, CarbonHubError>;
