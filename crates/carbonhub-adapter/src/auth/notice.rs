/*
[INPUT]:  Errors reaching the UI boundary
[OUTPUT]: Single transient user-facing notification
[POS]:    Auth layer - error-to-notification normalization
[UPDATE]: When user-facing wording changes
*/

use std::fmt;

use crate::http::CarbonHubError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Transient notification shown to the user; never fatal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Normalize a sign-in failure
    pub fn sign_in_failed(err: &CarbonHubError) -> Self {
        match err {
            CarbonHubError::WalletNotConnected => {
                Self::warning("Please connect your wallet first.")
            }
            CarbonHubError::WalletDisconnected => {
                Self::warning("Wallet disconnected. Reconnect to sign in.")
            }
            CarbonHubError::LoginInProgress => {
                Self::info("Sign-in already in progress.")
            }
            CarbonHubError::SignatureRejected { .. } => {
                Self::warning("Sign-in failed: the signature request was rejected.")
            }
            CarbonHubError::AccountTypeMismatch { requested, .. } => Self::error(format!(
                "Sign-in failed: this wallet is not registered as a {requested} account."
            )),
            other => Self::error(format!("Sign-in failed: {other}")),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
