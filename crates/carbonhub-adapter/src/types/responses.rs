/*
[INPUT]:  Raw `{status, message, data}` envelopes from the service
[OUTPUT]: Tagged outcomes and typed response payloads
[POS]:    Data layer - response boundary typing
[UPDATE]: When API schema changes or new types added
*/

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::enums::ApiStatus;

/// Uniform response envelope used by every endpoint.
///
/// `data` stays raw until `status` says success; error envelopes may carry
/// any payload shape.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope {
    pub status: ApiStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// Envelope after boundary checks; callers never look at `status` directly.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome<T> {
    Ok(T),
    Err { message: String },
}

impl ApiEnvelope {
    /// Decode `data` as `T` for success envelopes. Fails only when a success
    /// payload does not match `T`.
    pub fn into_outcome<T: DeserializeOwned>(self) -> Result<ApiOutcome<T>, serde_json::Error> {
        let message = self.message.filter(|m| !m.trim().is_empty());
        match (self.status, self.data) {
            (ApiStatus::Success, Some(data)) => serde_json::from_value(data).map(ApiOutcome::Ok),
            (ApiStatus::Success, None) => Ok(ApiOutcome::Err {
                message: message.unwrap_or_else(|| "response is missing data".to_string()),
            }),
            _ => Ok(ApiOutcome::Err {
                message: message.unwrap_or_else(|| "request failed".to_string()),
            }),
        }
    }
}

impl<T> ApiOutcome<T> {
    /// Convert into a `Result`, mapping the service message with `on_err`.
    pub fn into_result<E>(self, on_err: impl FnOnce(String) -> E) -> Result<T, E> {
        match self {
            ApiOutcome::Ok(data) => Ok(data),
            ApiOutcome::Err { message } => Err(on_err(message)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeData {
    pub challenge: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyData {
    pub public_key: String,
    pub token: String,
    /// Kept as a raw string so unexpected roles surface as a mismatch.
    #[serde(rename = "type")]
    pub account_type: String,
}
