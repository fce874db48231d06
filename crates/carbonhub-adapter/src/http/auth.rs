/*
[INPUT]:  Wallet public key, account type, signed challenge
[OUTPUT]: Challenge strings and verified identities
[POS]:    HTTP layer - challenge/verify authentication endpoints (no auth required)
[UPDATE]: When auth endpoints or payload shapes change
*/

use reqwest::Method;
use tracing::debug;

use crate::http::{CarbonHubClient, CarbonHubError, Result};
use crate::types::{AccountType, Challenge, ChallengeData, ChallengeRequest, VerifyData, VerifyRequest};

impl CarbonHubClient {
    /// Request a one-time challenge for the wallet
    ///
    /// POST /auth/request-challenge
    pub async fn request_challenge(
        &self,
        public_key: &str,
        account_type: AccountType,
    ) -> Result<Challenge> {
        let body = ChallengeRequest {
            public_key: public_key.to_string(),
            account_type,
        };

        let builder = self
            .request(Method::POST, "/auth/request-challenge")?
            .json(&body);
        let data: ChallengeData = self
            .send_envelope(builder)
            .await?
            .into_result(|message| CarbonHubError::ChallengeRequestFailed { message })?;

        debug!(public_key, %account_type, "challenge issued");
        Ok(Challenge {
            message: data.challenge,
        })
    }

    /// Submit the signed challenge for verification
    ///
    /// POST /auth/verify-signature
    pub async fn verify_signature(
        &self,
        public_key: &str,
        challenge: &str,
        signature_base64: &str,
    ) -> Result<VerifyData> {
        let body = VerifyRequest {
            public_key: public_key.to_string(),
            challenge: challenge.to_string(),
            signature: signature_base64.to_string(),
        };

        let builder = self
            .request(Method::POST, "/auth/verify-signature")?
            .json(&body);
        self.send_envelope(builder)
            .await?
            .into_result(|message| CarbonHubError::VerifyFailed { message })
    }
}
