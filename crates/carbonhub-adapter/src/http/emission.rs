/*
[INPUT]:  Session bearer token and withdraw amount
[OUTPUT]: Emission quota and withdraw receipts
[POS]:    HTTP layer - emission endpoints (require bearer auth)
[UPDATE]: When adding new emission endpoints or changing payloads
*/

use reqwest::Method;

use crate::http::swap::api_failure;
use crate::http::{CarbonHubClient, Result};
use crate::types::{EmissionQuota, Session, WithdrawReceipt, WithdrawRequest};

impl CarbonHubClient {
    /// GET /emission/quota
    pub async fn emission_quota(&self, session: &Session) -> Result<EmissionQuota> {
        let builder = self.bearer_request(Method::GET, "/emission/quota", &session.token)?;
        self.send_envelope(builder).await?.into_result(api_failure)
    }

    /// POST /emission/withdraw
    pub async fn withdraw_emission(
        &self,
        session: &Session,
        req: &WithdrawRequest,
    ) -> Result<WithdrawReceipt> {
        let builder = self
            .bearer_request(Method::POST, "/emission/withdraw", &session.token)?
            .json(req);
        self.send_envelope(builder).await?.into_result(api_failure)
    }
}
