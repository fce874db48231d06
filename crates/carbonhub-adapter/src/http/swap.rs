/*
[INPUT]:  Session bearer token and swap parameters
[OUTPUT]: Balances, prices, swap tickets and receipts
[POS]:    HTTP layer - swap endpoints (require bearer auth)
[UPDATE]: When adding new swap endpoints or changing payloads
*/

use reqwest::Method;

use crate::http::{CarbonHubClient, CarbonHubError, Result};
use crate::types::{
    Session, SwapCreateRequest, SwapExecuteRequest, SwapPrice, SwapReceipt, SwapTicket,
    WalletBalance,
};

impl CarbonHubClient {
    /// GET /swap/balance
    pub async fn swap_balance(&self, session: &Session) -> Result<WalletBalance> {
        let builder = self.bearer_request(Method::GET, "/swap/balance", &session.token)?;
        self.send_envelope(builder).await?.into_result(api_failure)
    }

    /// GET /swap/price
    pub async fn swap_price(&self, session: &Session) -> Result<SwapPrice> {
        let builder = self.bearer_request(Method::GET, "/swap/price", &session.token)?;
        self.send_envelope(builder).await?.into_result(api_failure)
    }

    /// POST /swap/create
    pub async fn create_swap(&self, session: &Session, req: &SwapCreateRequest) -> Result<SwapTicket> {
        let builder = self
            .bearer_request(Method::POST, "/swap/create", &session.token)?
            .json(req);
        self.send_envelope(builder).await?.into_result(api_failure)
    }

    /// POST /swap/execute
    pub async fn execute_swap(
        &self,
        session: &Session,
        req: &SwapExecuteRequest,
    ) -> Result<SwapReceipt> {
        let builder = self
            .bearer_request(Method::POST, "/swap/execute", &session.token)?
            .json(req);
        self.send_envelope(builder).await?.into_result(api_failure)
    }
}

pub(crate) fn api_failure(message: String) -> CarbonHubError {
    CarbonHubError::Rejected { message }
}
