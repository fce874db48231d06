/*
[INPUT]:  Session context, wallet adapter, swap/withdraw amounts
[OUTPUT]: Balances, quotas, executed swaps and withdrawals
[POS]:    Service layer - bearer-authenticated dashboard operations
[UPDATE]: When swap/withdraw flows or bounds checks change
*/

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use rust_decimal::Decimal;
use tracing::info;

use crate::auth::{SessionContext, WalletAdapter};
use crate::http::{CarbonHubClient, CarbonHubError, Result};
use crate::types::{
    EmissionQuota, SwapCreateRequest, SwapDirection, SwapExecuteRequest, SwapPrice, SwapReceipt,
    WalletBalance, WithdrawReceipt, WithdrawRequest,
};

/// Dashboard operations for the signed-in account
#[derive(Debug, Clone)]
pub struct AccountService {
    client: CarbonHubClient,
    sessions: SessionContext,
}

impl AccountService {
    pub fn new(client: CarbonHubClient, sessions: SessionContext) -> Self {
        Self { client, sessions }
    }

    pub async fn balance(&self) -> Result<WalletBalance> {
        let session = self.sessions.require()?;
        self.client.swap_balance(&session).await
    }

    pub async fn price(&self) -> Result<SwapPrice> {
        let session = self.sessions.require()?;
        self.client.swap_price(&session).await
    }

    pub async fn quota(&self) -> Result<EmissionQuota> {
        let session = self.sessions.require()?;
        self.client.emission_quota(&session).await
    }

    /// Create a swap, have the wallet sign its transaction, then execute it.
    ///
    /// The amount must be positive and within the balance of the spent asset.
    pub async fn swap(
        &self,
        wallet: &dyn WalletAdapter,
        direction: SwapDirection,
        amount: Decimal,
    ) -> Result<SwapReceipt> {
        let session = self.sessions.require()?;
        if !wallet.is_connected() {
            return Err(CarbonHubError::WalletNotConnected);
        }

        let balance = self.client.swap_balance(&session).await?;
        check_bounds(amount, balance.available_for(direction))?;

        let ticket = self
            .client
            .create_swap(&session, &SwapCreateRequest { direction, amount })
            .await?;
        info!(swap_id = %ticket.swap_id, direction = direction.as_str(), %amount, "swap created");

        let transaction = STANDARD.decode(ticket.transaction.trim()).map_err(|e| {
            CarbonHubError::InvalidResponse(format!("swap transaction is not base64: {e}"))
        })?;
        let signature = wallet.sign_message(&transaction).await?;

        let receipt = self
            .client
            .execute_swap(
                &session,
                &SwapExecuteRequest {
                    swap_id: ticket.swap_id,
                    signature: STANDARD.encode(signature),
                },
            )
            .await?;
        info!(swap_id = %receipt.swap_id, "swap executed");
        Ok(receipt)
    }

    /// Withdraw credits from the emission quota
    pub async fn withdraw(&self, amount: Decimal) -> Result<WithdrawReceipt> {
        let session = self.sessions.require()?;
        let quota = self.client.emission_quota(&session).await?;
        check_bounds(amount, quota.remaining())?;

        let receipt = self
            .client
            .withdraw_emission(&session, &WithdrawRequest { amount })
            .await?;
        info!(%amount, "emission withdrawn");
        Ok(receipt)
    }
}

/// `0 < amount <= max`
pub fn check_bounds(amount: Decimal, max: Decimal) -> Result<()> {
    if amount <= Decimal::ZERO || amount > max {
        return Err(CarbonHubError::OutOfBounds { amount, max });
    }
    Ok(())
}
