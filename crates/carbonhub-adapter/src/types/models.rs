/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust structs with serialization support
[POS]:    Data layer - session, connection and account models
[UPDATE]: When API schema changes or new types added
*/

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::enums::{AccountType, SwapDirection};

/// Authenticated session produced by a successful verify step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub public_key: String,
    pub token: String,
    pub account_type: AccountType,
}

impl Session {
    pub fn new(
        public_key: impl Into<String>,
        token: impl Into<String>,
        account_type: AccountType,
    ) -> Self {
        Self {
            public_key: public_key.into(),
            token: token.into(),
            account_type,
        }
    }

    /// A stored triple with an empty field is never usable.
    pub fn is_complete(&self) -> bool {
        !self.public_key.trim().is_empty() && !self.token.trim().is_empty()
    }
}

/// Server-issued, single-use string the wallet must sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub message: String,
}

/// Transient wallet connection status, owned by the wallet adapter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionState {
    pub connecting: bool,
    pub connected: bool,
    pub public_key: Option<String>,
    pub last_error: Option<String>,
}

impl ConnectionState {
    pub fn connected(public_key: impl Into<String>) -> Self {
        Self {
            connecting: false,
            connected: true,
            public_key: Some(public_key.into()),
            last_error: None,
        }
    }

    pub fn connecting() -> Self {
        Self {
            connecting: true,
            ..Self::default()
        }
    }

    /// The adapter has finished connecting, one way or the other.
    pub fn is_settled(&self) -> bool {
        !self.connecting
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletBalance {
    #[serde(default)]
    pub sol: Decimal,
    #[serde(default)]
    pub credits: Decimal,
}

impl WalletBalance {
    /// Balance of the asset spent by a swap in the given direction.
    pub fn available_for(&self, direction: SwapDirection) -> Decimal {
        match direction {
            SwapDirection::SolToCredit => self.sol,
            SwapDirection::CreditToSol => self.credits,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapPrice {
    pub sol_usd: Decimal,
    pub credit_usd: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SwapPrice {
    /// Credits obtained for one SOL.
    pub fn ratio(&self) -> Option<Decimal> {
        if self.credit_usd.is_zero() {
            return None;
        }
        self.sol_usd.checked_div(self.credit_usd)
    }

    /// Expected output amount for a swap, before fees.
    pub fn quote(&self, direction: SwapDirection, amount: Decimal) -> Option<Decimal> {
        let ratio = self.ratio()?;
        match direction {
            SwapDirection::SolToCredit => amount.checked_mul(ratio),
            SwapDirection::CreditToSol if ratio.is_zero() => None,
            SwapDirection::CreditToSol => amount.checked_div(ratio),
        }
    }
}

/// Pending swap returned by `/swap/create`; `transaction` is base64.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapTicket {
    pub swap_id: String,
    pub transaction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_out: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapReceipt {
    pub swap_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_signature: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmissionQuota {
    pub total: Decimal,
    #[serde(default)]
    pub used: Decimal,
}

impl EmissionQuota {
    pub fn remaining(&self) -> Decimal {
        self.total
            .checked_sub(self.used)
            .unwrap_or(Decimal::ZERO)
            .max(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawReceipt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_signature: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn price(sol_usd: i64, credit_usd: i64) -> SwapPrice {
        SwapPrice {
            sol_usd: Decimal::from(sol_usd),
            credit_usd: Decimal::from(credit_usd),
            updated_at: None,
        }
    }

    #[test]
    fn test_swap_price_ratio() {
        assert_eq!(price(150, 15).ratio(), Some(Decimal::from(10)));
        assert_eq!(price(150, 0).ratio(), None);
    }

    #[test]
    fn test_swap_price_quote_both_directions() {
        let p = price(150, 15);
        assert_eq!(
            p.quote(SwapDirection::SolToCredit, Decimal::from(2)),
            Some(Decimal::from(20))
        );
        assert_eq!(
            p.quote(SwapDirection::CreditToSol, Decimal::from(20)),
            Some(Decimal::from(2))
        );
    }

    #[test]
    fn test_emission_quota_remaining_never_negative() {
        let quota = EmissionQuota {
            total: Decimal::from(10),
            used: Decimal::from(12),
        };
        assert_eq!(quota.remaining(), Decimal::ZERO);
    }

    #[test]
    fn test_emission_quota_remaining_extreme_values() {
        let quota = EmissionQuota {
            total: Decimal::MIN,
            used: Decimal::MAX,
        };
        assert_eq!(quota.remaining(), Decimal::ZERO);
    }

    #[test]
    fn test_session_completeness() {
        assert!(Session::new("PK1", "T1", AccountType::User).is_complete());
        assert!(!Session::new("PK1", " ", AccountType::User).is_complete());
    }

    #[test]
    fn test_balance_deserializes_numbers_and_strings() {
        let balance: WalletBalance =
            serde_json::from_str(r#"{"sol": 1.5, "credits": "200"}"#).unwrap();
        assert_eq!(balance.available_for(SwapDirection::SolToCredit), Decimal::new(15, 1));
        assert_eq!(balance.available_for(SwapDirection::CreditToSol), Decimal::from(200));
    }
}
