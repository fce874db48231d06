/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role selected at login time and validated against the service's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    User,
    Company,
}

impl AccountType {
    /// Wire representation used by the authentication service.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::User => "user",
            AccountType::Company => "company",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(AccountType::User),
            "company" => Ok(AccountType::Company),
            other => Err(format!("unknown account type: {other}")),
        }
    }
}

/// Envelope status field. Anything other than `success` is a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Success,
    Error,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapDirection {
    SolToCredit,
    CreditToSol,
}

impl SwapDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwapDirection::SolToCredit => "sol_to_credit",
            SwapDirection::CreditToSol => "credit_to_sol",
        }
    }
}

impl FromStr for SwapDirection {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sol_to_credit" | "buy" => Ok(SwapDirection::SolToCredit),
            "credit_to_sol" | "sell" => Ok(SwapDirection::CreditToSol),
            other => Err(format!("unknown swap direction: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            other => Err(format!("unknown order side: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_type_wire_format() {
        assert_eq!(
            serde_json::to_string(&AccountType::Company).unwrap(),
            "\"company\""
        );
        assert_eq!("USER".parse::<AccountType>().unwrap(), AccountType::User);
        assert!("admin".parse::<AccountType>().is_err());
    }

    #[test]
    fn test_api_status_unknown_value() {
        let status: ApiStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(status, ApiStatus::Unknown);
    }
}
