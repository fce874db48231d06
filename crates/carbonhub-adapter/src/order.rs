/*
[INPUT]:  Order side, size and optional limit price from the trading panel
[OUTPUT]: Validated, locally simulated order receipts
[POS]:    Trading helpers - simulated order placement (no network)
[UPDATE]: When order validation or receipt format changes
*/

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::http::{CarbonHubError, Result};
use crate::types::Side;

#[derive(Debug, Clone, PartialEq)]
pub struct OrderTicket {
    pub side: Side,
    pub size: Decimal,
    pub limit_price: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderReceipt {
    pub id: Uuid,
    pub side: Side,
    pub size: Decimal,
    pub limit_price: Option<Decimal>,
    pub placed_at: DateTime<Utc>,
}

impl OrderTicket {
    pub fn new(side: Side, size: Decimal) -> Self {
        Self {
            side,
            size,
            limit_price: None,
        }
    }

    pub fn with_limit_price(mut self, price: Decimal) -> Self {
        self.limit_price = Some(price);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.size <= Decimal::ZERO {
            return Err(CarbonHubError::InvalidOrder(
                "Please enter a valid order size.".to_string(),
            ));
        }
        if self.limit_price.is_some_and(|price| price <= Decimal::ZERO) {
            return Err(CarbonHubError::InvalidOrder(
                "Limit price must be greater than zero.".to_string(),
            ));
        }
        Ok(())
    }

    /// Validate and record the order locally
    pub fn place(&self) -> Result<OrderReceipt> {
        self.validate()?;
        Ok(OrderReceipt {
            id: Uuid::new_v4(),
            side: self.side,
            size: self.size,
            limit_price: self.limit_price,
            placed_at: Utc::now(),
        })
    }
}

impl OrderReceipt {
    /// `"Order placed: BUY 5 credits (Price: $12.5)"`
    pub fn summary(&self) -> String {
        let price = self
            .limit_price
            .map(|price| format!(" (Price: ${})", price.normalize()))
            .unwrap_or_default();
        format!(
            "Order placed: {} {} credits{price}",
            self.side.as_str().to_uppercase(),
            self.size.normalize()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_valid_order() {
        let receipt = OrderTicket::new(Side::Buy, Decimal::from(5))
            .with_limit_price(Decimal::new(125, 1))
            .place()
            .unwrap();
        assert_eq!(receipt.summary(), "Order placed: BUY 5 credits (Price: $12.5)");
    }

    #[test]
    fn test_market_order_summary_has_no_price() {
        let receipt = OrderTicket::new(Side::Sell, Decimal::new(25, 1)).place().unwrap();
        assert_eq!(receipt.summary(), "Order placed: SELL 2.5 credits");
    }

    #[test]
    fn test_rejects_non_positive_size_and_price() {
        assert!(matches!(
            OrderTicket::new(Side::Buy, Decimal::ZERO).place(),
            Err(CarbonHubError::InvalidOrder(_))
        ));
        assert!(
            OrderTicket::new(Side::Buy, Decimal::ONE)
                .with_limit_price(Decimal::new(-1, 0))
                .place()
                .is_err()
        );
    }

    #[test]
    fn test_receipts_get_distinct_ids() {
        let ticket = OrderTicket::new(Side::Buy, Decimal::ONE);
        assert_ne!(ticket.place().unwrap().id, ticket.place().unwrap().id);
    }
}
