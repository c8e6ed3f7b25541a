use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::TradingError;
use crate::models::order::OrderSide;

/// How much notional to place, in how many orders, and where
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VolumeDistributionRequest {
    /// Total notional (quote currency) across all orders
    pub total_volume: Decimal,
    pub order_count: usize,
    /// Allowed deviation of each order's notional from `total_volume / order_count`
    pub amount_variance: Decimal,
    pub side: OrderSide,
    pub price_min: Decimal,
    pub price_max: Decimal,
}

impl VolumeDistributionRequest {
    /// Nominal notional per order
    pub fn part(&self) -> Decimal {
        self.total_volume / Decimal::from(self.order_count)
    }

    pub fn validate(&self) -> Result<(), TradingError> {
        if self.total_volume <= Decimal::ZERO {
            return Err(TradingError::InvalidParameter("total volume must be positive".to_string()));
        }

        if self.order_count == 0 {
            return Err(TradingError::InvalidParameter("order count must be at least 1".to_string()));
        }

        if self.amount_variance < Decimal::ZERO {
            return Err(TradingError::InvalidParameter("amount variance cannot be negative".to_string()));
        }

        if self.price_min <= Decimal::ZERO {
            return Err(TradingError::InvalidParameter("minimum price must be positive".to_string()));
        }

        if self.price_min >= self.price_max {
            return Err(TradingError::InvalidParameter(format!(
                "price range is empty: {} >= {}",
                self.price_min, self.price_max
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request() -> VolumeDistributionRequest {
        VolumeDistributionRequest {
            total_volume: dec!(10000),
            order_count: 5,
            amount_variance: dec!(50),
            side: OrderSide::Buy,
            price_min: dec!(200),
            price_max: dec!(300),
        }
    }

    #[test]
    fn test_part() {
        assert_eq!(request().part(), dec!(2000));
    }

    #[test]
    fn test_validate() {
        assert!(request().validate().is_ok());

        let mut r = request();
        r.order_count = 0;
        assert!(matches!(r.validate(), Err(TradingError::InvalidParameter(_))));

        let mut r = request();
        r.price_max = r.price_min;
        assert!(matches!(r.validate(), Err(TradingError::InvalidParameter(_))));

        let mut r = request();
        r.amount_variance = dec!(-1);
        assert!(r.validate().is_err());

        let mut r = request();
        r.total_volume = Decimal::ZERO;
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_deserialize_camel_case() {
        let r: VolumeDistributionRequest = serde_json::from_str(
            r#"{"totalVolume": "10000.0", "orderCount": 5, "amountVariance": "50.0",
                "side": "BUY", "priceMin": "200.0", "priceMax": "300.0"}"#,
        )
        .unwrap();
        assert_eq!(r, request());
    }
}
