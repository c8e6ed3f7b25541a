use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::error::TradingError;
use crate::models::instrument::ExchangeInfo;
use crate::models::order::{OrderId, OrderIntent, SubmittedOrder};

/// The `Exchange` trait defines the interface for interacting with trading exchanges.
/// It is implemented by the Binance Spot connector and the in-memory paper exchange.
///
/// Exchange rejections are returned as `TradingError::Gateway` carrying the
/// HTTP status, the exchange error code and message.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Exchange: Send + Sync {
    /// Full instrument metadata: every symbol with its filters
    async fn exchange_info(&self) -> Result<ExchangeInfo, TradingError>;

    /// Place a new order
    async fn place_order(&mut self, intent: &OrderIntent) -> Result<SubmittedOrder, TradingError>;

    /// Open orders for one symbol
    async fn open_orders(&self, symbol: &str) -> Result<Vec<SubmittedOrder>, TradingError>;

    /// Cancel one order, returning the cancelled order
    async fn cancel_order(&mut self, symbol: &str, order_id: OrderId) -> Result<SubmittedOrder, TradingError>;
}
