/**
* filename : submitter
* author : HAMA
* date: 2025. 5. 8.
* description:
**/

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::TradingError;
use crate::exchange::traits::Exchange;
use crate::models::order::{OrderIntent, OrderResult};

/// 관찰된 결과가 나온 거래소 호출 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
  Place,
  ListOpen,
  Cancel,
}

/// 주문 결과가 나올 때마다 전달받는 관찰자
///
/// 실패할 수 없고, 호출자에게 돌아가는 결과를 바꾸지 않는다.
pub trait OrderObserver: Send + Sync {
  fn on_result(&self, action: OrderAction, symbol: &str, result: &OrderResult);
}

/// 아무것도 하지 않는 관찰자
pub struct NoopObserver;

impl OrderObserver for NoopObserver {
  fn on_result(&self, _action: OrderAction, _symbol: &str, _result: &OrderResult) {}
}

/// 호출당 주문 하나를 제출
pub struct OrderSubmitter {
  exchange: Arc<RwLock<dyn Exchange>>,
  observer: Arc<dyn OrderObserver>,
}

impl OrderSubmitter {
  pub fn new(exchange: Arc<RwLock<dyn Exchange>>, observer: Arc<dyn OrderObserver>) -> Self {
    OrderSubmitter { exchange, observer }
  }

  /// 거래소 호출은 정확히 한 번, 재시도 없음. 실패는 `TradingError::Gateway` 형태로 반환
  pub async fn submit(&self, intent: &OrderIntent) -> OrderResult {
    let result = {
      let mut exchange = self.exchange.write().await;
      exchange.place_order(intent).await
    }
    .map_err(TradingError::into_gateway_shape);

    self.observer.on_result(OrderAction::Place, &intent.symbol, &result);
    result
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;
  use crate::error::GatewayError;
  use crate::exchange::traits::MockExchange;
  use crate::models::order::{OrderId, OrderSide, OrderStatus, SubmittedOrder};
  use rust_decimal_macros::dec;
  use std::sync::Mutex;

  /// 검증용으로 관찰된 결과를 모두 보관
  #[derive(Default)]
  pub(crate) struct RecordingObserver {
    pub seen: Mutex<Vec<(OrderAction, String, bool)>>,
  }

  impl OrderObserver for RecordingObserver {
    fn on_result(&self, action: OrderAction, symbol: &str, result: &OrderResult) {
      if let Ok(mut seen) = self.seen.lock() {
        seen.push((action, symbol.to_string(), result.is_ok()));
      }
    }
  }

  fn accepted(intent: &OrderIntent) -> SubmittedOrder {
    SubmittedOrder {
      symbol: intent.symbol.clone(),
      order_id: OrderId(7),
      client_order_id: "abc".into(),
      price: intent.price,
      orig_qty: intent.quantity,
      executed_qty: dec!(0),
      status: OrderStatus::New,
      time_in_force: intent.time_in_force,
      order_type: intent.order_type,
      side: intent.side,
      transact_time: None,
    }
  }

  #[tokio::test]
  async fn test_submit_success_is_observed() {
    let mut mock = MockExchange::new();
    mock.expect_place_order().times(1).returning(|intent| Ok(accepted(intent)));
    let observer = Arc::new(RecordingObserver::default());
    let submitter = OrderSubmitter::new(Arc::new(RwLock::new(mock)), observer.clone());

    let intent = OrderIntent::limit("BNBBUSD", OrderSide::Buy, dec!(1.5), dec!(250.25));
    let order = submitter.submit(&intent).await.unwrap();
    assert_eq!(order.order_id, OrderId(7));

    let seen = observer.seen.lock().unwrap();
    assert_eq!(*seen, vec![(OrderAction::Place, "BNBBUSD".to_string(), true)]);
  }

  #[tokio::test]
  async fn test_decode_failure_normalized_to_gateway_error() {
    let mut mock = MockExchange::new();
    mock.expect_place_order()
      .times(1)
      .returning(|_| Err(TradingError::ParseError("missing field `orderId`".into())));
    let submitter = OrderSubmitter::new(Arc::new(RwLock::new(mock)), Arc::new(NoopObserver));

    let intent = OrderIntent::limit("BNBBUSD", OrderSide::Sell, dec!(1), dec!(250));
    let err = submitter.submit(&intent).await.unwrap_err();
    assert_eq!(err, TradingError::Gateway(GatewayError::transport("missing field `orderId`")));
  }

  #[tokio::test]
  async fn test_exchange_rejection_kept_as_is() {
    let mut mock = MockExchange::new();
    mock.expect_place_order().times(1).returning(|_| {
      Err(TradingError::Gateway(GatewayError::new(Some(400), Some(-1013), "Filter failure: PRICE_FILTER")))
    });
    let observer = Arc::new(RecordingObserver::default());
    let submitter = OrderSubmitter::new(Arc::new(RwLock::new(mock)), observer.clone());

    let intent = OrderIntent::limit("BNBBUSD", OrderSide::Buy, dec!(1), dec!(250.001));
    let err = submitter.submit(&intent).await.unwrap_err();
    assert_eq!(err.status_code(), Some(400));
    assert_eq!(err.error_code(), Some(-1013));
    assert!(!observer.seen.lock().unwrap()[0].2);
  }
}
