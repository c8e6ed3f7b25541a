/**
* filename : canceller
* author : HAMA
* date: 2025. 5. 8.
* description:
**/

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::core::submitter::{OrderAction, OrderObserver};
use crate::error::TradingError;
use crate::exchange::traits::Exchange;
use crate::models::order::OrderResult;

/// 미체결 주문 일괄 취소
///
/// 최선 노력 방식: 심볼 조회나 개별 취소가 실패해도 오류를 결과에 남기고 계속 진행한다.
pub struct OpenOrderCanceller {
  exchange: Arc<RwLock<dyn Exchange>>,
  observer: Arc<dyn OrderObserver>,
}

impl OpenOrderCanceller {
  pub fn new(exchange: Arc<RwLock<dyn Exchange>>, observer: Arc<dyn OrderObserver>) -> Self {
    OpenOrderCanceller { exchange, observer }
  }

  /// 거래소의 모든 심볼에 대해 미체결 주문 취소
  ///
  /// 메타데이터 조회 자체가 실패하면 오류 하나만 담아 반환
  pub async fn cancel_all_open_orders(&self) -> Vec<OrderResult> {
    let info = {
      let exchange = self.exchange.read().await;
      exchange.exchange_info().await
    };

    let info = match info {
      Ok(info) => info,
      Err(e) => {
        let result = Err(e.into_gateway_shape());
        self.observer.on_result(OrderAction::ListOpen, "*", &result);
        return vec![result];
      }
    };

    let mut batch = Vec::new();
    for symbol in &info.symbols {
      self.cancel_symbol_into(&symbol.symbol, &mut batch).await;
    }

    log::info!("미체결 주문 취소 완료: {}건 (심볼 {}개)", batch.len(), info.symbols.len());
    batch
  }

  /// 한 심볼의 미체결 주문 취소
  pub async fn cancel_open_orders_for(&self, symbol: &str) -> Vec<OrderResult> {
    let mut batch = Vec::new();
    self.cancel_symbol_into(symbol, &mut batch).await;
    batch
  }

  async fn cancel_symbol_into(&self, symbol: &str, batch: &mut Vec<OrderResult>) {
    let open = {
      let exchange = self.exchange.read().await;
      exchange.open_orders(symbol).await
    };

    let open = match open {
      Ok(orders) => orders,
      Err(e) => {
        let result = Err(e.into_gateway_shape());
        self.observer.on_result(OrderAction::ListOpen, symbol, &result);
        batch.push(result);
        return;
      }
    };

    for order in open {
      let result = {
        let mut exchange = self.exchange.write().await;
        exchange.cancel_order(symbol, order.order_id).await
      }
      .map_err(TradingError::into_gateway_shape);

      self.observer.on_result(OrderAction::Cancel, symbol, &result);
      batch.push(result);
    }
  }
}
