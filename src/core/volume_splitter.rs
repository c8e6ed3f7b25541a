/**
* filename : volume_splitter
* author : HAMA
* date: 2025. 5. 8.
* description:
**/

use std::sync::Arc;
use rand::Rng;
use tokio::sync::RwLock;

use crate::core::distribution::{OrderDraft, VolumeDistribution};
use crate::core::precision::PrecisionResolver;
use crate::core::submitter::{OrderObserver, OrderSubmitter};
use crate::exchange::traits::Exchange;
use crate::models::order::{OrderIntent, OrderResult};
use crate::models::request::VolumeDistributionRequest;

/// 재추첨 루프 기본 상한
pub const DEFAULT_MAX_ATTEMPTS: usize = 100_000;

/// 거래대금 분할 주문기
///
/// 목표 거래대금을 `order_count`개의 지정가 주문으로 나눠 순서대로 제출한다.
/// 오류가 나면 즉시 멈추고(fail-fast) 그때까지의 결과와 오류를 반환한다.
pub struct VolumeSplitter<R: Rng + Send> {
  /// 거래 심볼
  symbol: String,
  resolver: PrecisionResolver,
  submitter: OrderSubmitter,
  /// 주입된 난수 생성기
  rng: R,
  max_attempts: usize,
}

impl<R: Rng + Send> VolumeSplitter<R> {
  pub fn new(
    exchange: Arc<RwLock<dyn Exchange>>,
    symbol: impl Into<String>,
    observer: Arc<dyn OrderObserver>,
    rng: R,
  ) -> Self {
    VolumeSplitter {
      symbol: symbol.into(),
      resolver: PrecisionResolver::new(exchange.clone()),
      submitter: OrderSubmitter::new(exchange, observer),
      rng,
      max_attempts: DEFAULT_MAX_ATTEMPTS,
    }
  }

  pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
    self.max_attempts = max_attempts;
    self
  }

  pub fn symbol(&self) -> &str {
    &self.symbol
  }

  /// 분할 주문 실행
  ///
  /// 요청 검증이나 정밀도 조회가 실패하면 오류 하나만 담긴 결과를 반환하고 주문은 내지 않는다.
  pub async fn split_and_submit(&mut self, request: &VolumeDistributionRequest) -> Vec<OrderResult> {
    if let Err(e) = request.validate() {
      log::error!("분할 요청 거부: {}", e);
      return vec![Err(e)];
    }

    let precision = match self.resolver.resolve(&self.symbol).await {
      Ok(p) => p,
      Err(e) => {
        log::error!("{} 정밀도 조회 실패: {}", self.symbol, e);
        return vec![Err(e)];
      }
    };

    let mut distribution = match VolumeDistribution::new(request, precision, self.max_attempts) {
      Ok(d) => d,
      Err(e) => return vec![Err(e)],
    };

    log::info!(
      "분할 시작: {} {} - 총액 {} / {}건, 편차 {}, 가격 [{}, {}]",
      self.symbol, request.side, request.total_volume, request.order_count,
      request.amount_variance, request.price_min, request.price_max
    );

    let mut results = Vec::with_capacity(request.order_count);

    for _ in 1..request.order_count {
      let draft = match distribution.next_order(&mut self.rng) {
        Ok(d) => d,
        Err(e) => {
          results.push(Err(e));
          return results;
        }
      };

      let result = self.place(request, &draft).await;
      let failed = result.is_err();
      results.push(result);
      if failed {
        return results;
      }
      distribution.record(&draft);
    }

    match distribution.closing_order(&mut self.rng) {
      Ok(draft) => {
        let result = self.place(request, &draft).await;
        if result.is_ok() {
          distribution.record(&draft);
        }
        results.push(result);
      }
      Err(e) => results.push(Err(e)),
    }

    log::info!(
      "분할 종료: {} - 제출 {}건, 누적 명목 금액 {}",
      self.symbol,
      results.iter().filter(|r| r.is_ok()).count(),
      distribution.total()
    );

    results
  }

  async fn place(&self, request: &VolumeDistributionRequest, draft: &OrderDraft) -> OrderResult {
    let intent = OrderIntent::limit(self.symbol.clone(), request.side, draft.quantity, draft.price);
    self.submitter.submit(&intent).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::core::submitter::tests::RecordingObserver;
  use crate::core::submitter::NoopObserver;
  use crate::error::{GatewayError, TradingError};
  use crate::exchange::paper::PaperExchange;
  use crate::exchange::traits::MockExchange;
  use crate::models::order::{realized_notional, OrderSide};
  use rand::rngs::StdRng;
  use rand::SeedableRng;
  use rust_decimal::Decimal;
  use rust_decimal_macros::dec;
  use std::collections::BTreeSet;

  fn request() -> VolumeDistributionRequest {
    VolumeDistributionRequest {
      total_volume: dec!(10000.0),
      order_count: 5,
      amount_variance: dec!(50.0),
      side: OrderSide::Buy,
      price_min: dec!(200.0),
      price_max: dec!(300.0),
    }
  }

  fn paper() -> PaperExchange {
    PaperExchange::new().with_symbol("BNBBUSD", "0.01", "0.0001")
  }

  #[tokio::test]
  async fn test_split_example_scenario() {
    let exchange = Arc::new(RwLock::new(paper()));
    let observer = Arc::new(RecordingObserver::default());
    let mut splitter = VolumeSplitter::new(exchange.clone(), "BNBBUSD", observer.clone(), StdRng::seed_from_u64(2023));

    let results = splitter.split_and_submit(&request()).await;
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 5);

    let total = realized_notional(&results);
    assert!(total >= dec!(9900) && total <= dec!(10000), "total {}", total);

    let orders: Vec<_> = results.iter().map(|r| r.as_ref().unwrap()).collect();
    let prices: BTreeSet<Decimal> = orders.iter().map(|o| o.price).collect();
    assert_eq!(prices.len(), 5);
    assert!(orders.iter().all(|o| o.price >= dec!(200) && o.price <= dec!(300)));

    let notionals: BTreeSet<Decimal> = orders.iter().map(|o| o.notional()).collect();
    assert_eq!(notionals.len(), 5);
    assert!(notionals.iter().all(|n| *n >= dec!(1950) && *n <= dec!(2050)));

    assert!(orders.iter().all(|o| o.side == OrderSide::Buy && o.symbol == "BNBBUSD"));
    assert_eq!(exchange.read().await.placed().len(), 5);
    assert_eq!(observer.seen.lock().unwrap().len(), 5);
  }

  #[tokio::test]
  async fn test_precision_failure_returns_single_error() {
    let gateway = GatewayError::new(Some(401), Some(-2015), "Invalid API-key, IP, or permissions for action.");
    let exchange = Arc::new(RwLock::new(paper().fail_exchange_info(gateway.clone())));
    let mut splitter = VolumeSplitter::new(exchange.clone(), "BNBBUSD", Arc::new(NoopObserver), StdRng::seed_from_u64(1));

    let results = splitter.split_and_submit(&request()).await;
    assert_eq!(results, vec![Err(TradingError::Gateway(gateway))]);
    assert!(exchange.read().await.placed().is_empty());
  }

  #[tokio::test]
  async fn test_missing_tick_size_returns_single_error() {
    let filters = vec![
      crate::models::instrument::InstrumentFilter::new("PRICE_FILTER").with_param("minPrice", "0.01"),
      crate::models::instrument::InstrumentFilter::new("LOT_SIZE").with_param("stepSize", "0.0001"),
    ];
    let exchange = Arc::new(RwLock::new(PaperExchange::new().with_symbol_filters("BNBBUSD", filters)));
    let mut splitter = VolumeSplitter::new(exchange.clone(), "BNBBUSD", Arc::new(NoopObserver), StdRng::seed_from_u64(1));

    let results = splitter.split_and_submit(&request()).await;
    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], Err(TradingError::PrecisionUnavailable { .. })));
    assert!(exchange.read().await.placed().is_empty());
  }

  #[tokio::test]
  async fn test_submission_failure_stops_run() {
    let exchange = Arc::new(RwLock::new(
      paper().fail_placement(3, GatewayError::new(Some(400), Some(-2010), "Account has insufficient balance for requested action.")),
    ));
    let mut splitter = VolumeSplitter::new(exchange.clone(), "BNBBUSD", Arc::new(NoopObserver), StdRng::seed_from_u64(11));

    let results = splitter.split_and_submit(&request()).await;
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok() && results[1].is_ok());
    assert_eq!(results[2].as_ref().unwrap_err().error_code(), Some(-2010));
    assert_eq!(exchange.read().await.placed().len(), 3);
  }

  #[tokio::test]
  async fn test_first_submission_failure_submits_nothing_else() {
    let mut mock = MockExchange::new();
    mock.expect_exchange_info().times(2).returning(|| {
      Ok(crate::models::instrument::ExchangeInfo {
        symbols: vec![crate::models::instrument::SymbolInfo {
          symbol: "BNBBUSD".into(),
          status: "TRADING".into(),
          filters: vec![
            crate::models::instrument::InstrumentFilter::new("PRICE_FILTER").with_param("tickSize", "0.01000000"),
            crate::models::instrument::InstrumentFilter::new("LOT_SIZE").with_param("stepSize", "0.00010000"),
          ],
        }],
      })
    });
    mock.expect_place_order()
      .times(1)
      .returning(|_| Err(TradingError::Gateway(GatewayError::new(Some(400), Some(-1013), "Filter failure: MIN_NOTIONAL"))));

    let mut splitter = VolumeSplitter::new(Arc::new(RwLock::new(mock)), "BNBBUSD", Arc::new(NoopObserver), StdRng::seed_from_u64(5));
    let results = splitter.split_and_submit(&request()).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].as_ref().unwrap_err().error_code(), Some(-1013));
  }

  #[tokio::test]
  async fn test_last_order_error_is_appended() {
    let exchange = Arc::new(RwLock::new(
      paper().fail_placement(5, GatewayError::new(Some(400), Some(-1013), "Filter failure: PERCENT_PRICE_BY_SIDE")),
    ));
    let mut splitter = VolumeSplitter::new(exchange, "BNBBUSD", Arc::new(NoopObserver), StdRng::seed_from_u64(8));

    let results = splitter.split_and_submit(&request()).await;
    assert_eq!(results.len(), 5);
    assert!(results[..4].iter().all(|r| r.is_ok()));
    assert!(results[4].is_err());
  }

  #[tokio::test]
  async fn test_invalid_request_returns_single_error() {
    let exchange = Arc::new(RwLock::new(paper()));
    let mut splitter = VolumeSplitter::new(exchange.clone(), "BNBBUSD", Arc::new(NoopObserver), StdRng::seed_from_u64(1));

    let mut bad = request();
    bad.price_min = dec!(300);
    bad.price_max = dec!(200);
    let results = splitter.split_and_submit(&bad).await;
    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], Err(TradingError::InvalidParameter(_))));
    assert_eq!(exchange.read().await.exchange_info_calls(), 0);
  }

  #[tokio::test]
  async fn test_unsatisfiable_request_terminates() {
    let exchange = Arc::new(RwLock::new(PaperExchange::new().with_symbol("BNBBUSD", "0.01", "1")));
    let mut splitter = VolumeSplitter::new(exchange.clone(), "BNBBUSD", Arc::new(NoopObserver), StdRng::seed_from_u64(4))
      .with_max_attempts(1_000);

    // 수량 단위 1이면 249.00~249.05 에서 2000 ± 0.5를 만들 수 있는 가격이 없다
    let request = VolumeDistributionRequest {
      total_volume: dec!(4000),
      order_count: 2,
      amount_variance: dec!(0.5),
      side: OrderSide::Sell,
      price_min: dec!(249.0),
      price_max: dec!(249.05),
    };
    let results = splitter.split_and_submit(&request).await;
    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], Err(TradingError::ConstraintUnsatisfiable(_))));
    assert!(exchange.read().await.placed().is_empty());
  }
}
