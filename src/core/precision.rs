/**
* filename : precision
* author : HAMA
* date: 2025. 5. 8.
* description:
**/

use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::TradingError;
use crate::exchange::traits::Exchange;
use crate::models::instrument::{FilterKind, InstrumentFilter};
use crate::utils::math::precision_from_step;

/// 심볼별 가격/수량 소수점 자릿수
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolPrecision {
  /// `PRICE_FILTER.tickSize` 기준
  pub price: u32,
  /// `LOT_SIZE.stepSize` 기준
  pub quantity: u32,
}

/// 거래소 메타데이터에서 정밀도 제약을 조회
///
/// 캐시하지 않는다. 호출마다 거래소 규칙을 새로 가져온다.
pub struct PrecisionResolver {
  exchange: Arc<RwLock<dyn Exchange>>,
}

impl PrecisionResolver {
  pub fn new(exchange: Arc<RwLock<dyn Exchange>>) -> Self {
    PrecisionResolver { exchange }
  }

  /// 심볼의 필터 조회. 거래소 오류는 상태/오류 코드 그대로 전달
  pub async fn resolve_filter(&self, symbol: &str, kind: FilterKind) -> Result<InstrumentFilter, TradingError> {
    let info = {
      let exchange = self.exchange.read().await;
      exchange.exchange_info().await.map_err(TradingError::into_gateway_shape)?
    };

    let symbol_info = info
      .symbol(symbol)
      .ok_or_else(|| TradingError::SymbolNotFound(symbol.to_string()))?;

    symbol_info.filter(kind).cloned().ok_or_else(|| TradingError::FilterNotFound {
      symbol: symbol.to_string(),
      filter: kind.as_str().to_string(),
    })
  }

  /// 필터의 스텝 값을 소수점 자릿수로 변환
  pub async fn resolve_precision(&self, symbol: &str, kind: FilterKind) -> Result<u32, TradingError> {
    let filter = self.resolve_filter(symbol, kind).await?;
    precision_of(symbol, &filter, kind)
  }

  /// 가격, 수량 순으로 각각 조회
  pub async fn resolve(&self, symbol: &str) -> Result<SymbolPrecision, TradingError> {
    let price = self.resolve_precision(symbol, FilterKind::Price).await?;
    let quantity = self.resolve_precision(symbol, FilterKind::LotSize).await?;
    log::debug!("{} 정밀도: 가격 {}자리, 수량 {}자리", symbol, price, quantity);
    Ok(SymbolPrecision { price, quantity })
  }
}

/// 스텝 필드가 없거나 해석할 수 없으면 `PrecisionUnavailable` (0 자리로 대체하지 않음)
pub fn precision_of(symbol: &str, filter: &InstrumentFilter, kind: FilterKind) -> Result<u32, TradingError> {
  let field = kind.step_field();
  filter
    .param(field)
    .and_then(precision_from_step)
    .ok_or_else(|| TradingError::PrecisionUnavailable {
      symbol: symbol.to_string(),
      filter: kind.as_str().to_string(),
      field: field.to_string(),
    })
}
