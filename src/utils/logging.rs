//! 로깅 유틸리티
//!
//! 로그 초기화 및 주문 결과 로그 함수 제공

use env_logger::Builder;
use log::LevelFilter;

use crate::core::submitter::{OrderAction, OrderObserver};
use crate::error::TradingError;
use crate::models::order::{OrderResult, SubmittedOrder};

/// 로깅 시스템 초기화
pub fn init(level: &str) -> Result<(), TradingError> {
    let level_filter = parse_level(level);

    Builder::from_default_env()
        .filter_level(level_filter)
        .format_timestamp_millis()
        .try_init()
        .map_err(|e| TradingError::ConfigError(format!("logger already initialized: {}", e)))?;

    log::info!("로깅 시스템 초기화 완료: 레벨 = {}", level);

    Ok(())
}

/// 로그 레벨 파싱 (알 수 없는 값은 info)
pub fn parse_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

/// 주문 생성 로그
pub fn log_order_placed(order: &SubmittedOrder) {
    log::info!("주문 생성: {} - 심볼: {} - 방향: {} - 수량: {} - 가격: {}",
               order.order_id, order.symbol, order.side, order.orig_qty, order.price);
}

/// 주문 취소 로그
pub fn log_order_cancelled(order: &SubmittedOrder) {
    log::info!("주문 취소: {} - 심볼: {}", order.order_id, order.symbol);
}

/// 오류 로그
pub fn log_error(context: &str, error: &TradingError) {
    log::error!("오류 발생 - {}: {}", context, error);
}

/// 모든 주문 결과를 `log`로 남기는 관찰자
pub struct LogObserver;

impl OrderObserver for LogObserver {
    fn on_result(&self, action: OrderAction, symbol: &str, result: &OrderResult) {
        match (action, result) {
            (OrderAction::Place, Ok(order)) => log_order_placed(order),
            (OrderAction::Cancel, Ok(order)) => log_order_cancelled(order),
            (OrderAction::ListOpen, Ok(_)) => {}
            (OrderAction::Place, Err(e)) => log_error(&format!("주문 생성 {}", symbol), e),
            (OrderAction::ListOpen, Err(e)) => log_error(&format!("미체결 주문 조회 {}", symbol), e),
            (OrderAction::Cancel, Err(e)) => log_error(&format!("주문 취소 {}", symbol), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), LevelFilter::Debug);
        assert_eq!(parse_level("warn"), LevelFilter::Warn);
        assert_eq!(parse_level("verbose"), LevelFilter::Info);
    }
}
