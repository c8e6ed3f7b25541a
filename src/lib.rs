//! 거래대금 분할 주문 라이브러리
//!
//! 목표 거래대금을 무작위 가격/수량의 지정가 주문들로 나눠 거래소에 제출하고,
//! 미체결 주문을 일괄 취소합니다.

pub mod config;
pub mod core;
pub mod error;
pub mod exchange;
pub mod models;
pub mod utils;

// 핵심 타입 재노출
pub use crate::core::{OpenOrderCanceller, OrderObserver, PrecisionResolver, VolumeSplitter};
pub use crate::error::{GatewayError, TradingError};
pub use crate::exchange::traits::Exchange;
pub use crate::models::order::{realized_notional, OrderIntent, OrderResult, OrderSide, SubmittedOrder};
pub use crate::models::request::VolumeDistributionRequest;

/// 버전 정보
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 결과 타입 별칭
pub type Result<T> = std::result::Result<T, TradingError>;
