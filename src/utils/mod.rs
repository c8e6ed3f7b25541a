//! 공용 유틸리티
//!
//! 로깅 초기화와 정밀도/난수 계산 함수

pub mod logging;
pub mod math;
