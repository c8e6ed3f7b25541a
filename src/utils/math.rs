//! 수학 관련 유틸리티
//!
//! 거래소 정밀도 계산, 난수 샘플링 함수 제공

use std::str::FromStr;

use rand::Rng;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

/// 스텝 문자열을 소수점 자릿수로 변환 (`"0.01000000"` -> 2, `"1.00000000"` -> 0)
///
/// 0 이하이거나 숫자가 아니면 `None`
pub fn precision_from_step(step: &str) -> Option<u32> {
  let value = Decimal::from_str(step.trim()).ok()?;
  if value <= Decimal::ZERO {
    return None;
  }
  Some(value.normalize().scale())
}

/// 자릿수에 해당하는 최소 단위 (2 -> 0.01)
pub fn step_for_precision(dp: u32) -> Decimal {
  Decimal::new(1, dp)
}

/// [0, 1) 균등 난수
pub fn unit_interval<R: Rng + ?Sized>(rng: &mut R) -> Decimal {
  Decimal::from_f64(rng.gen::<f64>()).unwrap_or_default()
}

/// [low, high) 균등 난수
pub fn uniform_between<R: Rng + ?Sized>(rng: &mut R, low: Decimal, high: Decimal) -> Decimal {
  low + unit_interval(rng) * (high - low)
}

/// [low, high] 범위 안에 있는 dp 자릿수 격자점 개수
pub fn grid_points(low: Decimal, high: Decimal, dp: u32) -> u64 {
  let step = step_for_precision(dp);
  let first = match low.checked_div(step) {
    Some(v) => v.ceil(),
    None => return u64::MAX,
  };
  let last = match high.checked_div(step) {
    Some(v) => v.floor(),
    None => return u64::MAX,
  };
  if last < first {
    return 0;
  }
  (last - first + Decimal::ONE).to_u64().unwrap_or(u64::MAX)
}
