/**
* filename : distribution
* author : HAMA
* date: 2025. 5. 8.
* description:
**/

use std::collections::BTreeSet;

use rand::Rng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::core::precision::SymbolPrecision;
use crate::error::TradingError;
use crate::models::request::VolumeDistributionRequest;
use crate::utils::math::{grid_points, step_for_precision, uniform_between};

/// 실현 총액이 목표 대비 채워야 하는 최소 비율 (99%)
pub const MIN_FILL_RATIO: Decimal = dec!(0.99);

/// 가격/수량이 정해진 주문 초안
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderDraft {
  pub price: Decimal,
  pub quantity: Decimal,
}

impl OrderDraft {
  pub fn notional(&self) -> Decimal {
    self.quantity * self.price
  }
}

/// 목표 거래대금을 무작위 주문들로 나누는 샘플러
///
/// 주문마다 명목 금액은 `part ± variance` 안에서 흔들리고, `surplus`가 지금까지
/// 기록된 주문의 누적 편차를 다음 주문에서 되돌린다. 마지막 주문은 남은 금액을
/// 예산을 넘지 않고 목표의 `MIN_FILL_RATIO` 이상이 되는 가격을 탐색해서 정한다.
///
/// 모든 재추첨 루프는 `max_attempts` 번에서 멈추고 `ConstraintUnsatisfiable`을 반환한다.
pub struct VolumeDistribution {
  total_volume: Decimal,
  /// 마지막 주문 후 누적 합계의 하한
  fill_floor: Decimal,
  part: Decimal,
  variance: Decimal,
  price_min: Decimal,
  price_max: Decimal,
  precision: SymbolPrecision,
  max_attempts: usize,
  /// 기록된 주문 수 * part - 누적 명목 금액
  surplus: Decimal,
  total: Decimal,
  /// 반올림으로 생기는 주문당 최대 명목 오차
  rounding_margin: Decimal,
  used_prices: BTreeSet<Decimal>,
  used_notionals: BTreeSet<Decimal>,
}

impl VolumeDistribution {
  pub fn new(
    request: &VolumeDistributionRequest,
    precision: SymbolPrecision,
    max_attempts: usize,
  ) -> Result<Self, TradingError> {
    request.validate()?;

    let available = grid_points(request.price_min, request.price_max, precision.price);
    if available < request.order_count as u64 {
      return Err(TradingError::ConstraintUnsatisfiable(format!(
        "only {} prices with {} decimals fit in [{}, {}], {} orders requested",
        available, precision.price, request.price_min, request.price_max, request.order_count
      )));
    }

    let rounding_margin = step_for_precision(precision.quantity) * request.price_max / Decimal::TWO;

    Ok(VolumeDistribution {
      total_volume: request.total_volume,
      fill_floor: request.total_volume * MIN_FILL_RATIO,
      part: request.part(),
      variance: request.amount_variance,
      price_min: request.price_min,
      price_max: request.price_max,
      precision,
      max_attempts,
      surplus: Decimal::ZERO,
      total: Decimal::ZERO,
      rounding_margin,
      used_prices: BTreeSet::new(),
      used_notionals: BTreeSet::new(),
    })
  }

  /// 기록된 주문들의 명목 금액 합계
  pub fn total(&self) -> Decimal {
    self.total
  }

  pub fn surplus(&self) -> Decimal {
    self.surplus
  }

  /// 다음 주문의 명목 금액 편차
  ///
  /// `uniform + surplus`를 `|shift| <= variance`가 될 때까지 다시 뽑는다.
  ///
  /// 무작위 성분을 `±variance` 그대로 뽑고 `surplus -= shift`로 갱신하는 단순한 방식과 다르다.
  /// 무작위 성분은 `±(variance - 2 * rounding_margin)`에서 뽑고 (폭이 남지 않으면 `±variance`),
  /// surplus는 `record`에서 실제 체결 명목 금액의 편차로 갱신한다. 수량 반올림으로 생긴
  /// 오차가 다음 주문에서 상쇄되어 마지막 주문이 채울 수 있는 범위 안에 남는다.
  pub fn next_shift<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Decimal, TradingError> {
    let narrowed = self.variance - self.rounding_margin * Decimal::TWO;
    let window = if narrowed > Decimal::ZERO { narrowed } else { self.variance };

    for _ in 0..self.max_attempts {
      let shift = uniform_between(rng, -window, window) + self.surplus;
      if shift.abs() <= self.variance {
        return Ok(shift);
      }
    }

    Err(self.exhausted("volume shift"))
  }

  /// 마지막을 제외한 주문 하나를 생성. 기록은 제출 성공 후 `record`로 한다
  pub fn next_order<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<OrderDraft, TradingError> {
    let shift = self.next_shift(rng)?;
    let target = self.part + shift;
    let qty_dp = self.precision.quantity;

    self.draw(
      rng,
      "order price",
      |price| (target / price).round_dp(qty_dp),
      |draft| (draft.notional() - self.part).abs() <= self.variance,
    )
  }

  /// 남은 금액을 채우는 마지막 주문
  ///
  /// 누적 합계가 `[total_volume * MIN_FILL_RATIO, total_volume]` 안에 들고
  /// 명목 금액이 `part ± variance` 안에 드는 가격을 찾는다.
  /// 수량 단위가 거칠어 못 찾으면 `ConstraintUnsatisfiable`.
  pub fn closing_order<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<OrderDraft, TradingError> {
    let remaining = self.total_volume - self.total;
    let qty_dp = self.precision.quantity;

    self.draw(
      rng,
      "closing order price",
      |price| (remaining / price).round_dp(qty_dp),
      |draft| {
        let notional = draft.notional();
        let total = self.total + notional;
        total <= self.total_volume && total >= self.fill_floor && (notional - self.part).abs() <= self.variance
      },
    )
  }

  /// 거래소가 받아들인 주문을 누적
  ///
  /// surplus는 뽑은 shift가 아니라 실제 명목 금액과 `part`의 차이만큼 줄인다.
  pub fn record(&mut self, draft: &OrderDraft) {
    let notional = draft.notional();
    self.total += notional;
    self.surplus -= notional - self.part;
    self.used_prices.insert(draft.price);
    self.used_notionals.insert(notional);
  }

  fn random_price<R: Rng + ?Sized>(&self, rng: &mut R) -> Decimal {
    uniform_between(rng, self.price_min, self.price_max).round_dp(self.precision.price)
  }

  /// 범위 밖, 이미 쓴 가격/명목 금액, 0 이하 수량은 다시 뽑는다
  fn draw<R, Q, A>(&self, rng: &mut R, what: &str, quantity_for: Q, accept: A) -> Result<OrderDraft, TradingError>
  where
    R: Rng + ?Sized,
    Q: Fn(Decimal) -> Decimal,
    A: Fn(&OrderDraft) -> bool,
  {
    for _ in 0..self.max_attempts {
      let price = self.random_price(rng);
      if price < self.price_min || price > self.price_max || self.used_prices.contains(&price) {
        continue;
      }

      let quantity = quantity_for(price);
      if quantity <= Decimal::ZERO {
        continue;
      }

      let draft = OrderDraft { price, quantity };
      if self.used_notionals.contains(&draft.notional()) || !accept(&draft) {
        continue;
      }
      return Ok(draft);
    }

    Err(self.exhausted(what))
  }

  fn exhausted(&self, what: &str) -> TradingError {
    TradingError::ConstraintUnsatisfiable(format!(
      "no acceptable {} after {} attempts (part {}, variance {}, price [{}, {}])",
      what, self.max_attempts, self.part, self.variance, self.price_min, self.price_max
    ))
  }
}
