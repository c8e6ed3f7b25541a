use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;

use crate::error::{GatewayError, TradingError};
use crate::exchange::traits::Exchange;
use crate::models::instrument::{ExchangeInfo, FilterKind, InstrumentFilter, SymbolInfo};
use crate::models::order::{OrderId, OrderIntent, OrderStatus, SubmittedOrder};

/// In-memory exchange: accepts every limit order as NEW and keeps it open until cancelled.
///
/// Failures can be scripted per call so callers' error paths can be exercised offline.
pub struct PaperExchange {
  symbols: Vec<SymbolInfo>,
  open: BTreeMap<String, Vec<SubmittedOrder>>,
  placed: Vec<OrderIntent>,
  order_id_counter: u64,
  info_failure: Option<GatewayError>,
  /// 1-based placement number -> error returned for it
  placement_failures: HashMap<usize, GatewayError>,
  listing_failures: HashSet<String>,
  cancel_failures: HashSet<String>,
  info_calls: AtomicUsize,
}

impl PaperExchange {
  pub fn new() -> Self {
    PaperExchange {
      symbols: Vec::new(),
      open: BTreeMap::new(),
      placed: Vec::new(),
      order_id_counter: 0,
      info_failure: None,
      placement_failures: HashMap::new(),
      listing_failures: HashSet::new(),
      cancel_failures: HashSet::new(),
      info_calls: AtomicUsize::new(0),
    }
  }

  /// Adds a tradable symbol with its `PRICE_FILTER.tickSize` and `LOT_SIZE.stepSize`
  pub fn with_symbol(mut self, symbol: &str, tick_size: &str, step_size: &str) -> Self {
    let filters = vec![
      InstrumentFilter::new(FilterKind::Price.as_str())
        .with_param("minPrice", tick_size)
        .with_param("maxPrice", "1000000.00000000")
        .with_param(FilterKind::Price.step_field(), tick_size),
      InstrumentFilter::new(FilterKind::LotSize.as_str())
        .with_param("minQty", step_size)
        .with_param("maxQty", "9000000.00000000")
        .with_param(FilterKind::LotSize.step_field(), step_size),
    ];
    self.with_symbol_filters(symbol, filters)
  }

  /// Adds a symbol with arbitrary filters
  pub fn with_symbol_filters(mut self, symbol: &str, filters: Vec<InstrumentFilter>) -> Self {
    self.symbols.push(SymbolInfo {
      symbol: symbol.to_string(),
      status: "TRADING".to_string(),
      filters,
    });
    self
  }

  /// Seeds an already open order
  pub fn with_open_order(mut self, intent: OrderIntent) -> Self {
    self.accept(&intent);
    self
  }

  pub fn fail_exchange_info(mut self, error: GatewayError) -> Self {
    self.info_failure = Some(error);
    self
  }

  /// The `n`-th placement (1-based) is rejected with `error`
  pub fn fail_placement(mut self, n: usize, error: GatewayError) -> Self {
    self.placement_failures.insert(n, error);
    self
  }

  pub fn fail_open_orders_for(mut self, symbol: &str) -> Self {
    self.listing_failures.insert(symbol.to_string());
    self
  }

  pub fn fail_cancels_for(mut self, symbol: &str) -> Self {
    self.cancel_failures.insert(symbol.to_string());
    self
  }

  /// Every placement attempt, accepted or rejected, in call order
  pub fn placed(&self) -> &[OrderIntent] {
    &self.placed
  }

  pub fn open_order_count(&self) -> usize {
    self.open.values().map(Vec::len).sum()
  }

  pub fn exchange_info_calls(&self) -> usize {
    self.info_calls.load(Ordering::Relaxed)
  }

  fn accept(&mut self, intent: &OrderIntent) -> SubmittedOrder {
    self.order_id_counter += 1;
    let order = SubmittedOrder {
      symbol: intent.symbol.clone(),
      order_id: OrderId(self.order_id_counter),
      client_order_id: format!("paper-{}", self.order_id_counter),
      price: intent.price,
      orig_qty: intent.quantity,
      executed_qty: Decimal::ZERO,
      status: OrderStatus::New,
      time_in_force: intent.time_in_force,
      order_type: intent.order_type,
      side: intent.side,
      transact_time: Some(Utc::now().timestamp_millis()),
    };
    self.open.entry(intent.symbol.clone()).or_default().push(order.clone());
    order
  }

  fn rejection(code: i64, message: &str) -> TradingError {
    TradingError::Gateway(GatewayError::new(Some(400), Some(code), message))
  }
}

impl Default for PaperExchange {
  fn default() -> Self {
    Self::new()
  }
}

#[async_trait]
impl Exchange for PaperExchange {
  async fn exchange_info(&self) -> Result<ExchangeInfo, TradingError> {
    self.info_calls.fetch_add(1, Ordering::Relaxed);
    if let Some(err) = &self.info_failure {
      return Err(TradingError::Gateway(err.clone()));
    }
    Ok(ExchangeInfo { symbols: self.symbols.clone() })
  }

  async fn place_order(&mut self, intent: &OrderIntent) -> Result<SubmittedOrder, TradingError> {
    self.placed.push(intent.clone());
    if let Some(err) = self.placement_failures.get(&self.placed.len()) {
      return Err(TradingError::Gateway(err.clone()));
    }
    if !self.symbols.iter().any(|s| s.symbol == intent.symbol) {
      return Err(Self::rejection(-1121, "Invalid symbol."));
    }
    if intent.quantity <= Decimal::ZERO || intent.price <= Decimal::ZERO {
      return Err(Self::rejection(-1013, "Filter failure: LOT_SIZE"));
    }
    Ok(self.accept(intent))
  }

  async fn open_orders(&self, symbol: &str) -> Result<Vec<SubmittedOrder>, TradingError> {
    if self.listing_failures.contains(symbol) {
      return Err(TradingError::Gateway(GatewayError::new(Some(503), Some(-1001), "Internal error; unable to process your request.")));
    }
    Ok(self.open.get(symbol).cloned().unwrap_or_default())
  }

  async fn cancel_order(&mut self, symbol: &str, order_id: OrderId) -> Result<SubmittedOrder, TradingError> {
    if self.cancel_failures.contains(symbol) {
      return Err(Self::rejection(-2011, "Unknown order sent."));
    }
    let orders = self.open.get_mut(symbol).ok_or_else(|| Self::rejection(-2011, "Unknown order sent."))?;
    let index = orders
      .iter()
      .position(|o| o.order_id == order_id)
      .ok_or_else(|| Self::rejection(-2011, "Unknown order sent."))?;
    let mut order = orders.remove(index);
    order.status = OrderStatus::Canceled;
    Ok(order)
  }
}
