use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sha2::Sha256;
use std::time::Duration;

use crate::config::ExchangeConfig;
use crate::error::{GatewayError, TradingError};
use crate::exchange::traits::Exchange;
use crate::models::instrument::ExchangeInfo;
use crate::models::order::{OrderId, OrderIntent, SubmittedOrder};

type HmacSha256 = Hmac<Sha256>;

pub const MAINNET_URL: &str = "https://api.binance.com";
pub const TESTNET_URL: &str = "https://testnet.binance.vision";

#[derive(Debug, Deserialize)]
struct BinanceError {
  code: i64,
  msg: String,
}

/// Binance Spot REST connector
pub struct BinanceSpotExchange {
  base_url: String,
  api_key: String,
  api_secret: String,
  recv_window: u64,
  http: reqwest::Client,
}

impl BinanceSpotExchange {
  pub fn new(
    base_url: impl Into<String>,
    api_key: impl Into<String>,
    api_secret: impl Into<String>,
    recv_window: u64,
    timeout: Duration,
  ) -> Result<Self, TradingError> {
    let http = reqwest::Client::builder()
      .timeout(timeout)
      .build()
      .map_err(|e| TradingError::ConfigError(format!("failed to build HTTP client: {}", e)))?;

    Ok(BinanceSpotExchange {
      base_url: base_url.into(),
      api_key: api_key.into(),
      api_secret: api_secret.into(),
      recv_window,
      http,
    })
  }

  /// Connector for the network selected in the configuration
  pub fn from_config(config: &ExchangeConfig) -> Result<Self, TradingError> {
    let (api_key, api_secret) = config.active_credentials()?;
    Self::new(
      config.rest_base_url(),
      api_key,
      api_secret,
      config.recv_window,
      Duration::from_millis(config.timeout_ms),
    )
  }

  fn timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
  }

  fn sign(&self, query: &str) -> Result<String, TradingError> {
    let mut mac = HmacSha256::new_from_slice(self.api_secret.as_bytes())
      .map_err(|e| TradingError::ConfigError(format!("invalid API secret: {}", e)))?;
    mac.update(query.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
  }

  fn build_query(params: &[(&str, String)]) -> String {
    params
      .iter()
      .map(|(k, v)| format!("{}={}", k, v))
      .collect::<Vec<_>>()
      .join("&")
  }

  /// Query string with timestamp, recvWindow and signature appended
  fn signed_query(&self, params: &[(&str, String)]) -> Result<String, TradingError> {
    let mut all = params.to_vec();
    all.push(("recvWindow", self.recv_window.to_string()));
    all.push(("timestamp", Self::timestamp_ms().to_string()));
    let query = Self::build_query(&all);
    let signature = self.sign(&query)?;
    Ok(format!("{}&signature={}", query, signature))
  }

  async fn public_get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, TradingError> {
    let url = format!("{}{}", self.base_url, endpoint);
    log::debug!("GET {}", url);
    let res = self.http.get(url).send().await?;
    Self::handle_response(res).await
  }

  async fn signed_request<T: DeserializeOwned>(
    &self,
    method: reqwest::Method,
    endpoint: &str,
    params: &[(&str, String)],
  ) -> Result<T, TradingError> {
    let query = self.signed_query(params)?;
    let url = format!("{}{}?{}", self.base_url, endpoint, query);
    log::debug!("{} (signed) {}", method, endpoint);
    let res = self.http
      .request(method, url)
      .header("X-MBX-APIKEY", &self.api_key)
      .send()
      .await?;
    Self::handle_response(res).await
  }

  async fn handle_response<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, TradingError> {
    let status = res.status();
    let body = res.text().await?;

    if status.is_success() {
      return serde_json::from_str(&body).map_err(|e| {
        log::error!("Failed to parse response: {} - Body: {}", e, body);
        TradingError::ParseError(e.to_string())
      });
    }

    Err(Self::decode_error(status.as_u16(), &body))
  }

  /// Binance rejects with `{"code": -1013, "msg": "..."}`; anything else keeps the raw body
  fn decode_error(status: u16, body: &str) -> TradingError {
    let err = match serde_json::from_str::<BinanceError>(body) {
      Ok(e) => GatewayError::new(Some(status), Some(e.code), e.msg),
      Err(_) => GatewayError::new(Some(status), None, body.to_string()),
    };
    TradingError::Gateway(err)
  }
}

#[async_trait]
impl Exchange for BinanceSpotExchange {
  async fn exchange_info(&self) -> Result<ExchangeInfo, TradingError> {
    self.public_get("/api/v3/exchangeInfo").await
  }

  async fn place_order(&mut self, intent: &OrderIntent) -> Result<SubmittedOrder, TradingError> {
    let params = [
      ("symbol", intent.symbol.clone()),
      ("side", intent.side.as_str().to_string()),
      ("type", intent.order_type.as_str().to_string()),
      ("timeInForce", intent.time_in_force.as_str().to_string()),
      ("quantity", intent.quantity.normalize().to_string()),
      ("price", intent.price.normalize().to_string()),
    ];
    self.signed_request(reqwest::Method::POST, "/api/v3/order", &params).await
  }

  async fn open_orders(&self, symbol: &str) -> Result<Vec<SubmittedOrder>, TradingError> {
    let params = [("symbol", symbol.to_string())];
    self.signed_request(reqwest::Method::GET, "/api/v3/openOrders", &params).await
  }

  async fn cancel_order(&mut self, symbol: &str, order_id: OrderId) -> Result<SubmittedOrder, TradingError> {
    let params = [("symbol", symbol.to_string()), ("orderId", order_id.to_string())];
    self.signed_request(reqwest::Method::DELETE, "/api/v3/order", &params).await
  }
}
