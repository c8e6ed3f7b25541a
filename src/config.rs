/**
* filename : config
* author : HAMA
* date: 2025. 5. 8.
* description:
**/

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::TradingError;
use crate::exchange::binance_spot::{MAINNET_URL, TESTNET_URL};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub exchange: ExchangeConfig,
    pub splitter: SplitterConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct ExchangeConfig {
    pub name: String,
    pub testnet: bool,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    pub test_api_key: Option<String>,
    pub test_api_secret: Option<String>,
    /// Overrides the network's default REST URL
    pub base_url: Option<String>,
    pub recv_window: u64,
    pub timeout_ms: u64,
    /// Run against the in-memory paper exchange instead of Binance
    pub use_paper: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SplitterConfig {
    pub symbol: String,
    /// Cap on redraws in every rejection-sampling loop
    pub max_attempts: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
}

impl Config {
    /// Load configuration from `config.json` if present, then apply environment overrides.
    /// A `.env` file in the working directory is read first.
    pub fn load() -> Result<Self, TradingError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(TradingError::ConfigError(format!("Failed to read .env file: {}", e)));
            }
        }

        let config_path = Path::new("config.json");

        let mut cfg = if config_path.exists() {
            let mut file = File::open(config_path)
                .map_err(|e| TradingError::ConfigError(format!("Failed to open config file: {}", e)))?;

            let mut contents = String::new();
            file.read_to_string(&mut contents)
                .map_err(|e| TradingError::ConfigError(format!("Failed to read config file: {}", e)))?;

            serde_json::from_str::<Config>(&contents)
                .map_err(|e| TradingError::ConfigError(format!("Failed to parse config file: {}", e)))?
        } else {
            Config::default()
        };

        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(cfg)
    }

    /// Apply overrides for sensitive/runtime fields. `lookup` is `std::env::var` outside tests.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), TradingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(v) = get("BINANCE_TESTNET") { self.exchange.testnet = parse_flag("BINANCE_TESTNET", &v)?; }
        if let Some(v) = get("BINANCE_API_KEY") { self.exchange.api_key = Some(v); }
        if let Some(v) = get("BINANCE_SECRET_KEY") { self.exchange.api_secret = Some(v); }
        if let Some(v) = get("BINANCE_TEST_API_KEY") { self.exchange.test_api_key = Some(v); }
        if let Some(v) = get("BINANCE_TEST_SECRET_KEY") { self.exchange.test_api_secret = Some(v); }
        if let Some(v) = get("EXCHANGE_BASE_URL") { self.exchange.base_url = Some(v); }
        if let Some(v) = get("USE_PAPER") { self.exchange.use_paper = parse_flag("USE_PAPER", &v)?; }
        if let Some(v) = get("SPLITTER_SYMBOL") { self.splitter.symbol = v; }
        if let Some(v) = get("SPLITTER_MAX_ATTEMPTS") {
            self.splitter.max_attempts = v.parse()
                .map_err(|_| TradingError::ConfigError(format!("SPLITTER_MAX_ATTEMPTS is not a number: {}", v)))?;
        }
        if let Some(v) = get("RUST_LOG") { self.logging.level = v; }

        Ok(())
    }
}

impl ExchangeConfig {
    pub fn rest_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.clone(),
            None if self.testnet => TESTNET_URL.to_string(),
            None => MAINNET_URL.to_string(),
        }
    }

    /// API key and secret of the selected network
    pub fn active_credentials(&self) -> Result<(String, String), TradingError> {
        let (key, secret, network) = if self.testnet {
            (&self.test_api_key, &self.test_api_secret, "testnet")
        } else {
            (&self.api_key, &self.api_secret, "production")
        };

        match (key, secret) {
            (Some(k), Some(s)) => Ok((k.clone(), s.clone())),
            _ => Err(TradingError::ConfigError(format!("missing {} API credentials", network))),
        }
    }
}

impl std::fmt::Debug for ExchangeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let masked = |v: &Option<String>| v.as_ref().map(|_| "***");
        f.debug_struct("ExchangeConfig")
            .field("name", &self.name)
            .field("testnet", &self.testnet)
            .field("api_key", &masked(&self.api_key))
            .field("api_secret", &masked(&self.api_secret))
            .field("test_api_key", &masked(&self.test_api_key))
            .field("test_api_secret", &masked(&self.test_api_secret))
            .field("base_url", &self.base_url)
            .field("recv_window", &self.recv_window)
            .field("timeout_ms", &self.timeout_ms)
            .field("use_paper", &self.use_paper)
            .finish()
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, TradingError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(TradingError::ConfigError(format!("{} must be a boolean, got {}", key, value))),
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            exchange: ExchangeConfig {
                name: "Binance".to_string(),
                testnet: true,
                api_key: None,
                api_secret: None,
                test_api_key: None,
                test_api_secret: None,
                base_url: None,
                recv_window: 5000,
                timeout_ms: 10_000,
                use_paper: false,
            },
            splitter: SplitterConfig {
                symbol: "BNBBUSD".to_string(),
                max_attempts: 100_000,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}
