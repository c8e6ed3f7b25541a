/**
* filename : error
* author : HAMA
* date: 2025. 5. 8.
* description:
**/

use std::fmt;

use thiserror::Error;

/// Failure reported by the exchange gateway, in the shape the exchange returns it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayError {
    /// HTTP status of the response, `None` when no response arrived
    pub status_code: Option<u16>,
    /// Exchange-specific error code (Binance `code`)
    pub error_code: Option<i64>,
    pub message: String,
}

impl GatewayError {
    pub fn new(status_code: Option<u16>, error_code: Option<i64>, message: impl Into<String>) -> Self {
        GatewayError {
            status_code,
            error_code,
            message: message.into(),
        }
    }

    /// Failure before any exchange response was received
    pub fn transport(message: impl Into<String>) -> Self {
        GatewayError::new(None, None, message)
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = self.status_code.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string());
        let code = self.error_code.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string());
        write!(f, "status: {}, error code: {}, error message: {}", status, code, self.message)
    }
}

impl std::error::Error for GatewayError {}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TradingError {
    #[error("Exchange error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Precision unavailable: {filter}.{field} missing for {symbol}")]
    PrecisionUnavailable {
        symbol: String,
        filter: String,
        field: String,
    },

    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("Filter not found: {filter} for {symbol}")]
    FilterNotFound { symbol: String, filter: String },

    #[error("Constraint unsatisfiable: {0}")]
    ConstraintUnsatisfiable(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl TradingError {
    /// Exchange error code, when the failure came from the exchange
    pub fn error_code(&self) -> Option<i64> {
        match self {
            TradingError::Gateway(e) => e.error_code,
            _ => None,
        }
    }

    /// HTTP status of the failed exchange call, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            TradingError::Gateway(e) => e.status_code,
            _ => None,
        }
    }

    /// Collapse transport and decoding failures into the gateway shape.
    /// Errors that did not come from an exchange call are left as they are.
    pub fn into_gateway_shape(self) -> TradingError {
        match self {
            TradingError::ParseError(message) => TradingError::Gateway(GatewayError::transport(message)),
            other => other,
        }
    }
}

impl From<reqwest::Error> for TradingError {
    fn from(e: reqwest::Error) -> Self {
        let status = e.status().map(|s| s.as_u16());
        TradingError::Gateway(GatewayError::new(status, None, e.to_string()))
    }
}

impl From<serde_json::Error> for TradingError {
    fn from(e: serde_json::Error) -> Self {
        TradingError::ParseError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_display_matches_exchange_log_format() {
        let err = TradingError::Gateway(GatewayError::new(Some(400), Some(-1013), "Filter failure: LOT_SIZE"));
        assert_eq!(
            err.to_string(),
            "Exchange error: status: 400, error code: -1013, error message: Filter failure: LOT_SIZE"
        );
        assert_eq!(err.error_code(), Some(-1013));
        assert_eq!(err.status_code(), Some(400));
    }

    #[test]
    fn test_parse_error_normalized_to_gateway() {
        let err = TradingError::ParseError("expected value".into()).into_gateway_shape();
        assert_eq!(err, TradingError::Gateway(GatewayError::transport("expected value")));

        let untouched = TradingError::SymbolNotFound("XYZ".into()).into_gateway_shape();
        assert_eq!(untouched, TradingError::SymbolNotFound("XYZ".into()));
    }
}
