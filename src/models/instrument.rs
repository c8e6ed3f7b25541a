use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// Exchange-wide instrument metadata (`GET /api/v3/exchangeInfo`)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ExchangeInfo {
    pub symbols: Vec<SymbolInfo>,
}

impl ExchangeInfo {
    pub fn symbol(&self, symbol: &str) -> Option<&SymbolInfo> {
        self.symbols.iter().find(|s| s.symbol == symbol)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub filters: Vec<InstrumentFilter>,
}

impl SymbolInfo {
    pub fn filter(&self, kind: FilterKind) -> Option<&InstrumentFilter> {
        self.filters.iter().find(|f| f.filter_type == kind.as_str())
    }
}

/// One entry of a symbol's `filters` array. Only `filterType` is typed; the
/// remaining fields stay as raw JSON because every filter kind carries its own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentFilter {
    pub filter_type: String,
    #[serde(flatten)]
    pub params: HashMap<String, Value>,
}

impl InstrumentFilter {
    pub fn new(filter_type: impl Into<String>) -> Self {
        InstrumentFilter {
            filter_type: filter_type.into(),
            params: HashMap::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), Value::String(value.into()));
        self
    }

    /// String-valued field, e.g. `tickSize`
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }
}

/// Filters the splitter reads precision from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// `PRICE_FILTER`, price tick size
    Price,
    /// `LOT_SIZE`, quantity step size
    LotSize,
}

impl FilterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::Price => "PRICE_FILTER",
            FilterKind::LotSize => "LOT_SIZE",
        }
    }

    /// Field holding the increment for this filter
    pub fn step_field(&self) -> &'static str {
        match self {
            FilterKind::Price => "tickSize",
            FilterKind::LotSize => "stepSize",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
