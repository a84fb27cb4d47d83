use serde::{Deserialize, Serialize};

/// Reference entry for a tradable ticker, as listed by the market data provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    pub full_name: String,
}

impl SymbolInfo {
    pub fn new(symbol: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            full_name: full_name.into(),
        }
    }
}
