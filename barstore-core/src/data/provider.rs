//! Market data provider trait and structured error types.
//!
//! `MarketDataProvider` abstracts over the chart source so ingest can run
//! against a live HTTP API or a fixture in tests.

use crate::domain::SymbolInfo;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One daily chart entry as delivered by a provider, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartRecord {
    pub date: Option<NaiveDate>,
    pub open: Option<f64>,
    pub close: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: Option<u64>,
}

#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("invalid client setup: {0}")]
    ClientSetup(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Source of daily charts and the tradable symbol list.
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Daily chart for `symbol` over a provider range such as `1m`, `1y`, `5y`.
    fn fetch_chart(&self, symbol: &str, range: &str) -> Result<Vec<ChartRecord>, DataError>;

    /// Every symbol the provider knows, with its full name.
    fn list_symbols(&self) -> Result<Vec<SymbolInfo>, DataError>;
}
