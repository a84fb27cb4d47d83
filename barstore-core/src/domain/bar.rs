//! The persisted stock bar row.

use super::ids::BarId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single symbol at a single instant.
///
/// `id` is absent until the bar has been persisted and never changes after
/// that. Every other field is optional so that presence itself can be
/// queried (`specified=true/false`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockBar {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BarId>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub open: Option<f64>,
    #[serde(default)]
    pub close: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub volume: Option<u64>,
}

impl StockBar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<BarId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    pub fn open(mut self, open: f64) -> Self {
        self.open = Some(open);
        self
    }

    pub fn close(mut self, close: f64) -> Self {
        self.close = Some(close);
        self
    }

    pub fn high(mut self, high: f64) -> Self {
        self.high = Some(high);
        self
    }

    pub fn low(mut self, low: f64) -> Self {
        self.low = Some(low);
        self
    }

    pub fn volume(mut self, volume: u64) -> Self {
        self.volume = Some(volume);
        self
    }

    /// True once storage has assigned an identity.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Returns true if any price field is missing, NaN or infinite.
    pub fn is_void(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .any(|p| p.map_or(true, |v| !v.is_finite()))
    }

    /// Name of the first price field holding NaN or an infinity. Missing
    /// prices are fine.
    pub fn non_finite_price(&self) -> Option<&'static str> {
        [
            ("open", self.open),
            ("close", self.close),
            ("high", self.high),
            ("low", self.low),
        ]
        .into_iter()
        .find(|(_, price)| price.is_some_and(|v| !v.is_finite()))
        .map(|(field, _)| field)
    }

    /// Basic OHLC sanity check: high >= low, high >= open, high >= close, etc.
    pub fn is_sane(&self) -> bool {
        let (Some(open), Some(high), Some(low), Some(close)) =
            (self.open, self.high, self.low, self.close)
        else {
            return false;
        };
        if self.is_void() {
            return false;
        }
        high >= low && high >= open && high >= close && low <= open && low <= close && open > 0.0
    }
}
