//! Per-request query criteria: one optional filter slot per queryable bar field.

use crate::domain::BarId;
use crate::filter::{FilterKind, RangeFilter, StringFilter};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The queryable fields of a [`StockBar`](crate::domain::StockBar), in compile order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarField {
    Id,
    Symbol,
    Date,
    Open,
    Close,
    High,
    Low,
    Volume,
}

impl BarField {
    /// Fixed field order. Compiled predicates list their clauses in this order.
    pub const ALL: [BarField; 8] = [
        BarField::Id,
        BarField::Symbol,
        BarField::Date,
        BarField::Open,
        BarField::Close,
        BarField::High,
        BarField::Low,
        BarField::Volume,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BarField::Id => "id",
            BarField::Symbol => "symbol",
            BarField::Date => "date",
            BarField::Open => "open",
            BarField::Close => "close",
            BarField::High => "high",
            BarField::Low => "low",
            BarField::Volume => "volume",
        }
    }

    pub fn kind(self) -> FilterKind {
        match self {
            BarField::Symbol => FilterKind::String,
            _ => FilterKind::Range,
        }
    }
}

impl fmt::Display for BarField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BarField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BarField::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| format!("unknown field '{s}'"))
    }
}

/// Filtering options for stock bar queries, e.g. built from
/// `?id.greaterThan=5&symbol.contains=AA&open.specified=false`.
///
/// Request-scoped and read-only once built. `clone()` is a deep copy: every
/// held filter is copied, so a clone can be changed without touching the
/// original.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RangeFilter<BarId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<StringFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<RangeFilter<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<RangeFilter<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub close: Option<RangeFilter<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<RangeFilter<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<RangeFilter<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<RangeFilter<u64>>,
}

impl BarCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, filter: RangeFilter<BarId>) -> Self {
        self.id = Some(filter);
        self
    }

    pub fn symbol(mut self, filter: StringFilter) -> Self {
        self.symbol = Some(filter);
        self
    }

    pub fn date(mut self, filter: RangeFilter<DateTime<Utc>>) -> Self {
        self.date = Some(filter);
        self
    }

    pub fn open(mut self, filter: RangeFilter<f64>) -> Self {
        self.open = Some(filter);
        self
    }

    pub fn close(mut self, filter: RangeFilter<f64>) -> Self {
        self.close = Some(filter);
        self
    }

    pub fn high(mut self, filter: RangeFilter<f64>) -> Self {
        self.high = Some(filter);
        self
    }

    pub fn low(mut self, filter: RangeFilter<f64>) -> Self {
        self.low = Some(filter);
        self
    }

    pub fn volume(mut self, filter: RangeFilter<u64>) -> Self {
        self.volume = Some(filter);
        self
    }

    /// Whether the slot for `field` holds a filter with at least one operator set.
    pub fn constrains(&self, field: BarField) -> bool {
        match field {
            BarField::Id => self.id.as_ref().is_some_and(|f| !f.is_empty()),
            BarField::Symbol => self.symbol.as_ref().is_some_and(|f| !f.is_empty()),
            BarField::Date => self.date.as_ref().is_some_and(|f| !f.is_empty()),
            BarField::Open => self.open.as_ref().is_some_and(|f| !f.is_empty()),
            BarField::Close => self.close.as_ref().is_some_and(|f| !f.is_empty()),
            BarField::High => self.high.as_ref().is_some_and(|f| !f.is_empty()),
            BarField::Low => self.low.as_ref().is_some_and(|f| !f.is_empty()),
            BarField::Volume => self.volume.as_ref().is_some_and(|f| !f.is_empty()),
        }
    }

    /// Fields that actually constrain the query, in compile order.
    pub fn constrained_fields(&self) -> Vec<BarField> {
        BarField::ALL
            .into_iter()
            .filter(|field| self.constrains(*field))
            .collect()
    }

    /// True when no slot constrains anything; compiles to the always-true predicate.
    pub fn is_empty(&self) -> bool {
        self.constrained_fields().is_empty()
    }
}

impl fmt::Display for BarCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn slot<T: fmt::Display>(
            f: &mut fmt::Formatter<'_>,
            name: &str,
            filter: Option<&T>,
        ) -> fmt::Result {
            match filter {
                Some(filter) => write!(f, "{name}={filter}, "),
                None => Ok(()),
            }
        }

        f.write_str("BarCriteria{")?;
        slot(f, "id", self.id.as_ref())?;
        slot(f, "symbol", self.symbol.as_ref())?;
        slot(f, "date", self.date.as_ref())?;
        slot(f, "open", self.open.as_ref())?;
        slot(f, "close", self.close.as_ref())?;
        slot(f, "high", self.high.as_ref())?;
        slot(f, "low", self.low.as_ref())?;
        slot(f, "volume", self.volume.as_ref())?;
        f.write_str("}")
    }
}
