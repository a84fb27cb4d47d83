//! Typed field values and the field accessor table.

use crate::criteria::BarField;
use crate::domain::{BarId, StockBar};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// A single field value, as read from a bar or carried by a predicate clause.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Unsigned(u64),
    Decimal(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Orders two values of the same type. Values of different types, and
    /// NaN decimals, are unordered.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Unsigned(a), Value::Unsigned(b)) => Some(a.cmp(b)),
            (Value::Decimal(a), Value::Decimal(b)) => a.partial_cmp(b),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unsigned(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Timestamp(t) => write!(f, "'{}'", t.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        }
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Unsigned(v)
    }
}

impl From<BarId> for Value {
    fn from(id: BarId) -> Self {
        Value::Unsigned(id.0)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Decimal(v)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Timestamp(t)
    }
}

impl BarField {
    /// Reads this field from a bar. `None` is a null column.
    pub fn value_of(self, bar: &StockBar) -> Option<Value> {
        match self {
            BarField::Id => bar.id.map(Value::from),
            BarField::Symbol => bar.symbol.as_deref().map(Value::from),
            BarField::Date => bar.date.map(Value::from),
            BarField::Open => bar.open.map(Value::from),
            BarField::Close => bar.close.map(Value::from),
            BarField::High => bar.high.map(Value::from),
            BarField::Low => bar.low.map(Value::from),
            BarField::Volume => bar.volume.map(Value::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn compare_same_type() {
        assert_eq!(Value::from(1u64).compare(&Value::from(2u64)), Some(Ordering::Less));
        assert_eq!(Value::from(2.5).compare(&Value::from(2.5)), Some(Ordering::Equal));
        assert_eq!(Value::from("b").compare(&Value::from("a")), Some(Ordering::Greater));
    }

    #[test]
    fn mixed_types_are_unordered() {
        assert_eq!(Value::from(1u64).compare(&Value::from(1.0)), None);
        assert_eq!(Value::from(f64::NAN).compare(&Value::from(1.0)), None);
    }

    #[test]
    fn timestamps_compare_by_instant() {
        let earlier = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 1).unwrap();
        assert_eq!(
            Value::from(earlier).compare(&Value::from(later)),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn value_of_covers_every_field() {
        let bar = StockBar::new()
            .id(1)
            .symbol("AAPL")
            .date(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap())
            .open(1.0)
            .close(2.0)
            .high(3.0)
            .low(0.5)
            .volume(10);
        for field in BarField::ALL {
            assert!(field.value_of(&bar).is_some(), "{field} should be readable");
            assert!(field.value_of(&StockBar::new()).is_none(), "{field} should be null");
        }
        assert_eq!(BarField::Close.value_of(&bar), Some(Value::Decimal(2.0)));
        assert_eq!(BarField::Id.value_of(&bar), Some(Value::Unsigned(1)));
    }

    #[test]
    fn display_quotes_text_and_timestamps() {
        assert_eq!(Value::from("O'Neil").to_string(), "'O''Neil'");
        let t = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(Value::from(t).to_string(), "'2020-01-01T00:00:00Z'");
    }
}
