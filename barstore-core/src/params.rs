//! `field.operator=value` parameter parsing.
//!
//! Turns request-style pairs such as `symbol.equals=AAPL` or
//! `open.in=1.5,2.5` into a [`BarCriteria`], and `page`/`size`/`sort` into a
//! [`PageRequest`]. Values are expected already URL-decoded.

use crate::criteria::{BarCriteria, BarField};
use crate::domain::BarId;
use crate::filter::{Operator, RangeFilter, StringFilter};
use crate::query::{Direction, PageRequest, Sort};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::str::FromStr;
use thiserror::Error;

/// Keys owned by paging; the criteria parser skips them.
pub const RESERVED_KEYS: [&str; 3] = ["page", "size", "sort"];

/// Rejected request parameters. Raised before any storage access.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("malformed parameter '{0}', expected key=value")]
    Malformed(String),

    #[error("parameter '{0}' has no operator, expected field.operator")]
    MissingOperator(String),

    #[error("unknown field '{0}'")]
    UnknownField(String),

    #[error("unknown operator '{operator}' in '{param}'")]
    UnknownOperator { param: String, operator: String },

    #[error("operator '{operator}' is not supported on field '{field}'")]
    UnsupportedOperator { field: BarField, operator: Operator },

    #[error("invalid value '{value}' for '{param}': {reason}")]
    InvalidValue {
        param: String,
        value: String,
        reason: String,
    },

    #[error("parameter '{0}' given more than once")]
    Duplicate(String),
}

impl ParamError {
    fn invalid(param: &str, value: &str, reason: impl Into<String>) -> Self {
        ParamError::InvalidValue {
            param: param.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Splits an already-decoded query string into key/value pairs. Empty
/// segments (`a=1&&b=2`, a trailing `&`) are skipped.
pub fn split_query(query: &str) -> Result<Vec<(&str, &str)>, ParamError> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(split_param)
        .collect()
}

/// Splits one `key=value` parameter at the first `=`.
pub fn split_param(param: &str) -> Result<(&str, &str), ParamError> {
    param
        .split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| ParamError::Malformed(param.to_string()))
}

impl BarCriteria {
    /// Builds criteria from `field.operator=value` pairs.
    ///
    /// Reserved paging keys are ignored. Every other key must name a known
    /// field and an operator that field's filter supports, at most once.
    pub fn from_params<'a>(
        params: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self, ParamError> {
        let mut criteria = BarCriteria::new();
        let mut seen = HashSet::new();

        for (key, value) in params {
            if RESERVED_KEYS.contains(&key) {
                continue;
            }
            let (field, operator) = parse_key(key)?;
            if !seen.insert((field, operator)) {
                return Err(ParamError::Duplicate(key.to_string()));
            }
            criteria.apply(field, operator, key, value)?;
        }

        Ok(criteria)
    }

    /// [`BarCriteria::from_params`] over an already-decoded query string,
    /// e.g. `symbol.equals=AAPL&volume.greaterThan=1000`.
    pub fn from_query_str(query: &str) -> Result<Self, ParamError> {
        Self::from_params(split_query(query)?)
    }

    fn apply(
        &mut self,
        field: BarField,
        operator: Operator,
        param: &str,
        raw: &str,
    ) -> Result<(), ParamError> {
        let slot = Slot {
            field,
            operator,
            param,
            raw,
        };
        match field {
            BarField::Id => slot.apply_range(self.id.get_or_insert_with(RangeFilter::new), parse_id),
            BarField::Symbol => slot.apply_string(self.symbol.get_or_insert_with(StringFilter::new)),
            BarField::Date => slot.apply_range(self.date.get_or_insert_with(RangeFilter::new), parse_date),
            BarField::Open => slot.apply_range(self.open.get_or_insert_with(RangeFilter::new), parse_price),
            BarField::Close => slot.apply_range(self.close.get_or_insert_with(RangeFilter::new), parse_price),
            BarField::High => slot.apply_range(self.high.get_or_insert_with(RangeFilter::new), parse_price),
            BarField::Low => slot.apply_range(self.low.get_or_insert_with(RangeFilter::new), parse_price),
            BarField::Volume => slot.apply_range(self.volume.get_or_insert_with(RangeFilter::new), parse_volume),
        }
    }
}

fn parse_key(key: &str) -> Result<(BarField, Operator), ParamError> {
    let (field, operator) = key
        .split_once('.')
        .ok_or_else(|| ParamError::MissingOperator(key.to_string()))?;
    let field = BarField::from_str(field).map_err(|_| ParamError::UnknownField(field.to_string()))?;
    let operator = Operator::from_str(operator).map_err(|_| ParamError::UnknownOperator {
        param: key.to_string(),
        operator: operator.to_string(),
    })?;
    if !operator.supported_by(field.kind()) {
        return Err(ParamError::UnsupportedOperator { field, operator });
    }
    Ok((field, operator))
}

/// One parameter being written into a filter slot.
struct Slot<'a> {
    field: BarField,
    operator: Operator,
    param: &'a str,
    raw: &'a str,
}

impl Slot<'_> {
    fn value<T>(&self, parse: fn(&str) -> Result<T, String>) -> Result<T, ParamError> {
        parse(self.raw).map_err(|reason| ParamError::invalid(self.param, self.raw, reason))
    }

    fn list<T>(&self, parse: fn(&str) -> Result<T, String>) -> Result<Vec<T>, ParamError> {
        self.raw
            .split(',')
            .map(|item| {
                if item.is_empty() {
                    Err(ParamError::invalid(self.param, self.raw, "empty list item"))
                } else {
                    parse(item).map_err(|reason| ParamError::invalid(self.param, self.raw, reason))
                }
            })
            .collect()
    }

    fn specified(&self) -> Result<bool, ParamError> {
        self.value(|s| s.parse::<bool>().map_err(|_| "expected true or false".to_string()))
    }

    fn apply_range<T>(
        &self,
        filter: &mut RangeFilter<T>,
        parse: fn(&str) -> Result<T, String>,
    ) -> Result<(), ParamError> {
        match self.operator {
            Operator::Equals => filter.equals = Some(self.value(parse)?),
            Operator::NotEquals => filter.not_equals = Some(self.value(parse)?),
            Operator::In => filter.in_list = Some(self.list(parse)?),
            Operator::NotIn => filter.not_in_list = Some(self.list(parse)?),
            Operator::GreaterThan => filter.greater_than = Some(self.value(parse)?),
            Operator::LessThan => filter.less_than = Some(self.value(parse)?),
            Operator::GreaterThanOrEqual => filter.greater_than_or_equal = Some(self.value(parse)?),
            Operator::LessThanOrEqual => filter.less_than_or_equal = Some(self.value(parse)?),
            Operator::Specified => filter.specified = Some(self.specified()?),
            Operator::Contains | Operator::DoesNotContain => return Err(self.unsupported()),
        }
        Ok(())
    }

    fn apply_string(&self, filter: &mut StringFilter) -> Result<(), ParamError> {
        let text = |s: &str| -> Result<String, String> { Ok(s.to_string()) };
        match self.operator {
            Operator::Equals => filter.equals = Some(self.raw.to_string()),
            Operator::NotEquals => filter.not_equals = Some(self.raw.to_string()),
            Operator::In => filter.in_list = Some(self.list(text)?),
            Operator::NotIn => filter.not_in_list = Some(self.list(text)?),
            Operator::Contains => filter.contains = Some(self.raw.to_string()),
            Operator::DoesNotContain => filter.does_not_contain = Some(self.raw.to_string()),
            Operator::Specified => filter.specified = Some(self.specified()?),
            Operator::GreaterThan
            | Operator::LessThan
            | Operator::GreaterThanOrEqual
            | Operator::LessThanOrEqual => return Err(self.unsupported()),
        }
        Ok(())
    }

    fn unsupported(&self) -> ParamError {
        ParamError::UnsupportedOperator {
            field: self.field,
            operator: self.operator,
        }
    }
}

fn parse_id(s: &str) -> Result<BarId, String> {
    s.parse::<u64>()
        .map(BarId)
        .map_err(|e| format!("expected an unsigned integer ({e})"))
}

fn parse_volume(s: &str) -> Result<u64, String> {
    s.parse::<u64>()
        .map_err(|e| format!("expected an unsigned integer ({e})"))
}

fn parse_price(s: &str) -> Result<f64, String> {
    let value = s
        .parse::<f64>()
        .map_err(|e| format!("expected a decimal number ({e})"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err("expected a finite decimal number".to_string())
    }
}

fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("expected an RFC 3339 timestamp ({e})"))
}

impl FromStr for Sort {
    type Err = ParamError;

    /// `field` or `field,asc` / `field,desc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.split_once(',') {
            Some((field, direction)) => (field, Some(direction)),
            None => (s, None),
        };
        let field =
            BarField::from_str(field).map_err(|_| ParamError::UnknownField(field.to_string()))?;
        let direction = match direction.map(str::to_ascii_lowercase).as_deref() {
            None | Some("asc") => Direction::Asc,
            Some("desc") => Direction::Desc,
            Some(_) => return Err(ParamError::invalid("sort", s, "expected asc or desc")),
        };
        Ok(Sort { field, direction })
    }
}

impl PageRequest {
    /// Reads `page`, `size` and `sort`, ignoring every other key. `page` is
    /// zero-based; a missing `size` means `default_size` and a larger one is
    /// capped at `max_size`.
    pub fn from_params<'a>(
        params: impl IntoIterator<Item = (&'a str, &'a str)>,
        default_size: usize,
        max_size: usize,
    ) -> Result<Self, ParamError> {
        let mut page = None;
        let mut size = None;
        let mut sort = None;

        for (key, value) in params {
            match key {
                "page" => {
                    let parsed = value
                        .parse::<usize>()
                        .map_err(|_| ParamError::invalid(key, value, "expected a page number"))?;
                    if page.replace(parsed).is_some() {
                        return Err(ParamError::Duplicate(key.to_string()));
                    }
                }
                "size" => {
                    let parsed = value
                        .parse::<usize>()
                        .map_err(|_| ParamError::invalid(key, value, "expected a page size"))?;
                    if parsed == 0 {
                        return Err(ParamError::invalid(key, value, "page size must be positive"));
                    }
                    if size.replace(parsed).is_some() {
                        return Err(ParamError::Duplicate(key.to_string()));
                    }
                }
                "sort" => {
                    if sort.replace(value.parse::<Sort>()?).is_some() {
                        return Err(ParamError::Duplicate(key.to_string()));
                    }
                }
                _ => {}
            }
        }

        Ok(PageRequest {
            page: page.unwrap_or(0),
            size: size.unwrap_or(default_size).min(max_size),
            sort,
        })
    }
}
