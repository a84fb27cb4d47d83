use super::SlotWriter;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Filter for ordered field types: ids, timestamps, prices and volumes.
///
/// Setting `greater_than_or_equal` and `less_than_or_equal` together expresses
/// a closed range. `specified` can be combined with any other operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RangeFilter<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equals: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_equals: Option<T>,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub in_list: Option<Vec<T>>,
    #[serde(rename = "notIn", skip_serializing_if = "Option::is_none")]
    pub not_in_list: Option<Vec<T>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greater_than: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub less_than: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub greater_than_or_equal: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub less_than_or_equal: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specified: Option<bool>,
}

impl<T> Default for RangeFilter<T> {
    fn default() -> Self {
        Self {
            equals: None,
            not_equals: None,
            in_list: None,
            not_in_list: None,
            greater_than: None,
            less_than: None,
            greater_than_or_equal: None,
            less_than_or_equal: None,
            specified: None,
        }
    }
}

impl<T> RangeFilter<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equals(mut self, value: T) -> Self {
        self.equals = Some(value);
        self
    }

    pub fn not_equals(mut self, value: T) -> Self {
        self.not_equals = Some(value);
        self
    }

    pub fn in_list(mut self, values: impl IntoIterator<Item = T>) -> Self {
        self.in_list = Some(values.into_iter().collect());
        self
    }

    pub fn not_in_list(mut self, values: impl IntoIterator<Item = T>) -> Self {
        self.not_in_list = Some(values.into_iter().collect());
        self
    }

    pub fn greater_than(mut self, value: T) -> Self {
        self.greater_than = Some(value);
        self
    }

    pub fn less_than(mut self, value: T) -> Self {
        self.less_than = Some(value);
        self
    }

    pub fn greater_than_or_equal(mut self, value: T) -> Self {
        self.greater_than_or_equal = Some(value);
        self
    }

    pub fn less_than_or_equal(mut self, value: T) -> Self {
        self.less_than_or_equal = Some(value);
        self
    }

    pub fn specified(mut self, specified: bool) -> Self {
        self.specified = Some(specified);
        self
    }

    /// True when no operator is set; such a filter constrains nothing.
    pub fn is_empty(&self) -> bool {
        self.equals.is_none()
            && self.not_equals.is_none()
            && self.in_list.is_none()
            && self.not_in_list.is_none()
            && self.greater_than.is_none()
            && self.less_than.is_none()
            && self.greater_than_or_equal.is_none()
            && self.less_than_or_equal.is_none()
            && self.specified.is_none()
    }
}

impl<T: fmt::Display> fmt::Display for RangeFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RangeFilter ")?;
        let mut w = SlotWriter::new(f)?;
        w.slot("equals", self.equals.as_ref())?;
        w.slot("notEquals", self.not_equals.as_ref())?;
        w.list("in", self.in_list.as_ref())?;
        w.list("notIn", self.not_in_list.as_ref())?;
        w.slot("greaterThan", self.greater_than.as_ref())?;
        w.slot("lessThan", self.less_than.as_ref())?;
        w.slot("greaterThanOrEqual", self.greater_than_or_equal.as_ref())?;
        w.slot("lessThanOrEqual", self.less_than_or_equal.as_ref())?;
        w.slot("specified", self.specified.as_ref())?;
        w.finish()
    }
}
