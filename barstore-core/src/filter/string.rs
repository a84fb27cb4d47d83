use super::SlotWriter;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Filter for string fields. No ordering operators; adds substring matching.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StringFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equals: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not_equals: Option<String>,
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub in_list: Option<Vec<String>>,
    #[serde(rename = "notIn", skip_serializing_if = "Option::is_none")]
    pub not_in_list: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub does_not_contain: Option<String>,
}

impl StringFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equals(mut self, value: impl Into<String>) -> Self {
        self.equals = Some(value.into());
        self
    }

    pub fn not_equals(mut self, value: impl Into<String>) -> Self {
        self.not_equals = Some(value.into());
        self
    }

    pub fn in_list<S: Into<String>>(mut self, values: impl IntoIterator<Item = S>) -> Self {
        self.in_list = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn not_in_list<S: Into<String>>(mut self, values: impl IntoIterator<Item = S>) -> Self {
        self.not_in_list = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn specified(mut self, specified: bool) -> Self {
        self.specified = Some(specified);
        self
    }

    pub fn contains(mut self, needle: impl Into<String>) -> Self {
        self.contains = Some(needle.into());
        self
    }

    pub fn does_not_contain(mut self, needle: impl Into<String>) -> Self {
        self.does_not_contain = Some(needle.into());
        self
    }

    /// True when no operator is set; such a filter constrains nothing.
    pub fn is_empty(&self) -> bool {
        self.equals.is_none()
            && self.not_equals.is_none()
            && self.in_list.is_none()
            && self.not_in_list.is_none()
            && self.specified.is_none()
            && self.contains.is_none()
            && self.does_not_contain.is_none()
    }
}

impl fmt::Display for StringFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StringFilter ")?;
        let mut w = SlotWriter::new(f)?;
        w.slot("equals", self.equals.as_ref())?;
        w.slot("notEquals", self.not_equals.as_ref())?;
        w.list("in", self.in_list.as_ref())?;
        w.list("notIn", self.not_in_list.as_ref())?;
        w.slot("specified", self.specified.as_ref())?;
        w.slot("contains", self.contains.as_ref())?;
        w.slot("doesNotContain", self.does_not_contain.as_ref())?;
        w.finish()
    }
}
