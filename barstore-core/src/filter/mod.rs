//! Field-scoped filters.
//!
//! A filter holds zero or more operator constraints on a single field. All
//! set operators apply together (AND). A filter with no operator set is
//! treated as if it were absent.

pub mod range;
pub mod string;

pub use range::RangeFilter;
pub use string::StringFilter;

use std::fmt;
use std::str::FromStr;

/// Shape of a field's filter: ordered (numbers, timestamps) or string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Range,
    String,
}

/// The fixed operator vocabulary, as spelled in `field.operator=value` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equals,
    NotEquals,
    In,
    NotIn,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    Specified,
    Contains,
    DoesNotContain,
}

impl Operator {
    pub const ALL: [Operator; 11] = [
        Operator::Equals,
        Operator::NotEquals,
        Operator::In,
        Operator::NotIn,
        Operator::GreaterThan,
        Operator::LessThan,
        Operator::GreaterThanOrEqual,
        Operator::LessThanOrEqual,
        Operator::Specified,
        Operator::Contains,
        Operator::DoesNotContain,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "notEquals",
            Operator::In => "in",
            Operator::NotIn => "notIn",
            Operator::GreaterThan => "greaterThan",
            Operator::LessThan => "lessThan",
            Operator::GreaterThanOrEqual => "greaterThanOrEqual",
            Operator::LessThanOrEqual => "lessThanOrEqual",
            Operator::Specified => "specified",
            Operator::Contains => "contains",
            Operator::DoesNotContain => "doesNotContain",
        }
    }

    /// Whether a filter of the given kind exposes this operator.
    pub fn supported_by(self, kind: FilterKind) -> bool {
        match self {
            Operator::GreaterThan
            | Operator::LessThan
            | Operator::GreaterThanOrEqual
            | Operator::LessThanOrEqual => kind == FilterKind::Range,
            Operator::Contains | Operator::DoesNotContain => kind == FilterKind::String,
            _ => true,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| format!("unknown operator '{s}'"))
    }
}

/// Writes `name=value` slots as `[a=1, b=2]`, skipping unset ones.
pub(crate) struct SlotWriter<'a, 'b> {
    f: &'a mut fmt::Formatter<'b>,
    first: bool,
}

impl<'a, 'b> SlotWriter<'a, 'b> {
    pub(crate) fn new(f: &'a mut fmt::Formatter<'b>) -> Result<Self, fmt::Error> {
        f.write_str("[")?;
        Ok(Self { f, first: true })
    }

    pub(crate) fn slot<T: fmt::Display>(&mut self, name: &str, value: Option<&T>) -> fmt::Result {
        let Some(value) = value else {
            return Ok(());
        };
        if !self.first {
            self.f.write_str(", ")?;
        }
        self.first = false;
        write!(self.f, "{name}={value}")
    }

    pub(crate) fn list<T: fmt::Display>(&mut self, name: &str, values: Option<&Vec<T>>) -> fmt::Result {
        let Some(values) = values else {
            return Ok(());
        };
        let joined = values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",");
        self.slot(name, Some(&joined))
    }

    pub(crate) fn finish(self) -> fmt::Result {
        self.f.write_str("]")
    }
}
