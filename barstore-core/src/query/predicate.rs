//! Composite predicate over stock bars: a flat conjunction of field clauses.
//!
//! The empty conjunction is the always-true predicate. Clauses are evaluated
//! with relational NULL semantics: every value comparison is false on a null
//! field, and only `IsNull` matches one.

use super::value::Value;
use crate::criteria::BarField;
use crate::domain::StockBar;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// One comparison against a single field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", content = "value", rename_all = "camelCase")]
pub enum Condition {
    IsNull,
    IsNotNull,
    Equals(Value),
    NotEquals(Value),
    In(Vec<Value>),
    NotIn(Vec<Value>),
    GreaterThan(Value),
    LessThan(Value),
    GreaterThanOrEqual(Value),
    LessThanOrEqual(Value),
    Contains(String),
    DoesNotContain(String),
}

impl Condition {
    /// Evaluates the condition against a column value (`None` = null).
    pub fn test(&self, value: Option<&Value>) -> bool {
        match self {
            Condition::IsNull => value.is_none(),
            Condition::IsNotNull => value.is_some(),
            Condition::Equals(expected) => value == Some(expected),
            Condition::NotEquals(expected) => {
                value.is_some_and(|v| ordered(v, expected, |o| o != Ordering::Equal))
            }
            Condition::In(set) => value.is_some_and(|v| set.contains(v)),
            Condition::NotIn(set) => value.is_some_and(|v| {
                set.iter()
                    .all(|candidate| ordered(v, candidate, |o| o != Ordering::Equal))
            }),
            Condition::GreaterThan(bound) => {
                value.is_some_and(|v| ordered(v, bound, |o| o == Ordering::Greater))
            }
            Condition::LessThan(bound) => {
                value.is_some_and(|v| ordered(v, bound, |o| o == Ordering::Less))
            }
            Condition::GreaterThanOrEqual(bound) => {
                value.is_some_and(|v| ordered(v, bound, |o| o != Ordering::Less))
            }
            Condition::LessThanOrEqual(bound) => {
                value.is_some_and(|v| ordered(v, bound, |o| o != Ordering::Greater))
            }
            Condition::Contains(needle) => value
                .and_then(Value::as_text)
                .is_some_and(|s| s.contains(needle.as_str())),
            Condition::DoesNotContain(needle) => value
                .and_then(Value::as_text)
                .is_some_and(|s| !s.contains(needle.as_str())),
        }
    }
}

/// Unordered pairs (type mismatch, NaN) never satisfy a comparison.
fn ordered(value: &Value, other: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    value.compare(other).is_some_and(accept)
}

/// A condition bound to the field it reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Clause {
    pub field: BarField,
    pub condition: Condition,
}

impl Clause {
    pub fn new(field: BarField, condition: Condition) -> Self {
        Self { field, condition }
    }

    pub fn matches(&self, bar: &StockBar) -> bool {
        self.condition.test(self.field.value_of(bar).as_ref())
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.field.name();
        match &self.condition {
            Condition::IsNull => write!(f, "{field} IS NULL"),
            Condition::IsNotNull => write!(f, "{field} IS NOT NULL"),
            Condition::Equals(v) => write!(f, "{field} = {v}"),
            Condition::NotEquals(v) => write!(f, "{field} <> {v}"),
            Condition::In(set) => write!(f, "{field} IN ({})", join(set)),
            Condition::NotIn(set) => write!(f, "{field} NOT IN ({})", join(set)),
            Condition::GreaterThan(v) => write!(f, "{field} > {v}"),
            Condition::LessThan(v) => write!(f, "{field} < {v}"),
            Condition::GreaterThanOrEqual(v) => write!(f, "{field} >= {v}"),
            Condition::LessThanOrEqual(v) => write!(f, "{field} <= {v}"),
            Condition::Contains(s) => write!(f, "{field} LIKE {}", Value::from(format!("%{s}%"))),
            Condition::DoesNotContain(s) => {
                write!(f, "{field} NOT LIKE {}", Value::from(format!("%{s}%")))
            }
        }
    }
}

fn join(values: &[Value]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Conjunction of clauses. Built by folding clauses into [`Predicate::always`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Predicate {
    clauses: Vec<Clause>,
}

impl Predicate {
    /// The empty conjunction: matches every row.
    pub fn always() -> Self {
        Self::default()
    }

    pub fn and(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn and_all(mut self, clauses: impl IntoIterator<Item = Clause>) -> Self {
        self.clauses.extend(clauses);
        self
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn is_always_true(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, bar: &StockBar) -> bool {
        self.clauses.iter().all(|clause| clause.matches(bar))
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.clauses.is_empty() {
            return f.write_str("TRUE");
        }
        for (i, clause) in self.clauses.iter().enumerate() {
            if i > 0 {
                f.write_str(" AND ")?;
            }
            write!(f, "{clause}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar() -> StockBar {
        StockBar::new().id(1).symbol("AAPL").open(5.0).volume(100)
    }

    #[test]
    fn always_matches_everything() {
        assert!(Predicate::always().matches(&bar()));
        assert!(Predicate::always().matches(&StockBar::new()));
        assert_eq!(Predicate::always().to_string(), "TRUE");
    }

    #[test]
    fn null_fails_every_value_comparison() {
        let conditions = [
            Condition::Equals(Value::from(1.0)),
            Condition::NotEquals(Value::from(1.0)),
            Condition::In(vec![Value::from(1.0)]),
            Condition::NotIn(vec![Value::from(1.0)]),
            Condition::GreaterThan(Value::from(1.0)),
            Condition::LessThan(Value::from(1.0)),
            Condition::GreaterThanOrEqual(Value::from(1.0)),
            Condition::LessThanOrEqual(Value::from(1.0)),
            Condition::Contains("A".into()),
            Condition::DoesNotContain("A".into()),
            Condition::IsNotNull,
        ];
        for condition in conditions {
            assert!(!condition.test(None), "{condition:?} matched a null");
        }
        assert!(Condition::IsNull.test(None));
    }

    #[test]
    fn not_in_with_empty_set_matches_non_null() {
        assert!(Condition::NotIn(vec![]).test(Some(&Value::from(3u64))));
        assert!(!Condition::In(vec![]).test(Some(&Value::from(3u64))));
    }

    #[test]
    fn contains_is_case_sensitive() {
        let value = Value::from("AAPL");
        assert!(Condition::Contains("AP".into()).test(Some(&value)));
        assert!(!Condition::Contains("ap".into()).test(Some(&value)));
        assert!(Condition::DoesNotContain("ap".into()).test(Some(&value)));
    }

    #[test]
    fn conjunction_requires_every_clause() {
        let p = Predicate::always()
            .and(Clause::new(BarField::Symbol, Condition::Equals("AAPL".into())))
            .and(Clause::new(BarField::Open, Condition::LessThan(Value::from(2.0))));
        assert!(!p.matches(&bar()));
        assert!(p.matches(&bar().open(1.0)));
    }

    #[test]
    fn display_renders_sql_like_text() {
        let p = Predicate::always()
            .and(Clause::new(BarField::Symbol, Condition::Contains("AP".into())))
            .and(Clause::new(
                BarField::Id,
                Condition::In(vec![Value::from(1u64), Value::from(2u64)]),
            ))
            .and(Clause::new(BarField::Volume, Condition::IsNull));
        assert_eq!(
            p.to_string(),
            "symbol LIKE '%AP%' AND id IN (1, 2) AND volume IS NULL"
        );
    }
}
