//! Criteria → predicate compilation.
//!
//! Walks the fixed field list, skips unset or empty filters, and folds each
//! present filter's clauses into an always-true accumulator. Pure: no state
//! survives a call and the criteria is never mutated.

use super::predicate::{Clause, Condition, Predicate};
use super::value::Value;
use crate::criteria::{BarCriteria, BarField};
use crate::filter::{RangeFilter, StringFilter};

/// Compiles criteria into one conjunctive predicate.
///
/// `None` and all-empty criteria both compile to [`Predicate::always`].
pub fn compile(criteria: Option<&BarCriteria>) -> Predicate {
    let Some(criteria) = criteria else {
        return Predicate::always();
    };

    BarField::ALL
        .into_iter()
        .fold(Predicate::always(), |predicate, field| {
            predicate.and_all(field_clauses(criteria, field))
        })
}

/// The field table: which slot feeds which field, and through which translation.
fn field_clauses(criteria: &BarCriteria, field: BarField) -> Vec<Clause> {
    let clauses = match field {
        BarField::Id => criteria.id.as_ref().map(|f| range_clauses(field, f)),
        BarField::Symbol => criteria.symbol.as_ref().map(|f| string_clauses(field, f)),
        BarField::Date => criteria.date.as_ref().map(|f| range_clauses(field, f)),
        BarField::Open => criteria.open.as_ref().map(|f| range_clauses(field, f)),
        BarField::Close => criteria.close.as_ref().map(|f| range_clauses(field, f)),
        BarField::High => criteria.high.as_ref().map(|f| range_clauses(field, f)),
        BarField::Low => criteria.low.as_ref().map(|f| range_clauses(field, f)),
        BarField::Volume => criteria.volume.as_ref().map(|f| range_clauses(field, f)),
    };
    clauses.unwrap_or_default()
}

/// Translates a range filter: one clause per set operator.
pub fn range_clauses<T>(field: BarField, filter: &RangeFilter<T>) -> Vec<Clause>
where
    T: Clone + Into<Value>,
{
    let mut conditions = Vec::new();
    if let Some(specified) = filter.specified {
        conditions.push(presence(specified));
    }
    if let Some(v) = &filter.equals {
        conditions.push(Condition::Equals(v.clone().into()));
    }
    if let Some(v) = &filter.not_equals {
        conditions.push(Condition::NotEquals(v.clone().into()));
    }
    if let Some(values) = &filter.in_list {
        conditions.push(Condition::In(to_values(values)));
    }
    if let Some(values) = &filter.not_in_list {
        conditions.push(Condition::NotIn(to_values(values)));
    }
    if let Some(v) = &filter.greater_than {
        conditions.push(Condition::GreaterThan(v.clone().into()));
    }
    if let Some(v) = &filter.less_than {
        conditions.push(Condition::LessThan(v.clone().into()));
    }
    if let Some(v) = &filter.greater_than_or_equal {
        conditions.push(Condition::GreaterThanOrEqual(v.clone().into()));
    }
    if let Some(v) = &filter.less_than_or_equal {
        conditions.push(Condition::LessThanOrEqual(v.clone().into()));
    }
    bind(field, conditions)
}

/// Translates a string filter: equality, set and presence like a range
/// filter, plus case-sensitive substring matching.
pub fn string_clauses(field: BarField, filter: &StringFilter) -> Vec<Clause> {
    let mut conditions = Vec::new();
    if let Some(specified) = filter.specified {
        conditions.push(presence(specified));
    }
    if let Some(v) = &filter.equals {
        conditions.push(Condition::Equals(Value::from(v.as_str())));
    }
    if let Some(v) = &filter.not_equals {
        conditions.push(Condition::NotEquals(Value::from(v.as_str())));
    }
    if let Some(values) = &filter.in_list {
        conditions.push(Condition::In(to_values(values)));
    }
    if let Some(values) = &filter.not_in_list {
        conditions.push(Condition::NotIn(to_values(values)));
    }
    if let Some(needle) = &filter.contains {
        conditions.push(Condition::Contains(needle.clone()));
    }
    if let Some(needle) = &filter.does_not_contain {
        conditions.push(Condition::DoesNotContain(needle.clone()));
    }
    bind(field, conditions)
}

fn presence(specified: bool) -> Condition {
    if specified {
        Condition::IsNotNull
    } else {
        Condition::IsNull
    }
}

fn to_values<T: Clone + Into<Value>>(values: &[T]) -> Vec<Value> {
    values.iter().cloned().map(Into::into).collect()
}

fn bind(field: BarField, conditions: Vec<Condition>) -> Vec<Clause> {
    conditions
        .into_iter()
        .map(|condition| Clause::new(field, condition))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BarId;

    #[test]
    fn none_and_empty_compile_to_always() {
        assert!(compile(None).is_always_true());
        assert!(compile(Some(&BarCriteria::new())).is_always_true());

        let hollow = BarCriteria::new()
            .symbol(StringFilter::new())
            .volume(RangeFilter::new());
        assert_eq!(compile(Some(&hollow)), Predicate::always());
    }

    #[test]
    fn clauses_follow_field_order() {
        // slots set in reverse order on purpose
        let criteria = BarCriteria::new()
            .volume(RangeFilter::new().greater_than(10))
            .open(RangeFilter::new().less_than(2.0))
            .symbol(StringFilter::new().equals("AAPL"))
            .id(RangeFilter::new().specified(true));

        let fields: Vec<_> = compile(Some(&criteria))
            .clauses()
            .iter()
            .map(|c| c.field)
            .collect();
        assert_eq!(
            fields,
            vec![BarField::Id, BarField::Symbol, BarField::Open, BarField::Volume]
        );
    }

    #[test]
    fn every_range_operator_becomes_one_clause() {
        let filter = RangeFilter::new()
            .equals(BarId(1))
            .not_equals(BarId(2))
            .in_list([BarId(1), BarId(3)])
            .not_in_list([BarId(4)])
            .greater_than(BarId(0))
            .less_than(BarId(9))
            .greater_than_or_equal(BarId(1))
            .less_than_or_equal(BarId(8))
            .specified(true);
        let clauses = range_clauses(BarField::Id, &filter);
        assert_eq!(clauses.len(), 9);
        assert_eq!(clauses[0].condition, Condition::IsNotNull);
        assert_eq!(
            clauses[3].condition,
            Condition::In(vec![Value::Unsigned(1), Value::Unsigned(3)])
        );
    }

    #[test]
    fn string_operators_translate() {
        let filter = StringFilter::new()
            .contains("AP")
            .does_not_contain("X")
            .specified(false);
        let rendered = compile(Some(&BarCriteria::new().symbol(filter))).to_string();
        assert_eq!(
            rendered,
            "symbol IS NULL AND symbol LIKE '%AP%' AND symbol NOT LIKE '%X%'"
        );
    }

    #[test]
    fn compile_is_deterministic_and_leaves_input_untouched() {
        let criteria = BarCriteria::new()
            .symbol(StringFilter::new().in_list(["AAPL", "MSFT"]))
            .high(RangeFilter::new().greater_than_or_equal(5.0).less_than_or_equal(5.0));
        let before = criteria.clone();

        let first = compile(Some(&criteria));
        let second = compile(Some(&criteria));
        assert_eq!(first, second);
        assert_eq!(compile(Some(&criteria.clone())), first);
        assert_eq!(criteria, before);
    }
}
