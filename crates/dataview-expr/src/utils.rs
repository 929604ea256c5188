//! Semantic helpers layered on the SX tree.
//!
//! Everything schema-driven takes the [`ConceptualSchema`] explicitly and
//! degrades gracefully: a field the schema cannot resolve yields `None` or an
//! empty aggregate set, never an error. The only hard failures here are
//! contract violations (mismatched array lengths), which are debug
//! assertions.

use crate::expr::{AggregateFunction, SxExpr, SxNode};
use crate::schema::{field_def, ConceptualSchema, PropertyKind};
use crate::value::{Value, ValueType};
use crate::visitor::SxVisitor;
use std::collections::HashSet;

/// Unwraps a single aggregate wrapper, if present.
pub fn strip_aggregate(expr: &SxExpr) -> &SxExpr {
    match expr.node() {
        SxNode::Aggregation { arg, .. } => arg,
        _ => expr,
    }
}

fn existing_count_aggregate(expr: &SxExpr) -> bool {
    matches!(
        expr.node(),
        SxNode::Aggregation {
            func: AggregateFunction::Count | AggregateFunction::CountNonNull,
            ..
        }
    )
}

/// The aggregates a consumer may apply to `expr`'s underlying field.
///
/// Measure-kind fields are already aggregated and support nothing further;
/// unresolvable fields also yield the empty set. Numeric columns get the full
/// set (plus `Median` where the schema declares support); other columns get
/// the counting aggregates, narrowed to `CountNonNull` for identity-bearing
/// key properties that do not already carry a count.
pub fn supported_aggregates(expr: &SxExpr, schema: &ConceptualSchema) -> Vec<AggregateFunction> {
    let underlying = strip_aggregate(expr);
    let Some(def) = field_def(underlying) else {
        return Vec::new();
    };
    let Some(property) = schema.resolve(&def) else {
        return Vec::new();
    };

    let (identity_on_key, supports_median) = match &property.kind {
        PropertyKind::Measure => return Vec::new(),
        PropertyKind::Column {
            identity_on_key,
            supports_median,
            ..
        } => (*identity_on_key, *supports_median),
    };

    if property.value_type.is_numeric() {
        let mut aggregates = vec![
            AggregateFunction::Sum,
            AggregateFunction::Avg,
            AggregateFunction::Min,
            AggregateFunction::Max,
            AggregateFunction::Count,
            AggregateFunction::CountNonNull,
            AggregateFunction::StandardDeviation,
            AggregateFunction::Variance,
        ];
        if supports_median {
            aggregates.push(AggregateFunction::Median);
        }
        aggregates
    } else if identity_on_key && !existing_count_aggregate(expr) {
        vec![AggregateFunction::CountNonNull]
    } else {
        vec![AggregateFunction::Count, AggregateFunction::CountNonNull]
    }
}

pub fn is_supported_aggregate(
    expr: &SxExpr,
    schema: &ConceptualSchema,
    func: AggregateFunction,
) -> bool {
    supported_aggregates(expr, schema).contains(&func)
}

/// Whether arithmetic applies to the expression's value type
/// (numeric, date/time and duration only).
pub fn supports_arithmetic(expr: &SxExpr, schema: &ConceptualSchema) -> bool {
    value_type_of(expr, schema).is_some_and(ValueType::supports_arithmetic)
}

fn value_type_of(expr: &SxExpr, schema: &ConceptualSchema) -> Option<ValueType> {
    match expr.node() {
        SxNode::Constant { value_type, .. } => Some(*value_type),
        SxNode::Arithmetic { left, .. } => value_type_of(left, schema),
        _ => Some(schema.resolve_expr(expr)?.value_type),
    }
}

/// The schema-declared default value for the expression's field, if any.
pub fn default_value(expr: &SxExpr, schema: &ConceptualSchema) -> Option<Value> {
    match &schema.resolve_expr(expr)?.kind {
        PropertyKind::Column { default_value, .. } => default_value.clone(),
        PropertyKind::Measure => None,
    }
}

/// Structural equality over expression arrays.
pub fn sequence_equal(left: &[SxExpr], right: &[SxExpr]) -> bool {
    left.len() == right.len() && left.iter().zip(right).all(|(a, b)| a == b)
}

/// Index of the first structurally equal element.
pub fn index_of_expr(items: &[SxExpr], expr: &SxExpr) -> Option<usize> {
    items.iter().position(|item| item == expr)
}

/// Picks a name based on `base` that collides with none of `existing`.
pub fn unique_name<'a>(existing: impl IntoIterator<Item = &'a str>, base: &str) -> String {
    let taken: HashSet<&str> = existing.into_iter().collect();
    if !taken.contains(base) {
        return base.to_string();
    }
    let mut suffix = 1u32;
    loop {
        let candidate = format!("{base}{suffix}");
        if !taken.contains(candidate.as_str()) {
            return candidate;
        }
        suffix += 1;
    }
}

struct NameVisitor;

impl SxVisitor for NameVisitor {
    type Output = String;

    fn default_output(&mut self, _expr: &SxExpr) -> String {
        "expr".to_string()
    }

    fn visit_entity(
        &mut self,
        _expr: &SxExpr,
        _schema: &str,
        entity: &str,
        _variable: Option<&str>,
    ) -> String {
        entity.to_string()
    }

    fn visit_column_ref(&mut self, _expr: &SxExpr, source: &SxExpr, name: &str) -> String {
        format!("{}.{name}", source.accept(self))
    }

    fn visit_measure_ref(&mut self, _expr: &SxExpr, source: &SxExpr, name: &str) -> String {
        format!("{}.{name}", source.accept(self))
    }

    fn visit_aggregation(
        &mut self,
        _expr: &SxExpr,
        arg: &SxExpr,
        func: AggregateFunction,
    ) -> String {
        format!("{func}({})", arg.accept(self))
    }

    fn visit_hierarchy_ref(&mut self, _expr: &SxExpr, source: &SxExpr, hierarchy: &str) -> String {
        format!("{}.{hierarchy}", source.accept(self))
    }

    fn visit_hierarchy_level_ref(&mut self, _expr: &SxExpr, source: &SxExpr, level: &str) -> String {
        format!("{}.{level}", source.accept(self))
    }

    fn visit_property_variation_source(
        &mut self,
        _expr: &SxExpr,
        source: &SxExpr,
        _name: &str,
        property: &str,
    ) -> String {
        format!("{}.{property}", source.accept(self))
    }

    fn visit_with_ref(&mut self, _expr: &SxExpr, expression_name: &str) -> String {
        expression_name.to_string()
    }

    fn visit_constant(
        &mut self,
        _expr: &SxExpr,
        _value_type: ValueType,
        value: &Value,
    ) -> String {
        value.to_string()
    }
}

/// A human-readable name for an expression, e.g. `Sum(Sales.Amount)`.
/// Falls back to `expr` for shapes without a natural name.
pub fn default_name(expr: &SxExpr) -> String {
    expr.accept(&mut NameVisitor)
}

/// True for expressions that denote an aggregated quantity.
pub fn is_measure(expr: &SxExpr) -> bool {
    matches!(
        expr.node(),
        SxNode::MeasureRef { .. } | SxNode::Aggregation { .. }
    )
}

/// Recognizes the `AnyValue` sentinel, including the equivalent
/// `Equal(_, AnyValue)` comparison form and conjunctions of two such.
pub fn is_any_value(expr: &SxExpr) -> bool {
    is_sentinel(expr, &SxNode::AnyValue)
}

/// Recognizes the `DefaultValue` sentinel, including the equivalent
/// `Equal(_, DefaultValue)` comparison form and conjunctions of two such.
pub fn is_default_value(expr: &SxExpr) -> bool {
    is_sentinel(expr, &SxNode::DefaultValue)
}

fn is_sentinel(expr: &SxExpr, sentinel: &SxNode) -> bool {
    match expr.node() {
        node if node == sentinel => true,
        SxNode::Compare {
            kind: crate::expr::ComparisonKind::Equal,
            right,
            ..
        } => right.node() == sentinel,
        SxNode::And { left, right } => is_sentinel(left, sentinel) && is_sentinel(right, sentinel),
        _ => false,
    }
}

/// Builds the conjunction of per-field equality comparisons that identifies a
/// scope, e.g. `Equal(F1, v1) AND Equal(F2, v2)`.
///
/// Returns `None` for empty input. `fields` and `values` must be the same
/// length; a mismatch is a caller bug.
pub fn scope_identity_comparison(fields: &[SxExpr], values: &[SxExpr]) -> Option<SxExpr> {
    debug_assert_eq!(
        fields.len(),
        values.len(),
        "identity fields and values must align"
    );
    if fields.is_empty() || fields.len() != values.len() {
        return None;
    }

    let mut comparisons = fields
        .iter()
        .zip(values)
        .map(|(field, value)| SxExpr::equal(field.clone(), value.clone()));
    let first = comparisons.next()?;
    Some(comparisons.fold(first, SxExpr::and))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ConceptualEntity, ConceptualProperty};
    use pretty_assertions::assert_eq;

    fn schema() -> ConceptualSchema {
        ConceptualSchema::new("s").with_entity(
            ConceptualEntity::new("Sales")
                .with_property(ConceptualProperty::column("Amount", ValueType::Double))
                .with_property(
                    ConceptualProperty::column("Price", ValueType::Double).with_median_support(),
                )
                .with_property(
                    ConceptualProperty::column("Customer", ValueType::Text)
                        .with_identity_on_key(),
                )
                .with_property(ConceptualProperty::column("Region", ValueType::Text))
                .with_property(ConceptualProperty::measure("Total", ValueType::Double))
                .with_property(
                    ConceptualProperty::column("Discount", ValueType::Double)
                        .with_default_value(Value::number(0.0)),
                ),
        )
    }

    fn sales_column(name: &str) -> SxExpr {
        SxExpr::column_ref(SxExpr::entity("s", "Sales"), name)
    }

    #[test]
    fn numeric_column_gets_full_aggregate_set() {
        let aggregates = supported_aggregates(&sales_column("Amount"), &schema());
        assert_eq!(
            aggregates,
            vec![
                AggregateFunction::Sum,
                AggregateFunction::Avg,
                AggregateFunction::Min,
                AggregateFunction::Max,
                AggregateFunction::Count,
                AggregateFunction::CountNonNull,
                AggregateFunction::StandardDeviation,
                AggregateFunction::Variance,
            ]
        );
    }

    #[test]
    fn median_requires_schema_support() {
        let s = schema();
        assert!(!is_supported_aggregate(
            &sales_column("Amount"),
            &s,
            AggregateFunction::Median
        ));
        assert!(is_supported_aggregate(
            &sales_column("Price"),
            &s,
            AggregateFunction::Median
        ));
    }

    #[test]
    fn identity_text_column_narrows_to_count_non_null() {
        let s = schema();
        assert_eq!(
            supported_aggregates(&sales_column("Customer"), &s),
            vec![AggregateFunction::CountNonNull]
        );
        // An existing count keeps the full counting pair available.
        let counted = SxExpr::aggregation(sales_column("Customer"), AggregateFunction::Count);
        assert_eq!(
            supported_aggregates(&counted, &s),
            vec![AggregateFunction::Count, AggregateFunction::CountNonNull]
        );
        // A plain text column was never narrowed.
        assert_eq!(
            supported_aggregates(&sales_column("Region"), &s),
            vec![AggregateFunction::Count, AggregateFunction::CountNonNull]
        );
    }

    #[test]
    fn measures_and_unknown_fields_support_nothing() {
        let s = schema();
        let measure = SxExpr::measure_ref(SxExpr::entity("s", "Sales"), "Total");
        assert!(supported_aggregates(&measure, &s).is_empty());
        assert!(supported_aggregates(&sales_column("Nope"), &s).is_empty());
        assert!(supported_aggregates(&SxExpr::now(), &s).is_empty());
    }

    #[test]
    fn arithmetic_support_follows_value_type() {
        let s = schema();
        assert!(supports_arithmetic(&sales_column("Amount"), &s));
        assert!(!supports_arithmetic(&sales_column("Region"), &s));
        assert!(supports_arithmetic(&SxExpr::number(1.0), &s));
    }

    #[test]
    fn default_value_comes_from_the_schema() {
        let s = schema();
        assert_eq!(
            default_value(&sales_column("Discount"), &s),
            Some(Value::number(0.0))
        );
        assert_eq!(default_value(&sales_column("Amount"), &s), None);
    }

    #[test]
    fn unique_name_avoids_collisions() {
        assert_eq!(unique_name(["X", "Y"], "Z"), "Z");
        assert_eq!(unique_name(["X", "X1"], "X"), "X2");
    }

    #[test]
    fn default_name_formats_aggregates() {
        let expr = SxExpr::aggregation(sales_column("Amount"), AggregateFunction::Sum);
        assert_eq!(default_name(&expr), "Sum(Sales.Amount)");
        assert_eq!(default_name(&SxExpr::any_value()), "expr");
    }

    #[test]
    fn sentinel_classification_recognizes_comparison_forms() {
        let field = sales_column("Region");
        assert!(is_any_value(&SxExpr::any_value()));
        assert!(is_any_value(&SxExpr::equal(field.clone(), SxExpr::any_value())));
        assert!(is_any_value(&SxExpr::and(
            SxExpr::equal(field.clone(), SxExpr::any_value()),
            SxExpr::equal(field.clone(), SxExpr::any_value()),
        )));
        assert!(!is_any_value(&SxExpr::equal(
            field.clone(),
            SxExpr::text("East")
        )));

        assert!(is_default_value(&SxExpr::equal(
            field.clone(),
            SxExpr::default_value()
        )));
        assert!(!is_default_value(&SxExpr::equal(field, SxExpr::any_value())));
    }

    #[test]
    fn scope_identity_comparison_builds_conjunction() {
        let fields = vec![sales_column("Region"), sales_column("Customer")];
        let values = vec![SxExpr::text("East"), SxExpr::text("Alice")];
        let expr = scope_identity_comparison(&fields, &values).unwrap();
        assert_eq!(
            expr,
            SxExpr::and(
                SxExpr::equal(fields[0].clone(), values[0].clone()),
                SxExpr::equal(fields[1].clone(), values[1].clone()),
            )
        );
        assert!(scope_identity_comparison(&[], &[]).is_none());
    }

    #[test]
    fn structural_sequence_helpers() {
        let a = vec![sales_column("A"), sales_column("B")];
        let b = vec![sales_column("A"), sales_column("B")];
        assert!(sequence_equal(&a, &b));
        assert_eq!(index_of_expr(&a, &sales_column("B")), Some(1));
        assert_eq!(index_of_expr(&a, &sales_column("C")), None);
    }

    #[test]
    fn measure_classification() {
        assert!(is_measure(&SxExpr::aggregation(
            sales_column("Amount"),
            AggregateFunction::Sum
        )));
        assert!(is_measure(&SxExpr::measure_ref(
            SxExpr::entity("s", "Sales"),
            "Total"
        )));
        assert!(!is_measure(&sales_column("Amount")));
    }
}
