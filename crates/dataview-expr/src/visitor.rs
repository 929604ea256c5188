//! Visitor dispatch over the closed SX node set.
//!
//! [`SxExpr::accept`] matches exhaustively, so adding a node kind forces
//! every visitor to be revisited at compile time. Visitors override only the
//! kinds they care about; everything else falls through to
//! [`SxVisitor::default_output`].

use crate::expr::{
    AggregateFunction, ArithmeticOp, ComparisonKind, FillRuleDefinition, SxExpr, SxNode,
};
use crate::value::{Value, ValueType};

/// One `visit_*` hook per node kind, each defaulting to
/// [`SxVisitor::default_output`]. The full expression handle is always passed
/// first so defaults can fall through without re-matching.
pub trait SxVisitor {
    type Output;

    fn default_output(&mut self, expr: &SxExpr) -> Self::Output;

    fn visit_entity(
        &mut self,
        expr: &SxExpr,
        _schema: &str,
        _entity: &str,
        _variable: Option<&str>,
    ) -> Self::Output {
        self.default_output(expr)
    }

    fn visit_column_ref(&mut self, expr: &SxExpr, _source: &SxExpr, _name: &str) -> Self::Output {
        self.default_output(expr)
    }

    fn visit_measure_ref(&mut self, expr: &SxExpr, _source: &SxExpr, _name: &str) -> Self::Output {
        self.default_output(expr)
    }

    fn visit_aggregation(
        &mut self,
        expr: &SxExpr,
        _arg: &SxExpr,
        _func: AggregateFunction,
    ) -> Self::Output {
        self.default_output(expr)
    }

    fn visit_compare(
        &mut self,
        expr: &SxExpr,
        _kind: ComparisonKind,
        _left: &SxExpr,
        _right: &SxExpr,
    ) -> Self::Output {
        self.default_output(expr)
    }

    fn visit_and(&mut self, expr: &SxExpr, _left: &SxExpr, _right: &SxExpr) -> Self::Output {
        self.default_output(expr)
    }

    fn visit_or(&mut self, expr: &SxExpr, _left: &SxExpr, _right: &SxExpr) -> Self::Output {
        self.default_output(expr)
    }

    fn visit_not(&mut self, expr: &SxExpr, _arg: &SxExpr) -> Self::Output {
        self.default_output(expr)
    }

    fn visit_between(
        &mut self,
        expr: &SxExpr,
        _arg: &SxExpr,
        _lower: &SxExpr,
        _upper: &SxExpr,
    ) -> Self::Output {
        self.default_output(expr)
    }

    fn visit_in(&mut self, expr: &SxExpr, _args: &[SxExpr], _values: &[Vec<SxExpr>]) -> Self::Output {
        self.default_output(expr)
    }

    fn visit_arithmetic(
        &mut self,
        expr: &SxExpr,
        _op: ArithmeticOp,
        _left: &SxExpr,
        _right: &SxExpr,
    ) -> Self::Output {
        self.default_output(expr)
    }

    fn visit_constant(
        &mut self,
        expr: &SxExpr,
        _value_type: ValueType,
        _value: &Value,
    ) -> Self::Output {
        self.default_output(expr)
    }

    fn visit_fill_rule(
        &mut self,
        expr: &SxExpr,
        _input: &SxExpr,
        _rule: &FillRuleDefinition,
    ) -> Self::Output {
        self.default_output(expr)
    }

    fn visit_default_value(&mut self, expr: &SxExpr) -> Self::Output {
        self.default_output(expr)
    }

    fn visit_any_value(&mut self, expr: &SxExpr) -> Self::Output {
        self.default_output(expr)
    }

    fn visit_now(&mut self, expr: &SxExpr) -> Self::Output {
        self.default_output(expr)
    }

    fn visit_scoped_eval(
        &mut self,
        expr: &SxExpr,
        _expression: &SxExpr,
        _scope: &[SxExpr],
    ) -> Self::Output {
        self.default_output(expr)
    }

    fn visit_with_ref(&mut self, expr: &SxExpr, _expression_name: &str) -> Self::Output {
        self.default_output(expr)
    }

    fn visit_resource_package_item(
        &mut self,
        expr: &SxExpr,
        _package_name: &str,
        _package_type: i32,
        _item_name: &str,
    ) -> Self::Output {
        self.default_output(expr)
    }

    fn visit_hierarchy_ref(
        &mut self,
        expr: &SxExpr,
        _source: &SxExpr,
        _hierarchy: &str,
    ) -> Self::Output {
        self.default_output(expr)
    }

    fn visit_hierarchy_level_ref(
        &mut self,
        expr: &SxExpr,
        _source: &SxExpr,
        _level: &str,
    ) -> Self::Output {
        self.default_output(expr)
    }

    fn visit_property_variation_source(
        &mut self,
        expr: &SxExpr,
        _source: &SxExpr,
        _name: &str,
        _property: &str,
    ) -> Self::Output {
        self.default_output(expr)
    }
}

impl SxExpr {
    /// Dispatches to the matching `visit_*` method.
    pub fn accept<V: SxVisitor>(&self, visitor: &mut V) -> V::Output {
        match self.node() {
            SxNode::Entity {
                schema,
                entity,
                variable,
            } => visitor.visit_entity(self, schema, entity, variable.as_deref()),
            SxNode::ColumnRef { source, name } => visitor.visit_column_ref(self, source, name),
            SxNode::MeasureRef { source, name } => visitor.visit_measure_ref(self, source, name),
            SxNode::Aggregation { arg, func } => visitor.visit_aggregation(self, arg, *func),
            SxNode::Compare { kind, left, right } => {
                visitor.visit_compare(self, *kind, left, right)
            }
            SxNode::And { left, right } => visitor.visit_and(self, left, right),
            SxNode::Or { left, right } => visitor.visit_or(self, left, right),
            SxNode::Not { arg } => visitor.visit_not(self, arg),
            SxNode::Between { arg, lower, upper } => {
                visitor.visit_between(self, arg, lower, upper)
            }
            SxNode::In { args, values } => visitor.visit_in(self, args, values),
            SxNode::Arithmetic { op, left, right } => {
                visitor.visit_arithmetic(self, *op, left, right)
            }
            SxNode::Constant { value_type, value } => {
                visitor.visit_constant(self, *value_type, value)
            }
            SxNode::FillRule { input, rule } => visitor.visit_fill_rule(self, input, rule),
            SxNode::DefaultValue => visitor.visit_default_value(self),
            SxNode::AnyValue => visitor.visit_any_value(self),
            SxNode::Now => visitor.visit_now(self),
            SxNode::ScopedEval { expression, scope } => {
                visitor.visit_scoped_eval(self, expression, scope)
            }
            SxNode::WithRef { expression_name } => visitor.visit_with_ref(self, expression_name),
            SxNode::ResourcePackageItem {
                package_name,
                package_type,
                item_name,
            } => visitor.visit_resource_package_item(self, package_name, *package_type, item_name),
            SxNode::HierarchyRef { source, hierarchy } => {
                visitor.visit_hierarchy_ref(self, source, hierarchy)
            }
            SxNode::HierarchyLevelRef { source, level } => {
                visitor.visit_hierarchy_level_ref(self, source, level)
            }
            SxNode::PropertyVariationSource {
                source,
                name,
                property,
            } => visitor.visit_property_variation_source(self, source, name, property),
        }
    }
}
