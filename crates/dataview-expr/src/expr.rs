//! The SX expression tree.
//!
//! An [`SxExpr`] is an immutable, reference-counted handle over a closed set
//! of node kinds. Trees are never mutated in place: transformations (see
//! [`crate::rewriter`]) produce new handles, sharing every unchanged subtree
//! with the original. That makes pointer identity ([`SxExpr::ptr_eq`]) a
//! reliable "did anything change" signal, while `==` remains structural.

use crate::value::{Value, ValueType};
use std::fmt;
use std::sync::Arc;

/// Aggregate functions an expression may apply to a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AggregateFunction {
    Sum,
    Avg,
    Min,
    Max,
    Count,
    CountNonNull,
    StandardDeviation,
    Variance,
    Median,
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Sum => "Sum",
            Self::Avg => "Avg",
            Self::Min => "Min",
            Self::Max => "Max",
            Self::Count => "Count",
            Self::CountNonNull => "CountNonNull",
            Self::StandardDeviation => "StandardDeviation",
            Self::Variance => "Variance",
            Self::Median => "Median",
        };
        write!(f, "{name}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComparisonKind {
    Equal,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
}

/// One stop of a gradient fill rule. The stop color is itself an expression
/// (usually a constant); the value pinning the stop is optional.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RuleColorStop {
    pub color: SxExpr,
    pub value: Option<SxExpr>,
}

impl RuleColorStop {
    pub fn new(color: SxExpr, value: Option<SxExpr>) -> Self {
        Self { color, value }
    }
}

/// Gradient definition carried by a fill-rule node.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FillRuleDefinition {
    LinearGradient2 {
        min: RuleColorStop,
        max: RuleColorStop,
    },
    LinearGradient3 {
        min: RuleColorStop,
        mid: RuleColorStop,
        max: RuleColorStop,
    },
}

/// The closed set of SX node kinds.
///
/// Child expressions are [`SxExpr`] handles, so cloning a node is cheap and
/// subtrees are shared freely.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SxNode {
    Entity {
        schema: String,
        entity: String,
        variable: Option<String>,
    },
    ColumnRef {
        source: SxExpr,
        name: String,
    },
    MeasureRef {
        source: SxExpr,
        name: String,
    },
    Aggregation {
        arg: SxExpr,
        func: AggregateFunction,
    },
    Compare {
        kind: ComparisonKind,
        left: SxExpr,
        right: SxExpr,
    },
    And {
        left: SxExpr,
        right: SxExpr,
    },
    Or {
        left: SxExpr,
        right: SxExpr,
    },
    Not {
        arg: SxExpr,
    },
    Between {
        arg: SxExpr,
        lower: SxExpr,
        upper: SxExpr,
    },
    In {
        args: Vec<SxExpr>,
        /// One tuple of constants per matched row, aligned to `args`.
        values: Vec<Vec<SxExpr>>,
    },
    Arithmetic {
        op: ArithmeticOp,
        left: SxExpr,
        right: SxExpr,
    },
    Constant {
        value_type: ValueType,
        value: Value,
    },
    FillRule {
        input: SxExpr,
        rule: FillRuleDefinition,
    },
    DefaultValue,
    AnyValue,
    Now,
    ScopedEval {
        expression: SxExpr,
        scope: Vec<SxExpr>,
    },
    WithRef {
        expression_name: String,
    },
    ResourcePackageItem {
        package_name: String,
        package_type: i32,
        item_name: String,
    },
    HierarchyRef {
        source: SxExpr,
        hierarchy: String,
    },
    HierarchyLevelRef {
        source: SxExpr,
        level: String,
    },
    PropertyVariationSource {
        source: SxExpr,
        name: String,
        property: String,
    },
}

/// Shared, immutable handle to an SX node.
#[derive(Clone, Debug, Eq)]
pub struct SxExpr(Arc<SxNode>);

impl PartialEq for SxExpr {
    fn eq(&self, other: &Self) -> bool {
        // Pointer equality short-circuits the structural walk.
        Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl std::hash::Hash for SxExpr {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl SxExpr {
    pub fn new(node: SxNode) -> Self {
        Self(Arc::new(node))
    }

    pub fn node(&self) -> &SxNode {
        &self.0
    }

    /// Pointer identity: true iff both handles refer to the same allocation.
    /// This is the change-detection primitive used by the rewriter.
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    pub fn entity(schema: impl Into<String>, entity: impl Into<String>) -> Self {
        Self::new(SxNode::Entity {
            schema: schema.into(),
            entity: entity.into(),
            variable: None,
        })
    }

    pub fn entity_with_variable(
        schema: impl Into<String>,
        entity: impl Into<String>,
        variable: impl Into<String>,
    ) -> Self {
        Self::new(SxNode::Entity {
            schema: schema.into(),
            entity: entity.into(),
            variable: Some(variable.into()),
        })
    }

    pub fn column_ref(source: Self, name: impl Into<String>) -> Self {
        Self::new(SxNode::ColumnRef {
            source,
            name: name.into(),
        })
    }

    pub fn measure_ref(source: Self, name: impl Into<String>) -> Self {
        Self::new(SxNode::MeasureRef {
            source,
            name: name.into(),
        })
    }

    pub fn aggregation(arg: Self, func: AggregateFunction) -> Self {
        Self::new(SxNode::Aggregation { arg, func })
    }

    pub fn compare(kind: ComparisonKind, left: Self, right: Self) -> Self {
        Self::new(SxNode::Compare { kind, left, right })
    }

    pub fn equal(left: Self, right: Self) -> Self {
        Self::compare(ComparisonKind::Equal, left, right)
    }

    pub fn and(left: Self, right: Self) -> Self {
        Self::new(SxNode::And { left, right })
    }

    pub fn or(left: Self, right: Self) -> Self {
        Self::new(SxNode::Or { left, right })
    }

    pub fn not(arg: Self) -> Self {
        Self::new(SxNode::Not { arg })
    }

    pub fn between(arg: Self, lower: Self, upper: Self) -> Self {
        Self::new(SxNode::Between { arg, lower, upper })
    }

    pub fn in_values(args: Vec<Self>, values: Vec<Vec<Self>>) -> Self {
        debug_assert!(
            values.iter().all(|tuple| tuple.len() == args.len()),
            "every In tuple must align with the argument list"
        );
        Self::new(SxNode::In { args, values })
    }

    pub fn arithmetic(op: ArithmeticOp, left: Self, right: Self) -> Self {
        Self::new(SxNode::Arithmetic { op, left, right })
    }

    pub fn constant(value_type: ValueType, value: Value) -> Self {
        Self::new(SxNode::Constant { value_type, value })
    }

    pub fn text(value: impl Into<Arc<str>>) -> Self {
        Self::constant(ValueType::Text, Value::Text(value.into()))
    }

    pub fn number(value: f64) -> Self {
        Self::constant(ValueType::Double, Value::number(value))
    }

    pub fn integer(value: i64) -> Self {
        Self::constant(ValueType::Integer, Value::Integer(value))
    }

    pub fn boolean(value: bool) -> Self {
        Self::constant(ValueType::Bool, Value::Bool(value))
    }

    pub fn fill_rule(input: Self, rule: FillRuleDefinition) -> Self {
        Self::new(SxNode::FillRule { input, rule })
    }

    pub fn default_value() -> Self {
        Self::new(SxNode::DefaultValue)
    }

    pub fn any_value() -> Self {
        Self::new(SxNode::AnyValue)
    }

    pub fn now() -> Self {
        Self::new(SxNode::Now)
    }

    pub fn scoped_eval(expression: Self, scope: Vec<Self>) -> Self {
        Self::new(SxNode::ScopedEval { expression, scope })
    }

    pub fn with_ref(expression_name: impl Into<String>) -> Self {
        Self::new(SxNode::WithRef {
            expression_name: expression_name.into(),
        })
    }

    pub fn resource_package_item(
        package_name: impl Into<String>,
        package_type: i32,
        item_name: impl Into<String>,
    ) -> Self {
        Self::new(SxNode::ResourcePackageItem {
            package_name: package_name.into(),
            package_type,
            item_name: item_name.into(),
        })
    }

    pub fn hierarchy_ref(source: Self, hierarchy: impl Into<String>) -> Self {
        Self::new(SxNode::HierarchyRef {
            source,
            hierarchy: hierarchy.into(),
        })
    }

    pub fn hierarchy_level_ref(source: Self, level: impl Into<String>) -> Self {
        Self::new(SxNode::HierarchyLevelRef {
            source,
            level: level.into(),
        })
    }

    pub fn property_variation_source(
        source: Self,
        name: impl Into<String>,
        property: impl Into<String>,
    ) -> Self {
        Self::new(SxNode::PropertyVariationSource {
            source,
            name: name.into(),
            property: property.into(),
        })
    }
}
