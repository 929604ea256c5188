//! Conceptual-model lookups consumed by the expression utilities.
//!
//! The schema is an external collaborator: utilities take it as an explicit
//! parameter and degrade to `None`/empty results whenever a field does not
//! resolve. Nothing here ever panics on a missing entry.

use crate::expr::{SxExpr, SxNode};
use crate::value::{Value, ValueType};
use std::collections::HashMap;

/// Schema coordinates named by a column/measure expression.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FieldDef {
    pub schema: String,
    pub entity: String,
    pub name: String,
}

impl FieldDef {
    pub fn new(
        schema: impl Into<String>,
        entity: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            schema: schema.into(),
            entity: entity.into(),
            name: name.into(),
        }
    }
}

/// Resolves the schema coordinates named by `expr`, unwrapping a single
/// aggregate wrapper if present. Returns `None` for expressions that do not
/// reference a field (constants, comparisons, sentinels, ...).
pub fn field_def(expr: &SxExpr) -> Option<FieldDef> {
    match expr.node() {
        SxNode::Aggregation { arg, .. } => field_def(arg),
        SxNode::ColumnRef { source, name } | SxNode::MeasureRef { source, name } => {
            let (schema, entity) = entity_of(source)?;
            Some(FieldDef::new(schema, entity, name.clone()))
        }
        SxNode::HierarchyLevelRef { source, level } => {
            // A level resolves through its hierarchy to the owning entity.
            let SxNode::HierarchyRef { source: inner, .. } = source.node() else {
                return None;
            };
            let (schema, entity) = entity_of(inner)?;
            Some(FieldDef::new(schema, entity, level.clone()))
        }
        _ => None,
    }
}

fn entity_of(expr: &SxExpr) -> Option<(&str, &str)> {
    match expr.node() {
        SxNode::Entity { schema, entity, .. } => Some((schema, entity)),
        SxNode::PropertyVariationSource { source, .. } => entity_of(source),
        _ => None,
    }
}

/// How a property behaves when queried.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyKind {
    Column {
        /// The property identifies rows through the entity key, so counting
        /// distinct non-null values is the only aggregate that stays
        /// meaningful.
        identity_on_key: bool,
        default_value: Option<Value>,
        supports_median: bool,
    },
    /// Already aggregated; no further aggregation applies.
    Measure,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConceptualProperty {
    pub name: String,
    pub value_type: ValueType,
    pub kind: PropertyKind,
}

impl ConceptualProperty {
    pub fn column(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            kind: PropertyKind::Column {
                identity_on_key: false,
                default_value: None,
                supports_median: false,
            },
        }
    }

    pub fn measure(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            kind: PropertyKind::Measure,
        }
    }

    pub fn with_identity_on_key(mut self) -> Self {
        if let PropertyKind::Column {
            identity_on_key, ..
        } = &mut self.kind
        {
            *identity_on_key = true;
        }
        self
    }

    pub fn with_default_value(mut self, value: Value) -> Self {
        if let PropertyKind::Column { default_value, .. } = &mut self.kind {
            *default_value = Some(value);
        }
        self
    }

    pub fn with_median_support(mut self) -> Self {
        if let PropertyKind::Column {
            supports_median, ..
        } = &mut self.kind
        {
            *supports_median = true;
        }
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConceptualEntity {
    pub name: String,
    properties: HashMap<String, ConceptualProperty>,
}

impl ConceptualEntity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: HashMap::new(),
        }
    }

    pub fn with_property(mut self, property: ConceptualProperty) -> Self {
        self.properties.insert(property.name.clone(), property);
        self
    }

    pub fn property(&self, name: &str) -> Option<&ConceptualProperty> {
        self.properties.get(name)
    }
}

/// A name-indexed conceptual model.
#[derive(Clone, Debug, Default)]
pub struct ConceptualSchema {
    pub name: String,
    entities: HashMap<String, ConceptualEntity>,
}

impl ConceptualSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entities: HashMap::new(),
        }
    }

    pub fn with_entity(mut self, entity: ConceptualEntity) -> Self {
        self.entities.insert(entity.name.clone(), entity);
        self
    }

    pub fn entity(&self, name: &str) -> Option<&ConceptualEntity> {
        self.entities.get(name)
    }

    /// Looks up the property a field definition points at. `None` when the
    /// schema name, entity or property does not match.
    pub fn resolve(&self, field: &FieldDef) -> Option<&ConceptualProperty> {
        if field.schema != self.name {
            return None;
        }
        self.entities.get(&field.entity)?.property(&field.name)
    }

    /// Resolves the field named by an expression, if any.
    pub fn resolve_expr(&self, expr: &SxExpr) -> Option<&ConceptualProperty> {
        self.resolve(&field_def(expr)?)
    }
}
