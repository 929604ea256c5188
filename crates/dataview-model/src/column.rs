//! Column metadata and the column-oriented data types a view is made of.

use dataview_expr::{SxExpr, Value, ValueType};
use std::collections::HashMap;

/// Per-object formatting/behavior overrides, keyed by property name.
pub type ObjectProperties = HashMap<String, Value>;

/// Local min/max aggregates computed over a column's visible rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MinMaxAggregates {
    pub min: Value,
    pub max: Value,
}

/// Descriptive metadata for one column of a view.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnMetadata {
    pub display_name: String,
    pub value_type: ValueType,
    /// Role membership: role name -> declared. Lookup treats absent and
    /// `false` the same.
    pub roles: HashMap<String, bool>,
    pub is_measure: bool,
    /// Present on visual-view columns; its presence is what distinguishes a
    /// consumer-facing view from a pre-split query intermediate.
    pub query_name: Option<String>,
    /// The dynamic-series key this concrete column belongs to, set during the
    /// grouped fan-out.
    pub group_name: Option<Value>,
    /// Position in the originating query projection, when known.
    pub index: Option<usize>,
    /// Provenance: how this column's data was derived.
    pub expr: Option<SxExpr>,
    pub aggregates: Option<MinMaxAggregates>,
}

impl ColumnMetadata {
    pub fn new(display_name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            display_name: display_name.into(),
            value_type,
            roles: HashMap::new(),
            is_measure: false,
            query_name: None,
            group_name: None,
            index: None,
            expr: None,
            aggregates: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.insert(role.into(), true);
        self
    }

    pub fn as_measure(mut self) -> Self {
        self.is_measure = true;
        self
    }

    pub fn with_query_name(mut self, query_name: impl Into<String>) -> Self {
        self.query_name = Some(query_name.into());
        self
    }

    pub fn with_expr(mut self, expr: SxExpr) -> Self {
        self.expr = Some(expr);
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.get(role).copied().unwrap_or(false)
    }
}

/// A grouping/axis column with one identity per row.
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryColumn {
    pub source: ColumnMetadata,
    pub values: Vec<Value>,
    pub identity: Vec<crate::identity::ScopeIdentity>,
    pub identity_fields: Vec<SxExpr>,
    pub objects: Option<Vec<Option<ObjectProperties>>>,
}

/// A measure column: row-aligned values plus optional highlights.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueColumn {
    pub source: ColumnMetadata,
    pub values: Vec<Value>,
    pub highlights: Option<Vec<Value>>,
    pub aggregates: Option<MinMaxAggregates>,
}

/// One series group: the measure columns for a single series key (or the
/// single implicit group when all series are static).
#[derive(Clone, Debug, PartialEq)]
pub struct ValueColumnGroup {
    pub name: Option<Value>,
    pub identity: Option<crate::identity::ScopeIdentity>,
    pub objects: Option<ObjectProperties>,
    pub values: Vec<ValueColumn>,
}

/// All value columns of a view, organized by series group.
///
/// `source` carries the grouping column's metadata and is present exactly
/// when the data has a dynamic series.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GroupedValues {
    source: Option<ColumnMetadata>,
    identity_fields: Option<Vec<SxExpr>>,
    groups: Vec<ValueColumnGroup>,
}

impl GroupedValues {
    pub(crate) fn new(
        source: Option<ColumnMetadata>,
        identity_fields: Option<Vec<SxExpr>>,
        groups: Vec<ValueColumnGroup>,
    ) -> Self {
        Self {
            source,
            identity_fields,
            groups,
        }
    }

    /// The per-series view of the value columns.
    pub fn grouped(&self) -> &[ValueColumnGroup] {
        &self.groups
    }

    /// The grouping column's metadata; present iff the series is dynamic.
    pub fn source(&self) -> Option<&ColumnMetadata> {
        self.source.as_ref()
    }

    pub fn identity_fields(&self) -> Option<&[SxExpr]> {
        self.identity_fields.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.values.is_empty())
    }
}
