//! The assembled view and its kind tag.

use crate::column::{CategoryColumn, ColumnMetadata, GroupedValues};

/// Whether a view is the consumer-facing visual form or the pre-split query
/// intermediate.
///
/// Visual views must not mix a dynamic series with static measure columns;
/// that combination is only legal in the query form a splitting transform
/// consumes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewKind {
    Query,
    Visual,
}

impl ViewKind {
    /// Infers the kind from column metadata: a view whose columns carry
    /// query-reference names is treated as visual.
    ///
    /// This is a heuristic, not a structural guarantee; producers that know
    /// their intent should tag the builder explicitly instead.
    pub fn infer(columns: &[ColumnMetadata]) -> Self {
        if columns.iter().any(|c| c.query_name.is_some()) {
            Self::Visual
        } else {
            Self::Query
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableViewMetadata {
    pub columns: Vec<ColumnMetadata>,
}

/// A column-oriented, identity-bearing tabular view.
///
/// Built once by [`crate::builder::TableViewBuilder`] and treated as
/// immutable afterwards; consumers read it through
/// [`crate::reader::TableViewReader`].
#[derive(Clone, Debug, PartialEq)]
pub struct TableView {
    pub metadata: TableViewMetadata,
    pub categories: Vec<CategoryColumn>,
    pub values: GroupedValues,
    pub kind: ViewKind,
}
