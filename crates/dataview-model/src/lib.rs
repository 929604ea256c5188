//! Column-oriented tabular views with grouping, identity and role-based
//! access.
//!
//! Producers assemble a [`TableView`] through [`TableViewBuilder`] from raw
//! column arrays plus row-identity information; consumers read it back
//! through [`TableViewReader`], which hides how value columns are grouped.
//! Expression provenance and identity derivation come from the
//! `dataview-expr` crate.

#![forbid(unsafe_code)]

mod column;
mod identity;
mod view;

pub mod builder;
pub mod reader;

pub use crate::builder::{
    CategoryColumnSource, GroupedSeriesSource, SeriesMeasureData, StaticSeriesColumn,
    TableViewBuilder, ViewError, ViewResult,
};
pub use crate::column::{
    CategoryColumn, ColumnMetadata, GroupedValues, MinMaxAggregates, ObjectProperties,
    ValueColumn, ValueColumnGroup,
};
pub use crate::identity::ScopeIdentity;
pub use crate::reader::TableViewReader;
pub use crate::view::{TableView, TableViewMetadata, ViewKind};
