//! Semantic expression trees ("SX trees") for tabular analytical views.
//!
//! The tree records how a column's data was derived (field references,
//! aggregates, comparisons, fill rules, ...). Trees are immutable and
//! `Arc`-shared: transforming one goes through the structural-sharing
//! [`rewriter`], which returns the original handle for every untouched
//! subtree. Helpers in [`utils`] derive semantic facts (supported aggregates,
//! display names, identity comparisons) from a tree plus an explicit
//! [`schema::ConceptualSchema`].

#![forbid(unsafe_code)]

mod expr;
mod value;

pub mod rewriter;
pub mod schema;
pub mod utils;
pub mod visitor;

pub use crate::expr::{
    AggregateFunction, ArithmeticOp, ComparisonKind, FillRuleDefinition, RuleColorStop, SxExpr,
    SxNode,
};
pub use crate::rewriter::{rewrite_children, FieldRenameRewriter, SxRewriter};
pub use crate::schema::{
    field_def, ConceptualEntity, ConceptualProperty, ConceptualSchema, FieldDef, PropertyKind,
};
pub use crate::value::{Value, ValueType};
pub use crate::visitor::SxVisitor;
