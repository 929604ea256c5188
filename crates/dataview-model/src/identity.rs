//! Row and series identity.
//!
//! Identities let selection and animation match rows across renders, so
//! equality must be structural: two identities derived from equal keys
//! compare equal no matter when or where each was allocated.

use dataview_expr::{SxExpr, Value, ValueType};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// An opaque equality key for one row or series of a view.
///
/// Wraps the identity expression (typically `Equal(keyField, constant)`)
/// together with a cached structural hash; the hash only accelerates map use,
/// equality always compares the expressions.
#[derive(Clone, Debug)]
pub struct ScopeIdentity {
    expr: SxExpr,
    key: u64,
}

impl ScopeIdentity {
    pub fn new(expr: SxExpr) -> Self {
        let mut hasher = DefaultHasher::new();
        expr.hash(&mut hasher);
        let key = hasher.finish();
        Self { expr, key }
    }

    /// The derived form: `Equal(key_field, typed_constant(value))`.
    pub fn from_equality(key_field: &SxExpr, value: Value, value_type: ValueType) -> Self {
        Self::new(SxExpr::equal(
            key_field.clone(),
            SxExpr::constant(value_type, value),
        ))
    }

    pub fn expr(&self) -> &SxExpr {
        &self.expr
    }

    pub fn key(&self) -> u64 {
        self.key
    }
}

impl PartialEq for ScopeIdentity {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.expr == other.expr
    }
}

impl Eq for ScopeIdentity {}

impl Hash for ScopeIdentity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataview_expr::SxExpr;

    #[test]
    fn identities_from_equal_keys_are_equal() {
        let field = SxExpr::column_ref(SxExpr::entity("s", "Sales"), "Region");
        let a = ScopeIdentity::from_equality(&field, "East".into(), ValueType::Text);
        let b = ScopeIdentity::from_equality(&field, "East".into(), ValueType::Text);
        assert_eq!(a, b);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn identities_from_different_keys_differ() {
        let field = SxExpr::column_ref(SxExpr::entity("s", "Sales"), "Region");
        let a = ScopeIdentity::from_equality(&field, "East".into(), ValueType::Text);
        let b = ScopeIdentity::from_equality(&field, "West".into(), ValueType::Text);
        assert!(a != b);
    }
}
