//! Structural-sharing tree rewriting.
//!
//! The driver in [`rewrite_children`] enforces the rewrite contract: every
//! child is rewritten first, then compared to the original with
//! [`SxExpr::ptr_eq`]; the node is rebuilt only when at least one child
//! actually changed, otherwise the original handle is returned untouched.
//! Allocation cost is therefore proportional to the depth of the change, not
//! the size of the tree, and callers can use pointer identity on the result
//! as a cheap "did anything change" check.

use crate::expr::{FillRuleDefinition, RuleColorStop, SxExpr, SxNode};

/// A tree transformer. Implementations override [`SxRewriter::rewrite`] to
/// intercept the nodes they care about and delegate everything else to
/// [`rewrite_children`].
///
/// Rewriting never fails; a malformed tree is a programmer error, not a
/// runtime condition.
pub trait SxRewriter {
    fn rewrite(&mut self, expr: &SxExpr) -> SxExpr {
        rewrite_children(self, expr)
    }
}

/// Rewrites `expr`'s children through `rewriter` and rebuilds the node iff
/// any child changed.
pub fn rewrite_children<R: SxRewriter + ?Sized>(rewriter: &mut R, expr: &SxExpr) -> SxExpr {
    match expr.node() {
        // Leaves have nothing to rewrite.
        SxNode::Entity { .. }
        | SxNode::Constant { .. }
        | SxNode::DefaultValue
        | SxNode::AnyValue
        | SxNode::Now
        | SxNode::WithRef { .. }
        | SxNode::ResourcePackageItem { .. } => expr.clone(),

        SxNode::ColumnRef { source, name } => {
            let new_source = rewriter.rewrite(source);
            if SxExpr::ptr_eq(&new_source, source) {
                expr.clone()
            } else {
                SxExpr::column_ref(new_source, name.clone())
            }
        }
        SxNode::MeasureRef { source, name } => {
            let new_source = rewriter.rewrite(source);
            if SxExpr::ptr_eq(&new_source, source) {
                expr.clone()
            } else {
                SxExpr::measure_ref(new_source, name.clone())
            }
        }
        SxNode::Aggregation { arg, func } => {
            let new_arg = rewriter.rewrite(arg);
            if SxExpr::ptr_eq(&new_arg, arg) {
                expr.clone()
            } else {
                SxExpr::aggregation(new_arg, *func)
            }
        }
        SxNode::Compare { kind, left, right } => {
            let new_left = rewriter.rewrite(left);
            let new_right = rewriter.rewrite(right);
            if SxExpr::ptr_eq(&new_left, left) && SxExpr::ptr_eq(&new_right, right) {
                expr.clone()
            } else {
                SxExpr::compare(*kind, new_left, new_right)
            }
        }
        SxNode::And { left, right } => {
            let new_left = rewriter.rewrite(left);
            let new_right = rewriter.rewrite(right);
            if SxExpr::ptr_eq(&new_left, left) && SxExpr::ptr_eq(&new_right, right) {
                expr.clone()
            } else {
                SxExpr::and(new_left, new_right)
            }
        }
        SxNode::Or { left, right } => {
            let new_left = rewriter.rewrite(left);
            let new_right = rewriter.rewrite(right);
            if SxExpr::ptr_eq(&new_left, left) && SxExpr::ptr_eq(&new_right, right) {
                expr.clone()
            } else {
                SxExpr::or(new_left, new_right)
            }
        }
        SxNode::Not { arg } => {
            let new_arg = rewriter.rewrite(arg);
            if SxExpr::ptr_eq(&new_arg, arg) {
                expr.clone()
            } else {
                SxExpr::not(new_arg)
            }
        }
        SxNode::Between { arg, lower, upper } => {
            let new_arg = rewriter.rewrite(arg);
            let new_lower = rewriter.rewrite(lower);
            let new_upper = rewriter.rewrite(upper);
            if SxExpr::ptr_eq(&new_arg, arg)
                && SxExpr::ptr_eq(&new_lower, lower)
                && SxExpr::ptr_eq(&new_upper, upper)
            {
                expr.clone()
            } else {
                SxExpr::between(new_arg, new_lower, new_upper)
            }
        }
        SxNode::In { args, values } => {
            let new_args = rewrite_list(rewriter, args);
            let new_values = rewrite_tuples(rewriter, values);
            if new_args.is_none() && new_values.is_none() {
                expr.clone()
            } else {
                SxExpr::in_values(
                    new_args.unwrap_or_else(|| args.clone()),
                    new_values.unwrap_or_else(|| values.clone()),
                )
            }
        }
        SxNode::Arithmetic { op, left, right } => {
            let new_left = rewriter.rewrite(left);
            let new_right = rewriter.rewrite(right);
            if SxExpr::ptr_eq(&new_left, left) && SxExpr::ptr_eq(&new_right, right) {
                expr.clone()
            } else {
                SxExpr::arithmetic(*op, new_left, new_right)
            }
        }
        SxNode::FillRule { input, rule } => {
            let new_input = rewriter.rewrite(input);
            let new_rule = rewrite_fill_rule(rewriter, rule);
            if SxExpr::ptr_eq(&new_input, input) && new_rule.is_none() {
                expr.clone()
            } else {
                SxExpr::fill_rule(new_input, new_rule.unwrap_or_else(|| rule.clone()))
            }
        }
        SxNode::ScopedEval { expression, scope } => {
            let new_expression = rewriter.rewrite(expression);
            let new_scope = rewrite_list(rewriter, scope);
            if SxExpr::ptr_eq(&new_expression, expression) && new_scope.is_none() {
                expr.clone()
            } else {
                SxExpr::scoped_eval(new_expression, new_scope.unwrap_or_else(|| scope.clone()))
            }
        }
        SxNode::HierarchyRef { source, hierarchy } => {
            let new_source = rewriter.rewrite(source);
            if SxExpr::ptr_eq(&new_source, source) {
                expr.clone()
            } else {
                SxExpr::hierarchy_ref(new_source, hierarchy.clone())
            }
        }
        SxNode::HierarchyLevelRef { source, level } => {
            let new_source = rewriter.rewrite(source);
            if SxExpr::ptr_eq(&new_source, source) {
                expr.clone()
            } else {
                SxExpr::hierarchy_level_ref(new_source, level.clone())
            }
        }
        SxNode::PropertyVariationSource {
            source,
            name,
            property,
        } => {
            let new_source = rewriter.rewrite(source);
            if SxExpr::ptr_eq(&new_source, source) {
                expr.clone()
            } else {
                SxExpr::property_variation_source(new_source, name.clone(), property.clone())
            }
        }
    }
}

/// Lazy-copy rewrite of an expression list.
///
/// The list is scanned in place; only once a rewritten element differs from
/// its original is the already-scanned prefix copied into a fresh `Vec`.
/// Returns `None` when no element changed, so the caller can keep the
/// original list (and node) untouched.
fn rewrite_list<R: SxRewriter + ?Sized>(rewriter: &mut R, list: &[SxExpr]) -> Option<Vec<SxExpr>> {
    let mut rebuilt: Option<Vec<SxExpr>> = None;
    for (i, item) in list.iter().enumerate() {
        let rewritten = rewriter.rewrite(item);
        match rebuilt.as_mut() {
            Some(out) => out.push(rewritten),
            None => {
                if !SxExpr::ptr_eq(&rewritten, item) {
                    let mut out = Vec::with_capacity(list.len());
                    out.extend_from_slice(&list[..i]);
                    out.push(rewritten);
                    rebuilt = Some(out);
                }
            }
        }
    }
    rebuilt
}

/// Same lazy-copy discipline, one level up: tuples of constants inside an
/// `In` node.
fn rewrite_tuples<R: SxRewriter + ?Sized>(
    rewriter: &mut R,
    tuples: &[Vec<SxExpr>],
) -> Option<Vec<Vec<SxExpr>>> {
    let mut rebuilt: Option<Vec<Vec<SxExpr>>> = None;
    for (i, tuple) in tuples.iter().enumerate() {
        let rewritten = rewrite_list(rewriter, tuple);
        match rebuilt.as_mut() {
            Some(out) => out.push(rewritten.unwrap_or_else(|| tuple.clone())),
            None => {
                if let Some(changed) = rewritten {
                    let mut out = Vec::with_capacity(tuples.len());
                    out.extend_from_slice(&tuples[..i]);
                    out.push(changed);
                    rebuilt = Some(out);
                }
            }
        }
    }
    rebuilt
}

fn rewrite_stop<R: SxRewriter + ?Sized>(
    rewriter: &mut R,
    stop: &RuleColorStop,
) -> Option<RuleColorStop> {
    let new_color = rewriter.rewrite(&stop.color);
    let new_value = stop.value.as_ref().map(|v| rewriter.rewrite(v));

    let color_changed = !SxExpr::ptr_eq(&new_color, &stop.color);
    // `new_value` mirrors `stop.value`'s presence by construction.
    let value_changed = match (&new_value, &stop.value) {
        (Some(new), Some(old)) => !SxExpr::ptr_eq(new, old),
        _ => false,
    };

    if color_changed || value_changed {
        Some(RuleColorStop::new(new_color, new_value))
    } else {
        None
    }
}

fn rewrite_fill_rule<R: SxRewriter + ?Sized>(
    rewriter: &mut R,
    rule: &FillRuleDefinition,
) -> Option<FillRuleDefinition> {
    match rule {
        FillRuleDefinition::LinearGradient2 { min, max } => {
            let new_min = rewrite_stop(rewriter, min);
            let new_max = rewrite_stop(rewriter, max);
            if new_min.is_none() && new_max.is_none() {
                None
            } else {
                Some(FillRuleDefinition::LinearGradient2 {
                    min: new_min.unwrap_or_else(|| min.clone()),
                    max: new_max.unwrap_or_else(|| max.clone()),
                })
            }
        }
        FillRuleDefinition::LinearGradient3 { min, mid, max } => {
            let new_min = rewrite_stop(rewriter, min);
            let new_mid = rewrite_stop(rewriter, mid);
            let new_max = rewrite_stop(rewriter, max);
            if new_min.is_none() && new_mid.is_none() && new_max.is_none() {
                None
            } else {
                Some(FillRuleDefinition::LinearGradient3 {
                    min: new_min.unwrap_or_else(|| min.clone()),
                    mid: new_mid.unwrap_or_else(|| mid.clone()),
                    max: new_max.unwrap_or_else(|| max.clone()),
                })
            }
        }
    }
}

/// Renames column, measure and query (`WithRef`) references.
///
/// The canonical query-transform rewriter: collaborators that rename a
/// projection (e.g. `X` to `X1` when splitting a view) run their trees
/// through this and rely on subtree sharing everywhere the name does not
/// occur.
#[derive(Clone, Debug)]
pub struct FieldRenameRewriter {
    from: String,
    to: String,
}

impl FieldRenameRewriter {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl SxRewriter for FieldRenameRewriter {
    fn rewrite(&mut self, expr: &SxExpr) -> SxExpr {
        match expr.node() {
            SxNode::ColumnRef { source, name } if *name == self.from => {
                SxExpr::column_ref(self.rewrite(source), self.to.clone())
            }
            SxNode::MeasureRef { source, name } if *name == self.from => {
                SxExpr::measure_ref(self.rewrite(source), self.to.clone())
            }
            SxNode::WithRef { expression_name } if *expression_name == self.from => {
                SxExpr::with_ref(self.to.clone())
            }
            _ => rewrite_children(self, expr),
        }
    }
}
