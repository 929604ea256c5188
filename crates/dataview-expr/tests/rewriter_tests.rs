use dataview_expr::{
    rewrite_children, AggregateFunction, FieldRenameRewriter, FillRuleDefinition, RuleColorStop,
    SxExpr, SxNode, SxRewriter,
};
use pretty_assertions::assert_eq;

fn projection_tree() -> SxExpr {
    // The shape a concatenation-style transform works on: a filter over a
    // renameable projection plus an unrelated measure subtree.
    let entity = SxExpr::entity("s", "Sales");
    SxExpr::and(
        SxExpr::equal(SxExpr::column_ref(entity.clone(), "X"), SxExpr::text("a")),
        SxExpr::compare(
            dataview_expr::ComparisonKind::GreaterThan,
            SxExpr::aggregation(
                SxExpr::column_ref(entity, "Amount"),
                AggregateFunction::Sum,
            ),
            SxExpr::number(10.0),
        ),
    )
}

#[test]
fn rename_round_trip_restores_structure() {
    let original = projection_tree();
    let renamed = FieldRenameRewriter::new("X", "X1").rewrite(&original);
    assert!(!SxExpr::ptr_eq(&renamed, &original));

    let back = FieldRenameRewriter::new("X1", "X").rewrite(&renamed);
    assert_eq!(back, original);
}

#[test]
fn rename_leaves_unrelated_subtrees_shared() {
    let original = projection_tree();
    let renamed = FieldRenameRewriter::new("X", "X1").rewrite(&original);

    let (SxNode::And { right: new_right, .. }, SxNode::And { right: old_right, .. }) =
        (renamed.node(), original.node())
    else {
        panic!("rewrite must preserve node kind");
    };
    // The measure comparison does not mention X, so it keeps its allocation.
    assert!(SxExpr::ptr_eq(new_right, old_right));
}

#[test]
fn rename_applies_to_query_references() {
    let expr = SxExpr::with_ref("X");
    let renamed = FieldRenameRewriter::new("X", "X1").rewrite(&expr);
    assert_eq!(renamed, SxExpr::with_ref("X1"));
}

#[test]
fn noop_rewrite_of_a_full_tree_is_pointer_equal() {
    struct Noop;
    impl SxRewriter for Noop {}

    let entity = SxExpr::entity("s", "Sales");
    let tree = SxExpr::or(
        projection_tree(),
        SxExpr::fill_rule(
            SxExpr::column_ref(entity.clone(), "Amount"),
            FillRuleDefinition::LinearGradient2 {
                min: RuleColorStop::new(SxExpr::text("#000000"), None),
                max: RuleColorStop::new(SxExpr::text("#ffffff"), Some(SxExpr::number(1.0))),
            },
        ),
    );

    let rewritten = Noop.rewrite(&tree);
    assert!(SxExpr::ptr_eq(&rewritten, &tree));
}

#[test]
fn custom_rewriter_composes_with_the_default_walk() {
    // Replace every AnyValue sentinel with a concrete constant; everything
    // else flows through the shared walk.
    struct Concretize;
    impl SxRewriter for Concretize {
        fn rewrite(&mut self, expr: &SxExpr) -> SxExpr {
            match expr.node() {
                SxNode::AnyValue => SxExpr::text("fallback"),
                _ => rewrite_children(self, expr),
            }
        }
    }

    let field = SxExpr::column_ref(SxExpr::entity("s", "Sales"), "Region");
    let expr = SxExpr::equal(field.clone(), SxExpr::any_value());
    let rewritten = Concretize.rewrite(&expr);

    assert_eq!(rewritten, SxExpr::equal(field, SxExpr::text("fallback")));
}
