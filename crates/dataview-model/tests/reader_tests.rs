use dataview_expr::{SxExpr, Value, ValueType};
use dataview_model::{
    CategoryColumnSource, ColumnMetadata, GroupedSeriesSource, SeriesMeasureData,
    StaticSeriesColumn, TableView, TableViewBuilder, TableViewReader,
};
use pretty_assertions::assert_eq;

fn field(name: &str) -> SxExpr {
    SxExpr::column_ref(SxExpr::entity("s", "Sales"), name)
}

fn category_source(values: &[&str]) -> CategoryColumnSource {
    CategoryColumnSource {
        source: ColumnMetadata::new("Category", ValueType::Text).with_role("Category"),
        values: values.iter().map(|v| Value::from(*v)).collect(),
        identity: None,
        identity_fields: vec![field("F")],
        objects: None,
    }
}

fn static_column(name: &str, values: &[f64]) -> StaticSeriesColumn {
    StaticSeriesColumn {
        source: ColumnMetadata::new(name, ValueType::Double)
            .with_role(name)
            .as_measure(),
        values: values.iter().map(|v| Value::number(*v)).collect(),
        highlights: None,
        aggregates: None,
    }
}

/// Category ["A", "B"] with one measure Y = [1, 2].
fn simple_view() -> TableView {
    let mut builder = TableViewBuilder::new();
    builder.with_category(category_source(&["A", "B"])).unwrap();
    builder
        .with_values(vec![static_column("Y", &[1.0, 2.0])])
        .unwrap();
    builder.build().unwrap()
}

/// Two dynamic series over one measure, with a null gap in the first series.
fn dynamic_view() -> TableView {
    let mut builder = TableViewBuilder::new();
    builder.with_category(category_source(&["A", "B"])).unwrap();
    builder
        .with_grouped_values(GroupedSeriesSource {
            series_source: ColumnMetadata::new("Series", ValueType::Text).with_role("Series"),
            series_values: vec!["s1".into(), "s2".into()],
            series_identity: None,
            series_identity_fields: vec![field("Series")],
            series_objects: None,
            measures: vec![ColumnMetadata::new("Y", ValueType::Double)
                .with_role("Y")
                .as_measure()],
            data: vec![
                vec![SeriesMeasureData {
                    values: vec![Value::Null, Value::number(12.0)],
                    highlights: None,
                    aggregates: None,
                }],
                vec![SeriesMeasureData {
                    values: vec![Value::number(21.0), Value::number(22.0)],
                    highlights: None,
                    aggregates: None,
                }],
            ],
        })
        .unwrap();
    builder.build().unwrap()
}

#[test]
fn end_to_end_category_and_value_lookup() {
    let view = simple_view();
    let reader = TableViewReader::new(&view);

    assert_eq!(reader.category_value("Category", 1), Some(&Value::from("B")));
    assert_eq!(reader.value("Y", 0), Some(&Value::number(1.0)));
    assert!(!reader.has_dynamic_series());
    assert_eq!(reader.category_display_name("Category"), Some("Category"));
    assert_eq!(
        reader.category_identity_fields("Category").map(<[SxExpr]>::len),
        Some(1)
    );
}

#[test]
fn absent_roles_degrade_to_none() {
    let view = simple_view();
    let reader = TableViewReader::new(&view);

    assert_eq!(reader.category_values("Nope"), None);
    assert_eq!(reader.category_value("Nope", 0), None);
    assert_eq!(reader.value("Nope", 0), None);
    assert_eq!(reader.measure_index("Nope"), None);
    assert_eq!(reader.category_objects("Category", 0), None);
    assert_eq!(reader.highlight("Y", 0), None);
    // In-range role, out-of-range index.
    assert_eq!(reader.value("Y", 99), None);
}

#[test]
fn empty_view_degrades_everywhere() {
    let view = TableViewBuilder::new().build().unwrap();
    let reader = TableViewReader::new(&view);

    assert!(!reader.has_categories());
    assert!(!reader.has_values());
    assert!(!reader.has_dynamic_series());
    assert_eq!(reader.category_values("Category"), None);
    assert_eq!(reader.value("Y", 0), None);
    assert_eq!(reader.series_count(), 0);
    assert_eq!(reader.series_metadata_column(), None);
    assert_eq!(reader.series_identity_fields(), None);
}

#[test]
fn dynamic_series_values_index_by_series() {
    let view = dynamic_view();
    let reader = TableViewReader::new(&view);

    assert!(reader.has_dynamic_series());
    assert_eq!(reader.series_count(), 2);
    assert_eq!(reader.value_in_series("Y", 1, 0), Some(&Value::number(12.0)));
    assert_eq!(reader.value_in_series("Y", 0, 1), Some(&Value::number(21.0)));
    assert_eq!(reader.series_name(0), Some(&Value::from("s1")));
    assert!(reader.series_identity(1).is_some());
    assert_eq!(
        reader.series_metadata_column().map(|c| c.display_name.as_str()),
        Some("Series")
    );
    assert_eq!(reader.series_identity_fields().map(<[SxExpr]>::len), Some(1));
}

#[test]
fn first_non_null_value_scans_series_in_order() {
    let view = dynamic_view();
    let reader = TableViewReader::new(&view);

    // Category 0 is null in s1, so s2 supplies the value.
    assert_eq!(
        reader.first_non_null_value("Y", 0),
        Some(&Value::number(21.0))
    );
    // Category 1 resolves from s1 directly.
    assert_eq!(
        reader.first_non_null_value("Y", 1),
        Some(&Value::number(12.0))
    );
}

#[test]
fn additional_static_series_are_sibling_measures() {
    let mut builder = TableViewBuilder::new();
    builder.with_category(category_source(&["A", "B"])).unwrap();
    builder
        .with_values(vec![
            static_column("Y", &[1.0, 2.0]),
            static_column("Z", &[3.0, 4.0]),
        ])
        .unwrap();
    let view = builder.build().unwrap();
    let reader = TableViewReader::new(&view);

    // Series 0 goes through the measure index for the role...
    assert_eq!(reader.value_in_series("Y", 0, 0), Some(&Value::number(1.0)));
    // ...and series 1 addresses the sibling column within group 0.
    assert_eq!(reader.value_in_series("Y", 0, 1), Some(&Value::number(3.0)));
    assert_eq!(reader.value_in_series("Y", 1, 1), Some(&Value::number(4.0)));
    assert!(!reader.has_dynamic_series());
}

#[test]
fn highlights_read_back_through_the_role() {
    let mut column = static_column("Y", &[1.0, 2.0]);
    column.highlights = Some(vec![Value::number(0.5), Value::Null]);

    let mut builder = TableViewBuilder::new();
    builder.with_category(category_source(&["A", "B"])).unwrap();
    builder.with_values(vec![column]).unwrap();
    let view = builder.build().unwrap();
    let reader = TableViewReader::new(&view);

    assert_eq!(reader.highlight("Y", 0), Some(&Value::number(0.5)));
    assert_eq!(reader.highlight("Y", 1), Some(&Value::Null));
}
