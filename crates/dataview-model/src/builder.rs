//! Incremental assembly of a [`TableView`].
//!
//! The builder accumulates category columns plus static and/or dynamic
//! (grouped) value columns, then `build()` performs the series fan-out,
//! fills row data, and runs the legality check. `build()` is atomic: it
//! returns a fully assembled view or `None`, never a partially filled one.

use crate::column::{
    CategoryColumn, ColumnMetadata, GroupedValues, MinMaxAggregates, ObjectProperties,
    ValueColumn, ValueColumnGroup,
};
use crate::identity::ScopeIdentity;
use crate::view::{TableView, TableViewMetadata, ViewKind};
use dataview_expr::SxExpr;
use log::{debug, warn};

pub type ViewResult<T> = Result<T, ViewError>;

/// Recoverable input-contract violations raised while accumulating columns.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("category {column}: {expected} values but {actual} identities")]
    IdentityLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("category {column} has no identity field to derive identities from")]
    MissingIdentityField { column: String },

    #[error("column {column}: {expected} values but {actual} highlights")]
    HighlightLengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("grouped data shape mismatch: expected {series} series x {measures} measures")]
    GroupedDataShape { series: usize, measures: usize },

    #[error("a grouped (dynamic) series was already supplied")]
    DuplicateGroupedValues,
}

/// Input for one category column. Identities may be supplied explicitly;
/// otherwise one is derived per value from the first identity field.
#[derive(Clone, Debug)]
pub struct CategoryColumnSource {
    pub source: ColumnMetadata,
    pub values: Vec<dataview_expr::Value>,
    pub identity: Option<Vec<ScopeIdentity>>,
    pub identity_fields: Vec<SxExpr>,
    pub objects: Option<Vec<Option<ObjectProperties>>>,
}

/// Input for one fixed (static-series) measure column.
#[derive(Clone, Debug)]
pub struct StaticSeriesColumn {
    pub source: ColumnMetadata,
    pub values: Vec<dataview_expr::Value>,
    pub highlights: Option<Vec<dataview_expr::Value>>,
    pub aggregates: Option<MinMaxAggregates>,
}

/// Row data for one (series, measure) cell of the dynamic fan-out.
#[derive(Clone, Debug, Default)]
pub struct SeriesMeasureData {
    pub values: Vec<dataview_expr::Value>,
    pub highlights: Option<Vec<dataview_expr::Value>>,
    pub aggregates: Option<MinMaxAggregates>,
}

/// Input for a dynamic series: the grouping column plus measure templates
/// and a per-series-per-measure data grid.
#[derive(Clone, Debug)]
pub struct GroupedSeriesSource {
    /// Metadata of the series key column itself.
    pub series_source: ColumnMetadata,
    /// One entry per distinct series key, in presentation order.
    pub series_values: Vec<dataview_expr::Value>,
    pub series_identity: Option<Vec<ScopeIdentity>>,
    pub series_identity_fields: Vec<SxExpr>,
    pub series_objects: Option<Vec<Option<ObjectProperties>>>,
    /// Measure templates, fanned out once per series.
    pub measures: Vec<ColumnMetadata>,
    /// Indexed `data[series][measure]`.
    pub data: Vec<Vec<SeriesMeasureData>>,
}

#[derive(Debug, Default)]
pub struct TableViewBuilder {
    kind: Option<ViewKind>,
    categories: Vec<CategoryColumn>,
    static_columns: Vec<StaticSeriesColumn>,
    grouped: Option<GroupedSeriesSource>,
}

impl TableViewBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags the view explicitly. Without this the kind is inferred from
    /// query-name presence at `build()` time (see [`ViewKind::infer`]).
    pub fn with_kind(&mut self, kind: ViewKind) -> &mut Self {
        self.kind = Some(kind);
        self
    }

    /// Appends a category column, deriving one identity per value when none
    /// are supplied.
    pub fn with_category(&mut self, category: CategoryColumnSource) -> ViewResult<&mut Self> {
        let CategoryColumnSource {
            source,
            values,
            identity,
            identity_fields,
            objects,
        } = category;

        let identity = match identity {
            Some(identity) => {
                if identity.len() != values.len() {
                    return Err(ViewError::IdentityLengthMismatch {
                        column: source.display_name,
                        expected: values.len(),
                        actual: identity.len(),
                    });
                }
                identity
            }
            None => {
                let Some(key_field) = identity_fields.first() else {
                    return Err(ViewError::MissingIdentityField {
                        column: source.display_name,
                    });
                };
                values
                    .iter()
                    .map(|v| ScopeIdentity::from_equality(key_field, v.clone(), source.value_type))
                    .collect()
            }
        };

        self.categories.push(CategoryColumn {
            source,
            values,
            identity,
            identity_fields,
            objects,
        });
        Ok(self)
    }

    /// Bulk-appends pre-built category columns.
    pub fn with_categories(&mut self, categories: Vec<CategoryColumn>) -> &mut Self {
        debug_assert!(
            categories.iter().all(|c| c.identity.len() == c.values.len()),
            "pre-built categories must carry one identity per value"
        );
        self.categories.extend(categories);
        self
    }

    /// Records fixed measure columns (a static series).
    pub fn with_values(&mut self, columns: Vec<StaticSeriesColumn>) -> ViewResult<&mut Self> {
        for column in &columns {
            if let Some(highlights) = &column.highlights {
                if highlights.len() != column.values.len() {
                    return Err(ViewError::HighlightLengthMismatch {
                        column: column.source.display_name.clone(),
                        expected: column.values.len(),
                        actual: highlights.len(),
                    });
                }
            }
        }
        self.static_columns.extend(columns);
        Ok(self)
    }

    /// Records the dynamic series: grouping column, measure templates and the
    /// per-series-per-measure data grid.
    pub fn with_grouped_values(&mut self, grouped: GroupedSeriesSource) -> ViewResult<&mut Self> {
        if self.grouped.is_some() {
            return Err(ViewError::DuplicateGroupedValues);
        }
        let series = grouped.series_values.len();
        let measures = grouped.measures.len();
        if grouped.data.len() != series || grouped.data.iter().any(|row| row.len() != measures) {
            return Err(ViewError::GroupedDataShape { series, measures });
        }
        if let Some(identity) = &grouped.series_identity {
            if identity.len() != series {
                return Err(ViewError::IdentityLengthMismatch {
                    column: grouped.series_source.display_name,
                    expected: series,
                    actual: identity.len(),
                });
            }
        }
        if grouped.series_identity.is_none() && grouped.series_identity_fields.is_empty() {
            return Err(ViewError::MissingIdentityField {
                column: grouped.series_source.display_name,
            });
        }
        self.grouped = Some(grouped);
        Ok(self)
    }

    /// Assembles the view, or returns `None` when the accumulated columns are
    /// not a legal combination (see [`ViewKind`]).
    pub fn build(self) -> Option<TableView> {
        let category_len = self
            .categories
            .first()
            .map(|c| c.values.len())
            .unwrap_or(0);

        let mut metadata_columns: Vec<ColumnMetadata> = Vec::new();
        for category in &self.categories {
            push_metadata(&mut metadata_columns, &category.source);
        }

        let has_dynamic = self.grouped.is_some();
        let has_static = !self.static_columns.is_empty();

        let mut groups: Vec<ValueColumnGroup> = Vec::new();
        let mut grouping_source = None;
        let mut grouping_identity_fields = None;

        if let Some(grouped) = self.grouped {
            push_metadata(&mut metadata_columns, &grouped.series_source);

            for (series_index, series_value) in grouped.series_values.iter().enumerate() {
                let identity = match &grouped.series_identity {
                    Some(supplied) => supplied.get(series_index).cloned(),
                    None => grouped.series_identity_fields.first().map(|field| {
                        ScopeIdentity::from_equality(
                            field,
                            series_value.clone(),
                            grouped.series_source.value_type,
                        )
                    }),
                };
                let objects = grouped
                    .series_objects
                    .as_ref()
                    .and_then(|o| o.get(series_index).cloned())
                    .flatten();

                // O(series x measures) fan-out: each template becomes one
                // concrete column per series, with its own metadata copy so
                // the series-specific group name never aliases.
                let mut columns = Vec::with_capacity(grouped.measures.len());
                for (measure_index, template) in grouped.measures.iter().enumerate() {
                    let data = &grouped.data[series_index][measure_index];
                    if !row_data_fits(data.values.len(), data.highlights.as_ref(), category_len) {
                        warn!(
                            "dropping view: series {series_value} measure {} rows do not match \
                             category length {category_len}",
                            template.display_name
                        );
                        return None;
                    }

                    let mut source = template.clone();
                    source.group_name = Some(series_value.clone());
                    if let Some(aggregates) = &data.aggregates {
                        source.aggregates = Some(aggregates.clone());
                    }
                    push_metadata(&mut metadata_columns, &source);

                    columns.push(ValueColumn {
                        source,
                        values: data.values.clone(),
                        highlights: data.highlights.clone(),
                        aggregates: data.aggregates.clone(),
                    });
                }

                groups.push(ValueColumnGroup {
                    name: Some(series_value.clone()),
                    identity,
                    objects,
                    values: columns,
                });
            }

            grouping_source = Some(grouped.series_source);
            grouping_identity_fields = (!grouped.series_identity_fields.is_empty())
                .then_some(grouped.series_identity_fields);
        }

        if has_static {
            if groups.is_empty() {
                groups.push(ValueColumnGroup {
                    name: None,
                    identity: None,
                    objects: None,
                    values: Vec::new(),
                });
            } else {
                // The grouped() view was pinned from dynamic columns above;
                // static measures join the first group as sibling columns
                // without touching the visible group structure.
                debug!("appending static measures to a dynamic-series view");
            }
            let first_group = groups.first_mut()?;
            for column in self.static_columns {
                if !row_data_fits(
                    column.values.len(),
                    column.highlights.as_ref(),
                    category_len,
                ) {
                    warn!(
                        "dropping view: column {} rows do not match category length {category_len}",
                        column.source.display_name
                    );
                    return None;
                }
                let mut source = column.source;
                if let Some(aggregates) = &column.aggregates {
                    source.aggregates = Some(aggregates.clone());
                }
                push_metadata(&mut metadata_columns, &source);
                first_group.values.push(ValueColumn {
                    source,
                    values: column.values,
                    highlights: column.highlights,
                    aggregates: column.aggregates,
                });
            }
        }

        let kind = self
            .kind
            .unwrap_or_else(|| ViewKind::infer(&metadata_columns));
        if has_dynamic && has_static && kind == ViewKind::Visual {
            warn!("dropping visual view: dynamic and static series must not mix");
            return None;
        }

        Some(TableView {
            metadata: TableViewMetadata {
                columns: metadata_columns,
            },
            categories: self.categories,
            values: GroupedValues::new(grouping_source, grouping_identity_fields, groups),
            kind,
        })
    }
}

/// Row data is legal when it matches the category length, or when the view
/// has no categories at all.
fn row_data_fits(
    values_len: usize,
    highlights: Option<&Vec<dataview_expr::Value>>,
    category_len: usize,
) -> bool {
    let values_ok = category_len == 0 || values_len == category_len;
    let highlights_ok = highlights.is_none_or(|h| category_len == 0 || h.len() == category_len);
    debug_assert!(
        values_ok && highlights_ok,
        "value rows must align with the category column"
    );
    values_ok && highlights_ok
}

fn push_metadata(columns: &mut Vec<ColumnMetadata>, candidate: &ColumnMetadata) {
    // Re-appending the same source must not duplicate the metadata entry.
    if !columns.iter().any(|c| c == candidate) {
        columns.push(candidate.clone());
    }
}
