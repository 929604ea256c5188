//! Role-indexed read access over a built [`TableView`].
//!
//! The reader is the only surface rendering/converter code should depend on;
//! it hides how value columns are grouped and indexed. Every accessor
//! degrades to `None` for roles or indices the view does not carry.

use crate::column::{CategoryColumn, ColumnMetadata, ObjectProperties, ValueColumn};
use crate::identity::ScopeIdentity;
use crate::view::TableView;
use dataview_expr::{SxExpr, Value};

/// Stateless (post-construction) read view. Validity of the underlying
/// arrays is computed once, up front.
#[derive(Clone, Copy, Debug)]
pub struct TableViewReader<'a> {
    view: &'a TableView,
    has_valid_categories: bool,
    has_any_valid_values: bool,
    has_dynamic_series: bool,
}

impl<'a> TableViewReader<'a> {
    pub fn new(view: &'a TableView) -> Self {
        Self {
            view,
            has_valid_categories: !view.categories.is_empty(),
            has_any_valid_values: !view.values.is_empty(),
            has_dynamic_series: view.values.source().is_some(),
        }
    }

    pub fn has_categories(&self) -> bool {
        self.has_valid_categories
    }

    pub fn has_values(&self) -> bool {
        self.has_any_valid_values
    }

    pub fn has_dynamic_series(&self) -> bool {
        self.has_dynamic_series
    }

    /// The first category column declaring `role`.
    pub fn category_column(&self, role: &str) -> Option<&'a CategoryColumn> {
        if !self.has_valid_categories {
            return None;
        }
        self.view
            .categories
            .iter()
            .find(|c| c.source.has_role(role))
    }

    pub fn category_values(&self, role: &str) -> Option<&'a [Value]> {
        Some(self.category_column(role)?.values.as_slice())
    }

    pub fn category_value(&self, role: &str, index: usize) -> Option<&'a Value> {
        self.category_column(role)?.values.get(index)
    }

    pub fn category_metadata_column(&self, role: &str) -> Option<&'a ColumnMetadata> {
        Some(&self.category_column(role)?.source)
    }

    pub fn category_identity(&self, role: &str, index: usize) -> Option<&'a ScopeIdentity> {
        self.category_column(role)?.identity.get(index)
    }

    pub fn category_identity_fields(&self, role: &str) -> Option<&'a [SxExpr]> {
        Some(self.category_column(role)?.identity_fields.as_slice())
    }

    pub fn category_display_name(&self, role: &str) -> Option<&'a str> {
        Some(self.category_column(role)?.source.display_name.as_str())
    }

    pub fn category_objects(&self, role: &str, index: usize) -> Option<&'a ObjectProperties> {
        self.category_column(role)?
            .objects
            .as_ref()?
            .get(index)?
            .as_ref()
    }

    /// The measure index `role` resolves to within each series group.
    pub fn measure_index(&self, role: &str) -> Option<usize> {
        if !self.has_any_valid_values {
            return None;
        }
        self.view
            .values
            .grouped()
            .first()?
            .values
            .iter()
            .position(|c| c.source.has_role(role))
    }

    /// Resolves the concrete value column for a role and series.
    ///
    /// Dynamic-series data (and the default series 0) indexes
    /// `grouped[series].values[measure]`. Additional static series are
    /// sibling measures within group 0, so `series_index` itself becomes the
    /// column index there.
    fn target_column(&self, role: &str, series_index: usize) -> Option<&'a ValueColumn> {
        let measure_index = self.measure_index(role)?;
        let grouped = self.view.values.grouped();
        if self.has_dynamic_series || series_index == 0 {
            grouped.get(series_index)?.values.get(measure_index)
        } else {
            grouped.first()?.values.get(series_index)
        }
    }

    pub fn value_column(&self, role: &str) -> Option<&'a ValueColumn> {
        self.target_column(role, 0)
    }

    pub fn value(&self, role: &str, category_index: usize) -> Option<&'a Value> {
        self.value_in_series(role, category_index, 0)
    }

    pub fn value_in_series(
        &self,
        role: &str,
        category_index: usize,
        series_index: usize,
    ) -> Option<&'a Value> {
        self.target_column(role, series_index)?
            .values
            .get(category_index)
    }

    pub fn highlight(&self, role: &str, category_index: usize) -> Option<&'a Value> {
        self.target_column(role, 0)?
            .highlights
            .as_ref()?
            .get(category_index)
    }

    /// The first non-null value for a category across series, in series
    /// order. Useful where a value is series-invariant but sparse data
    /// leaves earlier series null.
    pub fn first_non_null_value(&self, role: &str, category_index: usize) -> Option<&'a Value> {
        if !self.has_dynamic_series {
            return self.value(role, category_index).filter(|v| !v.is_null());
        }
        let measure_index = self.measure_index(role)?;
        self.view
            .values
            .grouped()
            .iter()
            .filter_map(|group| group.values.get(measure_index)?.values.get(category_index))
            .find(|v| !v.is_null())
    }

    pub fn series_count(&self) -> usize {
        if self.has_any_valid_values {
            self.view.values.grouped().len()
        } else {
            0
        }
    }

    pub fn series_name(&self, series_index: usize) -> Option<&'a Value> {
        self.view.values.grouped().get(series_index)?.name.as_ref()
    }

    pub fn series_identity(&self, series_index: usize) -> Option<&'a ScopeIdentity> {
        self.view
            .values
            .grouped()
            .get(series_index)?
            .identity
            .as_ref()
    }

    pub fn series_objects(&self, series_index: usize) -> Option<&'a ObjectProperties> {
        self.view
            .values
            .grouped()
            .get(series_index)?
            .objects
            .as_ref()
    }

    /// The grouping column's metadata; `None` without a dynamic series.
    pub fn series_metadata_column(&self) -> Option<&'a ColumnMetadata> {
        self.view.values.source()
    }

    pub fn series_identity_fields(&self) -> Option<&'a [SxExpr]> {
        if !self.has_dynamic_series {
            return None;
        }
        self.view.values.identity_fields()
    }
}
