//! Materialized columns.
//!
//! A column binds one spec to the owning table. It never owns row data;
//! every derived view here scans the row set it is handed, on demand.

use std::collections::{BTreeMap, BTreeSet};

use owid_model::{CellValue, ColumnSpec, ENTITY_NAME_SLUG, Row, row_has_value};

/// Closure deriving a computed column's value from a row and its index.
pub type ComputeFn = Box<dyn Fn(&Row, usize) -> Option<CellValue>>;

/// Boolean predicate backing filter and selection columns.
pub type PredicateFn = Box<dyn Fn(&Row, usize) -> bool>;

/// What part a column plays in row visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    /// Ordinary data or computed column.
    Plain,
    /// Boolean column AND-composed into `unfiltered_rows`.
    Filter,
    /// Boolean column OR-composed into selection.
    Selection,
}

/// A column registered on a table.
pub struct Column {
    pub spec: ColumnSpec,
    pub(crate) role: ColumnRole,
    /// Present on filter columns only; re-run on every `unfiltered_rows`
    /// read. Selection columns materialize once and are read back from
    /// the rows.
    pub(crate) predicate: Option<PredicateFn>,
}

impl Column {
    pub(crate) fn plain(spec: ColumnSpec) -> Self {
        Self {
            spec,
            role: ColumnRole::Plain,
            predicate: None,
        }
    }

    pub fn slug(&self) -> &str {
        &self.spec.slug
    }

    pub fn role(&self) -> ColumnRole {
        self.role
    }

    pub fn is_filter(&self) -> bool {
        self.role == ColumnRole::Filter
    }

    pub fn is_selection(&self) -> bool {
        self.role == ColumnRole::Selection
    }

    /// Rows where this column has a defined, non-empty-string value.
    pub fn rows_with_value<'a>(&self, rows: &'a [Row]) -> Vec<&'a Row> {
        rows.iter()
            .filter(|row| row_has_value(row, &self.spec.slug))
            .collect()
    }

    /// Defined, non-empty values in row order.
    pub fn values<'a>(&self, rows: &'a [Row]) -> Vec<&'a CellValue> {
        self.rows_with_value(rows)
            .into_iter()
            .filter_map(|row| row.get(&self.spec.slug))
            .collect()
    }

    /// Distinct entity names among rows where this column has a value.
    pub fn entity_names_uniq(&self, rows: &[Row]) -> BTreeSet<String> {
        self.rows_with_value(rows)
            .into_iter()
            .filter_map(|row| row.get(ENTITY_NAME_SLUG))
            .map(CellValue::to_display_string)
            .collect()
    }

    /// Last-seen value per entity, in row order.
    pub fn latest_values_map(&self, rows: &[Row]) -> BTreeMap<String, CellValue> {
        let mut map = BTreeMap::new();
        for row in self.rows_with_value(rows) {
            let (Some(entity), Some(value)) =
                (row.get(ENTITY_NAME_SLUG), row.get(&self.spec.slug))
            else {
                continue;
            };
            map.insert(entity.to_display_string(), value.clone());
        }
        map
    }

    /// Sorted distinct non-empty string values.
    pub fn sorted_uniq_non_empty_string_vals(&self, rows: &[Row]) -> Vec<String> {
        let uniq: BTreeSet<String> = self
            .values(rows)
            .into_iter()
            .filter_map(|value| value.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        uniq.into_iter().collect()
    }

    pub fn format_value(&self, value: Option<&CellValue>) -> String {
        owid_model::format_value(self.spec.kind, value, &self.spec)
    }

    pub fn format_value_short(&self, value: Option<&CellValue>) -> String {
        owid_model::format_value_short(self.spec.kind, value, &self.spec)
    }

    pub fn format_for_csv(&self, value: Option<&CellValue>) -> String {
        owid_model::format_for_csv(self.spec.kind, value)
    }
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("spec", &self.spec)
            .field("role", &self.role)
            .field("has_predicate", &self.predicate.is_some())
            .finish()
    }
}
