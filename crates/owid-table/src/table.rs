//! Generic table core: row store plus an ordered column registry.
//!
//! The table owns its rows outright. Constructing or loading takes the row
//! vector by value, so the table can never alias caller-owned data; a
//! caller that wants to keep its rows clones them at the call site (this
//! replaces the `cloneRows` opt-out of the dictionary-based original).

use std::collections::BTreeSet;

use owid_model::{
    CellValue, ColumnKind, ColumnSpec, DAY_SLUG, ENTITY_CODE_SLUG, ENTITY_ID_SLUG,
    ENTITY_NAME_SLUG, Row, Slug, YEAR_SLUG,
};

use crate::column::{Column, ColumnRole, ComputeFn, PredicateFn};

/// Generic row store with a slug-keyed column registry.
///
/// Columns live in registration order; filter columns evaluate in that
/// order, which is observable (a later filter may read an earlier filter's
/// written value).
#[derive(Debug, Default)]
pub struct Table {
    rows: Vec<Row>,
    columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from rows, inferring a spec for every distinct key
    /// found across all rows.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut table = Self::new();
        table.load(rows, Vec::new());
        table
    }

    /// Replace the row set and merge specs. Existing slugs are never
    /// overwritten; missing specs are inferred from row keys.
    pub fn load(&mut self, rows: Vec<Row>, specs: Vec<ColumnSpec>) {
        self.rows = rows;
        self.add_specs(specs);
        self.detect_columns_from_rows();
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub(crate) fn rows_mut(&mut self) -> &mut Vec<Row> {
        &mut self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_slugs(&self) -> Vec<Slug> {
        self.columns.iter().map(|c| c.spec.slug.clone()).collect()
    }

    pub fn has_column(&self, slug: &str) -> bool {
        self.columns.iter().any(|c| c.spec.slug == slug)
    }

    pub fn column_by_slug(&self, slug: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.spec.slug == slug)
    }

    /// Register a column spec. Adding a slug that already exists is a
    /// no-op: first writer wins.
    pub fn add_spec(&mut self, spec: ColumnSpec) -> &mut Self {
        if !self.has_column(&spec.slug) {
            self.columns.push(Column::plain(spec));
        }
        self
    }

    pub fn add_specs(&mut self, specs: Vec<ColumnSpec>) -> &mut Self {
        for spec in specs {
            self.add_spec(spec);
        }
        self
    }

    pub fn add_string_column_spec(&mut self, slug: impl Into<Slug>) -> &mut Self {
        self.add_spec(ColumnSpec::new(slug, ColumnKind::String))
    }

    pub fn add_categorical_column_spec(&mut self, slug: impl Into<Slug>) -> &mut Self {
        self.add_spec(ColumnSpec::new(slug, ColumnKind::Categorical))
    }

    /// Register a computed column and materialize it eagerly: the closure
    /// runs once per current row and its result is written back into the
    /// row under the spec's slug. Rows added later do not get values
    /// retroactively.
    pub fn add_numeric_computed_column(&mut self, spec: ColumnSpec, compute: ComputeFn) -> &mut Self {
        let slug = spec.slug.clone();
        self.add_spec(spec);
        for (index, row) in self.rows.iter_mut().enumerate() {
            if let Some(value) = compute(row, index) {
                row.insert(slug.clone(), value);
            }
        }
        self
    }

    /// Register a filter column: an eagerly materialized boolean column
    /// whose predicate is additionally re-run on every `unfiltered_rows`
    /// read. Filters AND together.
    pub fn add_filter_column(&mut self, slug: impl Into<Slug>, predicate: PredicateFn) -> &mut Self {
        let slug = slug.into();
        if self.has_column(&slug) {
            return self;
        }
        for (index, row) in self.rows.iter_mut().enumerate() {
            let result = predicate(row, index);
            row.insert(slug.clone(), CellValue::Boolean(result));
        }
        self.columns.push(Column {
            spec: ColumnSpec::new(slug, ColumnKind::Boolean),
            role: ColumnRole::Filter,
            predicate: Some(predicate),
        });
        self
    }

    /// Register a selection column: a one-shot boolean column OR-composed
    /// into `is_selected`.
    pub fn add_selection_column(
        &mut self,
        slug: impl Into<Slug>,
        predicate: PredicateFn,
    ) -> &mut Self {
        let slug = slug.into();
        if self.has_column(&slug) {
            return self;
        }
        for (index, row) in self.rows.iter_mut().enumerate() {
            let result = predicate(row, index);
            row.insert(slug.clone(), CellValue::Boolean(result));
        }
        self.columns.push(Column {
            spec: ColumnSpec::new(slug, ColumnKind::Boolean),
            role: ColumnRole::Selection,
            predicate: None,
        });
        self
    }

    /// Rows passing every filter column.
    ///
    /// Filter predicates are re-evaluated here, not cached, in
    /// registration order; each result is written into the row before the
    /// next filter runs, so later filters may read earlier filters'
    /// values.
    pub fn unfiltered_rows(&mut self) -> Vec<&Row> {
        let Self { rows, columns } = self;
        let mut keep = vec![true; rows.len()];
        for column in columns.iter().filter(|c| c.is_filter()) {
            let Some(predicate) = column.predicate.as_ref() else {
                continue;
            };
            for (index, row) in rows.iter_mut().enumerate() {
                let result = predicate(row, index);
                row.insert(column.spec.slug.clone(), CellValue::Boolean(result));
                keep[index] = keep[index] && result;
            }
        }
        rows.iter()
            .zip(keep)
            .filter_map(|(row, kept)| kept.then_some(row))
            .collect()
    }

    /// Whether any selection column holds a truthy value for this row.
    pub fn is_selected(&self, row: &Row) -> bool {
        self.columns
            .iter()
            .filter(|c| c.is_selection())
            .any(|c| row.get(&c.spec.slug).is_some_and(CellValue::is_truthy))
    }

    pub fn selected_rows(&self) -> Vec<&Row> {
        self.rows.iter().filter(|row| self.is_selected(row)).collect()
    }

    /// Remove the column and delete its key from every row.
    pub fn delete_column_by_slug(&mut self, slug: &str) {
        self.columns.retain(|c| c.spec.slug != slug);
        for row in &mut self.rows {
            row.remove(slug);
        }
    }

    /// Append a batch of rows and register specs for any new slugs found
    /// in them. Existing column definitions are untouched.
    pub fn clone_and_add_rows_and_detect_columns(&mut self, rows: &[Row]) -> &mut Self {
        self.rows.extend(rows.iter().cloned());
        self.detect_columns_from_rows();
        self
    }

    /// Columns whose value set across all rows has exactly one distinct
    /// member. Absence counts as a member, so a column defined on some
    /// rows only is not constant.
    pub fn constant_columns(&self) -> Vec<&Column> {
        self.columns
            .iter()
            .filter(|column| {
                let mut distinct: Vec<Option<&CellValue>> = Vec::new();
                for row in &self.rows {
                    let value = row.get(&column.spec.slug);
                    if !distinct.contains(&value) {
                        distinct.push(value);
                        if distinct.len() > 1 {
                            return false;
                        }
                    }
                }
                distinct.len() == 1
            })
            .collect()
    }

    /// Register inferred specs for every row key that has no column yet.
    /// Well-known slugs get their domain kinds; everything else defaults
    /// to string.
    fn detect_columns_from_rows(&mut self) {
        let mut seen: BTreeSet<&Slug> = BTreeSet::new();
        let mut new_slugs: Vec<Slug> = Vec::new();
        for row in &self.rows {
            for slug in row.keys() {
                if seen.insert(slug) && !self.columns.iter().any(|c| &c.spec.slug == slug) {
                    new_slugs.push(slug.clone());
                }
            }
        }
        for slug in new_slugs {
            self.columns.push(Column::plain(spec_for_detected_slug(&slug)));
        }
    }
}

/// The spec inferred for a slug with no caller-provided definition.
pub(crate) fn spec_for_detected_slug(slug: &str) -> ColumnSpec {
    ColumnSpec::new(slug, kind_for_detected_slug(slug))
}

fn kind_for_detected_slug(slug: &str) -> ColumnKind {
    match slug {
        YEAR_SLUG => ColumnKind::Year,
        DAY_SLUG => ColumnKind::Day,
        ENTITY_ID_SLUG => ColumnKind::Numeric,
        ENTITY_NAME_SLUG | ENTITY_CODE_SLUG => ColumnKind::String,
        _ => ColumnKind::String,
    }
}
