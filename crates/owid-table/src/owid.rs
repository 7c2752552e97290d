//! OWID-domain extension over the generic table core.
//!
//! Adds entity (id/name/code) and time (year|day) semantics: entity
//! indexing maps, year-derived time bounds, time-column selection with
//! day preferred over year, and entity selection helpers.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::{Deref, DerefMut};

use owid_model::{
    CellValue, ColumnKind, ENTITY_CODE_SLUG, ENTITY_ID_SLUG, ENTITY_NAME_SLUG, Row, YEAR_SLUG,
};

use crate::column::Column;
use crate::table::Table;

/// Fixed slug of the boolean selection column created lazily by the
/// entity selection helpers.
pub const SELECTION_SLUG: &str = "is_selected";

/// A table whose rows carry `entityName`, `entityCode`, `entityId` and at
/// most one authoritative time axis (`year` or `day`; day wins when both
/// exist).
#[derive(Debug, Default)]
pub struct OwidTable {
    table: Table,
}

impl Deref for OwidTable {
    type Target = Table;

    fn deref(&self) -> &Table {
        &self.table
    }
}

impl DerefMut for OwidTable {
    fn deref_mut(&mut self) -> &mut Table {
        &mut self.table
    }
}

impl OwidTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from rows, registering the required entity columns ahead of
    /// whatever else the rows carry.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut table = Table::new();
        table
            .add_string_column_spec(ENTITY_NAME_SLUG)
            .add_string_column_spec(ENTITY_CODE_SLUG)
            .add_spec(owid_model::ColumnSpec::new(ENTITY_ID_SLUG, ColumnKind::Numeric));
        table.load(rows, Vec::new());
        Self { table }
    }

    pub(crate) fn from_table(table: Table) -> Self {
        Self { table }
    }

    fn entity_name_of(row: &Row) -> Option<String> {
        row.get(ENTITY_NAME_SLUG).map(CellValue::to_display_string)
    }

    /// Distinct entity names.
    pub fn available_entities_set(&self) -> BTreeSet<String> {
        self.rows().iter().filter_map(Self::entity_name_of).collect()
    }

    /// Entity names in first-seen row order.
    pub fn available_entities(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.rows()
            .iter()
            .filter_map(Self::entity_name_of)
            .filter(|name| seen.insert(name.clone()))
            .collect()
    }

    /// Entity name to all of that entity's rows.
    pub fn entity_index(&self) -> BTreeMap<String, Vec<&Row>> {
        let mut index: BTreeMap<String, Vec<&Row>> = BTreeMap::new();
        for row in self.rows() {
            if let Some(name) = Self::entity_name_of(row) {
                index.entry(name).or_default().push(row);
            }
        }
        index
    }

    /// All rows for one entity, in table order.
    pub fn rows_by_entity_name(&self, entity_name: &str) -> Vec<&Row> {
        self.rows()
            .iter()
            .filter(|row| Self::entity_name_of(row).as_deref() == Some(entity_name))
            .collect()
    }

    pub fn entity_id_to_name_map(&self) -> BTreeMap<i64, String> {
        self.entity_pairs(ENTITY_ID_SLUG)
            .filter_map(|(name, value)| value.as_f64().map(|id| (id as i64, name)))
            .collect()
    }

    pub fn entity_name_to_id_map(&self) -> BTreeMap<String, i64> {
        self.entity_pairs(ENTITY_ID_SLUG)
            .filter_map(|(name, value)| value.as_f64().map(|id| (name, id as i64)))
            .collect()
    }

    pub fn entity_code_to_name_map(&self) -> BTreeMap<String, String> {
        self.entity_pairs(ENTITY_CODE_SLUG)
            .map(|(name, value)| (value.to_display_string(), name))
            .collect()
    }

    pub fn entity_name_to_code_map(&self) -> BTreeMap<String, String> {
        self.entity_pairs(ENTITY_CODE_SLUG)
            .map(|(name, value)| (name, value.to_display_string()))
            .collect()
    }

    fn entity_pairs<'a>(
        &'a self,
        slug: &'a str,
    ) -> impl Iterator<Item = (String, &'a CellValue)> + 'a {
        self.rows().iter().filter_map(move |row| {
            let name = Self::entity_name_of(row)?;
            let value = row.get(slug)?;
            Some((name, value))
        })
    }

    /// Year values across all rows. Day-only tables report nothing here;
    /// daily data is reached through `day_column` instead.
    fn years(&self) -> impl Iterator<Item = i64> + '_ {
        self.rows()
            .iter()
            .filter_map(|row| row.get(YEAR_SLUG))
            .filter_map(CellValue::as_f64)
            .map(|year| year as i64)
    }

    pub fn min_time(&self) -> Option<i64> {
        self.years().min()
    }

    pub fn max_time(&self) -> Option<i64> {
        self.years().max()
    }

    /// Sorted distinct years.
    pub fn all_times(&self) -> Vec<i64> {
        let times: BTreeSet<i64> = self.years().collect();
        times.into_iter().collect()
    }

    pub fn day_column(&self) -> Option<&Column> {
        self.columns().iter().find(|c| c.spec.kind == ColumnKind::Day)
    }

    pub fn has_day_column(&self) -> bool {
        self.day_column().is_some()
    }

    /// The authoritative time axis: the day column when one exists,
    /// otherwise the first temporal column in registration order.
    pub fn time_column(&self) -> Option<&Column> {
        self.day_column()
            .or_else(|| self.columns().iter().find(|c| c.spec.kind.is_temporal()))
    }

    /// Entity names that have a non-empty value for every listed slug.
    pub fn entities_with(&self, slugs: &[&str]) -> BTreeSet<String> {
        let mut slugs = slugs.iter();
        let Some(first) = slugs.next() else {
            return BTreeSet::new();
        };
        let mut entities = match self.column_by_slug(first) {
            Some(column) => column.entity_names_uniq(self.rows()),
            None => return BTreeSet::new(),
        };
        // Single slug is a direct pass-through; every further slug
        // intersects.
        for slug in slugs {
            let next = match self.column_by_slug(slug) {
                Some(column) => column.entity_names_uniq(self.rows()),
                None => return BTreeSet::new(),
            };
            entities = entities.intersection(&next).cloned().collect();
        }
        entities
    }

    fn ensure_selection_column(&mut self) {
        if !self.has_column(SELECTION_SLUG) {
            self.add_selection_column(SELECTION_SLUG, Box::new(|_, _| false));
        }
    }

    fn write_selection(&mut self, entity_name: &str, selected: bool) {
        self.ensure_selection_column();
        for row in self.table.rows_mut() {
            if Self::entity_name_of(row).as_deref() == Some(entity_name) {
                row.insert(SELECTION_SLUG.to_string(), CellValue::Boolean(selected));
            }
        }
    }

    pub fn select_entity(&mut self, entity_name: &str) -> &mut Self {
        self.write_selection(entity_name, true);
        self
    }

    pub fn deselect_entity(&mut self, entity_name: &str) -> &mut Self {
        self.write_selection(entity_name, false);
        self
    }

    /// Replace the selection wholesale with the given entity names.
    pub fn set_selected_entities<I, S>(&mut self, entity_names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ensure_selection_column();
        let selected: BTreeSet<String> = entity_names.into_iter().map(Into::into).collect();
        for row in self.table.rows_mut() {
            let is_selected = Self::entity_name_of(row)
                .is_some_and(|name| selected.contains(&name));
            row.insert(SELECTION_SLUG.to_string(), CellValue::Boolean(is_selected));
        }
        self
    }

    pub fn selected_entity_names(&self) -> BTreeSet<String> {
        self.rows()
            .iter()
            .filter(|row| self.is_selected(row))
            .filter_map(Self::entity_name_of)
            .collect()
    }
}
