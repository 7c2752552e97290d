//! Legacy-format loader.
//!
//! Converts the sparse "one array per variable, entities referenced by
//! integer id" wire format into dense per-row records. Wire-compatibility
//! quirks are preserved bit-for-bit: the last-write-wins merge on
//! duplicate `(time, entity)` keys, the first-colon-only annotation
//! split, and the epoch-diff day normalization.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use owid_model::{
    CellValue, ColumnKind, ColumnSpec, DAY_SLUG, ENTITY_CODE_SLUG, ENTITY_ID_SLUG,
    ENTITY_NAME_SLUG, EPOCH_DATE, LegacyVariable, LegacyVariablesAndEntityKey, Row, Slug,
    YEAR_SLUG, annotations_slug, epoch, slugify_same_case,
};

use crate::owid::OwidTable;
use crate::table::Table;

/// Variable 123 carries continent membership and is relabeled on load.
const CONTINENT_VARIABLE_ID: i64 = 123;

impl OwidTable {
    /// Parse and load a legacy JSON payload.
    pub fn from_legacy_json(json: &str) -> Result<Self> {
        let payload: LegacyVariablesAndEntityKey =
            serde_json::from_str(json).context("parse legacy variables payload")?;
        Ok(Self::from_legacy(&payload))
    }

    /// Load a legacy payload: one row per `(variable, index)` pair, merged
    /// by `(time, entity)` key and sorted by `[year, day]`.
    pub fn from_legacy(payload: &LegacyVariablesAndEntityKey) -> Self {
        let mut table = Table::new();
        table
            .add_spec(ColumnSpec::new(ENTITY_NAME_SLUG, ColumnKind::String))
            .add_spec(ColumnSpec::new(ENTITY_ID_SLUG, ColumnKind::Numeric))
            .add_spec(ColumnSpec::new(ENTITY_CODE_SLUG, ColumnKind::String));

        // Deterministic order: numeric variable id, not JSON map order.
        let mut variables: Vec<&LegacyVariable> = payload.variables.values().collect();
        variables.sort_by_key(|v| v.id);

        let mut merged: BTreeMap<(i64, String), Row> = BTreeMap::new();
        for variable in variables {
            load_variable(&mut table, variable, payload, &mut merged);
        }

        let mut rows: Vec<Row> = merged.into_values().collect();
        rows.sort_by_key(row_time_sort_key);
        tracing::debug!(
            variables = payload.variables.len(),
            rows = rows.len(),
            "merged legacy payload"
        );
        table.load(rows, Vec::new());
        Self::from_table(table)
    }

    /// Multiply every stored numeric value of one legacy-loaded column in
    /// place. Returns the number of rewritten cells.
    pub fn apply_unit_conversion_and_overwrite_legacy_column(
        &mut self,
        factor: f64,
        slug: &str,
    ) -> usize {
        let mut modified = 0;
        for row in self.rows_mut() {
            if let Some(CellValue::Number(value)) = row.get_mut(slug) {
                *value *= factor;
                modified += 1;
            }
        }
        tracing::debug!(slug, factor, modified, "applied unit conversion");
        modified
    }
}

fn load_variable(
    table: &mut Table,
    variable: &LegacyVariable,
    payload: &LegacyVariablesAndEntityKey,
    merged: &mut BTreeMap<(i64, String), Row>,
) {
    let spec = spec_from_variable(variable);
    let slug = spec.slug.clone();
    let year_is_day = variable
        .display
        .as_ref()
        .and_then(|d| d.year_is_day)
        .unwrap_or(false);

    // Each variable registers its own time axis; a table mixing daily and
    // yearly variables ends up with both specs.
    let time_slug = if year_is_day {
        table.add_spec(ColumnSpec::new(DAY_SLUG, ColumnKind::Day));
        DAY_SLUG
    } else {
        table.add_spec(ColumnSpec::new(YEAR_SLUG, ColumnKind::Year));
        YEAR_SLUG
    };

    let annotations = variable
        .display
        .as_ref()
        .and_then(|d| d.entity_annotations_map.as_deref())
        .map(parse_entity_annotations)
        .unwrap_or_default();
    let annotation_slug: Option<Slug> = if annotations.is_empty() {
        None
    } else {
        Some(annotations_slug(&slug))
    };

    let mut spec = spec;
    spec.annotations_column_slug = annotation_slug.clone();
    table.add_spec(spec);
    if let Some(annotation_slug) = &annotation_slug {
        table.add_spec(
            ColumnSpec::new(annotation_slug.clone(), ColumnKind::String)
                .with_name(format!("{slug} annotations")),
        );
    }

    let epoch_shift = if year_is_day {
        day_epoch_shift(variable)
    } else {
        0
    };

    for (index, value) in variable.values.iter().enumerate() {
        let (Some(entity_id), Some(raw_time)) =
            (variable.entities.get(index), variable.years.get(index))
        else {
            tracing::warn!(
                variable = variable.id,
                index,
                "values array longer than entities/years; trailing values dropped"
            );
            break;
        };
        let Some(entity) = payload.entity_key.get(&entity_id.to_string()) else {
            tracing::warn!(variable = variable.id, entity_id, "unknown entity id; row skipped");
            continue;
        };
        let time = raw_time + epoch_shift;

        let mut row = Row::new();
        row.insert(ENTITY_NAME_SLUG.to_string(), CellValue::Text(entity.name.clone()));
        row.insert(
            ENTITY_CODE_SLUG.to_string(),
            CellValue::Text(entity.code.clone().unwrap_or_default()),
        );
        row.insert(ENTITY_ID_SLUG.to_string(), CellValue::Number(*entity_id as f64));
        row.insert(time_slug.to_string(), CellValue::Number(time as f64));
        row.insert(slug.clone(), value.clone());
        if let Some(annotation_slug) = &annotation_slug
            && let Some(text) = annotations.get(&entity.name)
        {
            row.insert(annotation_slug.clone(), CellValue::Text(text.clone()));
        }

        merge_row(merged, (time, entity.name.clone()), row, &slug, variable.id);
    }
}

/// Shallow-overwrite union: all rows sharing a `(time, entity)` key merge
/// into one, later writes winning on any overlapping field.
fn merge_row(
    merged: &mut BTreeMap<(i64, String), Row>,
    key: (i64, String),
    row: Row,
    slug: &Slug,
    variable_id: i64,
) {
    match merged.get_mut(&key) {
        Some(existing) => {
            if existing.contains_key(slug) {
                // Same variable, same entity, same time: last write wins,
                // silently as far as the caller is concerned.
                tracing::warn!(
                    variable = variable_id,
                    time = key.0,
                    entity = %key.1,
                    "duplicate value for (time, entity); keeping the later one"
                );
            }
            existing.extend(row);
        }
        None => {
            merged.insert(key, row);
        }
    }
}

fn spec_from_variable(variable: &LegacyVariable) -> ColumnSpec {
    let name = if variable.id == CONTINENT_VARIABLE_ID {
        "Continent".to_string()
    } else {
        variable
            .name
            .clone()
            .unwrap_or_else(|| format!("Variable {}", variable.id))
    };
    ColumnSpec {
        slug: slugify_same_case(&name),
        name: Some(name),
        kind: ColumnKind::Numeric,
        unit: variable.unit.clone(),
        short_unit: variable.short_unit.clone(),
        description: variable.description.clone(),
        coverage: variable.coverage.clone(),
        dataset_id: variable.dataset_id,
        dataset_name: variable.dataset_name.clone(),
        source_name: variable.source.as_ref().and_then(|s| s.name.clone()),
        annotations_column_slug: None,
        display: variable.display.clone(),
    }
}

/// Whole-day difference between a daily variable's declared zero day and
/// the reference epoch. Offsets are shifted by this at load time so day
/// values from variables with different custom epochs stay comparable.
fn day_epoch_shift(variable: &LegacyVariable) -> i64 {
    let Some(zero_day) = variable.display.as_ref().and_then(|d| d.zero_day.as_deref()) else {
        return 0;
    };
    if zero_day == EPOCH_DATE {
        return 0;
    }
    match NaiveDate::parse_from_str(zero_day, "%Y-%m-%d") {
        Ok(date) => (date - epoch()).num_days(),
        Err(_) => {
            tracing::warn!(variable = variable.id, zero_day, "unparseable zeroDay; not shifted");
            0
        }
    }
}

/// Parse the newline-delimited `EntityName: free text` annotation blob.
/// Each line splits on the first colon only; remaining colons stay part
/// of the text. Blank annotations are dropped, so a later non-blank entry
/// for the same entity wins while blanks never erase one.
fn parse_entity_annotations(blob: &str) -> BTreeMap<String, String> {
    let mut annotations = BTreeMap::new();
    for line in blob.lines() {
        let Some((entity, text)) = line.split_once(':') else {
            continue;
        };
        let entity = entity.trim();
        let text = text.trim();
        if entity.is_empty() || text.is_empty() {
            continue;
        }
        annotations.insert(entity.to_string(), text.to_string());
    }
    annotations
}

/// Sort key for merged rows: year first, day as secondary key; rows
/// lacking a field sort after rows that have it.
fn row_time_sort_key(row: &Row) -> (i64, i64) {
    let get = |slug: &str| {
        row.get(slug)
            .and_then(CellValue::as_f64)
            .map_or(i64::MAX, |t| t as i64)
    };
    (get(YEAR_SLUG), get(DAY_SLUG))
}
