//! Column specs and display settings.

use serde::{Deserialize, Serialize};

use crate::column::ColumnKind;
use crate::slug::Slug;

/// Legacy per-variable display settings block.
///
/// Carried verbatim from the legacy wire format; every field is optional
/// and most variables set only one or two.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplaySettings {
    /// Display-name override for the variable.
    pub name: Option<String>,
    /// Unit override.
    pub unit: Option<String>,
    /// Short unit override, e.g. `$` or `%`.
    pub short_unit: Option<String>,
    /// Decimal places for compact formatting.
    pub num_decimal_places: Option<i32>,
    /// Multiplier applied to every value before formatting.
    pub conversion_factor: Option<f64>,
    /// When true the variable's time values are day offsets, not years.
    pub year_is_day: Option<bool>,
    /// The date that day offset `0` refers to, as `YYYY-MM-DD`.
    pub zero_day: Option<String>,
    /// Newline-delimited `EntityName: free text` annotation blob.
    pub entity_annotations_map: Option<String>,
    pub include_in_table: Option<bool>,
}

/// Identity and metadata for one column.
///
/// The slug is the column's stable identity; everything else is display
/// metadata or provenance. Computed/filter/selection closures are not part
/// of the spec (they live on the materialized column in the engine crate),
/// so specs stay serializable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub slug: Slug,
    /// Display label; falls back to the slug when absent.
    pub name: Option<String>,
    #[serde(default)]
    pub kind: ColumnKind,
    pub unit: Option<String>,
    pub short_unit: Option<String>,
    pub description: Option<String>,
    pub coverage: Option<String>,
    pub dataset_id: Option<i64>,
    pub dataset_name: Option<String>,
    /// Name of the data source this column came from.
    pub source_name: Option<String>,
    /// Slug of a companion free-text column holding per-entity annotations.
    pub annotations_column_slug: Option<Slug>,
    pub display: Option<DisplaySettings>,
}

impl ColumnSpec {
    pub fn new(slug: impl Into<Slug>, kind: ColumnKind) -> Self {
        Self {
            slug: slug.into(),
            kind,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_display(mut self, display: DisplaySettings) -> Self {
        self.display = Some(display);
        self
    }

    /// The label shown to readers; slugs stand in when no name was given.
    pub fn display_name(&self) -> &str {
        match &self.name {
            Some(name) if !name.is_empty() => name,
            _ => &self.slug,
        }
    }

    /// Effective short unit: display override wins over the spec's own
    /// `short_unit`, which wins over the full `unit`.
    pub fn effective_short_unit(&self) -> Option<&str> {
        self.display
            .as_ref()
            .and_then(|d| d.short_unit.as_deref())
            .or(self.short_unit.as_deref())
            .or(self.unit.as_deref())
    }
}
