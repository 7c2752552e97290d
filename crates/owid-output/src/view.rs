//! Export-only table snapshots.

use anyhow::{Context, Result};
use owid_model::{CellValue, ColumnSpec, ENTITY_ID_SLUG, ENTITY_NAME_SLUG, Row, Slug};
use owid_table::Table;

/// A non-reactive snapshot of a table's rows and column specs, taken at
/// construction time. Later mutations of the parent table do not show
/// through.
#[derive(Debug, Clone)]
pub struct TableView {
    rows: Vec<Row>,
    specs: Vec<ColumnSpec>,
    constant_slugs: Vec<Slug>,
}

impl TableView {
    pub fn new(table: &Table) -> Self {
        Self {
            rows: table.rows().to_vec(),
            specs: table.columns().iter().map(|c| c.spec.clone()).collect(),
            constant_slugs: table
                .constant_columns()
                .iter()
                .map(|c| c.spec.slug.clone())
                .collect(),
        }
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Render every column, slugs as headers, export-safe cell
    /// formatting. Output is always comma-delimited unless a delimiter is
    /// given.
    pub fn to_delimited(&self, delimiter: u8) -> Result<String> {
        self.render(&self.specs, &self.rows, delimiter, false)
    }

    pub fn to_csv(&self) -> Result<String> {
        self.to_delimited(b',')
    }

    /// Clean export: constant columns and `entityId` dropped, rows sorted
    /// by entity name ascending, display names as headers.
    pub fn to_pretty_csv(&self) -> Result<String> {
        let specs: Vec<ColumnSpec> = self
            .specs
            .iter()
            .filter(|spec| spec.slug != ENTITY_ID_SLUG && !self.constant_slugs.contains(&spec.slug))
            .cloned()
            .collect();
        let mut rows = self.rows.clone();
        rows.sort_by_key(|row| {
            row.get(ENTITY_NAME_SLUG)
                .map(CellValue::to_display_string)
                .unwrap_or_default()
        });
        self.render(&specs, &rows, b',', true)
    }

    fn render(
        &self,
        specs: &[ColumnSpec],
        rows: &[Row],
        delimiter: u8,
        display_names: bool,
    ) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(Vec::new());

        let header: Vec<&str> = specs
            .iter()
            .map(|spec| {
                if display_names {
                    spec.display_name()
                } else {
                    spec.slug.as_str()
                }
            })
            .collect();
        writer.write_record(&header).context("write header row")?;

        for row in rows {
            let record: Vec<String> = specs
                .iter()
                .map(|spec| owid_model::format_for_csv(spec.kind, row.get(&spec.slug)))
                .collect();
            writer.write_record(&record).context("write data row")?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|err| anyhow::anyhow!("flush csv writer: {err}"))?;
        String::from_utf8(bytes).context("csv output is not utf-8")
    }
}
