//! Delimited-text parsing.
//!
//! Input is a header row plus data rows sharing one delimiter (comma or
//! tab, autodetected from the header line). Headers are slugified
//! case-preserving on load and the slug replaces the raw header as the row
//! key. Cells that parse as numbers become numeric values, `true`/`false`
//! become booleans, empty cells become absent keys.

use owid_model::{CellValue, Row, Slug, slugify_same_case};

use crate::error::{IngestError, Result};

/// Parsed delimited text: slugified headers in file order plus one row map
/// per data line.
#[derive(Debug, Clone)]
pub struct ParsedDelimited {
    pub slugs: Vec<Slug>,
    pub rows: Vec<Row>,
}

/// Pick the delimiter by inspecting the header line. Tabs win when
/// present; everything else is treated as comma-separated.
pub fn detect_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or("");
    if header.contains('\t') { b'\t' } else { b',' }
}

/// Parse CSV/TSV text into rows keyed by slugified headers.
pub fn parse_delimited(text: &str) -> Result<ParsedDelimited> {
    let delimiter = detect_delimiter(text);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let slugs: Vec<Slug> = reader
        .headers()?
        .iter()
        .map(slugify_same_case)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row = Row::new();
        for (idx, slug) in slugs.iter().enumerate() {
            let raw = record.get(idx).unwrap_or("").trim();
            if raw.is_empty() {
                continue;
            }
            row.insert(slug.clone(), parse_cell(raw));
        }
        rows.push(row);
    }
    tracing::debug!(columns = slugs.len(), rows = rows.len(), "parsed delimited input");
    Ok(ParsedDelimited { slugs, rows })
}

/// Validate that every required slug is present, reporting all missing
/// ones at once.
pub fn require_slugs(present: &[Slug], required: &[&str]) -> Result<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|slug| !present.iter().any(|p| p == *slug))
        .map(|slug| (*slug).to_string())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(IngestError::MissingRequiredColumns { missing })
    }
}

fn parse_cell(raw: &str) -> CellValue {
    match raw.parse::<f64>() {
        // Literal NaN/inf text stays text; only finite parses become
        // numeric cells.
        Ok(number) if number.is_finite() => CellValue::Number(number),
        _ => match raw {
            "true" => CellValue::Boolean(true),
            "false" => CellValue::Boolean(false),
            _ => CellValue::Text(raw.to_string()),
        },
    }
}
