//! Heterogeneous rows.

use std::collections::BTreeMap;

use crate::slug::Slug;
use crate::value::CellValue;

/// One table row: an ordered map from column slug to value. Rows are
/// heterogeneous; a missing key means the row has no value for that
/// column.
pub type Row = BTreeMap<Slug, CellValue>;

/// Whether the row has a defined, non-empty-string value for the slug.
pub fn row_has_value(row: &Row, slug: &str) -> bool {
    match row.get(slug) {
        Some(value) => !value.is_empty_text(),
        None => false,
    }
}

/// Build a row from `(slug, value)` pairs. Test and loader convenience.
pub fn row_from_pairs<I, S, V>(pairs: I) -> Row
where
    I: IntoIterator<Item = (S, V)>,
    S: Into<Slug>,
    V: Into<CellValue>,
{
    pairs
        .into_iter()
        .map(|(slug, value)| (slug.into(), value.into()))
        .collect()
}
