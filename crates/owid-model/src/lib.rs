pub mod column;
pub mod legacy;
pub mod row;
pub mod slug;
pub mod spec;
pub mod value;

pub use column::{ColumnKind, EPOCH_DATE, epoch, format_for_csv, format_value, format_value_short};
pub use legacy::{
    LegacyEntityRecord, LegacyVariable, LegacyVariableSource, LegacyVariablesAndEntityKey,
};
pub use row::{Row, row_from_pairs, row_has_value};
pub use slug::{
    ANNOTATIONS_SLUG_SUFFIX, DAY_SLUG, ENTITY_CODE_SLUG, ENTITY_ID_SLUG, ENTITY_NAME_SLUG,
    REQUIRED_OWID_SLUGS, Slug, YEAR_SLUG, annotations_slug, slugify_same_case,
};
pub use spec::{ColumnSpec, DisplaySettings};
pub use value::{CellValue, format_f64_plain};
