//! Column slug handling.
//!
//! A slug is the stable, unique string identity of a column, distinct from
//! its human-readable display name. Slugs double as row-map keys, so they
//! stay plain strings rather than a newtype.

/// Column slug. Row maps are keyed by these.
pub type Slug = String;

/// Slug of the entity display-name column every OWID row carries.
pub const ENTITY_NAME_SLUG: &str = "entityName";

/// Slug of the entity short-code column every OWID row carries.
pub const ENTITY_CODE_SLUG: &str = "entityCode";

/// Slug of the numeric entity-id column every OWID row carries.
pub const ENTITY_ID_SLUG: &str = "entityId";

/// Slug of the yearly time axis.
pub const YEAR_SLUG: &str = "year";

/// Slug of the daily time axis (integer offsets from the reference epoch).
pub const DAY_SLUG: &str = "day";

/// The required headers for OWID-flavored delimited input.
pub const REQUIRED_OWID_SLUGS: [&str; 3] = [ENTITY_NAME_SLUG, ENTITY_CODE_SLUG, ENTITY_ID_SLUG];

/// Suffix appended to a parent slug to form its annotations companion.
pub const ANNOTATIONS_SLUG_SUFFIX: &str = "-annotations";

/// Slugify a header while preserving its casing.
///
/// Whitespace runs become single hyphens and anything that is not
/// alphanumeric, `-` or `_` is dropped, so `"Population in 2020"` becomes
/// `"Population-in-2020"`.
pub fn slugify_same_case(header: &str) -> Slug {
    let mut slug = String::with_capacity(header.len());
    let mut pending_hyphen = false;
    for ch in header.trim().chars() {
        if ch.is_whitespace() {
            pending_hyphen = !slug.is_empty();
            continue;
        }
        if !(ch.is_alphanumeric() || ch == '-' || ch == '_') {
            continue;
        }
        if pending_hyphen {
            slug.push('-');
            pending_hyphen = false;
        }
        slug.push(ch);
    }
    slug
}

/// The companion annotations slug for a parent column slug.
pub fn annotations_slug(parent: &str) -> Slug {
    format!("{parent}{ANNOTATIONS_SLUG_SUFFIX}")
}
