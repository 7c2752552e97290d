pub mod delimited;
pub mod error;

pub use delimited::{ParsedDelimited, detect_delimiter, parse_delimited, require_slugs};
pub use error::{IngestError, Result};
