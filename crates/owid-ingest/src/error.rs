use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("csv parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing required columns: {}", missing.join(", "))]
    MissingRequiredColumns { missing: Vec<String> },
}

pub type Result<T> = std::result::Result<T, IngestError>;
