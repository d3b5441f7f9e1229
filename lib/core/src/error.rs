use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Catalog unavailable at {path:?}: {reason}")]
    CatalogUnavailable { path: PathBuf, reason: String },

    #[error("Catalog is missing required column: {0}")]
    MissingColumn(String),

    #[error("Malformed frequency table: {0}")]
    MalformedFrequency(String),

    #[error("Invalid filter rule #{index}: {reason}")]
    InvalidRule { index: usize, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Rule table parse error: {0}")]
    RuleParse(#[from] toml::de::Error),
}
