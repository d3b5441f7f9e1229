use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    /// The query normalized to zero tokens
    #[error("Query contains no searchable words")]
    InvalidQuery,

    #[error("Catalog unavailable: {source}")]
    CatalogUnavailable { source: storerank_core::Error },

    #[error("Embedding provider failed after {attempts} attempt(s): {source}")]
    EmbeddingProvider {
        attempts: u32,
        source: storerank_embedding::Error,
    },

    #[error("Failed to read config file at {path:?}.")]
    ReadConfig {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path:?}.")]
    ParseConfig {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("{message}")]
    Config { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}

impl Error {
    /// Errors the caller caused and can fix by changing the request
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::InvalidQuery)
    }

    /// Errors that mean a dependency of the service is down
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Error::CatalogUnavailable { .. } | Error::EmbeddingProvider { .. }
        )
    }
}
