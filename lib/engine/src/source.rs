use std::path::{Path, PathBuf};
use std::sync::Arc;
use storerank_core::{Catalog, CatalogColumns, Result};

/// Where a request gets its catalog from.
///
/// The catalog handed out is immutable for the duration of one request.
pub trait CatalogSource: Send + Sync {
    fn load(&self) -> Result<Arc<Catalog>>;

    /// Human-readable origin for logs
    fn describe(&self) -> String;
}

/// Reads and parses a CSV file on every request, so edits to the file are
/// picked up without a restart.
#[derive(Debug, Clone)]
pub struct CsvCatalogSource {
    path: PathBuf,
    columns: CatalogColumns,
}

impl CsvCatalogSource {
    pub fn new<P: AsRef<Path>>(path: P, columns: CatalogColumns) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            columns,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogSource for CsvCatalogSource {
    fn load(&self) -> Result<Arc<Catalog>> {
        Catalog::from_path(&self.path, &self.columns).map(Arc::new)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A catalog that is already in memory
#[derive(Debug, Clone)]
pub struct StaticCatalogSource {
    catalog: Arc<Catalog>,
}

impl StaticCatalogSource {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
        }
    }
}

impl CatalogSource for StaticCatalogSource {
    fn load(&self) -> Result<Arc<Catalog>> {
        Ok(Arc::clone(&self.catalog))
    }

    fn describe(&self) -> String {
        format!("in-memory ({} stores)", self.catalog.len())
    }
}
