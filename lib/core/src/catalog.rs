//! Store catalog loading.
//!
//! The catalog is a CSV file with a header row. Four columns are required
//! (identifier, address, store type, frequency table); every other column
//! whose cells read as booleans becomes a named attribute flag. A row whose
//! frequency table does not parse is rejected on its own and reported in
//! [`Catalog::rejected`]; it never fails the whole load.

use crate::candidate::Candidate;
use crate::frequency::FrequencyTable;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Header names of the required catalog columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogColumns {
    pub identifier: String,
    pub address: String,
    pub store_type: String,
    pub frequency: String,
}

impl Default for CatalogColumns {
    fn default() -> Self {
        Self {
            identifier: "Store_Name".to_string(),
            address: "storeAddress".to_string(),
            store_type: "storeType".to_string(),
            frequency: "frequency".to_string(),
        }
    }
}

/// A catalog row that was dropped while loading
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedRecord {
    /// 1-based line in the source file
    pub line: u64,
    pub identifier: Option<String>,
    pub reason: String,
}

/// All loadable candidates in file order, plus the rows that were rejected
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    candidates: Vec<Candidate>,
    rejected: Vec<RejectedRecord>,
}

impl Catalog {
    /// Build an in-memory catalog; positions are reassigned in slice order.
    pub fn from_candidates(candidates: Vec<Candidate>) -> Self {
        let candidates = candidates
            .into_iter()
            .enumerate()
            .map(|(i, c)| c.with_position(i))
            .collect();
        Self {
            candidates,
            rejected: Vec::new(),
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P, columns: &CatalogColumns) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::CatalogUnavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Self::from_reader(file, columns).map_err(|e| match e {
            Error::CatalogUnavailable { .. } => e,
            other => Error::CatalogUnavailable {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        })
    }

    pub fn from_reader<R: Read>(reader: R, columns: &CatalogColumns) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let headers: Vec<String> = csv
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        let layout = Layout::resolve(&headers, columns)?;

        let mut catalog = Catalog::default();
        for (row, record) in csv.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    let line = e.position().map(|p| p.line()).unwrap_or(row as u64 + 2);
                    catalog.reject(line, None, e.to_string());
                    continue;
                }
            };
            let line = record.position().map(|p| p.line()).unwrap_or(row as u64 + 2);

            let id = record.get(layout.identifier).unwrap_or("").trim();
            if id.is_empty() {
                catalog.reject(line, None, "empty identifier".to_string());
                continue;
            }

            let frequency = match record
                .get(layout.frequency)
                .unwrap_or("")
                .parse::<FrequencyTable>()
            {
                Ok(table) => table,
                Err(e) => {
                    catalog.reject(line, Some(id.to_string()), e.to_string());
                    continue;
                }
            };

            let mut flags = BTreeMap::new();
            for (idx, name) in &layout.flag_columns {
                if let Some(value) = record.get(*idx).and_then(parse_flag) {
                    flags.insert(name.clone(), value);
                }
            }

            let position = catalog.candidates.len();
            catalog.candidates.push(Candidate {
                id: id.to_string(),
                address: record.get(layout.address).unwrap_or("").trim().to_string(),
                store_type: record.get(layout.store_type).unwrap_or("").trim().to_string(),
                flags,
                frequency,
                position,
            });
        }

        debug!(
            loaded = catalog.candidates.len(),
            rejected = catalog.rejected.len(),
            "Catalog loaded"
        );
        Ok(catalog)
    }

    fn reject(&mut self, line: u64, identifier: Option<String>, reason: String) {
        warn!(line, identifier = ?identifier, %reason, "Skipping malformed catalog record");
        self.rejected.push(RejectedRecord {
            line,
            identifier,
            reason,
        });
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn rejected(&self) -> &[RejectedRecord] {
        &self.rejected
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }
}

struct Layout {
    identifier: usize,
    address: usize,
    store_type: usize,
    frequency: usize,
    flag_columns: Vec<(usize, String)>,
}

impl Layout {
    fn resolve(headers: &[String], columns: &CatalogColumns) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| Error::MissingColumn(name.to_string()))
        };

        let identifier = find(&columns.identifier)?;
        let address = find(&columns.address)?;
        let store_type = find(&columns.store_type)?;
        let frequency = find(&columns.frequency)?;

        let flag_columns = headers
            .iter()
            .enumerate()
            .filter(|(idx, name)| {
                !name.is_empty() && ![identifier, address, store_type, frequency].contains(idx)
            })
            .map(|(idx, name)| (idx, name.clone()))
            .collect();

        Ok(Self {
            identifier,
            address,
            store_type,
            frequency,
            flag_columns,
        })
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim() {
        "True" | "true" | "TRUE" | "1" => Some(true),
        "False" | "false" | "FALSE" | "0" => Some(false),
        _ => None,
    }
}
