// LMDB-backed result store, for caches with many entries
use crate::store::KeyValueStore;
use anyhow::Result;
use heed::types::{Bytes, Str};
use heed::{Database, Env, EnvOpenOptions};
use std::path::Path;
use std::sync::Arc;

const DB_RESULTS: &str = "results";

/// 1 GiB; result lists are tiny, this holds millions of them
pub const DEFAULT_MAP_SIZE: usize = 1024 * 1024 * 1024;

pub struct LmdbStore {
    env: Arc<Env>,
    results_db: Database<Str, Bytes>,
}

impl LmdbStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_map_size(path, DEFAULT_MAP_SIZE)
    }

    pub fn with_map_size<P: AsRef<Path>>(path: P, map_size: usize) -> Result<Self> {
        std::fs::create_dir_all(&path)?;

        let env = Arc::new(unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(1)
                .open(path)?
        });

        let mut wtxn = env.write_txn()?;
        let results_db = env.create_database(&mut wtxn, Some(DB_RESULTS))?;
        wtxn.commit()?;

        Ok(Self { env, results_db })
    }

    pub fn len(&self) -> Result<u64> {
        let rtxn = self.env.read_txn()?;
        Ok(self.results_db.len(&rtxn)?)
    }

    pub fn sync(&self) -> Result<()> {
        self.env.force_sync()?;
        Ok(())
    }
}

impl KeyValueStore for LmdbStore {
    fn name(&self) -> &'static str {
        "lmdb"
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let rtxn = self.env.read_txn()?;
        match self.results_db.get(&rtxn, key)? {
            Some(data) => Ok(Some(data.to_vec())),
            None => Ok(None),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut wtxn = self.env.write_txn()?;
        self.results_db.put(&mut wtxn, key, value)?;
        wtxn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_lmdb_put_get_reopen() {
        let temp = TempDir::new().unwrap();
        {
            let store = LmdbStore::with_map_size(temp.path(), 10 * 1024 * 1024).unwrap();
            assert_eq!(store.get("k").unwrap(), None);
            store.put("k", b"[1]").unwrap();
            store.put("k", b"[2]").unwrap();
            assert_eq!(store.len().unwrap(), 1);
            store.sync().unwrap();
        }
        let store = LmdbStore::with_map_size(temp.path(), 10 * 1024 * 1024).unwrap();
        assert_eq!(store.get("k").unwrap().unwrap(), b"[2]");
    }
}
