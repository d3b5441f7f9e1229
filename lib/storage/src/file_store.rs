//! One file per key under a cache directory

use crate::store::KeyValueStore;
use anyhow::{bail, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const EXTENSION: &str = "json";

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// The directory is created on first write, not here.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let allowed = |c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_';
        if key.is_empty() || !key.chars().all(allowed) {
            bail!("invalid cache key {:?}", key);
        }
        Ok(self.dir.join(format!("{}.{}", key, EXTENSION)))
    }
}

impl KeyValueStore for FileStore {
    fn name(&self) -> &'static str {
        "files"
    }

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        // write to a temp file and rename, so readers never see a torn entry
        AtomicFile::new(&path, OverwriteBehavior::AllowOverwrite)
            .write(|f| f.write_all(value))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_directory_created_lazily() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested").join("cache");
        let store = FileStore::new(&dir);
        assert!(!dir.exists());
        assert_eq!(store.get("abc123").unwrap(), None);

        store.put("abc123", b"[]").unwrap();
        assert!(dir.join("abc123.json").exists());
        assert_eq!(store.get("abc123").unwrap().as_deref(), Some(&b"[]"[..]));
    }

    #[test]
    fn test_overwrite_and_isolation() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());
        store.put("aa", b"one").unwrap();
        store.put("bb", b"two").unwrap();
        store.put("aa", b"three").unwrap();

        assert_eq!(store.get("aa").unwrap().unwrap(), b"three");
        assert_eq!(store.get("bb").unwrap().unwrap(), b"two");
        assert!(store.contains("bb").unwrap());
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let temp = TempDir::new().unwrap();
        let store = FileStore::new(temp.path());
        assert!(store.put("../escape", b"x").is_err());
        assert!(store.get("").is_err());
    }
}
