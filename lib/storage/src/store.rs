use anyhow::Result;

/// Byte-valued key-value store behind the result cache.
///
/// Keys are short ASCII strings (hex digests). Writers to different keys
/// must not interfere; concurrent writers to the same key may race, last
/// one wins.
pub trait KeyValueStore: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &'static str;

    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    fn put(&self, key: &str, value: &[u8]) -> Result<()>;

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}
