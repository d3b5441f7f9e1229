//! TOML configuration.
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! runnable offline setup: hashing embeddings, file cache in `./cache`,
//! built-in filter rules.

use crate::{Error, Result};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use storerank_core::CatalogColumns;

/// Upper bound on embedding attempts per request
pub const MAX_EMBEDDING_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub cache: CacheConfig,
    pub embedding: EmbeddingConfig,
    pub scoring: ScoringConfig,
    pub filter: FilterConfig,
    pub tokenizer: TokenizerConfig,
    pub service: ServiceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub path: PathBuf,
    pub columns: CatalogColumns,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("stores.csv"),
            columns: CatalogColumns::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Files,
    Lmdb,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Files,
            dir: PathBuf::from("./cache"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Hashing,
    Http,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub provider: ProviderKind,
    pub model: String,
    pub dimensions: usize,
    pub api_base: String,
    pub path: String,
    pub api_key: Option<String>,
    pub timeout_ms: u64,
    pub batch_size: usize,
    /// 1 means no retry
    pub max_attempts: u32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Hashing,
            model: "monologg/kobert".to_string(),
            dimensions: 768,
            api_base: "http://127.0.0.1:8080/v1".to_string(),
            path: "/embeddings".to_string(),
            api_key: None,
            timeout_ms: 30_000,
            batch_size: 64,
            max_attempts: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub threshold: f32,
    pub top_k: usize,
    pub parallel: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            threshold: storerank_similarity::DEFAULT_THRESHOLD,
            top_k: storerank_similarity::DEFAULT_TOP_K,
            parallel: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Replaces the built-in rule table when set
    pub rules_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    pub stopwords: Vec<String>,
    pub min_chars: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            stopwords: ["스타", "벅스", "스타벅스", "스벅", "매장", "카페"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_chars: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub http_bind: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            http_bind: "127.0.0.1:6333".to_string(),
        }
    }
}

pub fn load(path: &Path) -> Result<Config> {
    let raw = fs::read_to_string(path).map_err(|err| Error::ReadConfig {
        path: path.to_path_buf(),
        source: err,
    })?;

    let mut cfg: Config = toml::from_str(&raw).map_err(|err| Error::ParseConfig {
        path: path.to_path_buf(),
        source: err,
    })?;

    normalize(&mut cfg);
    validate(&cfg)?;

    Ok(cfg)
}

pub fn normalize(cfg: &mut Config) {
    trim_in_place(&mut cfg.embedding.model);
    trim_in_place(&mut cfg.embedding.api_base);
    trim_in_place(&mut cfg.embedding.path);
    trim_in_place(&mut cfg.service.http_bind);

    if cfg
        .embedding
        .api_key
        .as_deref()
        .map(|key| key.trim().is_empty())
        .unwrap_or(false)
    {
        cfg.embedding.api_key = None;
    }
    if cfg
        .filter
        .rules_path
        .as_deref()
        .map(|p| p.as_os_str().is_empty())
        .unwrap_or(false)
    {
        cfg.filter.rules_path = None;
    }

    let mut seen = AHashSet::new();
    cfg.tokenizer.stopwords = std::mem::take(&mut cfg.tokenizer.stopwords)
        .into_iter()
        .map(|w| w.trim().to_string())
        .filter(|w| !w.is_empty() && seen.insert(w.clone()))
        .collect();
}

fn trim_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

fn invalid(message: &str) -> Error {
    Error::Config {
        message: message.to_string(),
    }
}

pub fn validate(cfg: &Config) -> Result<()> {
    if cfg.catalog.path.as_os_str().is_empty() {
        return Err(invalid("catalog.path must be non-empty."));
    }
    let columns = &cfg.catalog.columns;
    let names = [
        &columns.identifier,
        &columns.address,
        &columns.store_type,
        &columns.frequency,
    ];
    if names.iter().any(|n| n.trim().is_empty()) {
        return Err(invalid("catalog.columns entries must be non-empty."));
    }
    for (i, a) in names.iter().enumerate() {
        if names[i + 1..].contains(a) {
            return Err(invalid("catalog.columns entries must be distinct."));
        }
    }

    if cfg.cache.backend != CacheBackend::Memory && cfg.cache.dir.as_os_str().is_empty() {
        return Err(invalid("cache.dir must be non-empty."));
    }

    let embedding = &cfg.embedding;
    if embedding.dimensions == 0 {
        return Err(invalid("embedding.dimensions must be greater than zero."));
    }
    if embedding.batch_size == 0 {
        return Err(invalid("embedding.batch_size must be greater than zero."));
    }
    if embedding.max_attempts == 0 || embedding.max_attempts > MAX_EMBEDDING_ATTEMPTS {
        return Err(Error::Config {
            message: format!(
                "embedding.max_attempts must be between 1 and {}.",
                MAX_EMBEDDING_ATTEMPTS
            ),
        });
    }
    if embedding.provider == ProviderKind::Http {
        if embedding.api_base.is_empty() {
            return Err(invalid("embedding.api_base must be non-empty for the http provider."));
        }
        if embedding.model.is_empty() {
            return Err(invalid("embedding.model must be non-empty for the http provider."));
        }
        if !embedding.path.starts_with('/') {
            return Err(invalid("embedding.path must start with '/'."));
        }
        if embedding.timeout_ms == 0 {
            return Err(invalid("embedding.timeout_ms must be greater than zero."));
        }
    }

    let scoring = &cfg.scoring;
    if !scoring.threshold.is_finite() || !(-1.0..=1.0).contains(&scoring.threshold) {
        return Err(invalid("scoring.threshold must be a finite number in [-1, 1]."));
    }
    if scoring.top_k == 0 {
        return Err(invalid("scoring.top_k must be greater than zero."));
    }

    if cfg.tokenizer.min_chars == 0 {
        return Err(invalid("tokenizer.min_chars must be greater than zero."));
    }
    if cfg.service.http_bind.is_empty() {
        return Err(invalid("service.http_bind must be non-empty."));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn parse(raw: &str) -> Result<Config> {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(raw.as_bytes()).unwrap();
        load(file.path())
    }

    fn message(err: Error) -> String {
        match err {
            Error::Config { message } => message,
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let cfg = parse("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.scoring.threshold, 0.98);
        assert_eq!(cfg.scoring.top_k, 10);
        assert_eq!(cfg.cache.backend, CacheBackend::Files);
        assert_eq!(cfg.catalog.columns.identifier, "Store_Name");
        assert_eq!(cfg.tokenizer.stopwords.len(), 6);
    }

    #[test]
    fn test_sections_override_defaults() {
        let cfg = parse(
            r#"
            [catalog]
            path = "data/stores.csv"

            [catalog.columns]
            identifier = "name"

            [cache]
            backend = "lmdb"
            dir = "/var/cache/storerank"

            [embedding]
            provider = "http"
            api_base = " http://models:8080/v1 "
            api_key = "  "
            max_attempts = 3

            [scoring]
            threshold = 0.9
            parallel = false

            [tokenizer]
            stopwords = ["매장", " 매장 ", "", "카페"]
            "#,
        )
        .unwrap();

        assert_eq!(cfg.catalog.path, PathBuf::from("data/stores.csv"));
        assert_eq!(cfg.catalog.columns.identifier, "name");
        assert_eq!(cfg.catalog.columns.frequency, "frequency");
        assert_eq!(cfg.cache.backend, CacheBackend::Lmdb);
        assert_eq!(cfg.embedding.provider, ProviderKind::Http);
        assert_eq!(cfg.embedding.api_base, "http://models:8080/v1");
        assert_eq!(cfg.embedding.api_key, None);
        assert_eq!(cfg.embedding.max_attempts, 3);
        assert_eq!(cfg.scoring.threshold, 0.9);
        assert!(!cfg.scoring.parallel);
        assert_eq!(cfg.tokenizer.stopwords, vec!["매장", "카페"]);
    }

    #[test]
    fn test_validation_failures() {
        let err = parse("[embedding]\nmax_attempts = 9\n").unwrap_err();
        assert!(message(err).contains("max_attempts"));

        let err = parse("[scoring]\ntop_k = 0\n").unwrap_err();
        assert!(message(err).contains("top_k"));

        let err = parse("[scoring]\nthreshold = 1.5\n").unwrap_err();
        assert!(message(err).contains("threshold"));

        let err = parse("[catalog.columns]\naddress = \"Store_Name\"\n").unwrap_err();
        assert!(message(err).contains("distinct"));

        let err = parse("[embedding]\nprovider = \"http\"\npath = \"embeddings\"\n").unwrap_err();
        assert!(message(err).contains("embedding.path"));
    }

    #[test]
    fn test_read_and_parse_errors() {
        let missing = load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(missing, Error::ReadConfig { .. }));

        let bad = parse("[cache]\nbackend = \"redis\"\n").unwrap_err();
        assert!(matches!(bad, Error::ParseConfig { .. }));
    }
}
