//! Embedding model served over an OpenAI-compatible `/embeddings` endpoint.
//!
//! The pretrained model (and its device placement) lives in the server;
//! this side only batches tokens and validates the response shape.

use crate::model::EmbeddingModel;
use crate::{Error, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use storerank_core::Vector;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpModelConfig {
    pub api_base: String,
    pub path: String,
    pub model: String,
    pub api_key: Option<String>,
    pub dimensions: usize,
    pub timeout_ms: u64,
}

pub struct HttpModel {
    client: Client,
    url: String,
    model: String,
    dimensions: usize,
}

impl HttpModel {
    pub fn new(cfg: &HttpModelConfig) -> Result<Self> {
        if cfg.api_base.trim().is_empty() {
            return Err(Error::InvalidConfig {
                message: "embedding api_base must be non-empty.".to_string(),
            });
        }
        if cfg.model.trim().is_empty() {
            return Err(Error::InvalidConfig {
                message: "embedding model must be non-empty.".to_string(),
            });
        }
        if cfg.dimensions == 0 {
            return Err(Error::InvalidConfig {
                message: "embedding dimensions must be greater than zero.".to_string(),
            });
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = cfg.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {}", key.trim())).map_err(|e| {
                Error::InvalidConfig {
                    message: format!("embedding api_key is not a valid header value: {}", e),
                }
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            url: format!("{}{}", cfg.api_base.trim_end_matches('/'), cfg.path),
            model: cfg.model.clone(),
            dimensions: cfg.dimensions,
        })
    }
}

impl EmbeddingModel for HttpModel {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimensions
    }

    fn embed_batch(&self, tokens: &[String]) -> Result<Vec<Vector>> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }
        debug!(batch = tokens.len(), url = %self.url, "Requesting embeddings");

        let body = serde_json::json!({
            "model": self.model,
            "input": tokens,
        });
        let json: Value = self
            .client
            .post(&self.url)
            .json(&body)
            .send()?
            .error_for_status()?
            .json()?;

        let vectors = parse_embedding_response(json)?;
        if vectors.len() != tokens.len() {
            return Err(Error::InvalidResponse {
                message: format!(
                    "Embedding response has {} vectors for {} inputs.",
                    vectors.len(),
                    tokens.len()
                ),
            });
        }
        Ok(vectors)
    }
}

fn parse_embedding_response(json: Value) -> Result<Vec<Vector>> {
    let invalid = |message: &str| Error::InvalidResponse {
        message: message.to_string(),
    };

    let data = json
        .get("data")
        .and_then(|v| v.as_array())
        .ok_or_else(|| invalid("Embedding response is missing data array."))?;

    let mut indexed: Vec<(usize, Vector)> = Vec::with_capacity(data.len());
    for (fallback_index, item) in data.iter().enumerate() {
        let index = item
            .get("index")
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
            .unwrap_or(fallback_index);
        let embedding = item
            .get("embedding")
            .and_then(|v| v.as_array())
            .ok_or_else(|| invalid("Embedding item missing embedding array."))?;
        let mut components = Vec::with_capacity(embedding.len());
        for value in embedding {
            let number = value
                .as_f64()
                .ok_or_else(|| invalid("Embedding value must be numeric."))?;
            components.push(number as f32);
        }
        indexed.push((index, Vector::new(components)));
    }

    indexed.sort_by_key(|(index, _)| *index);
    if indexed.iter().enumerate().any(|(at, (index, _))| at != *index) {
        return Err(invalid("Embedding indices must cover 0..n exactly once."));
    }
    Ok(indexed.into_iter().map(|(_, v)| v).collect())
}
