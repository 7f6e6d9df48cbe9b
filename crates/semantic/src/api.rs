use serde_json::{json, Value};
use std::time::Duration;

use tracing::debug;

use crate::embedder::Embedder;
use crate::normalize::l2_normalize_in_place;
use crate::retry::{execute_with_retry, RetryConfig};
use crate::{SemanticConfig, SemanticError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ApiProviderKind {
    HuggingFace,
    OpenAI,
    Custom,
}

impl ApiProviderKind {
    fn from_hint(hint: Option<&str>) -> Self {
        match hint.unwrap_or("custom").to_ascii_lowercase().as_str() {
            "hf" | "huggingface" => ApiProviderKind::HuggingFace,
            "openai" | "gpt" => ApiProviderKind::OpenAI,
            _ => ApiProviderKind::Custom,
        }
    }
}

/// Embedder that posts batches to a remote embedding endpoint (`"api"` mode).
///
/// Request and response shapes follow the provider hint: Hugging Face
/// feature-extraction, OpenAI embeddings, or a custom `{"texts": [...]}`
/// endpoint answering `{"embeddings": [[...]]}`.
#[derive(Debug)]
pub struct HttpEmbedder {
    client: reqwest::blocking::Client,
    url: String,
    auth_header: Option<String>,
    provider: ApiProviderKind,
    model_name: String,
    normalize: bool,
    retry: RetryConfig,
}

impl HttpEmbedder {
    pub fn from_config(cfg: &SemanticConfig) -> Result<Self, SemanticError> {
        let url = cfg
            .api_url
            .clone()
            .ok_or_else(|| SemanticError::InvalidConfig("api_url is required for api mode".into()))?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(cfg.api_timeout_secs.unwrap_or(30)))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| SemanticError::Http {
                status: None,
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            url,
            auth_header: cfg.api_auth_header.clone(),
            provider: ApiProviderKind::from_hint(cfg.api_provider.as_deref()),
            model_name: cfg.model_name.clone(),
            normalize: cfg.normalize,
            retry: cfg.retry_config.unwrap_or_default(),
        })
    }

    fn send(&self, payload: &Value) -> Result<Value, SemanticError> {
        let mut request = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json");
        if let Some(header) = self.auth_header.as_deref() {
            request = request.header("Authorization", header);
        }

        let response = request.json(payload).send().map_err(|e| SemanticError::Http {
            status: e.status().map(|s| s.as_u16()),
            message: format!("request failed: {e}"),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SemanticError::Http {
                status: Some(status.as_u16()),
                message: body,
            });
        }

        response
            .json::<Value>()
            .map_err(|e| SemanticError::Response(format!("invalid JSON: {e}")))
    }
}

impl Embedder for HttpEmbedder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, SemanticError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let payload = build_api_payload(self.provider, texts, &self.model_name);
        let response = execute_with_retry(&self.retry, |attempt| {
            if attempt > 0 {
                debug!(attempt, url = %self.url, "embedding_request_attempt");
            }
            self.send(&payload)
        })?;

        let mut vectors = parse_embeddings_from_value(response)?;
        if vectors.len() != texts.len() {
            return Err(SemanticError::Response(format!(
                "API returned {} embeddings for {} inputs",
                vectors.len(),
                texts.len()
            )));
        }
        if self.normalize {
            vectors.iter_mut().for_each(|v| l2_normalize_in_place(v));
        }
        Ok(vectors)
    }
}

fn build_api_payload(provider: ApiProviderKind, texts: &[&str], model_name: &str) -> Value {
    match provider {
        ApiProviderKind::HuggingFace => json!({ "inputs": texts }),
        ApiProviderKind::OpenAI => json!({ "input": texts, "model": model_name }),
        ApiProviderKind::Custom => json!({ "texts": texts }),
    }
}

fn parse_embeddings_from_value(value: Value) -> Result<Vec<Vec<f32>>, SemanticError> {
    match value {
        Value::Object(mut map) => {
            if let Some(embeddings) = map.remove("embeddings") {
                return parse_embedding_collection(embeddings);
            }

            if let Some(Value::Array(items)) = map.remove("data") {
                return items
                    .into_iter()
                    .map(|item| match item {
                        Value::Object(mut obj) => obj
                            .remove("embedding")
                            .ok_or_else(|| {
                                SemanticError::Response("missing `embedding` field in data item".into())
                            })
                            .and_then(parse_embedding_vector),
                        _ => Err(SemanticError::Response(
                            "unexpected entry inside `data` array".into(),
                        )),
                    })
                    .collect();
            }

            Err(SemanticError::Response("unsupported API response shape".into()))
        }
        other => parse_embedding_collection(other),
    }
}

fn parse_embedding_collection(value: Value) -> Result<Vec<Vec<f32>>, SemanticError> {
    match value {
        Value::Array(items) if items.is_empty() => Ok(Vec::new()),
        Value::Array(items) if items.iter().all(Value::is_array) => {
            items.into_iter().map(parse_embedding_vector).collect()
        }
        other => parse_embedding_vector(other).map(|vec| vec![vec]),
    }
}

fn parse_embedding_vector(value: Value) -> Result<Vec<f32>, SemanticError> {
    match value {
        Value::Array(values) => values
            .into_iter()
            .map(|entry| match entry {
                Value::Number(num) => num
                    .as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| SemanticError::Response("non-finite embedding value".into())),
                other => Err(SemanticError::Response(format!(
                    "embedding entries must be numbers, got {other:?}"
                ))),
            })
            .collect(),
        other => Err(SemanticError::Response(format!(
            "embedding vector must be an array, got {other:?}"
        ))),
    }
}
