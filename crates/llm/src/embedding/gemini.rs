use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::traits::{validate_rows, EmbedMode, Embedder, EmbeddingError};

/// Embedder backed by the Gemini batchEmbedContents API.
pub struct GeminiEmbedder {
    client: Client,
    api_key: String,
    /// Fully qualified model name, e.g. `models/text-embedding-004`.
    model: String,
    base_url: String,
    dimensions: usize,
}

impl GeminiEmbedder {
    pub fn new(api_key: String, model: String, base_url: String, dimensions: usize) -> Self {
        Self {
            client: Client::new(),
            api_key,
            model,
            base_url,
            dimensions,
        }
    }

    fn build_request(&self, texts: &[&str], mode: EmbedMode) -> BatchEmbedRequest {
        let task_type = match mode {
            EmbedMode::Document => "RETRIEVAL_DOCUMENT",
            EmbedMode::Query => "RETRIEVAL_QUERY",
        };
        BatchEmbedRequest {
            requests: texts
                .iter()
                .map(|text| EmbedRequest {
                    model: self.model.clone(),
                    content: Content {
                        parts: vec![Part {
                            text: text.to_string(),
                        }],
                    },
                    task_type: task_type.to_string(),
                })
                .collect(),
        }
    }
}

#[derive(Serialize)]
struct BatchEmbedRequest {
    requests: Vec<EmbedRequest>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedRequest {
    model: String,
    content: Content,
    task_type: String,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    embeddings: Vec<EmbeddingValues>,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    async fn embed(&self, texts: &[&str], mode: EmbedMode) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let url = format!(
            "{}/{}:batchEmbedContents?key={}",
            self.base_url, self.model, self.api_key,
        );
        let request = self.build_request(texts, mode);

        let response = self.client.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api(format!("{status}: {body}")));
        }

        let parsed: BatchEmbedResponse = response.json().await?;
        let rows = parsed
            .embeddings
            .into_iter()
            .map(|embedding| embedding.values)
            .collect();
        validate_rows(rows, texts.len(), self.dimensions)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
