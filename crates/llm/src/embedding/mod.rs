pub mod gemini;
pub mod ollama;
mod traits;

use std::sync::Arc;

use docqa_core::Config;

pub use traits::{EmbedMode, Embedder, EmbeddingError};

/// Create the appropriate embedding backend based on config.
pub fn create_embedder(config: &Config) -> Result<Arc<dyn Embedder>, EmbeddingError> {
    match config.embedding.provider.as_str() {
        "gemini" => {
            let api_key = config
                .gemini
                .api_key
                .as_ref()
                .ok_or_else(|| EmbeddingError::NotConfigured("GOOGLE_API_KEY not set".into()))?;
            Ok(Arc::new(gemini::GeminiEmbedder::new(
                api_key.clone(),
                config.gemini.embedding_model.clone(),
                config.gemini.base_url.clone(),
                config.embedding.dimensions,
            )))
        }
        "ollama" => Ok(Arc::new(ollama::OllamaEmbedder::new(
            config.ollama.url.clone(),
            config.ollama.embedding_model.clone(),
            config.embedding.dimensions,
        ))),
        other => Err(EmbeddingError::NotConfigured(format!(
            "unknown embedding provider: '{}'",
            other
        ))),
    }
}
