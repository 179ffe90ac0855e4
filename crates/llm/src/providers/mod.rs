pub mod gemini;
pub mod ollama;

use docqa_core::Config;

use crate::provider::{LlmError, LlmProvider};

/// Create the appropriate LLM provider based on config.
pub fn create_provider(config: &Config) -> Result<Box<dyn LlmProvider>, LlmError> {
    match config.llm.provider.as_str() {
        "gemini" => {
            let api_key = config
                .gemini
                .api_key
                .as_ref()
                .ok_or_else(|| LlmError::NotConfigured("GOOGLE_API_KEY not set".into()))?;
            Ok(Box::new(gemini::GeminiProvider::new(
                api_key.clone(),
                config.gemini.chat_model.clone(),
                config.gemini.base_url.clone(),
            )))
        }
        "ollama" => Ok(Box::new(ollama::OllamaProvider::new(
            config.ollama.url.clone(),
            config.ollama.model.clone(),
        ))),
        other => Err(LlmError::NotConfigured(format!(
            "unknown LLM provider: '{}'",
            other
        ))),
    }
}
