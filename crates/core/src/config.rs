use std::env;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

fn env_usize(key: &str, default: usize) -> usize {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_f32(key: &str, default: f32) -> f32 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    env_opt(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub gemini: GeminiConfig,
    pub ollama: OllamaConfig,
    pub rag: RagConfig,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    pub fn from_env() -> Self {
        Self {
            llm: LlmConfig::from_env(),
            embedding: EmbeddingConfig::from_env(),
            gemini: GeminiConfig::from_env(),
            ollama: OllamaConfig::from_env(),
            rag: RagConfig::from_env(),
        }
    }

    /// Print a redacted summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!(
            "  llm:        provider={}, temperature={}, max_tokens={}",
            self.llm.provider,
            self.llm.temperature,
            self.llm.max_tokens
        );
        tracing::info!(
            "  embedding:  provider={}, dimensions={}",
            self.embedding.provider,
            self.embedding.dimensions
        );
        tracing::info!(
            "  gemini:     chat_model={}, embedding_model={}, key={}",
            self.gemini.chat_model,
            self.gemini.embedding_model,
            if self.gemini.is_configured() { "set" } else { "missing" }
        );
        tracing::info!("  ollama:     url={}, model={}", self.ollama.url, self.ollama.model);
        tracing::info!(
            "  rag:        top_k={}, chunk_size={}, chunk_overlap={}",
            self.rag.top_k,
            self.rag.chunk_size,
            self.rag.chunk_overlap
        );
    }

    /// Return a redacted view safe for API responses (no secrets).
    pub fn redacted_summary(&self) -> serde_json::Value {
        serde_json::json!({
            "llm": {
                "provider": self.llm.provider,
                "temperature": self.llm.temperature,
                "max_tokens": self.llm.max_tokens,
            },
            "embedding": {
                "provider": self.embedding.provider,
                "dimensions": self.embedding.dimensions,
            },
            "gemini": {
                "chat_model": self.gemini.chat_model,
                "embedding_model": self.gemini.embedding_model,
                "configured": self.gemini.is_configured(),
            },
            "ollama": {
                "url": self.ollama.url,
                "model": self.ollama.model,
                "embedding_model": self.ollama.embedding_model,
            },
            "rag": {
                "top_k": self.rag.top_k,
                "chunk_size": self.rag.chunk_size,
                "chunk_overlap": self.rag.chunk_overlap,
            },
        })
    }
}

// ── LLM provider selection ────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "gemini" or "ollama"
    pub provider: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmConfig {
    fn from_env() -> Self {
        Self {
            provider: env_or("LLM_PROVIDER", "gemini"),
            temperature: env_f32("LLM_TEMPERATURE", 0.2),
            max_tokens: env_u32("LLM_MAX_TOKENS", 2048),
        }
    }
}

// ── Embedding provider selection ──────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "gemini" or "ollama"
    pub provider: String,
    pub dimensions: usize,
}

impl EmbeddingConfig {
    fn from_env() -> Self {
        Self {
            provider: env_or("EMBEDDING_PROVIDER", "gemini"),
            dimensions: env_usize("EMBEDDING_DIMENSIONS", 768),
        }
    }
}

// ── Gemini ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub chat_model: String,
    pub embedding_model: String,
    pub base_url: String,
}

impl GeminiConfig {
    fn from_env() -> Self {
        Self {
            api_key: env_opt("GOOGLE_API_KEY"),
            chat_model: env_or("GEMINI_CHAT_MODEL", "gemini-2.0-flash"),
            embedding_model: env_or("GEMINI_EMBEDDING_MODEL", "models/text-embedding-004"),
            base_url: env_or(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com/v1beta",
            ),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

// ── Ollama (local models) ─────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    pub url: String,
    pub model: String,
    pub embedding_model: String,
}

impl OllamaConfig {
    fn from_env() -> Self {
        Self {
            url: env_or("OLLAMA_URL", "http://localhost:11434"),
            model: env_or("OLLAMA_MODEL", "llama3.2"),
            embedding_model: env_or("OLLAMA_EMBEDDING_MODEL", "nomic-embed-text"),
        }
    }
}

// ── RAG ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// How many chunks retrieval returns when the caller does not say.
    pub top_k: usize,
    /// Target chunk size in characters for the retrieval-tuned profile.
    pub chunk_size: usize,
    /// Overlap between adjacent chunks in characters.
    pub chunk_overlap: usize,
}

impl RagConfig {
    fn from_env() -> Self {
        Self {
            top_k: env_usize("RAG_TOP_K", 3),
            chunk_size: env_usize("RAG_CHUNK_SIZE", 1500),
            chunk_overlap: env_usize("RAG_CHUNK_OVERLAP", 300),
        }
    }
}
