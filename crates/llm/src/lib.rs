pub mod embedding;
pub mod json;
pub mod provider;
pub mod providers;

pub use embedding::{create_embedder, EmbedMode, Embedder, EmbeddingError};
pub use json::{complete_json, extract_json};
pub use provider::{ChatRole, LlmError, LlmProvider, Message};
pub use providers::create_provider;
