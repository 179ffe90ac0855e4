use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("embedder not configured: {0}")]
    NotConfigured(String),
}

/// Task hint forwarded to the provider: documents are embedded for storage,
/// queries for lookup against them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedMode {
    Document,
    Query,
}

/// Trait for embedding backends (Gemini, Ollama, etc.)
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, returning one vector per input text (in order).
    async fn embed(&self, texts: &[&str], mode: EmbedMode) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// The dimensionality of the output vectors.
    fn dimensions(&self) -> usize;
}

/// Check a parsed embedding response: one row per input text, every row at
/// the provider's dimensionality. Providers occasionally drop rows from a
/// batch silently, which would desync the chunk/embedding pairing upstream.
pub(crate) fn validate_rows(
    rows: Vec<Vec<f32>>,
    expected_rows: usize,
    dimensions: usize,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if rows.len() != expected_rows {
        return Err(EmbeddingError::Api(format!(
            "expected {expected_rows} embeddings, got {}",
            rows.len()
        )));
    }
    for row in &rows {
        if row.len() != dimensions {
            return Err(EmbeddingError::DimensionMismatch {
                expected: dimensions,
                actual: row.len(),
            });
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rows_accepts_a_well_formed_batch() {
        let rows = vec![vec![0.1, 0.2, 0.3], vec![0.4, 0.5, 0.6]];
        let validated = validate_rows(rows.clone(), 2, 3).unwrap();
        assert_eq!(validated, rows);
    }

    #[test]
    fn validate_rows_rejects_a_short_batch() {
        let rows = vec![vec![0.1, 0.2, 0.3]];
        let err = validate_rows(rows, 2, 3).unwrap_err();
        match err {
            EmbeddingError::Api(msg) => {
                assert!(msg.contains("expected 2"), "unexpected message: {msg}");
                assert!(msg.contains("got 1"), "unexpected message: {msg}");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn validate_rows_rejects_a_wrong_width_row() {
        let rows = vec![vec![0.1, 0.2, 0.3], vec![0.4, 0.5]];
        let err = validate_rows(rows, 2, 3).unwrap_err();
        match err {
            EmbeddingError::DimensionMismatch { expected, actual } => {
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("expected DimensionMismatch, got {other:?}"),
        }
    }
}
