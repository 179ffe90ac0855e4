//! JSON extraction from LLM responses.

use serde_json::Value;
use tracing::debug;

use crate::provider::{LlmError, LlmProvider, Message};

/// Extract JSON from an LLM response, handling markdown code blocks.
pub fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();

    // Handle ```json ... ``` blocks
    if let Some(start) = trimmed.find("```json") {
        let json_start = start + 7;
        if let Some(end) = trimmed[json_start..].find("```") {
            return trimmed[json_start..json_start + end].trim();
        }
    }

    // Handle ``` ... ``` blocks
    if let Some(start) = trimmed.find("```") {
        let json_start = start + 3;
        // Skip past any language identifier on the same line
        let after_tick = &trimmed[json_start..];
        let content_start = after_tick.find('\n').map_or(0, |n| n + 1);
        if let Some(end) = after_tick[content_start..].find("```") {
            return after_tick[content_start..content_start + end].trim();
        }
    }

    // Try raw JSON (starts with {)
    if let Some(start) = trimmed.find('{') {
        if let Some(end) = trimmed.rfind('}') {
            return &trimmed[start..=end];
        }
    }

    trimmed
}

/// Run a completion expected to return a JSON object and parse it, tolerating
/// markdown fences and leading prose around the object.
pub async fn complete_json(
    provider: &dyn LlmProvider,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
) -> Result<Value, LlmError> {
    let response = provider.complete(messages, temperature, max_tokens).await?;
    let json_str = extract_json(&response);
    serde_json::from_str(json_str).map_err(|e| {
        debug!("unparseable completion: {response}");
        LlmError::ParseError(format!("invalid JSON in response: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    #[test]
    fn extract_json_raw() {
        let input = r#"{"document_type": "세금 고지서"}"#;
        assert_eq!(extract_json(input), r#"{"document_type": "세금 고지서"}"#);
    }

    #[test]
    fn extract_json_code_block() {
        let input = "분석 결과입니다:\n```json\n{\"summary\": \"요약\"}\n```\n이상입니다.";
        assert_eq!(extract_json(input), r#"{"summary": "요약"}"#);
    }

    #[test]
    fn extract_json_bare_fence() {
        let input = "```\n{\"summary\": \"요약\"}\n```";
        assert_eq!(extract_json(input), r#"{"summary": "요약"}"#);
    }

    #[test]
    fn extract_json_with_prefix() {
        let input = "네! 분석 결과는 다음과 같습니다: {\"summary\": \"요약\"}";
        assert_eq!(extract_json(input), r#"{"summary": "요약"}"#);
    }

    struct CannedProvider {
        response: String,
    }

    #[async_trait]
    impl LlmProvider for CannedProvider {
        async fn complete(
            &self,
            _messages: Vec<Message>,
            _temperature: f32,
            _max_tokens: u32,
        ) -> Result<String, LlmError> {
            Ok(self.response.clone())
        }
    }

    #[tokio::test]
    async fn complete_json_parses_fenced_response() {
        let provider = CannedProvider {
            response: "```json\n{\"document_type\": \"계약서\", \"keywords\": [\"임대\"]}\n```".into(),
        };
        let messages = vec![Message::user("분석해 주세요")];
        let value = complete_json(&provider, messages, 0.2, 1024).await.unwrap();
        assert_eq!(value["document_type"], "계약서");
        assert_eq!(value["keywords"][0], "임대");
    }

    #[tokio::test]
    async fn complete_json_rejects_non_json() {
        let provider = CannedProvider {
            response: "죄송합니다, 분석할 수 없습니다.".into(),
        };
        let messages = vec![Message::user("분석해 주세요")];
        let err = complete_json(&provider, messages, 0.2, 1024).await.unwrap_err();
        assert!(matches!(err, LlmError::ParseError(_)));
    }
}
