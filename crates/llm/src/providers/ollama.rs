use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::provider::{ChatRole, LlmError, LlmProvider, Message};

/// Chat backend for a local Ollama instance.
pub struct OllamaProvider {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl OllamaProvider {
    pub fn new(url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
            model,
        }
    }
}

// ── Wire format ─────────────────────────────────────────────────────

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Ollama keeps the OpenAI-style role names; `max_tokens` rides in
/// `options.num_predict`.
fn build_request(
    model: &str,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        messages: messages
            .into_iter()
            .map(|message| ChatMessage {
                role: match message.role {
                    ChatRole::System => "system",
                    ChatRole::User => "user",
                    ChatRole::Assistant => "assistant",
                },
                content: message.content,
            })
            .collect(),
        stream: false,
        options: ChatOptions {
            temperature,
            num_predict: max_tokens,
        },
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let url = format!("{}/api/chat", self.url);
        let request = build_request(&self.model, messages, temperature, max_tokens);

        debug!("Ollama request to {}", url);

        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, body });
        }

        let parsed: ChatResponse = response.json().await?;
        Ok(parsed.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_keeps_roles_and_caps_generation() {
        let messages = vec![
            Message::system("문서에 근거해 답하세요."),
            Message::user("납부 기한이 언제인가요?"),
            Message::assistant("7월 31일까지입니다."),
        ];
        let body = serde_json::to_value(build_request("llama3.2", messages, 0.2, 1024)).unwrap();

        assert_eq!(body["model"], "llama3.2");
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "납부 기한이 언제인가요?");
        assert_eq!(body["messages"][2]["role"], "assistant");
        assert_eq!(body["options"]["num_predict"], 1024);
        let temp = body["options"]["temperature"].as_f64().unwrap();
        assert!((temp - 0.2).abs() < 1e-6, "temperature should be ~0.2, got {temp}");
    }

    #[test]
    fn chat_response_exposes_the_message_content() {
        let parsed: ChatResponse = serde_json::from_str(
            r#"{"model": "llama3.2", "message": {"role": "assistant", "content": "7월 31일입니다."}, "done": true}"#,
        )
        .unwrap();
        assert_eq!(parsed.message.content, "7월 31일입니다.");
    }
}
