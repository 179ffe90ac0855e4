use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::provider::{ChatRole, LlmError, LlmProvider, Message};

/// Chat backend for the Gemini generateContent API.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            base_url,
        }
    }
}

// ── Wire format ─────────────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

/// System turns move to `system_instruction` (only the first one is kept);
/// assistant turns map to the `model` role.
fn build_request(messages: Vec<Message>, temperature: f32, max_tokens: u32) -> GenerateRequest {
    let mut system_instruction = None;
    let mut contents = Vec::with_capacity(messages.len());
    for message in messages {
        let role = match message.role {
            ChatRole::System => {
                if system_instruction.is_none() {
                    system_instruction = Some(SystemInstruction {
                        parts: vec![Part {
                            text: message.content,
                        }],
                    });
                }
                continue;
            }
            ChatRole::User => "user",
            ChatRole::Assistant => "model",
        };
        contents.push(Content {
            role,
            parts: vec![Part {
                text: message.content,
            }],
        });
    }
    GenerateRequest {
        contents,
        generation_config: GenerationConfig {
            temperature,
            max_output_tokens: max_tokens,
        },
        system_instruction,
    }
}

fn first_candidate_text(response: GenerateResponse) -> Option<String> {
    response
        .candidates
        .into_iter()
        .next()?
        .content?
        .parts
        .into_iter()
        .next()
        .map(|part| part.text)
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn complete(
        &self,
        messages: Vec<Message>,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key,
        );
        let request = build_request(messages, temperature, max_tokens);

        debug!("Gemini request to model={}", self.model);

        let response = self.client.post(&url).json(&request).send().await?;

        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiError { status, body });
        }

        let parsed: GenerateResponse = response.json().await?;
        first_candidate_text(parsed)
            .ok_or_else(|| LlmError::ParseError("response carried no candidate text".into()))
    }
}
