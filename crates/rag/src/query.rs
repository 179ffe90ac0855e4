//! Answer generation over retrieved chunks.
//!
//! Retrieval, prompt assembly, and the completion call live here; the index
//! and the provider are injected. No retrieval results is a valid terminal
//! state (fixed answer, confidence 0), not an error.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use docqa_chunker::ChunkKind;
use docqa_core::Config;
use docqa_llm::{ChatRole, LlmProvider, Message};

use crate::history::{ChatHistory, ChatTurn};
use crate::index::{RetrievalIndex, SearchResult};

/// Returned verbatim when retrieval finds nothing to answer from.
pub const NO_INFORMATION_ANSWER: &str = "문서에서 관련 정보를 찾을 수 없습니다.";

/// How many history turns the prompt may carry.
const HISTORY_TURNS: usize = 5;

/// How many characters of a chunk a source reference exposes.
const SOURCE_PREVIEW_CHARS: usize = 200;

/// Prompt skeleton; `{history}` is either empty or a full `[이전 대화]` block
/// with surrounding newlines.
const ANSWER_TEMPLATE: &str = r#"아래 [문서 내용]을 참고하여 [질문]에 답변해주세요.

[문서 내용]
{context}
{history}
[질문]
{question}

[답변 지침]
- 문서 내용에 기반하여 정확하게 답변하세요
- 문서에 없는 내용은 "문서에서 해당 정보를 찾을 수 없습니다"라고 답변하세요
- 간결하고 명확하게 답변하세요
- 필요하면 문서의 구체적인 내용을 인용하세요

[답변]"#;

// ── Response types ────────────────────────────────────────────

/// Pointer back into the document for one retrieved chunk. Carries a bounded
/// preview, never the full chunk text.
#[derive(Debug, Clone, Serialize)]
pub struct SourceRef {
    pub text: String,
    pub score: f32,
    pub kind: ChunkKind,
    pub index: usize,
}

impl SourceRef {
    fn from_result(result: &SearchResult) -> Self {
        Self {
            text: preview(&result.chunk.text),
            score: result.score,
            kind: result.chunk.kind,
            index: result.chunk.index,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    pub sources: Vec<SourceRef>,
    pub confidence: f32,
}

#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The completion call failed after retrieval succeeded. The sources are
    /// kept so the caller can retry generation without re-searching.
    #[error("answer generation failed: {reason}")]
    Generation {
        reason: String,
        sources: Vec<SourceRef>,
    },
}

// ── Engine ────────────────────────────────────────────────────

/// Answers questions about one indexed document at a time.
pub struct QueryEngine {
    index: Arc<RetrievalIndex>,
    provider: Box<dyn LlmProvider>,
    temperature: f32,
    max_tokens: u32,
}

impl QueryEngine {
    pub fn new(
        index: Arc<RetrievalIndex>,
        provider: Box<dyn LlmProvider>,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self {
            index,
            provider,
            temperature,
            max_tokens,
        }
    }

    pub fn from_config(
        index: Arc<RetrievalIndex>,
        provider: Box<dyn LlmProvider>,
        config: &Config,
    ) -> Self {
        Self::new(index, provider, config.llm.temperature, config.llm.max_tokens)
    }

    /// Retrieve the most relevant chunks and generate an answer from them,
    /// feeding at most the last five history turns into the prompt.
    pub async fn answer(
        &self,
        document_id: &str,
        question: &str,
        history: &ChatHistory,
    ) -> Result<QueryResponse, QueryError> {
        let results = self
            .index
            .search(document_id, question, self.index.top_k())
            .await;
        if results.is_empty() {
            debug!(document_id, "no relevant chunks, returning fixed answer");
            return Ok(QueryResponse {
                answer: NO_INFORMATION_ANSWER.to_string(),
                sources: Vec::new(),
                confidence: 0.0,
            });
        }

        let context = results
            .iter()
            .map(|r| r.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let sources: Vec<SourceRef> = results.iter().map(SourceRef::from_result).collect();
        let scores: Vec<f32> = results.iter().map(|r| r.score).collect();
        let confidence = round_confidence(&scores);

        let turns = history.recent(HISTORY_TURNS);
        let prompt = build_prompt(&context, &turns, question);
        let messages = vec![Message::user(prompt)];

        info!(document_id, sources = sources.len(), "generating answer");
        match self
            .provider
            .complete(messages, self.temperature, self.max_tokens)
            .await
        {
            Ok(answer) => Ok(QueryResponse {
                answer,
                sources,
                confidence,
            }),
            Err(e) => Err(QueryError::Generation {
                reason: e.to_string(),
                sources,
            }),
        }
    }
}

// ── Prompt assembly ───────────────────────────────────────────

fn build_prompt(context: &str, turns: &[&ChatTurn], question: &str) -> String {
    ANSWER_TEMPLATE
        .replace("{context}", context)
        .replace("{history}", &history_block(turns))
        .replace("{question}", question)
}

/// Role-tagged history lines, or an empty string when there is no history.
fn history_block(turns: &[&ChatTurn]) -> String {
    if turns.is_empty() {
        return String::new();
    }
    let lines: Vec<String> = turns
        .iter()
        .map(|turn| {
            let speaker = match turn.role {
                ChatRole::User => "사용자",
                _ => "AI",
            };
            format!("{speaker}: {}", turn.content)
        })
        .collect();
    format!("\n[이전 대화]\n{}\n", lines.join("\n"))
}

/// Mean retrieval score rounded to 2 decimals. Not a calibrated probability.
fn round_confidence(scores: &[f32]) -> f32 {
    if scores.is_empty() {
        return 0.0;
    }
    let mean = scores.iter().sum::<f32>() / scores.len() as f32;
    (mean * 100.0).round() / 100.0
}

fn preview(text: &str) -> String {
    text.chars().take(SOURCE_PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn turn(role: ChatRole, content: &str) -> ChatTurn {
        ChatTurn {
            role,
            content: content.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn prompt_without_history_omits_the_block() {
        let prompt = build_prompt("납부 기한은 7월 31일입니다.", &[], "기한이 언제인가요?");
        assert!(prompt.starts_with("아래 [문서 내용]을 참고하여"));
        assert!(prompt.contains("납부 기한은 7월 31일입니다."));
        assert!(prompt.contains("[질문]\n기한이 언제인가요?"));
        assert!(!prompt.contains("[이전 대화]"));
        assert!(prompt.ends_with("[답변]"));
    }

    #[test]
    fn prompt_with_history_carries_role_tagged_lines() {
        let turns = vec![
            turn(ChatRole::User, "금액은 얼마인가요?"),
            turn(ChatRole::Assistant, "1,250,000원입니다."),
        ];
        let refs: Vec<&ChatTurn> = turns.iter().collect();
        let prompt = build_prompt("본문", &refs, "기한은요?");
        assert!(prompt.contains("[이전 대화]\n사용자: 금액은 얼마인가요?\nAI: 1,250,000원입니다."));
        // The history block sits between the context and the question.
        let history_at = prompt.find("[이전 대화]").unwrap();
        assert!(history_at > prompt.find("[문서 내용]").unwrap());
        assert!(history_at < prompt.find("[질문]").unwrap());
    }

    #[test]
    fn confidence_is_rounded_to_two_decimals() {
        assert_eq!(round_confidence(&[]), 0.0);
        assert!((round_confidence(&[0.875, 0.125]) - 0.5).abs() < 1e-6);
        assert!((round_confidence(&[1.0 / 3.0]) - 0.33).abs() < 1e-6);
        assert!((round_confidence(&[0.856, 0.512]) - 0.68).abs() < 1e-6);
    }

    #[test]
    fn preview_cuts_at_two_hundred_chars() {
        let long = "가".repeat(300);
        let cut = preview(&long);
        assert_eq!(cut.chars().count(), 200);

        let short = "짧은 본문";
        assert_eq!(preview(short), short);
    }
}
