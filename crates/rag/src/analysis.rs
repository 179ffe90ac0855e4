//! Document analysis: regex key-info extraction plus an LLM summary.
//!
//! Key info (dates, amounts, phone and account numbers) always comes from
//! the regexes. Only the summary and the document type label involve the
//! LLM, and every failure there falls back to a head-of-document summary
//! and a keyword type guess, so analysis itself never fails.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use docqa_core::Config;
use docqa_llm::{complete_json, LlmProvider, Message};

use crate::index::RetrievalIndex;

/// How many characters of the document the LLM sees.
const ANALYSIS_HEAD_CHARS: usize = 2_000;

/// How many characters the keyword type guess considers.
const TYPE_GUESS_HEAD_CHARS: usize = 1_000;

/// Fallback summary length when the LLM is unavailable.
const FALLBACK_SUMMARY_CHARS: usize = 200;

/// `{document}` is replaced with the document head.
const ANALYSIS_TEMPLATE: &str = r#"다음 문서를 분석해주세요.

[문서]
{document}

아래 형식의 JSON으로만 응답하세요. 다른 설명은 쓰지 마세요:
{"summary": "2~3문장의 문서 요약", "document_type": "문서 종류 (예: 세금 고지서, 계약서)"}"#;

// ── Key info ──────────────────────────────────────────────────

static DATE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"\d{4}년\s*\d{1,2}월\s*\d{1,2}일").unwrap(),
        Regex::new(r"\d{4}[-./]\d{1,2}[-./]\d{1,2}").unwrap(),
    ]
});

/// Grouped amounts first so `123,456원` is one match, not a bare `456원`.
static AMOUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\d{1,3}(?:,\d{3})+|\d+)원").unwrap());

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{2,3}-\d{3,4}-\d{4}").unwrap());

static ACCOUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{3,4}-\d{2,4}-\d{4,6}").unwrap());

/// Structured facts pulled out of a document by pattern matching.
#[derive(Debug, Clone, Default, Serialize)]
pub struct KeyInfo {
    pub dates: Vec<String>,
    pub amounts: Vec<String>,
    pub phone_numbers: Vec<String>,
    pub account_numbers: Vec<String>,
}

/// Extract dates, amounts, phone and account numbers. Matches are
/// deduplicated preserving first-seen order.
pub fn extract_key_info(text: &str) -> KeyInfo {
    let mut info = KeyInfo::default();

    for pattern in DATE_PATTERNS.iter() {
        for m in pattern.find_iter(text) {
            push_unique(&mut info.dates, m.as_str());
        }
    }

    for m in AMOUNT_PATTERN.find_iter(text) {
        let amount = m.as_str();
        // Bare amounts under 100 won are noise (list markers, ages, ...).
        let digits: String = amount.chars().filter(|c| c.is_ascii_digit()).collect();
        if amount.contains(',') || digits.trim_start_matches('0').len() >= 3 {
            push_unique(&mut info.amounts, amount);
        }
    }

    for m in PHONE_PATTERN.find_iter(text) {
        push_unique(&mut info.phone_numbers, m.as_str());
    }

    for m in ACCOUNT_PATTERN.find_iter(text) {
        // Short dashed runs are phone numbers, not accounts.
        let digit_count = m.as_str().chars().filter(|c| c.is_ascii_digit()).count();
        if digit_count >= 10 {
            push_unique(&mut info.account_numbers, m.as_str());
        }
    }

    info
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

/// Keyword guess over the document head, first rule wins.
pub fn guess_document_type(text: &str) -> String {
    let head: String = text.chars().take(TYPE_GUESS_HEAD_CHARS).collect();
    let label = if ["세금", "납부", "고지"].iter().any(|k| head.contains(k)) {
        "세금 고지서"
    } else if head.contains("계약") {
        "계약서"
    } else if head.contains("증명") {
        "증명서"
    } else if head.contains("안내") || head.contains("공지") {
        "안내문"
    } else {
        "일반 문서"
    };
    label.to_string()
}

// ── Analyzer ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct DocumentAnalysis {
    pub summary: String,
    pub document_type: String,
    pub key_info: KeyInfo,
}

/// Summarizes and classifies documents with the LLM, falling back to local
/// heuristics when it is unavailable.
pub struct DocumentAnalyzer {
    provider: Box<dyn LlmProvider>,
    temperature: f32,
    max_tokens: u32,
}

impl DocumentAnalyzer {
    pub fn new(provider: Box<dyn LlmProvider>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            provider,
            temperature,
            max_tokens,
        }
    }

    pub fn from_config(provider: Box<dyn LlmProvider>, config: &Config) -> Self {
        Self::new(provider, config.llm.temperature, config.llm.max_tokens)
    }

    /// Analyze a document. Never fails: any LLM problem degrades to the
    /// head-of-document summary and the keyword type guess.
    pub async fn analyze(&self, text: &str) -> DocumentAnalysis {
        let key_info = extract_key_info(text);

        let head: String = text.chars().take(ANALYSIS_HEAD_CHARS).collect();
        let prompt = ANALYSIS_TEMPLATE.replace("{document}", &head);
        let messages = vec![Message::user(prompt)];

        match complete_json(&*self.provider, messages, self.temperature, self.max_tokens).await {
            Ok(value) => {
                let summary = value.get("summary").and_then(Value::as_str);
                let document_type = value.get("document_type").and_then(Value::as_str);
                if let (Some(summary), Some(document_type)) = (summary, document_type) {
                    return DocumentAnalysis {
                        summary: summary.to_string(),
                        document_type: document_type.to_string(),
                        key_info,
                    };
                }
                warn!("analysis response is missing fields, falling back");
            }
            Err(e) => warn!(error = %e, "document analysis failed, falling back"),
        }

        DocumentAnalysis {
            summary: text.chars().take(FALLBACK_SUMMARY_CHARS).collect(),
            document_type: guess_document_type(text),
            key_info,
        }
    }

    /// Analyze a document and add it to the retrieval index in one step.
    /// Returns the analysis and the number of chunks indexed.
    pub async fn analyze_and_index(
        &self,
        index: &RetrievalIndex,
        document_id: &str,
        text: &str,
    ) -> (DocumentAnalysis, usize) {
        let analysis = self.analyze(text).await;
        let chunk_count = index
            .add_document(document_id, text, HashMap::new())
            .await;
        (analysis, chunk_count)
    }
}
