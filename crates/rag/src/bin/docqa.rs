//! docqa — index a text document and answer questions about it.
//!
//! Reads the file, analyzes it (summary, type, key info), indexes it for
//! retrieval, then answers each `--question` in order, sharing one chat
//! history across the session.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::error;

use docqa_core::Config;
use docqa_llm::{create_embedder, create_provider, ChatRole};
use docqa_rag::{ChatHistory, DocumentAnalyzer, QueryEngine, QueryError, RetrievalIndex};

// ── CLI ─────────────────────────────────────────────────────────────

/// Ask questions about a text document.
#[derive(Parser, Debug)]
#[command(name = "docqa", version, about)]
struct Cli {
    /// Text file to index.
    #[arg(long)]
    file: PathBuf,

    /// Question to answer; repeat the flag for a multi-turn session.
    #[arg(long = "question")]
    questions: Vec<String>,

    /// Print index statistics as JSON at the end.
    #[arg(long)]
    stats: bool,
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    docqa_core::config::load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    config.log_summary();

    let embedder = create_embedder(&config).context("embedding provider")?;
    let answer_provider = create_provider(&config).context("LLM provider")?;
    let analysis_provider = create_provider(&config).context("LLM provider")?;

    let index = Arc::new(RetrievalIndex::from_config(embedder, &config));
    let analyzer = DocumentAnalyzer::from_config(analysis_provider, &config);
    let engine = QueryEngine::from_config(Arc::clone(&index), answer_provider, &config);

    let text = std::fs::read_to_string(&cli.file)
        .with_context(|| format!("failed to read {}", cli.file.display()))?;

    let document_id = uuid::Uuid::new_v4().to_string();
    let (analysis, chunk_count) = analyzer.analyze_and_index(&index, &document_id, &text).await;
    anyhow::ensure!(
        chunk_count > 0,
        "document produced no indexable chunks: {}",
        cli.file.display()
    );

    println!("문서 분석 ({chunk_count}개 청크)");
    println!("  종류: {}", analysis.document_type);
    println!("  요약: {}", analysis.summary);
    print_key_info("날짜", &analysis.key_info.dates);
    print_key_info("금액", &analysis.key_info.amounts);
    print_key_info("전화번호", &analysis.key_info.phone_numbers);
    print_key_info("계좌번호", &analysis.key_info.account_numbers);

    let mut history = ChatHistory::new();
    for question in &cli.questions {
        println!();
        println!("질문: {question}");
        match engine.answer(&document_id, question, &history).await {
            Ok(response) => {
                println!("답변: {}", response.answer);
                println!("신뢰도: {:.2}", response.confidence);
                for source in &response.sources {
                    println!("  [{}] {:.3} {}", source.index, source.score, source.text);
                }
                history.push(ChatRole::User, question.clone());
                history.push(ChatRole::Assistant, response.answer);
            }
            Err(QueryError::Generation { reason, sources }) => {
                error!("answer generation failed: {reason}");
                for source in &sources {
                    println!("  [{}] {:.3} {}", source.index, source.score, source.text);
                }
            }
        }
    }

    if cli.stats {
        println!();
        println!("{}", serde_json::to_string_pretty(&index.stats())?);
    }

    Ok(())
}

fn print_key_info(label: &str, values: &[String]) {
    if !values.is_empty() {
        println!("  {label}: {}", values.join(", "));
    }
}
