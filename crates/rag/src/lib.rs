//! Retrieval-augmented question answering over indexed documents.
//!
//! The pipeline: [`RetrievalIndex`] chunks and embeds documents and answers
//! similarity searches; [`QueryEngine`] turns search hits into an LLM answer
//! with sources and a confidence score; [`DocumentAnalyzer`] summarizes and
//! classifies documents; [`ChatHistory`] keeps the session context that
//! feeds follow-up questions.

pub mod analysis;
pub mod history;
pub mod index;
pub mod query;

pub use analysis::{
    extract_key_info, guess_document_type, DocumentAnalysis, DocumentAnalyzer, KeyInfo,
};
pub use history::{ChatHistory, ChatTurn};
pub use index::{DocumentIndex, DocumentStats, IndexStats, RetrievalIndex, SearchResult};
pub use query::{QueryEngine, QueryError, QueryResponse, SourceRef, NO_INFORMATION_ANSWER};
