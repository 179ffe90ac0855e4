//! Chunking configuration and output types.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ── Configuration ───────────────────────────────────────────────────────────

/// Configuration for one chunking run. All sizes count characters, not bytes.
///
/// Invariant: `overlap_size < target_size` and
/// `min_chunk_size <= target_size <= max_chunk_size`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Target chunk size (default: 800).
    pub target_size: usize,
    /// Overlap carried between adjacent chunks (default: 150).
    pub overlap_size: usize,
    /// Chunks below this fold into their neighbour (default: 100).
    pub min_chunk_size: usize,
    /// Hard cap for non-table chunks (default: 1500).
    pub max_chunk_size: usize,
    /// Keep table sections whole regardless of size (default: true).
    pub preserve_tables: bool,
    /// Emit title lines as their own sections (default: true).
    pub preserve_titles: bool,
    /// Split oversized sections at sentence boundaries (default: true).
    pub sentence_boundary: bool,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            target_size: 800,
            overlap_size: 150,
            min_chunk_size: 100,
            max_chunk_size: 1500,
            preserve_tables: true,
            preserve_titles: true,
            sentence_boundary: true,
        }
    }
}

impl ChunkingConfig {
    /// Retrieval-tuned profile: larger chunks so one retrieval hit carries a
    /// whole page of context, with proportionally larger overlap.
    pub fn retrieval_profile() -> Self {
        Self {
            target_size: 1500,
            overlap_size: 300,
            ..Self::default()
        }
    }
}

// ── Line and section classification ─────────────────────────────────────────

/// Structural tag for a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Empty,
    Table,
    Title,
    List,
    Paragraph,
}

/// Structural kind of a contiguous section. List lines fold into paragraph
/// sections, so there is no list variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Table,
    Title,
    Paragraph,
}

impl SectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Table => "table",
            SectionKind::Title => "title",
            SectionKind::Paragraph => "paragraph",
        }
    }
}

/// A contiguous run of lines sharing one structural kind, emitted by the
/// section splitter and consumed exactly once by the chunker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: SectionKind,
    pub text: String,
    /// Character offset of the section's first line in the normalized text.
    pub start: usize,
}

// ── Chunk output ────────────────────────────────────────────────────────────

/// Kind of an emitted chunk. `Mixed` only appears when the merge pass folds
/// chunks of different kinds together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkKind {
    Paragraph,
    Table,
    Title,
    List,
    Mixed,
}

/// A bounded, typed span of document text prepared for embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    /// 0-based position in the final chunk sequence (reassigned after merging).
    pub index: usize,
    pub kind: ChunkKind,
    /// Character offset of the chunk start in the normalized source.
    pub start_char: usize,
    /// Character offset one past the chunk end in the normalized source.
    pub end_char: usize,
    /// Carries the owning document id and section kind after chunking, plus
    /// whatever the indexing layer attaches.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Chunk {
    /// Length in characters (sizes in this engine are character counts).
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
