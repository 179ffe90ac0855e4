//! Structure-aware chunking engine.
//!
//! Splits free-form document text into overlapping, size-bounded chunks
//! suitable for embedding: lines are classified (table/title/list/paragraph),
//! contiguous runs become typed sections, oversized sections are split at
//! sentence boundaries with overlap carried forward, and undersized chunks
//! are folded into their neighbours. Tables always survive as a single chunk.
//!
//! All sizes are character counts, so Korean and other multi-byte scripts are
//! budgeted the same as ASCII.

mod helpers;
mod patterns;
mod section;
mod strategies;
mod types;

pub use patterns::classify_line;
pub use section::{normalize_text, split_sections};
pub use strategies::{chunk_section, chunk_text};
pub use types::{Chunk, ChunkKind, ChunkingConfig, LineKind, Section, SectionKind};
