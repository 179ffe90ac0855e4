//! Section-level chunking strategies and the document pipeline.

use std::collections::HashMap;

use serde_json::json;
use tracing::debug;

use crate::helpers::{char_len, merge_small, overlap_tail, split_sentences};
use crate::section::{normalize_text, split_sections};
use crate::types::{Chunk, ChunkKind, ChunkingConfig, Section, SectionKind};

/// Chunk a whole document: normalize, split into structural sections, chunk
/// each section, stamp the owning document id and section kind into chunk
/// metadata, then fold undersized chunks into their neighbours.
///
/// Blank input produces no chunks. Identical input always produces identical
/// output; chunking never fails on well-formed text.
pub fn chunk_text(text: &str, document_id: &str, config: &ChunkingConfig) -> Vec<Chunk> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let normalized = normalize_text(text);
    let sections = split_sections(&normalized, config);

    let mut chunks: Vec<Chunk> = Vec::new();
    for section in &sections {
        let mut produced = chunk_section(section, config, chunks.len());
        for chunk in &mut produced {
            chunk
                .metadata
                .insert("document_id".to_string(), json!(document_id));
            chunk
                .metadata
                .insert("section_kind".to_string(), json!(section.kind.as_str()));
        }
        chunks.append(&mut produced);
    }

    let chunks = merge_small(chunks, config);
    debug!(document_id, chunk_count = chunks.len(), "document chunked");
    chunks
}

/// Chunk one section. Tables pass through as a single chunk regardless of
/// size; sections at or under the target size pass through unchanged;
/// oversized sections are split at sentence boundaries with overlap, or by
/// fixed width when sentence mode is off.
pub fn chunk_section(section: &Section, config: &ChunkingConfig, start_index: usize) -> Vec<Chunk> {
    let raw_len = char_len(&section.text);

    if section.kind == SectionKind::Table && config.preserve_tables {
        return vec![new_chunk(
            section.text.trim(),
            start_index,
            ChunkKind::Table,
            section.start,
            section.start + raw_len,
        )];
    }

    if raw_len <= config.target_size {
        let kind = match section.kind {
            SectionKind::Table => ChunkKind::Table,
            SectionKind::Title => ChunkKind::Title,
            SectionKind::Paragraph => ChunkKind::Paragraph,
        };
        return vec![new_chunk(
            section.text.trim(),
            start_index,
            kind,
            section.start,
            section.start + raw_len,
        )];
    }

    if config.sentence_boundary {
        split_by_sentences(&section.text, config, start_index, section.start)
    } else {
        split_by_size(&section.text, config, start_index, section.start)
    }
}

/// Greedy sentence accumulation: sentences are appended to a buffer while the
/// buffer stays within the target size; on overflow the buffer is flushed as
/// one chunk and the next buffer is seeded with its overlap tail.
fn split_by_sentences(
    text: &str,
    config: &ChunkingConfig,
    start_index: usize,
    section_start: usize,
) -> Vec<Chunk> {
    let sentences = split_sentences(text);
    let mut chunks: Vec<Chunk> = Vec::new();
    let mut buffer = String::new();
    let mut buffer_start = section_start;

    for sentence in &sentences {
        if char_len(&buffer) + char_len(sentence) <= config.target_size {
            buffer.push_str(sentence);
            buffer.push(' ');
        } else {
            emit_buffer(&mut chunks, &buffer, config, start_index, buffer_start);
            let seed = overlap_tail(&buffer, config.overlap_size);
            buffer_start += char_len(&buffer) - char_len(&seed);
            buffer = seed;
            buffer.push_str(sentence);
            buffer.push(' ');
        }
    }
    emit_buffer(&mut chunks, &buffer, config, start_index, buffer_start);
    chunks
}

/// Flush an accumulation buffer as a paragraph chunk. Whitespace-only buffers
/// are skipped; a buffer that still exceeds `max_chunk_size` (a single run-on
/// sentence longer than the target) is hard-split by fixed width instead.
fn emit_buffer(
    chunks: &mut Vec<Chunk>,
    buffer: &str,
    config: &ChunkingConfig,
    start_index: usize,
    buffer_start: usize,
) {
    let text = buffer.trim();
    if text.is_empty() {
        return;
    }
    let index = start_index + chunks.len();
    if char_len(text) > config.max_chunk_size {
        chunks.extend(split_by_size(text, config, index, buffer_start));
        return;
    }
    chunks.push(new_chunk(
        text,
        index,
        ChunkKind::Paragraph,
        buffer_start,
        buffer_start + char_len(buffer),
    ));
}

/// Fixed-width fallback: advance a window of `target_size` characters,
/// backing off to the last space no earlier than `min_chunk_size` into the
/// window, then restart the next window `overlap_size` characters before the
/// cut. The window start always advances, so pathological configs (overlap
/// close to target) cannot loop.
fn split_by_size(
    text: &str,
    config: &ChunkingConfig,
    start_index: usize,
    section_start: usize,
) -> Vec<Chunk> {
    let chars: Vec<char> = text.chars().collect();
    let total = chars.len();
    let mut chunks: Vec<Chunk> = Vec::new();
    let mut start = 0usize;

    while start < total {
        let raw_end = start + config.target_size;
        if raw_end >= total {
            push_window(&mut chunks, &chars[start..], start_index, section_start + start, section_start + total);
            break;
        }

        let mut end = raw_end;
        let floor = start + config.min_chunk_size;
        if floor < end {
            // Back off to a word boundary, excluding the space itself.
            if let Some(offset) = chars[floor..end].iter().rposition(|c| *c == ' ') {
                end = floor + offset;
            }
        }
        push_window(&mut chunks, &chars[start..end], start_index, section_start + start, section_start + end);

        let next = end.saturating_sub(config.overlap_size);
        start = if next > start { next } else { end.max(start + 1) };
    }
    chunks
}

fn push_window(chunks: &mut Vec<Chunk>, window: &[char], start_index: usize, start_char: usize, end_char: usize) {
    let piece: String = window.iter().collect();
    let trimmed = piece.trim();
    if trimmed.is_empty() {
        return;
    }
    chunks.push(new_chunk(
        trimmed,
        start_index + chunks.len(),
        ChunkKind::Paragraph,
        start_char,
        end_char,
    ));
}

fn new_chunk(text: &str, index: usize, kind: ChunkKind, start_char: usize, end_char: usize) -> Chunk {
    Chunk {
        text: text.to_string(),
        index,
        kind,
        start_char,
        end_char,
        metadata: HashMap::new(),
    }
}
