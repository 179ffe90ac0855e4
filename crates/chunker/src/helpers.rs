//! Sentence splitting, overlap extraction, and small-chunk merging.

use crate::types::{Chunk, ChunkKind, ChunkingConfig};

/// Length in characters. All size accounting in this crate counts characters,
/// never bytes, so multi-byte scripts are budgeted the same as ASCII.
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte offset of the character at position `idx`, or the text length when
/// `idx` is past the end.
fn byte_of_char(text: &str, idx: usize) -> usize {
    text.char_indices().nth(idx).map(|(b, _)| b).unwrap_or(text.len())
}

/// Split `text` into sentence-like units at terminal punctuation (`.`, `!`,
/// `?` and their full-width forms) followed by whitespace. Korean polite
/// endings (…다. …요. …습니다.) end in `.` and are covered by the same rule.
/// Returns trimmed, non-empty fragments; best-effort only, abbreviations are
/// not special-cased.
pub(crate) fn split_sentences(text: &str) -> Vec<String> {
    const TERMINALS: [char; 6] = ['.', '!', '?', '。', '！', '？'];

    let mut sentences = Vec::new();
    let mut start = 0usize;
    let mut iter = text.char_indices().peekable();

    while let Some((_, ch)) = iter.next() {
        if !TERMINALS.contains(&ch) {
            continue;
        }
        if let Some(&(next_pos, next_ch)) = iter.peek() {
            if next_ch.is_whitespace() {
                // Cut at the whitespace so the terminal stays with its sentence.
                let piece = text[start..next_pos].trim();
                if !piece.is_empty() {
                    sentences.push(piece.to_string());
                }
                start = next_pos;
            }
        }
    }

    // Remainder
    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }
    sentences
}

/// Extract the overlap to carry into the next chunk: the trailing `overlap`
/// characters of `text`, re-aligned forward to the next sentence boundary
/// (`. ` with more than 10 characters left after it) or, failing that, the
/// next word boundary. The raw tail is returned when neither exists.
pub(crate) fn overlap_tail(text: &str, overlap: usize) -> String {
    let total = char_len(text);
    if total <= overlap {
        return text.to_string();
    }
    let cut = byte_of_char(text, total - overlap);

    if let Some(rel) = text[cut..].find(". ") {
        let found = cut + rel;
        if text[found..].chars().count() > 10 {
            return text[found + 2..].to_string();
        }
    }
    if let Some(rel) = text[cut..].find(' ') {
        return text[cut + rel + 1..].to_string();
    }
    text[cut..].to_string()
}

/// Fold chunks shorter than `min_chunk_size` into their successor, joining
/// texts with a blank line and extending the end offset. Table chunks are
/// never folded in either direction; folding across different kinds yields a
/// `Mixed` chunk. Indices are reassigned 0..n-1 afterwards.
pub(crate) fn merge_small(chunks: Vec<Chunk>, config: &ChunkingConfig) -> Vec<Chunk> {
    let mut merged: Vec<Chunk> = Vec::new();
    let mut iter = chunks.into_iter();
    let Some(mut current) = iter.next() else {
        return merged;
    };

    for next in iter {
        let fold = current.char_len() < config.min_chunk_size
            && current.kind != ChunkKind::Table
            && next.kind != ChunkKind::Table;
        if fold {
            current.text.push_str("\n\n");
            current.text.push_str(&next.text);
            if current.kind != next.kind {
                current.kind = ChunkKind::Mixed;
            }
            current.end_char = next.end_char;
        } else {
            merged.push(current);
            current = next;
        }
    }
    merged.push(current);

    for (i, chunk) in merged.iter_mut().enumerate() {
        chunk.index = i;
    }
    merged
}
