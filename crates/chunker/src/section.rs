//! Text normalization and structural section splitting.

use std::sync::LazyLock;

use regex::Regex;

use crate::helpers::char_len;
use crate::patterns::classify_line;
use crate::types::{ChunkingConfig, LineKind, Section, SectionKind};

static HORIZONTAL_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static EXTRA_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Normalizes raw document text before any structural analysis: runs of
/// horizontal whitespace collapse to one space, three or more consecutive
/// newlines collapse to two, non-breaking spaces become plain spaces,
/// zero-width spaces are removed, and the result is trimmed.
pub fn normalize_text(text: &str) -> String {
    let text = HORIZONTAL_WS.replace_all(text, " ");
    let text = EXTRA_NEWLINES.replace_all(&text, "\n\n");
    let text = text.replace('\u{a0}', " ");
    let text = text.replace('\u{200b}', "");
    text.trim().to_string()
}

/// Walks normalized text line by line and groups contiguous lines into typed
/// sections. Contiguous table lines form a single table section; a title line
/// becomes a one-line section of its own and the lines after it open a fresh
/// paragraph section. Empty lines are kept inside paragraph text but never
/// open a section, and whitespace-only sections are dropped.
///
/// Each section records the character offset of its first line in the
/// normalized text.
pub fn split_sections(text: &str, config: &ChunkingConfig) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();
    let mut kind = SectionKind::Paragraph;
    let mut start = 0usize;
    let mut pos = 0usize;

    for line in text.split('\n') {
        match classify_line(line) {
            LineKind::Table if config.preserve_tables => {
                if kind != SectionKind::Table {
                    flush(&mut sections, &mut buffer, kind, start);
                    kind = SectionKind::Table;
                    start = pos;
                }
                buffer.push(line);
            }
            LineKind::Title if config.preserve_titles => {
                flush(&mut sections, &mut buffer, kind, start);
                kind = SectionKind::Paragraph;
                sections.push(Section {
                    kind: SectionKind::Title,
                    text: line.to_string(),
                    start: pos,
                });
            }
            LineKind::Empty => {
                if kind == SectionKind::Table {
                    flush(&mut sections, &mut buffer, kind, start);
                    kind = SectionKind::Paragraph;
                } else if !buffer.is_empty() {
                    buffer.push(line);
                }
            }
            _ => {
                if kind == SectionKind::Table {
                    flush(&mut sections, &mut buffer, kind, start);
                    kind = SectionKind::Paragraph;
                }
                if buffer.is_empty() {
                    start = pos;
                }
                buffer.push(line);
            }
        }
        pos += char_len(line) + 1;
    }
    flush(&mut sections, &mut buffer, kind, start);
    sections
}

fn flush(sections: &mut Vec<Section>, buffer: &mut Vec<&str>, kind: SectionKind, start: usize) {
    if buffer.is_empty() {
        return;
    }
    let text = buffer.join("\n");
    buffer.clear();
    if text.trim().is_empty() {
        return;
    }
    sections.push(Section { kind, text, start });
}
