//! Line classification patterns.
//!
//! A line is tagged by the first family that matches, checked in priority
//! order: table, then title, then list. Anything left is a paragraph line.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::LineKind;

// ── Pattern families ────────────────────────────────────────────────────────

/// Table markers match anywhere in the line: pipe cells, box-drawing borders,
/// long horizontal rules, tab-separated columns.
static TABLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"\|.+\|").unwrap(),
        Regex::new(r"┌.*┐").unwrap(),
        Regex::new(r"─{3,}").unwrap(),
        Regex::new(r"\t.+\t").unwrap(),
    ]
});

/// Title markers are anchored to the whole line: markdown headings, numbered
/// headings, Korean syllable / hanja-numeral headings, bracketed headings,
/// and statute article heads (제N조).
static TITLE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"^#{1,6}\s+.+$").unwrap(),
        Regex::new(r"^[0-9]+\.\s+.+$").unwrap(),
        Regex::new(r"^[가-힣]\.\s+.+$").unwrap(),
        Regex::new(r"^[一二三四五六七八九十]+\.\s+.+$").unwrap(),
        Regex::new(r"^【.+】$").unwrap(),
        Regex::new(r"^\[.+\]$").unwrap(),
        Regex::new(r"^<.+>$").unwrap(),
        Regex::new(r"^제[0-9]+조").unwrap(),
        Regex::new(r"^[0-9]+\)").unwrap(),
    ]
});

/// List markers are anchored to the line start: bullet glyphs, `1.`/`1)`
/// enumerations, and Korean syllable enumerations (`가.`/`가)`).
static LIST_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"^[-•●○◆◇▶▷]\s+").unwrap(),
        Regex::new(r"^\d+[\.\)]\s+").unwrap(),
        Regex::new(r"^[가-힣][\.\)]\s+").unwrap(),
    ]
});

// ── Classification ──────────────────────────────────────────────────────────

/// Tags a single line. Whitespace-only lines are `Empty`; otherwise the
/// trimmed line is checked against each family in priority order.
pub fn classify_line(line: &str) -> LineKind {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineKind::Empty;
    }
    if TABLE_PATTERNS.iter().any(|p| p.is_match(trimmed)) {
        return LineKind::Table;
    }
    if TITLE_PATTERNS.iter().any(|p| p.is_match(trimmed)) {
        return LineKind::Title;
    }
    if LIST_PATTERNS.iter().any(|p| p.is_match(trimmed)) {
        return LineKind::List;
    }
    LineKind::Paragraph
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_whitespace_lines_are_empty() {
        assert_eq!(classify_line(""), LineKind::Empty);
        assert_eq!(classify_line("   \t  "), LineKind::Empty);
    }

    #[test]
    fn pipe_rows_and_rules_are_tables() {
        assert_eq!(classify_line("| 항목 | 금액 |"), LineKind::Table);
        assert_eq!(classify_line("|------|------|"), LineKind::Table);
        assert_eq!(classify_line("┌──────┐"), LineKind::Table);
        assert_eq!(classify_line("──────────"), LineKind::Table);
        assert_eq!(classify_line("이름\t나이\t주소"), LineKind::Table);
    }

    #[test]
    fn heading_shapes_are_titles() {
        assert_eq!(classify_line("# 개요"), LineKind::Title);
        assert_eq!(classify_line("### 세부 사항"), LineKind::Title);
        assert_eq!(classify_line("【납부 안내】"), LineKind::Title);
        assert_eq!(classify_line("[첨부 서류]"), LineKind::Title);
        assert_eq!(classify_line("<계약 조건>"), LineKind::Title);
        assert_eq!(classify_line("제12조 납부 의무"), LineKind::Title);
        assert_eq!(classify_line("一. 총칙"), LineKind::Title);
    }

    #[test]
    fn bullet_lines_are_lists() {
        assert_eq!(classify_line("- 준비물 지참"), LineKind::List);
        assert_eq!(classify_line("• 신분증"), LineKind::List);
        assert_eq!(classify_line("▶ 접수 방법"), LineKind::List);
    }

    #[test]
    fn numbered_line_with_text_is_title_not_list() {
        // `1. ` matches both the title and list families; title wins.
        assert_eq!(classify_line("1. 신청 절차"), LineKind::Title);
        assert_eq!(classify_line("가. 제출 서류"), LineKind::Title);
    }

    #[test]
    fn table_beats_title_inside_one_line() {
        // A pipe row that also starts like a heading stays a table.
        assert_eq!(classify_line("1. | 구분 | 금액 |"), LineKind::Table);
    }

    #[test]
    fn plain_prose_is_paragraph() {
        assert_eq!(classify_line("납부 기한은 매월 말일입니다."), LineKind::Paragraph);
        assert_eq!(classify_line("Payment is due monthly."), LineKind::Paragraph);
    }

    #[test]
    fn classification_ignores_surrounding_whitespace() {
        assert_eq!(classify_line("   # 개요   "), LineKind::Title);
        assert_eq!(classify_line("  - 항목  "), LineKind::List);
    }
}
