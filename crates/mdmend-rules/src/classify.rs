//! Block-level line classification.
//!
//! A minimal tokenizer, not a Markdown parser: each line is put in one of a
//! handful of buckets before any structural rule looks at it, and fence state
//! is tracked so code content is never mistaken for headings or lists.

use once_cell::sync::Lazy;
use regex::Regex;

static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6}\s").unwrap());

static LIST_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s").unwrap());

/// A whole line of strong emphasis, e.g. `**Setup**`.
pub(crate) static EMPHASIS_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:\*\*([^*]+)\*\*|__([^_]+)__)$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Heading,
    FenceOpen,
    FenceClose,
    /// Inside a fenced block, including one never closed.
    Code,
    ListItem,
    /// Indented text directly under a list item.
    ListContinuation,
    TableRow,
    Text,
}

impl LineKind {
    pub fn is_list(self) -> bool {
        matches!(self, LineKind::ListItem | LineKind::ListContinuation)
    }

    pub fn is_code(self) -> bool {
        matches!(self, LineKind::FenceOpen | LineKind::FenceClose | LineKind::Code)
    }
}

/// The fence character (`` ` `` or `~`) if `line` starts a fence marker.
pub fn fence_char(line: &str) -> Option<char> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("```") {
        Some('`')
    } else if trimmed.starts_with("~~~") {
        Some('~')
    } else {
        None
    }
}

pub fn is_fence_marker(line: &str) -> bool {
    fence_char(line).is_some()
}

pub fn is_heading(line: &str) -> bool {
    HEADING.is_match(line)
}

pub fn is_list_item(line: &str) -> bool {
    LIST_ITEM.is_match(line)
}

pub fn is_emphasis_line(line: &str) -> bool {
    EMPHASIS_LINE.is_match(line)
}

pub fn is_table_row(line: &str) -> bool {
    line.trim_start().starts_with('|')
}

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn is_indented(line: &str) -> bool {
    line.starts_with("  ") || line.starts_with('\t')
}

/// Where a line sits relative to fenced code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FenceRole {
    Outside,
    Open,
    Inside,
    Close,
}

impl FenceRole {
    pub fn is_outside(self) -> bool {
        self == FenceRole::Outside
    }
}

/// Tracks whether the scan is inside a fenced code block.
///
/// A block closes only on a marker made of the same character that opened it.
#[derive(Debug, Clone, Default)]
pub struct FenceTracker {
    open: Option<char>,
}

impl FenceTracker {
    pub fn in_code(&self) -> bool {
        self.open.is_some()
    }

    /// Advance over one line and report the role it plays.
    pub fn step(&mut self, line: &str) -> FenceRole {
        match (self.open, fence_char(line)) {
            (None, Some(c)) => {
                self.open = Some(c);
                FenceRole::Open
            }
            (None, None) => FenceRole::Outside,
            (Some(open), Some(c)) if open == c => {
                self.open = None;
                FenceRole::Close
            }
            (Some(_), _) => FenceRole::Inside,
        }
    }
}

/// Classify a line that is known to be outside fenced code.
pub fn classify_plain(line: &str, prev: Option<LineKind>) -> LineKind {
    if is_blank(line) {
        LineKind::Blank
    } else if is_heading(line) {
        LineKind::Heading
    } else if is_list_item(line) {
        LineKind::ListItem
    } else if prev.is_some_and(LineKind::is_list) && is_indented(line) {
        LineKind::ListContinuation
    } else if is_table_row(line) {
        LineKind::TableRow
    } else {
        LineKind::Text
    }
}

/// Classify every line of a document, top to bottom.
pub fn classify_lines<S: AsRef<str>>(lines: &[S]) -> Vec<LineKind> {
    let mut fences = FenceTracker::default();
    let mut kinds: Vec<LineKind> = Vec::with_capacity(lines.len());
    for line in lines {
        let line = line.as_ref();
        let kind = match fences.step(line) {
            FenceRole::Open => LineKind::FenceOpen,
            FenceRole::Close => LineKind::FenceClose,
            FenceRole::Inside => LineKind::Code,
            FenceRole::Outside => classify_plain(line, kinds.last().copied()),
        };
        kinds.push(kind);
    }
    kinds
}

#[cfg(test)]
mod tests {
    use super::*;
    use LineKind::*;

    #[test]
    fn classifies_basic_blocks() {
        let lines = [
            "# Title",
            "",
            "Some text",
            "- item",
            "  continued",
            "2. numbered",
            "| a | b |",
        ];
        assert_eq!(
            classify_lines(&lines),
            vec![Heading, Blank, Text, ListItem, ListContinuation, ListItem, TableRow]
        );
    }

    #[test]
    fn fence_interior_is_code() {
        let lines = ["```rust", "# not a heading", "- not a list", "```", "# heading"];
        assert_eq!(
            classify_lines(&lines),
            vec![FenceOpen, Code, Code, FenceClose, Heading]
        );
    }

    #[test]
    fn unclosed_fence_swallows_rest() {
        let lines = ["text", "```", "# inside", "", "more"];
        assert_eq!(classify_lines(&lines), vec![Text, FenceOpen, Code, Code, Code]);
    }

    #[test]
    fn tilde_fence_does_not_close_backtick_fence() {
        let lines = ["```", "~~~", "```"];
        assert_eq!(classify_lines(&lines), vec![FenceOpen, Code, FenceClose]);
    }

    #[test]
    fn hash_without_space_is_text() {
        assert_eq!(classify_plain("#hashtag", None), Text);
        assert_eq!(classify_plain("####### seven", None), Text);
    }

    #[test]
    fn bold_line_is_not_a_list_item() {
        assert_eq!(classify_plain("**Bold**", None), Text);
        assert_eq!(classify_plain("* bullet", None), ListItem);
    }

    #[test]
    fn emphasis_line_needs_the_whole_line() {
        assert!(is_emphasis_line("**Setup**"));
        assert!(is_emphasis_line("__Setup__"));
        assert!(!is_emphasis_line("**Setup** now"));
        assert!(!is_emphasis_line("  **Setup**"));
    }

    #[test]
    fn indented_text_after_paragraph_is_text() {
        let lines = ["para", "  indented"];
        assert_eq!(classify_lines(&lines), vec![Text, Text]);
    }
}
