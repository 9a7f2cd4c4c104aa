//! Structural rules: blank lines around blocks, blank-run collapse, and
//! end-of-file normalization.
//!
//! These run after the line-local rules, on freshly classified output, so a
//! heading produced earlier in the same pass is already spaced correctly.

use crate::classify::{classify_lines, is_blank, LineKind};
use crate::config::{RuleId, RuleSet};
use crate::pipeline::Fix;

/// A working line tagged with the 1-based input line it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub text: String,
    pub line: usize,
}

impl SourceLine {
    pub fn new(text: impl Into<String>, line: usize) -> Self {
        Self {
            text: text.into(),
            line,
        }
    }

    fn blank(line: usize) -> Self {
        Self::new(String::new(), line)
    }
}

impl AsRef<str> for SourceLine {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Collects fixes for one pass.
pub struct FixLog<'a> {
    pub pass: usize,
    pub fixes: &'a mut Vec<Fix>,
}

impl FixLog<'_> {
    pub fn record(&mut self, rule: RuleId, line: usize) {
        tracing::debug!(rule = %rule, line, pass = self.pass, "Applied fix");
        self.fixes.push(Fix {
            rule,
            line,
            pass: self.pass,
        });
    }
}

// ---------------------------------------------------------------------------
// Blank lines around blocks
// ---------------------------------------------------------------------------

fn blank_before_rule(kind: LineKind) -> Option<RuleId> {
    match kind {
        LineKind::Heading => Some(RuleId::BlanksAroundHeadings),
        LineKind::FenceOpen => Some(RuleId::BlanksAroundFences),
        LineKind::ListItem => Some(RuleId::BlanksAroundLists),
        _ => None,
    }
}

fn blank_after_rule(kind: LineKind) -> Option<RuleId> {
    match kind {
        LineKind::Heading => Some(RuleId::BlanksAroundHeadings),
        LineKind::FenceClose => Some(RuleId::BlanksAroundFences),
        LineKind::ListItem | LineKind::ListContinuation => Some(RuleId::BlanksAroundLists),
        _ => None,
    }
}

/// Consecutive list lines belong to one list and need no separator.
fn same_run(a: LineKind, b: LineKind) -> bool {
    a.is_list() && b.is_list()
}

/// Insert blank lines around headings, fences and lists, and collapse runs of
/// blank lines outside code.
pub fn separate_blocks(lines: Vec<SourceLine>, rules: &RuleSet, log: &mut FixLog<'_>) -> Vec<SourceLine> {
    let kinds = classify_lines(&lines);
    let mut out: Vec<SourceLine> = Vec::with_capacity(lines.len() + 8);
    let mut last: Option<LineKind> = None;

    for (i, line) in lines.into_iter().enumerate() {
        let kind = kinds[i];

        if kind == LineKind::Blank {
            if last == Some(LineKind::Blank) && rules.contains(RuleId::MultipleBlanks) {
                log.record(RuleId::MultipleBlanks, line.line);
                continue;
            }
            out.push(line);
            last = Some(kind);
            continue;
        }

        if let Some(rule) = blank_before_rule(kind).filter(|r| rules.contains(*r)) {
            if let Some(prev) = last {
                if prev != LineKind::Blank && !same_run(prev, kind) {
                    log.record(rule, line.line);
                    out.push(SourceLine::blank(line.line));
                }
            }
        }

        let number = line.line;
        out.push(line);
        last = Some(kind);

        if let Some(rule) = blank_after_rule(kind).filter(|r| rules.contains(*r)) {
            if let Some(&next) = kinds.get(i + 1) {
                if next != LineKind::Blank && !same_run(kind, next) {
                    log.record(rule, number);
                    out.push(SourceLine::blank(number));
                    last = Some(LineKind::Blank);
                }
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// End of file
// ---------------------------------------------------------------------------

/// Join lines back into text, ending with exactly one newline when the
/// trailing-newline rule is on. With it off, the input's own ending is kept.
pub fn finish(mut lines: Vec<SourceLine>, had_trailing_newline: bool, rules: &RuleSet, log: &mut FixLog<'_>) -> String {
    if !rules.contains(RuleId::TrailingNewline) {
        let mut text = join(&lines);
        if had_trailing_newline && !lines.is_empty() {
            text.push('\n');
        }
        return text;
    }

    let before = lines.len();
    let last_line = lines.last().map_or(1, |l| l.line);
    let bare_newline = had_trailing_newline && before == 1 && lines[0].text.is_empty();
    while lines.last().is_some_and(|l| is_blank(&l.text)) {
        lines.pop();
    }

    // No visible content: the document is a single newline.
    if lines.is_empty() {
        if !bare_newline {
            log.record(RuleId::TrailingNewline, last_line);
        }
        return "\n".to_string();
    }
    if lines.len() != before || !had_trailing_newline {
        log.record(RuleId::TrailingNewline, last_line);
    }

    let mut text = join(&lines);
    text.push('\n');
    text
}

fn join(lines: &[SourceLine]) -> String {
    lines.iter().map(|l| l.text.as_str()).collect::<Vec<_>>().join("\n")
}
