//! Check-mode reporting: what a rewrite would touch, without touching it.

use std::fmt;

use crate::config::RuleId;
use crate::pipeline::Fix;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub rule: RuleId,
    /// 1-based line in the input text.
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn from_fix(fix: &Fix) -> Self {
        Self {
            rule: fix.rule,
            line: fix.line,
            message: fix.rule.description().to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}", self.line, self.rule, self.message)
    }
}

/// One diagnostic per fix, ordered by line then rule.
pub fn diagnostics_from_fixes<'a>(fixes: impl IntoIterator<Item = &'a Fix>) -> Vec<Diagnostic> {
    let mut diagnostics: Vec<Diagnostic> = fixes.into_iter().map(Diagnostic::from_fix).collect();
    diagnostics.sort_by_key(|d| (d.line, d.rule));
    diagnostics
}
