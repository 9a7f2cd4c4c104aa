//! Line-local rewrite rules.
//!
//! Each rule looks at one line (after the rules before it have run) plus the
//! per-document [`DocState`], and says what to emit. Structural rules that
//! need to see neighbouring lines live in [`crate::structure`].

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::classify::{FenceRole, FenceTracker, EMPHASIS_LINE};
use crate::config::{FixConfig, RuleId, RuleSet};
use crate::wrap::{wrap_line, WrapPolicy};

// ---------------------------------------------------------------------------
// Action / DocState
// ---------------------------------------------------------------------------

/// What a rule wants emitted for the current line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Emit the line unchanged.
    Keep,
    /// Emit a modified line.
    Replace(String),
    /// Emit several lines in its place. Ends the rule chain for this line.
    Expand(Vec<String>),
}

/// Accumulators scoped to a single document.
#[derive(Debug, Clone, Default)]
pub struct DocState {
    /// Normalized heading text -> occurrences seen so far.
    headings: HashMap<String, usize>,
    fences: FenceTracker,
}

impl DocState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance fence tracking over the next input line.
    pub fn enter_line(&mut self, line: &str) -> FenceRole {
        self.fences.step(line)
    }

    pub fn in_code(&self) -> bool {
        self.fences.in_code()
    }
}

// ---------------------------------------------------------------------------
// LineRule trait
// ---------------------------------------------------------------------------

pub trait LineRule: Send + Sync {
    fn id(&self) -> RuleId;

    /// Whether the rule also runs on fence markers and fenced code.
    fn applies_in_code(&self) -> bool {
        false
    }

    fn apply(&self, line: &str, state: &mut DocState) -> Action;
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

static HEADING_TRAILING_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#{1,6}\s.*[.:!?]$").unwrap());

static TRAILING_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.:!?]+$").unwrap());

static EMPTY_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]*)\]\(\)").unwrap());

static HEADING_TEXT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").unwrap());

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

pub struct TrailingWhitespaceRule;
impl LineRule for TrailingWhitespaceRule {
    fn id(&self) -> RuleId {
        RuleId::TrailingWhitespace
    }

    fn applies_in_code(&self) -> bool {
        true
    }

    fn apply(&self, line: &str, _state: &mut DocState) -> Action {
        let trimmed = line.trim_end_matches([' ', '\t']);
        if trimmed.len() == line.len() {
            Action::Keep
        } else {
            Action::Replace(trimmed.to_string())
        }
    }
}

pub struct HeadingPunctuationRule;
impl LineRule for HeadingPunctuationRule {
    fn id(&self) -> RuleId {
        RuleId::HeadingPunctuation
    }

    fn apply(&self, line: &str, _state: &mut DocState) -> Action {
        if !HEADING_TRAILING_PUNCT.is_match(line) {
            return Action::Keep;
        }
        let stripped = TRAILING_PUNCT.replace(line, "");
        Action::Replace(stripped.trim_end_matches([' ', '\t']).to_string())
    }
}

pub struct EmphasisHeadingRule;
impl LineRule for EmphasisHeadingRule {
    fn id(&self) -> RuleId {
        RuleId::EmphasisHeading
    }

    fn apply(&self, line: &str, _state: &mut DocState) -> Action {
        let Some(caps) = EMPHASIS_LINE.captures(line) else {
            return Action::Keep;
        };
        let inner = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().trim())
            .unwrap_or_default();
        if inner.is_empty() {
            return Action::Keep;
        }
        Action::Replace(format!("## {inner}"))
    }
}

pub struct EmptyLinkRule;
impl LineRule for EmptyLinkRule {
    fn id(&self) -> RuleId {
        RuleId::EmptyLink
    }

    fn apply(&self, line: &str, _state: &mut DocState) -> Action {
        if !EMPTY_LINK.is_match(line) {
            return Action::Keep;
        }
        Action::Replace(EMPTY_LINK.replace_all(line, "${1}").into_owned())
    }
}

pub struct DuplicateHeadingRule;
impl LineRule for DuplicateHeadingRule {
    fn id(&self) -> RuleId {
        RuleId::DuplicateHeading
    }

    fn apply(&self, line: &str, state: &mut DocState) -> Action {
        let Some(caps) = HEADING_TEXT.captures(line) else {
            return Action::Keep;
        };
        let level = &caps[1];
        let text = &caps[2];
        let count = state.headings.entry(normalize_heading(text)).or_insert(0);
        *count += 1;
        if *count == 1 {
            return Action::Keep;
        }
        // The new text is a heading too: skip names already taken and
        // reserve the one chosen so later copies do not collide with it.
        let mut n = *count;
        let renamed = loop {
            let candidate = format!("{text} ({n})");
            if !state.headings.contains_key(&normalize_heading(&candidate)) {
                break candidate;
            }
            n += 1;
        };
        state.headings.insert(normalize_heading(&renamed), 1);
        Action::Replace(format!("{level} {renamed}"))
    }
}

fn normalize_heading(text: &str) -> String {
    text.trim().to_lowercase()
}

pub struct LineLengthRule {
    policy: WrapPolicy,
}

impl LineLengthRule {
    pub fn new(policy: WrapPolicy) -> Self {
        Self { policy }
    }
}

impl LineRule for LineLengthRule {
    fn id(&self) -> RuleId {
        RuleId::LineLength
    }

    fn apply(&self, line: &str, _state: &mut DocState) -> Action {
        match wrap_line(line, &self.policy) {
            Some(pieces) => Action::Expand(pieces),
            None => Action::Keep,
        }
    }
}

/// Build the enabled line-local rules in application order.
pub fn line_rules(rules: &RuleSet, config: &FixConfig) -> Vec<Box<dyn LineRule>> {
    rules
        .iter()
        .filter_map(|id| -> Option<Box<dyn LineRule>> {
            match id {
                RuleId::TrailingWhitespace => Some(Box::new(TrailingWhitespaceRule)),
                RuleId::HeadingPunctuation => Some(Box::new(HeadingPunctuationRule)),
                RuleId::EmphasisHeading => Some(Box::new(EmphasisHeadingRule)),
                RuleId::EmptyLink => Some(Box::new(EmptyLinkRule)),
                RuleId::DuplicateHeading => Some(Box::new(DuplicateHeadingRule)),
                RuleId::LineLength => Some(Box::new(LineLengthRule::new(WrapPolicy::from(config)))),
                _ => None,
            }
        })
        .collect()
}
