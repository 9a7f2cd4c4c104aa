//! The rewrite pipeline: one ordered rule chain, run to a fixed point.

use crate::config::{FixConfig, RuleId, RuleSet};
use crate::diagnostics::{diagnostics_from_fixes, Diagnostic};
use crate::rules::{line_rules, Action, DocState, LineRule};
use crate::structure::{finish, separate_blocks, FixLog, SourceLine};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One rule firing on one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fix {
    pub rule: RuleId,
    /// 1-based line in the text the pass started from.
    pub line: usize,
    pub pass: usize,
}

/// Outcome of rewriting one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteResult {
    pub text: String,
    /// False only when `text` is byte-identical to the input.
    pub changed: bool,
    pub fixes: Vec<Fix>,
    pub passes: usize,
}

impl RewriteResult {
    /// Distinct rules that fired, in application order.
    pub fn rules_fired(&self) -> Vec<RuleId> {
        let mut rules: Vec<RuleId> = self.fixes.iter().map(|f| f.rule).collect();
        rules.sort();
        rules.dedup();
        rules
    }
}

/// Rewrites Markdown so it satisfies the enabled rules.
///
/// Line-local rules run first on every line (only trailing-whitespace trimming
/// reaches fenced code), then blank-line structure is repaired, then the end
/// of file is normalized. [`Pipeline::apply`] repeats that pass until the text
/// stops changing.
pub struct Pipeline {
    rules: RuleSet,
    config: FixConfig,
    line_rules: Vec<Box<dyn LineRule>>,
}

impl Pipeline {
    /// Pipeline with every rule not listed in `config.disabled_rules`.
    pub fn new(config: FixConfig) -> Self {
        let rules = config.rule_set();
        Self::with_rules(config, rules)
    }

    pub fn with_rules(config: FixConfig, rules: RuleSet) -> Self {
        let line_rules = line_rules(&rules, &config);
        Self {
            rules,
            config,
            line_rules,
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn config(&self) -> &FixConfig {
        &self.config
    }

    /// Run single passes until one changes nothing, up to `max_passes`.
    pub fn apply(&self, text: &str) -> RewriteResult {
        let max_passes = self.config.max_passes.max(1);
        let mut current = text.to_string();
        let mut fixes = Vec::new();
        let mut passes = 0;
        let mut settled = false;

        for pass in 1..=max_passes {
            passes = pass;
            let (next, pass_fixes) = self.single_pass(&current, pass);
            if next == current {
                settled = true;
                break;
            }
            tracing::debug!(pass, fixes = pass_fixes.len(), "Pass rewrote document");
            fixes.extend(pass_fixes);
            current = next;
        }

        if !settled {
            tracing::warn!(max_passes, "Rewrite did not settle within the pass limit, keeping last result");
        }

        RewriteResult {
            changed: current != text,
            text: current,
            fixes,
            passes,
        }
    }

    /// Exactly one pass of the rule chain.
    pub fn apply_once(&self, text: &str) -> RewriteResult {
        let (next, fixes) = self.single_pass(text, 1);
        RewriteResult {
            changed: next != text,
            text: next,
            fixes,
            passes: 1,
        }
    }

    /// What the first pass would fix, ordered by line.
    pub fn diagnose(&self, text: &str) -> Vec<Diagnostic> {
        let (_, fixes) = self.single_pass(text, 1);
        diagnostics_from_fixes(&fixes)
    }

    fn single_pass(&self, text: &str, pass: usize) -> (String, Vec<Fix>) {
        let had_trailing_newline = text.ends_with('\n');
        let mut fixes = Vec::new();
        let mut log = FixLog {
            pass,
            fixes: &mut fixes,
        };

        let mut state = DocState::new();
        let mut lines: Vec<SourceLine> = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let number = idx + 1;
            let in_code = !state.enter_line(raw).is_outside();
            let mut current = raw.to_string();
            let mut expanded: Option<Vec<String>> = None;

            for rule in &self.line_rules {
                if in_code && !rule.applies_in_code() {
                    continue;
                }
                match rule.apply(&current, &mut state) {
                    Action::Keep => {}
                    Action::Replace(next) => {
                        log.record(rule.id(), number);
                        current = next;
                    }
                    Action::Expand(parts) => {
                        log.record(rule.id(), number);
                        expanded = Some(parts);
                        break;
                    }
                }
            }

            match expanded {
                Some(parts) => lines.extend(parts.into_iter().map(|p| SourceLine::new(p, number))),
                None => lines.push(SourceLine::new(current, number)),
            }
        }

        let lines = separate_blocks(lines, &self.rules, &mut log);
        let out = finish(lines, had_trailing_newline, &self.rules, &mut log);
        (out, fixes)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(FixConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_document_settles_in_two_passes() {
        let input = "# Title:\nSome text   \n**Bold**\n- a\n- b\nText after\n\n\n\n```\ncode   \n```\nend";
        let result = Pipeline::default().apply(input);
        assert_eq!(
            result.text,
            "# Title\n\nSome text\n\n## Bold\n\n- a\n- b\n\nText after\n\n```\ncode\n```\n\nend\n"
        );
        assert!(result.changed);
        assert_eq!(result.passes, 2);
        assert!(result.fixes.iter().all(|f| f.pass == 1));
    }

    #[test]
    fn clean_document_is_unchanged() {
        let input = "# Title\n\nParagraph.\n\n- a\n- b\n";
        let result = Pipeline::default().apply(input);
        assert!(!result.changed);
        assert_eq!(result.text, input);
        assert!(result.fixes.is_empty());
        assert_eq!(result.passes, 1);
    }

    #[test]
    fn code_content_is_untouched() {
        let input = "```\n# Heading.\n**bold**\n[x]()\n\n\n\n```\n";
        let result = Pipeline::default().apply(input);
        assert!(!result.changed);
    }

    #[test]
    fn code_lines_still_lose_trailing_whitespace() {
        let result = Pipeline::default().apply("```\nlet x = 1;  \n```\n");
        assert_eq!(result.text, "```\nlet x = 1;\n```\n");
        assert_eq!(result.rules_fired(), vec![RuleId::TrailingWhitespace]);
    }

    #[test]
    fn disabled_rule_does_not_fire() {
        let pipeline = Pipeline::with_rules(FixConfig::default(), RuleSet::without([RuleId::EmptyLink]));
        assert!(!pipeline.apply("[x]()\n").changed);
    }

    #[test]
    fn disabled_rules_from_config() {
        let config = FixConfig {
            disabled_rules: vec![RuleId::TrailingNewline],
            ..FixConfig::default()
        };
        assert!(!Pipeline::new(config).apply("no newline").changed);
    }

    #[test]
    fn crlf_becomes_lf() {
        let result = Pipeline::default().apply("a\r\nb\r\n");
        assert_eq!(result.text, "a\nb\n");
        assert!(result.changed);
    }

    #[test]
    fn empty_and_blank_documents() {
        let empty = Pipeline::default().apply("");
        assert!(empty.changed);
        assert_eq!(empty.text, "\n");
        assert_eq!(empty.rules_fired(), vec![RuleId::TrailingNewline]);

        let blank = Pipeline::default().apply("\n\n  \n");
        assert!(blank.changed);
        assert_eq!(blank.text, "\n");

        let settled = Pipeline::default().apply("\n");
        assert!(!settled.changed);
        assert!(Pipeline::default().diagnose("\n").is_empty());
    }

    #[test]
    fn pass_limit_stops_the_loop() {
        let config = FixConfig {
            max_passes: 1,
            ..FixConfig::default()
        };
        // Punctuation is stripped from headings before emphasis becomes one,
        // so the trailing period needs a second pass.
        let result = Pipeline::new(config).apply("**Title.**\n");
        assert!(result.changed);
        assert_eq!(result.passes, 1);
        assert_eq!(result.text, "## Title.\n");

        assert_eq!(Pipeline::default().apply("**Title.**\n").text, "## Title\n");
    }

    #[test]
    fn long_paragraph_settles_in_one_rewriting_pass() {
        let config = FixConfig {
            max_line_length: 40,
            ..FixConfig::default()
        };
        let pipeline = Pipeline::new(config);
        let input = format!("{}\n", "word ".repeat(400).trim_end());
        let first = pipeline.apply(&input);
        assert_eq!(first.passes, 2);
        assert!(first.text.lines().all(|l| l.chars().count() <= 40));
        assert!(first.text.lines().skip(1).all(|l| l.starts_with("  word")));
        assert!(!pipeline.apply(&first.text).changed);
    }

    #[test]
    fn apply_once_runs_a_single_pass() {
        let pipeline = Pipeline::default();
        let once = pipeline.apply_once("# A.\ntext");
        assert_eq!(once.passes, 1);
        assert_eq!(once.text, "# A\n\ntext\n");
    }

    #[test]
    fn diagnose_reports_first_pass_fixes() {
        let diagnostics = Pipeline::default().diagnose("# Title.\ntext\n");
        let found: Vec<_> = diagnostics.iter().map(|d| (d.line, d.rule)).collect();
        assert_eq!(
            found,
            vec![(1, RuleId::HeadingPunctuation), (1, RuleId::BlanksAroundHeadings)]
        );
        assert!(Pipeline::default().diagnose("clean\n").is_empty());
    }
}
