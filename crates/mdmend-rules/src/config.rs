//! Rule identifiers, rule selection, and the tunable knobs of the pipeline.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use mdmend_types::{MendError, Result};
use serde::Deserialize;

// ---------------------------------------------------------------------------
// RuleId
// ---------------------------------------------------------------------------

/// Identifies one rewrite rule by the markdownlint check it satisfies.
///
/// Declaration order is the canonical application order: line-local rules
/// first, then the structural ones, then end-of-file normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum RuleId {
    TrailingWhitespace,
    HeadingPunctuation,
    EmphasisHeading,
    EmptyLink,
    DuplicateHeading,
    LineLength,
    BlanksAroundHeadings,
    BlanksAroundFences,
    BlanksAroundLists,
    MultipleBlanks,
    TrailingNewline,
}

impl RuleId {
    pub const ALL: [RuleId; 11] = [
        RuleId::TrailingWhitespace,
        RuleId::HeadingPunctuation,
        RuleId::EmphasisHeading,
        RuleId::EmptyLink,
        RuleId::DuplicateHeading,
        RuleId::LineLength,
        RuleId::BlanksAroundHeadings,
        RuleId::BlanksAroundFences,
        RuleId::BlanksAroundLists,
        RuleId::MultipleBlanks,
        RuleId::TrailingNewline,
    ];

    /// The markdownlint code, e.g. `MD013`.
    pub fn code(self) -> &'static str {
        match self {
            RuleId::TrailingWhitespace => "MD009",
            RuleId::HeadingPunctuation => "MD026",
            RuleId::EmphasisHeading => "MD036",
            RuleId::EmptyLink => "MD042",
            RuleId::DuplicateHeading => "MD024",
            RuleId::LineLength => "MD013",
            RuleId::BlanksAroundHeadings => "MD022",
            RuleId::BlanksAroundFences => "MD031",
            RuleId::BlanksAroundLists => "MD032",
            RuleId::MultipleBlanks => "MD012",
            RuleId::TrailingNewline => "MD047",
        }
    }

    /// Kebab-case alias accepted wherever a code is.
    pub fn name(self) -> &'static str {
        match self {
            RuleId::TrailingWhitespace => "no-trailing-spaces",
            RuleId::HeadingPunctuation => "no-trailing-punctuation",
            RuleId::EmphasisHeading => "no-emphasis-as-heading",
            RuleId::EmptyLink => "no-empty-links",
            RuleId::DuplicateHeading => "no-duplicate-heading",
            RuleId::LineLength => "line-length",
            RuleId::BlanksAroundHeadings => "blanks-around-headings",
            RuleId::BlanksAroundFences => "blanks-around-fences",
            RuleId::BlanksAroundLists => "blanks-around-lists",
            RuleId::MultipleBlanks => "no-multiple-blanks",
            RuleId::TrailingNewline => "single-trailing-newline",
        }
    }

    /// Short message used for diagnostics.
    pub fn description(self) -> &'static str {
        match self {
            RuleId::TrailingWhitespace => "Trailing whitespace",
            RuleId::HeadingPunctuation => "Trailing punctuation in heading",
            RuleId::EmphasisHeading => "Emphasis used instead of a heading",
            RuleId::EmptyLink => "Link with empty destination",
            RuleId::DuplicateHeading => "Duplicate heading text",
            RuleId::LineLength => "Line exceeds maximum length",
            RuleId::BlanksAroundHeadings => "Heading not surrounded by blank lines",
            RuleId::BlanksAroundFences => "Fenced code block not surrounded by blank lines",
            RuleId::BlanksAroundLists => "List not surrounded by blank lines",
            RuleId::MultipleBlanks => "Multiple consecutive blank lines",
            RuleId::TrailingNewline => "File does not end with a single newline",
        }
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for RuleId {
    type Err = MendError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        RuleId::ALL
            .into_iter()
            .find(|id| id.code().eq_ignore_ascii_case(wanted) || id.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| MendError::UnknownRule(wanted.to_string()))
    }
}

impl TryFrom<String> for RuleId {
    type Error = MendError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

// ---------------------------------------------------------------------------
// RuleSet
// ---------------------------------------------------------------------------

/// The subset of rules enabled for a run.
///
/// Selection never changes application order; rules always run in
/// [`RuleId`] declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    enabled: BTreeSet<RuleId>,
}

impl RuleSet {
    pub fn all() -> Self {
        Self {
            enabled: RuleId::ALL.into_iter().collect(),
        }
    }

    pub fn none() -> Self {
        Self {
            enabled: BTreeSet::new(),
        }
    }

    pub fn only(ids: impl IntoIterator<Item = RuleId>) -> Self {
        Self {
            enabled: ids.into_iter().collect(),
        }
    }

    /// All rules except `ids`.
    pub fn without(ids: impl IntoIterator<Item = RuleId>) -> Self {
        let mut set = Self::all();
        for id in ids {
            set.enabled.remove(&id);
        }
        set
    }

    pub fn contains(&self, id: RuleId) -> bool {
        self.enabled.contains(&id)
    }

    pub fn enable(&mut self, id: RuleId) {
        self.enabled.insert(id);
    }

    pub fn disable(&mut self, id: RuleId) {
        self.enabled.remove(&id);
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }

    /// Enabled rules in application order.
    pub fn iter(&self) -> impl Iterator<Item = RuleId> + '_ {
        self.enabled.iter().copied()
    }

    /// Parse a comma separated list such as `MD013,md026,line-length`.
    pub fn parse_list(list: &str) -> Result<Vec<RuleId>> {
        list.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::all()
    }
}

// ---------------------------------------------------------------------------
// FixConfig
// ---------------------------------------------------------------------------

pub const DEFAULT_MAX_LINE_LENGTH: usize = 120;
pub const DEFAULT_BREAK_FRACTION: f64 = 0.8;
pub const DEFAULT_URL_LENGTH_FACTOR: f64 = 1.5;
pub const DEFAULT_MAX_PASSES: usize = 8;

/// Knobs for the rule pipeline. Every field has a default, so a settings file
/// only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FixConfig {
    /// Lines longer than this many characters are rewrapped.
    pub max_line_length: usize,
    /// A break candidate must lie beyond this fraction of `max_line_length`.
    pub break_fraction: f64,
    /// Lines containing a URL are left alone while shorter than
    /// `url_length_factor * max_line_length`.
    pub url_length_factor: f64,
    /// Upper bound on single passes the fixed-point loop may run.
    pub max_passes: usize,
    pub disabled_rules: Vec<RuleId>,
}

impl Default for FixConfig {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            break_fraction: DEFAULT_BREAK_FRACTION,
            url_length_factor: DEFAULT_URL_LENGTH_FACTOR,
            max_passes: DEFAULT_MAX_PASSES,
            disabled_rules: Vec::new(),
        }
    }
}

impl FixConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_line_length == 0 {
            return Err(MendError::Settings("max_line_length must be greater than 0".into()));
        }
        if !(self.break_fraction > 0.0 && self.break_fraction < 1.0) {
            return Err(MendError::Settings(format!(
                "break_fraction must be between 0 and 1 (exclusive), got {}",
                self.break_fraction
            )));
        }
        if self.url_length_factor < 1.0 {
            return Err(MendError::Settings(format!(
                "url_length_factor must be at least 1.0, got {}",
                self.url_length_factor
            )));
        }
        if self.max_passes == 0 {
            return Err(MendError::Settings("max_passes must be greater than 0".into()));
        }
        Ok(())
    }

    /// All rules minus `disabled_rules`.
    pub fn rule_set(&self) -> RuleSet {
        RuleSet::without(self.disabled_rules.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_parse_case_insensitively() {
        assert_eq!("md013".parse::<RuleId>().unwrap(), RuleId::LineLength);
        assert_eq!("MD047".parse::<RuleId>().unwrap(), RuleId::TrailingNewline);
        assert_eq!(" line-length ".parse::<RuleId>().unwrap(), RuleId::LineLength);
    }

    #[test]
    fn unknown_code_is_rejected() {
        let err = "MD999".parse::<RuleId>().unwrap_err();
        assert!(matches!(err, MendError::UnknownRule(ref id) if id == "MD999"));
    }

    #[test]
    fn every_rule_has_distinct_code() {
        let codes: BTreeSet<_> = RuleId::ALL.iter().map(|id| id.code()).collect();
        assert_eq!(codes.len(), RuleId::ALL.len());
    }

    #[test]
    fn rule_set_iterates_in_application_order() {
        let set = RuleSet::only([RuleId::TrailingNewline, RuleId::TrailingWhitespace, RuleId::LineLength]);
        let order: Vec<_> = set.iter().collect();
        assert_eq!(
            order,
            vec![RuleId::TrailingWhitespace, RuleId::LineLength, RuleId::TrailingNewline]
        );
    }

    #[test]
    fn rule_set_without_removes_only_named() {
        let set = RuleSet::without([RuleId::LineLength]);
        assert!(!set.contains(RuleId::LineLength));
        assert!(set.contains(RuleId::EmptyLink));
        assert_eq!(set.iter().count(), RuleId::ALL.len() - 1);
    }

    #[test]
    fn parse_list_skips_empty_segments() {
        let ids = RuleSet::parse_list("MD042, ,md026,").unwrap();
        assert_eq!(ids, vec![RuleId::EmptyLink, RuleId::HeadingPunctuation]);
        assert!(RuleSet::parse_list("MD042,nope").is_err());
    }

    #[test]
    fn config_defaults_from_empty_json() {
        let cfg: FixConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, FixConfig::default());
        assert_eq!(cfg.max_line_length, 120);
        cfg.validate().unwrap();
    }

    #[test]
    fn config_reads_disabled_rules() {
        let cfg: FixConfig =
            serde_json::from_str(r#"{"max_line_length": 80, "disabled_rules": ["MD013", "md024"]}"#).unwrap();
        assert_eq!(cfg.max_line_length, 80);
        let set = cfg.rule_set();
        assert!(!set.contains(RuleId::LineLength));
        assert!(!set.contains(RuleId::DuplicateHeading));
        assert!(set.contains(RuleId::EmptyLink));
    }

    #[test]
    fn config_rejects_unknown_rule() {
        let result = serde_json::from_str::<FixConfig>(r#"{"disabled_rules": ["MD000"]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let zero = FixConfig {
            max_line_length: 0,
            ..FixConfig::default()
        };
        assert!(zero.validate().is_err());

        let fraction = FixConfig {
            break_fraction: 1.0,
            ..FixConfig::default()
        };
        assert!(fraction.validate().is_err());

        let passes = FixConfig {
            max_passes: 0,
            ..FixConfig::default()
        };
        assert!(passes.validate().is_err());
    }
}
