//! Markdown rewrite pipeline.
//!
//! This crate rewrites Markdown so it satisfies a fixed set of markdownlint
//! rules: line classification with fence tracking, line-local fixes, long-line
//! rewrapping, blank-line structure, and end-of-file normalization, all run to
//! a fixed point. It also expands PowerShell aliases in scripts.

pub mod classify;
pub mod config;
pub mod diagnostics;
pub mod pipeline;
pub mod powershell;
pub mod rules;
pub mod structure;
pub mod wrap;

pub use classify::{classify_lines, FenceRole, FenceTracker, LineKind};
pub use config::{FixConfig, RuleId, RuleSet, DEFAULT_MAX_LINE_LENGTH, DEFAULT_MAX_PASSES};
pub use diagnostics::Diagnostic;
pub use pipeline::{Fix, Pipeline, RewriteResult};
pub use powershell::expand_powershell_aliases;
pub use rules::{Action, DocState, LineRule};
pub use wrap::{wrap_line, WrapPolicy};
