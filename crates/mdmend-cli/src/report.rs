//! Output formatting for fix runs and health reports.
//!
//! Every function returns a `String`; callers decide where it goes.

use std::io::IsTerminal;

use mdmend_probe::{HealthOutcome, HealthReport, HealthSummary, ProbeResult, ProbeStatus};
use mdmend_rules::Diagnostic;
use owo_colors::OwoColorize;

use crate::fix::{FileOutcome, FixMode, FixSummary};

/// Whether report lines are colored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportStyle {
    pub color: bool,
}

impl ReportStyle {
    pub fn plain() -> Self {
        Self { color: false }
    }

    /// Color unless disabled by flag or `NO_COLOR`, or stdout is not a terminal.
    pub fn detect(no_color_flag: bool) -> Self {
        let no_color_env = std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty());
        if no_color_flag || no_color_env {
            return Self::plain();
        }
        Self {
            color: std::io::stdout().is_terminal(),
        }
    }

    fn green(&self, s: &str) -> String {
        if self.color {
            s.green().to_string()
        } else {
            s.to_string()
        }
    }

    fn red(&self, s: &str) -> String {
        if self.color {
            s.red().to_string()
        } else {
            s.to_string()
        }
    }

    fn yellow(&self, s: &str) -> String {
        if self.color {
            s.yellow().to_string()
        } else {
            s.to_string()
        }
    }

    fn blue(&self, s: &str) -> String {
        if self.color {
            s.blue().to_string()
        } else {
            s.to_string()
        }
    }

    fn heading(&self, s: &str) -> String {
        if self.color {
            s.bold().blue().to_string()
        } else {
            s.to_string()
        }
    }
}

// ---------------------------------------------------------------------------
// Generic lines
// ---------------------------------------------------------------------------

pub fn success(style: &ReportStyle, msg: &str) -> String {
    style.green(&format!("✅ {msg}"))
}

pub fn failure(style: &ReportStyle, msg: &str) -> String {
    style.red(&format!("❌ {msg}"))
}

pub fn warning(style: &ReportStyle, msg: &str) -> String {
    style.yellow(&format!("⚠️  {msg}"))
}

pub fn info(style: &ReportStyle, msg: &str) -> String {
    style.blue(&format!("ℹ️  {msg}"))
}

/// A blank line, the title, and an `=` underline of the same width.
pub fn header(style: &ReportStyle, title: &str) -> String {
    format!("\n{}\n{}", style.heading(title), "=".repeat(title.chars().count()))
}

// ---------------------------------------------------------------------------
// Fix runs
// ---------------------------------------------------------------------------

pub fn file_line(style: &ReportStyle, path: &str, outcome: &FileOutcome) -> String {
    match outcome {
        FileOutcome::Fixed { fixes } => success(style, &format!("Fixed: {path} ({fixes} fixes)")),
        FileOutcome::WouldChange { diagnostics } => {
            warning(style, &format!("Would fix: {path} ({} issues)", diagnostics.len()))
        }
        FileOutcome::Unchanged => info(style, &format!("No issues: {path}")),
        FileOutcome::Failed(message) => failure(style, &format!("Error: {path}: {message}")),
    }
}

pub fn diagnostic_line(path: &str, diagnostic: &Diagnostic) -> String {
    format!("   {path}:{diagnostic}")
}

pub fn fix_summary(style: &ReportStyle, summary: &FixSummary, mode: FixMode) -> String {
    let changed_label = match mode {
        FixMode::Write => "Files fixed",
        FixMode::Check => "Files needing fixes",
    };
    let mut lines = vec![
        header(style, "Summary"),
        info(style, &format!("Files processed: {}", summary.processed)),
        info(style, &format!("{changed_label}: {}", summary.fixed)),
        info(style, &format!("Files unchanged: {}", summary.unchanged)),
    ];
    if summary.failed > 0 {
        lines.push(failure(style, &format!("Files failed: {}", summary.failed)));
    }
    lines.push(match (mode, summary.fixed) {
        (_, 0) if summary.failed == 0 => success(style, "All files are clean"),
        (FixMode::Write, n) if n > 0 => success(style, "Markdown lint issues fixed"),
        (FixMode::Check, n) if n > 0 => warning(style, "Run `mdmend fix` to apply fixes"),
        _ => warning(style, "Some files could not be processed"),
    });
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Health reports
// ---------------------------------------------------------------------------

pub fn probe_line(style: &ReportStyle, result: &ProbeResult) -> String {
    let msg = format!("{}: {}", result.name, result.note);
    match result.status {
        ProbeStatus::Ok => success(style, &msg),
        ProbeStatus::Attention => warning(style, &msg),
        ProbeStatus::Failed => failure(style, &msg),
    }
}

/// The results as a Markdown table, one row per probe in run order.
pub fn health_table(report: &HealthReport) -> String {
    let mut out = String::from("| Server | Status | Notes |\n|--------|--------|-------|");
    for result in &report.results {
        out.push_str(&format!("\n| {} | {} | {} |", result.name, result.status_cell(), result.note));
    }
    out
}

pub fn health_summary(style: &ReportStyle, summary: &HealthSummary) -> String {
    let verdict = match summary.outcome {
        HealthOutcome::AllHealthy => success(style, "All MCP servers are working! 🎉"),
        HealthOutcome::Degraded => warning(style, &format!("{} servers need attention", summary.needs_attention())),
        HealthOutcome::NoneHealthy => failure(style, "No MCP servers are working!"),
    };
    [
        header(style, "Summary"),
        info(style, &format!("Working: {}/{} servers", summary.working, summary.total)),
        verdict,
    ]
    .join("\n")
}
