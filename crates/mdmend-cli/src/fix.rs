//! The fix driver: rewrite (or check) each discovered file.

use std::fs;
use std::path::Path;

use mdmend_rules::{expand_powershell_aliases, Diagnostic, Pipeline, RewriteResult};
use mdmend_types::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixMode {
    /// Write changed files back.
    Write,
    /// Report what would change; touch nothing.
    Check,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Fixed { fixes: usize },
    WouldChange { diagnostics: Vec<Diagnostic> },
    Unchanged,
    Failed(String),
}

/// Run counters, returned by [`fix_files`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FixSummary {
    pub processed: usize,
    /// Files rewritten, or in check mode files that would be.
    pub fixed: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl FixSummary {
    fn record(&mut self, outcome: &FileOutcome) {
        self.processed += 1;
        match outcome {
            FileOutcome::Fixed { .. } | FileOutcome::WouldChange { .. } => self.fixed += 1,
            FileOutcome::Unchanged => self.unchanged += 1,
            FileOutcome::Failed(_) => self.failed += 1,
        }
    }
}

fn is_powershell(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ps1"))
}

/// Rewrite one file. PowerShell scripts get alias expansion; everything else
/// goes through the Markdown pipeline.
pub fn fix_file(path: &Path, pipeline: &Pipeline, mode: FixMode) -> Result<FileOutcome> {
    let text = fs::read_to_string(path)?;
    let powershell = is_powershell(path);
    let result: RewriteResult = if powershell {
        expand_powershell_aliases(&text)
    } else {
        pipeline.apply(&text)
    };

    if !result.changed {
        return Ok(FileOutcome::Unchanged);
    }
    match mode {
        FixMode::Write => {
            fs::write(path, &result.text)?;
            tracing::debug!(path = %path.display(), fixes = result.fixes.len(), passes = result.passes, "Rewrote file");
            Ok(FileOutcome::Fixed {
                fixes: result.fixes.len(),
            })
        }
        FixMode::Check => {
            let diagnostics = if powershell { Vec::new() } else { pipeline.diagnose(&text) };
            Ok(FileOutcome::WouldChange { diagnostics })
        }
    }
}

/// Process every file, reporting each outcome to `on_file`. A file that
/// cannot be read or written is counted as failed and the run goes on.
pub fn fix_files(
    files: &[impl AsRef<Path>],
    pipeline: &Pipeline,
    mode: FixMode,
    mut on_file: impl FnMut(&Path, &FileOutcome),
) -> FixSummary {
    let mut summary = FixSummary::default();
    for path in files {
        let path = path.as_ref();
        let outcome = fix_file(path, pipeline, mode).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Could not process file");
            FileOutcome::Failed(e.to_string())
        });
        on_file(path, &outcome);
        summary.record(&outcome);
    }
    summary
}
