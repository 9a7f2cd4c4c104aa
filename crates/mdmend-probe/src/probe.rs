//! Probe trait and the values a probe run produces.

use std::fmt;

use mdmend_types::Result;
use serde::Serialize;

use crate::store::McpConfig;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    /// Present and complete.
    Ok,
    /// Present but missing something a person has to supply.
    Attention,
    /// Absent, or the check itself failed.
    Failed,
}

impl ProbeStatus {
    pub fn icon(self) -> &'static str {
        match self {
            ProbeStatus::Ok => "✅",
            ProbeStatus::Attention => "⚠️",
            ProbeStatus::Failed => "❌",
        }
    }

    pub fn is_ok(self) -> bool {
        self == ProbeStatus::Ok
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProbeStatus::Ok => "ok",
            ProbeStatus::Attention => "attention",
            ProbeStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Verdict
// ---------------------------------------------------------------------------

/// What a successful check concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub status: ProbeStatus,
    /// Short status text for the report table, e.g. `Needs Token`.
    pub label: String,
    pub note: String,
    /// Informational lines gathered while checking.
    pub details: Vec<String>,
}

impl Verdict {
    pub fn ok(note: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Ok,
            label: "Working".into(),
            note: note.into(),
            details: Vec::new(),
        }
    }

    pub fn attention(label: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            status: ProbeStatus::Attention,
            label: label.into(),
            note: note.into(),
            details: Vec::new(),
        }
    }

    pub fn with_detail(mut self, line: impl Into<String>) -> Self {
        self.details.push(line.into());
        self
    }

    pub fn with_details(mut self, lines: impl IntoIterator<Item = String>) -> Self {
        self.details.extend(lines);
        self
    }
}

// ---------------------------------------------------------------------------
// ProbeResult
// ---------------------------------------------------------------------------

/// One row of a health report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub name: String,
    pub status: ProbeStatus,
    pub label: String,
    pub note: String,
}

impl ProbeResult {
    pub fn from_verdict(name: &str, verdict: &Verdict) -> Self {
        Self {
            name: name.to_string(),
            status: verdict.status,
            label: verdict.label.clone(),
            note: verdict.note.clone(),
        }
    }

    pub fn failed(name: &str, note: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            status: ProbeStatus::Failed,
            label: "Failed".into(),
            note: note.into(),
        }
    }

    /// Status cell for the report table, e.g. `⚠️ Needs Token`.
    pub fn status_cell(&self) -> String {
        format!("{} {}", self.status.icon(), self.label)
    }
}

// ---------------------------------------------------------------------------
// Probe trait
// ---------------------------------------------------------------------------

/// A single named health check over the configuration store.
///
/// Returning `Err` is the normal way to report a failed check; the registry
/// records it as [`ProbeStatus::Failed`] and moves on.
pub trait Probe: Send + Sync {
    fn name(&self) -> &str;

    fn check(&self, config: &McpConfig) -> Result<Verdict>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ProbeStatus::Attention).unwrap(), "\"attention\"");
        assert_eq!(ProbeStatus::Failed.to_string(), "failed");
    }

    #[test]
    fn verdict_builders() {
        let v = Verdict::attention("Needs Token", "Configure TOKEN").with_detail("URL: x");
        assert_eq!(v.status, ProbeStatus::Attention);
        assert_eq!(v.details, vec!["URL: x".to_string()]);
        assert_eq!(Verdict::ok("ready").label, "Working");
    }

    #[test]
    fn status_cell_combines_icon_and_label() {
        let result = ProbeResult::from_verdict("GitHub", &Verdict::attention("Needs Token", "n"));
        assert_eq!(result.status_cell(), "⚠️ Needs Token");
        assert_eq!(ProbeResult::failed("Git", "boom").status_cell(), "❌ Failed");
    }
}
