//! Probe registry, the default probe set, and health reports.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use mdmend_types::MendError;
use serde::Serialize;

use crate::probe::{Probe, ProbeResult, ProbeStatus};
use crate::probes::{CommandCheck, CommandProbe, Detail, ManualStep, ServerProbe, StaticProbe};
use crate::store::{McpConfig, GITHUB_SERVER, GITHUB_TOKEN_ENV};

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Progress notifications emitted while probes run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeEvent<'a> {
    Started { name: &'a str },
    Detail { name: &'a str, line: &'a str },
    Finished { result: &'a ProbeResult },
}

// ---------------------------------------------------------------------------
// ProbeRegistry
// ---------------------------------------------------------------------------

/// An ordered set of probes. Results come back in registration order.
#[derive(Default)]
pub struct ProbeRegistry {
    probes: Vec<Box<dyn Probe>>,
}

impl ProbeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, probe: impl Probe + 'static) -> &mut Self {
        self.probes.push(Box::new(probe));
        self
    }

    pub fn len(&self) -> usize {
        self.probes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.probes.iter().map(|p| p.name())
    }

    pub fn run_all(&self, config: &McpConfig) -> HealthReport {
        self.run_all_with(config, |_| {})
    }

    /// Run every probe, reporting progress to `observer`. A probe that errors
    /// or panics is recorded as failed; the rest still run.
    pub fn run_all_with(&self, config: &McpConfig, mut observer: impl FnMut(ProbeEvent<'_>)) -> HealthReport {
        let mut results = Vec::with_capacity(self.probes.len());
        for probe in &self.probes {
            let name = probe.name();
            observer(ProbeEvent::Started { name });

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| probe.check(config)));
            let result = match outcome {
                Ok(Ok(verdict)) => {
                    for line in &verdict.details {
                        tracing::debug!(probe = name, "{line}");
                        observer(ProbeEvent::Detail { name, line });
                    }
                    ProbeResult::from_verdict(name, &verdict)
                }
                Ok(Err(err)) => ProbeResult::failed(name, failure_note(err)),
                Err(payload) => ProbeResult::failed(name, panic_note(payload.as_ref())),
            };

            match result.status {
                ProbeStatus::Ok => tracing::debug!(probe = name, "Probe passed"),
                ProbeStatus::Attention => tracing::warn!(probe = name, note = %result.note, "Probe needs attention"),
                ProbeStatus::Failed => tracing::warn!(probe = name, note = %result.note, "Probe failed"),
            }
            observer(ProbeEvent::Finished { result: &result });
            results.push(result);
        }
        HealthReport { results }
    }
}

fn failure_note(err: MendError) -> String {
    match err {
        MendError::ProbeFailed { message, .. } => message,
        other => other.to_string(),
    }
}

fn panic_note(payload: &(dyn Any + Send)) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("probe panicked: {message}")
}

// ---------------------------------------------------------------------------
// Default probe set
// ---------------------------------------------------------------------------

/// The standard development-environment probes, with commands run in the
/// current directory.
pub fn default_registry() -> ProbeRegistry {
    default_registry_in(Path::new("."))
}

/// The standard probes, with local commands run in `root`.
pub fn default_registry_in(root: &Path) -> ProbeRegistry {
    let mut registry = ProbeRegistry::new();
    registry
        .register(
            ServerProbe::new("ByteRover", "byterover-mcp", "Knowledge management configured and ready")
                .detail(Detail::Url),
        )
        .register(
            CommandProbe::new(
                "Git",
                "Git operations available",
                vec![
                    CommandCheck::new(&["git", "--version"], "Git is available"),
                    CommandCheck::new(&["git", "status"], "Git repository detected"),
                ],
            )
            .in_dir(root),
        )
        .register(
            ServerProbe::new("Task Master", "task-master-ai", "Task management configured").detail(Detail::Command),
        )
        .register(
            ServerProbe::new("Kapture", "kapture", "Browser automation configured")
                .detail(Detail::EnvVar {
                    label: "Browser",
                    key: "BROWSER",
                    default: "chrome",
                })
                .manual_step(ManualStep {
                    label: "Extension Required".into(),
                    note: "Configured but needs browser extension".into(),
                    hint: Some("Install: https://chrome.google.com/webstore/detail/kapture".into()),
                }),
        )
        .register(
            StaticProbe::new("GitKraken", "Enhanced Git operations with 19 tools")
                .detail("Provided by the editor: 19 tools, 1 prompt"),
        )
        .register(ServerProbe::new("Memory", "memory", "Session memory configured").detail(Detail::Command))
        .register(
            ServerProbe::new("Filesystem", "filesystem", "File operations configured").detail(Detail::Arg {
                label: "Path",
                index: 1,
                default: "current directory",
            }),
        )
        .register(
            ServerProbe::new("GitHub", GITHUB_SERVER, "GitHub API integration ready").require_env(GITHUB_TOKEN_ENV),
        );
    registry
}

// ---------------------------------------------------------------------------
// HealthReport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthOutcome {
    AllHealthy,
    Degraded,
    NoneHealthy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthSummary {
    pub working: usize,
    pub total: usize,
    pub outcome: HealthOutcome,
}

impl HealthSummary {
    pub fn needs_attention(&self) -> usize {
        self.total - self.working
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub results: Vec<ProbeResult>,
}

impl HealthReport {
    pub fn summary(&self) -> HealthSummary {
        let total = self.results.len();
        let working = self.results.iter().filter(|r| r.status.is_ok()).count();
        let outcome = if working == total {
            HealthOutcome::AllHealthy
        } else if working > 0 {
            HealthOutcome::Degraded
        } else {
            HealthOutcome::NoneHealthy
        };
        HealthSummary { working, total, outcome }
    }

    pub fn get(&self, name: &str) -> Option<&ProbeResult> {
        self.results.iter().find(|r| r.name == name)
    }
}
