//! Built-in probe kinds.

use std::path::PathBuf;
use std::process::Command;

use mdmend_types::{MendError, Result};

use crate::probe::{Probe, Verdict};
use crate::store::{McpConfig, ServerEntry};

// ---------------------------------------------------------------------------
// ServerProbe
// ---------------------------------------------------------------------------

/// Which part of a server entry to surface as an info line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detail {
    None,
    Url,
    Command,
    EnvVar {
        label: &'static str,
        key: &'static str,
        default: &'static str,
    },
    Arg {
        label: &'static str,
        index: usize,
        default: &'static str,
    },
}

impl Detail {
    fn render(&self, entry: &ServerEntry) -> Option<String> {
        match self {
            Detail::None => None,
            Detail::Url => Some(format!("URL: {}", entry.url.as_deref().unwrap_or("(none)"))),
            Detail::Command => Some(format!("Command: {}", entry.command_line())),
            Detail::EnvVar { label, key, default } => {
                Some(format!("{label}: {}", entry.env_value(key).unwrap_or(*default)))
            }
            Detail::Arg { label, index, default } => Some(format!(
                "{label}: {}",
                entry.args.get(*index).map(String::as_str).unwrap_or(*default)
            )),
        }
    }
}

/// A step the store cannot record, such as installing a browser extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualStep {
    pub label: String,
    pub note: String,
    pub hint: Option<String>,
}

/// Checks that a server entry exists and is complete.
#[derive(Debug, Clone)]
pub struct ServerProbe {
    name: String,
    key: String,
    ok_note: String,
    detail: Detail,
    required_env: Option<String>,
    manual_step: Option<ManualStep>,
}

impl ServerProbe {
    pub fn new(name: impl Into<String>, key: impl Into<String>, ok_note: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            ok_note: ok_note.into(),
            detail: Detail::None,
            required_env: None,
            manual_step: None,
        }
    }

    pub fn detail(mut self, detail: Detail) -> Self {
        self.detail = detail;
        self
    }

    /// The entry only counts as complete once this env var holds a value.
    pub fn require_env(mut self, key: impl Into<String>) -> Self {
        self.required_env = Some(key.into());
        self
    }

    pub fn manual_step(mut self, step: ManualStep) -> Self {
        self.manual_step = Some(step);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn fail(&self, message: String) -> MendError {
        MendError::ProbeFailed {
            probe: self.name.clone(),
            message,
        }
    }
}

impl Probe for ServerProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, config: &McpConfig) -> Result<Verdict> {
        let entry = match config.server(&self.key) {
            Ok(Some(entry)) => entry,
            Ok(None) => return Err(self.fail(format!("{} MCP not configured", self.name))),
            Err(e) => return Err(self.fail(format!("{} MCP entry is malformed: {e}", self.name))),
        };
        let details = self.detail.render(&entry);

        if let Some(var) = &self.required_env {
            if entry.env_value(var).is_none() {
                return Ok(Verdict::attention("Needs Token", format!("Configure {var}")).with_details(details));
            }
        }

        if let Some(step) = &self.manual_step {
            return Ok(Verdict::attention(step.label.clone(), step.note.clone())
                .with_details(details)
                .with_details(step.hint.clone()));
        }

        Ok(Verdict::ok(self.ok_note.clone()).with_details(details))
    }
}

// ---------------------------------------------------------------------------
// CommandProbe
// ---------------------------------------------------------------------------

/// One local command and the info line reported when it succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandCheck {
    pub program: String,
    pub args: Vec<String>,
    pub success_detail: String,
}

impl CommandCheck {
    pub fn new(argv: &[&str], success_detail: impl Into<String>) -> Self {
        let (program, args) = argv.split_first().map_or(("", &[][..]), |(p, a)| (*p, a));
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            success_detail: success_detail.into(),
        }
    }

    fn display(&self) -> String {
        let mut parts = vec![self.program.as_str()];
        parts.extend(self.args.iter().map(String::as_str));
        parts.join(" ")
    }
}

/// Runs local commands in order; the first that cannot start or exits
/// non-zero fails the probe.
#[derive(Debug, Clone)]
pub struct CommandProbe {
    name: String,
    ok_note: String,
    checks: Vec<CommandCheck>,
    workdir: Option<PathBuf>,
}

impl CommandProbe {
    pub fn new(name: impl Into<String>, ok_note: impl Into<String>, checks: Vec<CommandCheck>) -> Self {
        Self {
            name: name.into(),
            ok_note: ok_note.into(),
            checks,
            workdir: None,
        }
    }

    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    fn fail(&self, message: String) -> MendError {
        MendError::ProbeFailed {
            probe: self.name.clone(),
            message,
        }
    }
}

impl Probe for CommandProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, _config: &McpConfig) -> Result<Verdict> {
        let mut details = Vec::with_capacity(self.checks.len());
        for check in &self.checks {
            let mut cmd = Command::new(&check.program);
            cmd.args(&check.args);
            if let Some(dir) = &self.workdir {
                cmd.current_dir(dir);
            }
            tracing::debug!(probe = %self.name, command = %check.display(), "Running command");
            let output = cmd
                .output()
                .map_err(|e| self.fail(format!("`{}` could not start: {e}", check.display())))?;
            if !output.status.success() {
                let stderr = String::from_utf8_lossy(&output.stderr);
                let reason = stderr.lines().next().unwrap_or("").trim();
                let message = if reason.is_empty() {
                    format!("`{}` exited with {}", check.display(), output.status)
                } else {
                    format!("`{}` exited with {}: {reason}", check.display(), output.status)
                };
                return Err(self.fail(message));
            }
            details.push(check.success_detail.clone());
        }
        Ok(Verdict::ok(self.ok_note.clone()).with_details(details))
    }
}

// ---------------------------------------------------------------------------
// StaticProbe
// ---------------------------------------------------------------------------

/// An integration supplied by the host editor; nothing to look up.
#[derive(Debug, Clone)]
pub struct StaticProbe {
    name: String,
    note: String,
    details: Vec<String>,
}

impl StaticProbe {
    pub fn new(name: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            note: note.into(),
            details: Vec::new(),
        }
    }

    pub fn detail(mut self, line: impl Into<String>) -> Self {
        self.details.push(line.into());
        self
    }
}

impl Probe for StaticProbe {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, _config: &McpConfig) -> Result<Verdict> {
        Ok(Verdict::ok(self.note.clone()).with_details(self.details.clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::probe::ProbeStatus;

    fn config(json: &str) -> McpConfig {
        McpConfig::parse(json, Path::new("mcp.json")).unwrap()
    }

    #[test]
    fn absent_server_is_an_error() {
        let probe = ServerProbe::new("Memory", "memory", "Session memory configured");
        let err = probe.check(&config("{}")).unwrap_err();
        assert!(matches!(err, MendError::ProbeFailed { ref message, .. } if message == "Memory MCP not configured"));
    }

    #[test]
    fn malformed_entry_fails_with_its_reason() {
        let probe = ServerProbe::new("GitHub", "github", "ready");
        let err = probe
            .check(&config(r#"{"mcpServers": {"github": {"env": {"PORT": 3000}}}}"#))
            .unwrap_err();
        let MendError::ProbeFailed { message, .. } = err else {
            panic!("expected a probe failure");
        };
        assert!(message.starts_with("GitHub MCP entry is malformed"), "{message}");
        assert!(message.contains("expected a string"), "{message}");
    }

    #[test]
    fn present_server_is_ok_with_detail() {
        let probe = ServerProbe::new("Memory", "memory", "Session memory configured").detail(Detail::Command);
        let verdict = probe
            .check(&config(r#"{"mcpServers": {"memory": {"command": "npx", "args": ["-y", "mem"]}}}"#))
            .unwrap();
        assert_eq!(verdict.status, ProbeStatus::Ok);
        assert_eq!(verdict.note, "Session memory configured");
        assert_eq!(verdict.details, vec!["Command: npx -y mem".to_string()]);
    }

    #[test]
    fn missing_required_env_needs_attention() {
        let probe = ServerProbe::new("GitHub", "github", "ready").require_env("TOKEN");
        let empty = probe
            .check(&config(r#"{"mcpServers": {"github": {"env": {"TOKEN": ""}}}}"#))
            .unwrap();
        assert_eq!(empty.status, ProbeStatus::Attention);
        assert_eq!(empty.note, "Configure TOKEN");

        let filled = probe
            .check(&config(r#"{"mcpServers": {"github": {"env": {"TOKEN": "ghp_x"}}}}"#))
            .unwrap();
        assert_eq!(filled.status, ProbeStatus::Ok);
    }

    #[test]
    fn manual_step_needs_attention() {
        let probe = ServerProbe::new("Kapture", "kapture", "ready")
            .detail(Detail::EnvVar {
                label: "Browser",
                key: "BROWSER",
                default: "chrome",
            })
            .manual_step(ManualStep {
                label: "Extension Required".into(),
                note: "Configured but needs browser extension".into(),
                hint: Some("Install the browser extension".into()),
            });
        let verdict = probe.check(&config(r#"{"mcpServers": {"kapture": {}}}"#)).unwrap();
        assert_eq!(verdict.status, ProbeStatus::Attention);
        assert_eq!(verdict.label, "Extension Required");
        assert_eq!(
            verdict.details,
            vec!["Browser: chrome".to_string(), "Install the browser extension".to_string()]
        );
    }

    #[test]
    fn arg_detail_falls_back_to_default() {
        let probe = ServerProbe::new("Filesystem", "filesystem", "ok").detail(Detail::Arg {
            label: "Path",
            index: 1,
            default: "current directory",
        });
        let verdict = probe
            .check(&config(r#"{"mcpServers": {"filesystem": {"args": ["-y"]}}}"#))
            .unwrap();
        assert_eq!(verdict.details, vec!["Path: current directory".to_string()]);
    }

    #[test]
    fn command_that_cannot_start_fails() {
        let probe = CommandProbe::new(
            "Ghost",
            "never",
            vec![CommandCheck::new(&["mdmend-no-such-program-xyz"], "started")],
        );
        let err = probe.check(&McpConfig::default()).unwrap_err();
        assert!(err.to_string().contains("could not start"));
    }

    #[test]
    fn static_probe_is_always_ok() {
        let verdict = StaticProbe::new("GitKraken", "Enhanced Git operations")
            .detail("Provided by the editor")
            .check(&McpConfig::default())
            .unwrap();
        assert_eq!(verdict.status, ProbeStatus::Ok);
        assert_eq!(verdict.details.len(), 1);
    }
}
