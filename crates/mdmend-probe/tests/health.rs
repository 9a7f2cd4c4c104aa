//! Health checks against configuration stores on disk.

use std::fs;
use std::path::{Path, PathBuf};

use mdmend_probe::{
    default_registry_in, inject_token, McpConfig, ProbeRegistry, ProbeStatus, ServerProbe, GITHUB_SERVER,
    GITHUB_TOKEN_ENV,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const GITHUB_WITHOUT_TOKEN_AND_MEMORY: &str = r#"{
  "mcpServers": {
    "github": {
      "command": "npx",
      "args": ["-y", "@modelcontextprotocol/server-github"],
      "env": {}
    },
    "memory": {
      "command": "npx",
      "args": ["-y", "@modelcontextprotocol/server-memory"]
    }
  }
}"#;

fn write_store(dir: &tempfile::TempDir, text: &str) -> PathBuf {
    let path = dir.path().join("mcp.json");
    fs::write(&path, text).unwrap();
    path
}

// ---------------------------------------------------------------------------
// Probe isolation
// ---------------------------------------------------------------------------

#[test]
fn missing_token_does_not_stop_later_probes() {
    let config = McpConfig::parse(GITHUB_WITHOUT_TOKEN_AND_MEMORY, Path::new("mcp.json")).unwrap();
    let mut registry = ProbeRegistry::new();
    registry
        .register(ServerProbe::new("github", GITHUB_SERVER, "ready").require_env(GITHUB_TOKEN_ENV))
        .register(ServerProbe::new("memory", "memory", "ready"))
        .register(ServerProbe::new("filesystem", "filesystem", "ready"));

    let report = registry.run_all(&config);
    let rows: Vec<_> = report.results.iter().map(|r| (r.name.as_str(), r.status)).collect();
    assert_eq!(
        rows,
        vec![
            ("github", ProbeStatus::Attention),
            ("memory", ProbeStatus::Ok),
            ("filesystem", ProbeStatus::Failed),
        ]
    );
}

#[test]
fn malformed_entry_fails_only_its_own_check() {
    let dir = tempfile::tempdir().unwrap();
    let store = r#"{
  "mcpServers": {
    "github": { "command": "npx", "env": { "GITHUB_PERSONAL_ACCESS_TOKEN": 42 } },
    "memory": { "command": "npx", "args": ["-y", "@modelcontextprotocol/server-memory"] },
    "filesystem": { "command": "npx", "args": ["-y", "/work"] }
  }
}"#;
    let config = McpConfig::load(&write_store(&dir, store)).unwrap();

    let report = default_registry_in(dir.path()).run_all(&config);
    assert_eq!(report.results.len(), 8);
    let github = report.get("GitHub").unwrap();
    assert_eq!(github.status, ProbeStatus::Failed);
    assert!(github.note.starts_with("GitHub MCP entry is malformed"), "{}", github.note);
    assert_eq!(report.get("Memory").unwrap().status, ProbeStatus::Ok);
    assert_eq!(report.get("Filesystem").unwrap().status, ProbeStatus::Ok);
}

#[test]
fn default_registry_reports_every_probe() {
    let dir = tempfile::tempdir().unwrap();
    let config = McpConfig::load(&write_store(&dir, GITHUB_WITHOUT_TOKEN_AND_MEMORY)).unwrap();

    let report = default_registry_in(dir.path()).run_all(&config);
    assert_eq!(report.results.len(), 8);

    let github = report.get("GitHub").unwrap();
    assert_eq!(github.status, ProbeStatus::Attention);
    assert_eq!(github.note, "Configure GITHUB_PERSONAL_ACCESS_TOKEN");
    assert_eq!(report.get("Memory").unwrap().status, ProbeStatus::Ok);
    assert_eq!(report.get("GitKraken").unwrap().status, ProbeStatus::Ok);

    let byterover = report.get("ByteRover").unwrap();
    assert_eq!(byterover.status, ProbeStatus::Failed);
    assert_eq!(byterover.note, "ByteRover MCP not configured");

    let summary = report.summary();
    assert!(summary.working >= 2 && summary.working < summary.total);
}

// ---------------------------------------------------------------------------
// Token injection followed by a health check
// ---------------------------------------------------------------------------

#[test]
fn injected_token_turns_github_ok() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_store(&dir, GITHUB_WITHOUT_TOKEN_AND_MEMORY);
    inject_token(&path, GITHUB_SERVER, GITHUB_TOKEN_ENV, "ghp_0123456789abcdefghij").unwrap();

    let config = McpConfig::load(&path).unwrap();
    let report = default_registry_in(dir.path()).run_all(&config);
    assert_eq!(report.get("GitHub").unwrap().status, ProbeStatus::Ok);
}
