//! Access to the JSON configuration store (`.cursor/mcp.json`).
//!
//! Reads go through [`McpConfig`], which keeps each server entry as raw JSON
//! and converts it to a [`ServerEntry`] only when looked up, so one malformed
//! entry does not hide the others. Token injection edits the raw document,
//! so keys the typed view does not know about survive the rewrite in their
//! original order.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use mdmend_types::{MendError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

pub const DEFAULT_CONFIG_PATH: &str = ".cursor/mcp.json";
pub const GITHUB_SERVER: &str = "github";
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_PERSONAL_ACCESS_TOKEN";

// ---------------------------------------------------------------------------
// Typed view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct McpConfig {
    /// Server key -> entry as written in the store.
    #[serde(rename = "mcpServers", default)]
    pub servers: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServerEntry {
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl ServerEntry {
    /// The env value for `key`, treating an empty string as absent.
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str).filter(|v| !v.is_empty())
    }

    /// `command` followed by its arguments.
    pub fn command_line(&self) -> String {
        let mut parts: Vec<&str> = self.command.iter().map(String::as_str).collect();
        parts.extend(self.args.iter().map(String::as_str));
        parts.join(" ")
    }
}

impl McpConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = read_store(path)?;
        Self::parse(&text, path)
    }

    /// Parse store text; `path` only labels errors.
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| MendError::InvalidConfig {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// The entry under `key`, `Ok(None)` when absent. An entry whose fields
    /// have the wrong shape is an error for that entry alone.
    pub fn server(&self, key: &str) -> Result<Option<ServerEntry>> {
        self.servers
            .get(key)
            .map(ServerEntry::deserialize)
            .transpose()
            .map_err(MendError::from)
    }
}

fn read_store(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => MendError::ConfigNotFound {
            path: path.to_path_buf(),
        },
        _ => MendError::Io(e),
    })
}

// ---------------------------------------------------------------------------
// Token injection
// ---------------------------------------------------------------------------

/// Set `mcpServers.<server>.env.<env_key>` to `token` and write the store back
/// with two-space indentation and a trailing newline.
pub fn inject_token(path: &Path, server: &str, env_key: &str, token: &str) -> Result<()> {
    if token.is_empty() {
        return Err(MendError::MissingToken);
    }
    let text = read_store(path)?;
    let mut doc: Value = serde_json::from_str(&text).map_err(|e| invalid(path, e.to_string()))?;

    let entry = doc
        .get_mut("mcpServers")
        .and_then(Value::as_object_mut)
        .and_then(|servers| servers.get_mut(server))
        .and_then(Value::as_object_mut)
        .ok_or_else(|| MendError::ServerNotFound {
            server: server.to_string(),
        })?;

    let env = entry
        .entry("env")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| invalid(path, format!("mcpServers.{server}.env is not an object")))?;
    env.insert(env_key.to_string(), Value::String(token.to_string()));

    let mut out = serde_json::to_string_pretty(&doc)?;
    out.push('\n');
    fs::write(path, out)?;
    tracing::info!(path = %path.display(), server, env_key, "Token written to configuration");
    Ok(())
}

fn invalid(path: &Path, message: String) -> MendError {
    MendError::InvalidConfig {
        path: PathBuf::from(path),
        message,
    }
}

// ---------------------------------------------------------------------------
// Token helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenFormat {
    Recognized,
    Unrecognized,
}

/// GitHub personal access tokens start with `ghp_` or `github_pat_`.
pub fn check_token_format(token: &str) -> TokenFormat {
    if token.starts_with("ghp_") || token.starts_with("github_pat_") {
        TokenFormat::Recognized
    } else {
        TokenFormat::Unrecognized
    }
}

/// Shorten a token for display so it can be recognized but not reused.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() > 20 {
        let head: String = chars[..10].iter().collect();
        let tail: String = chars[chars.len() - 10..].iter().collect();
        format!("{head}...{tail}")
    } else {
        let head: String = chars.iter().take(4).collect();
        format!("{head}...")
    }
}
