//! Project settings: `.mdmend.json` at the project root, overridden by flags.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use mdmend_rules::{FixConfig, RuleId, RuleSet};
use mdmend_types::{MendError, Result};
use serde::Deserialize;

pub const SETTINGS_FILE: &str = ".mdmend.json";

/// Directory names skipped while discovering documents.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".cursor",
    ".taskmaster",
    ".kilo",
    ".kilocode",
    "target",
];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(flatten)]
    pub fix: FixConfig,
    /// Glob patterns matched against directory names.
    pub exclude_dirs: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fix: FixConfig::default(),
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

/// Flag values that take precedence over the settings file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub max_line_length: Option<usize>,
    pub only: Vec<RuleId>,
    pub disable: Vec<RuleId>,
}

impl Settings {
    /// Load from `explicit` if given (it must exist), else from
    /// `<root>/.mdmend.json` if present, else defaults.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let (path, required) = match explicit {
            Some(path) => (root.join(path), true),
            None => (root.join(SETTINGS_FILE), false),
        };
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound && !required => {
                tracing::debug!(path = %path.display(), "No settings file, using defaults");
                return Ok(Self::default());
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(MendError::Settings(format!("settings file {} not found", path.display())));
            }
            Err(e) => return Err(e.into()),
        };
        let settings = Self::parse(&text, &path)?;
        tracing::debug!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        let settings: Settings = serde_json::from_str(text)
            .map_err(|e| MendError::Settings(format!("{}: {e}", path.display())))?;
        settings.fix.validate()?;
        Ok(settings)
    }

    /// Apply flag overrides and return the resulting config and rule selection.
    pub fn resolve(mut self, overrides: &Overrides) -> Result<(FixConfig, RuleSet, Vec<String>)> {
        if let Some(max) = overrides.max_line_length {
            self.fix.max_line_length = max;
        }
        self.fix.validate()?;

        // An explicit selection replaces the file's disabled list.
        let mut rules = if overrides.only.is_empty() {
            self.fix.rule_set()
        } else {
            RuleSet::only(overrides.only.iter().copied())
        };
        for id in &overrides.disable {
            rules.disable(*id);
        }
        Ok((self.fix, rules, self.exclude_dirs))
    }
}

/// Resolve `path` against `root` unless it is already absolute.
pub fn under_root(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
