//! Shared error taxonomy for the mdmend crates.
//!
//! Every library crate in the workspace returns [`Result`], so the binary can
//! decide in one place which failures end the invocation and which are
//! recorded per item and skipped.

use std::path::PathBuf;

/// Unified error type for all mdmend subsystems.
#[derive(Debug, thiserror::Error)]
pub enum MendError {
    // === Configuration store ===
    #[error("Configuration file not found: {}", path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration file {} is not valid: {message}", path.display())]
    InvalidConfig { path: PathBuf, message: String },

    #[error("Server '{server}' not found in configuration")]
    ServerNotFound { server: String },

    #[error("Token is required")]
    MissingToken,

    // === Rule pipeline ===
    #[error("Unknown rule id '{0}'")]
    UnknownRule(String),

    #[error("Invalid settings: {0}")]
    Settings(String),

    // === Probes ===
    #[error("Probe '{probe}' failed: {message}")]
    ProbeFailed { probe: String, message: String },

    // === Generic ===
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl MendError {
    /// Returns `true` if the error ends the whole invocation.
    ///
    /// Input validation and configuration access failures are fatal; a failed
    /// probe or a single unreadable document is not.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MendError::ConfigNotFound { .. }
                | MendError::InvalidConfig { .. }
                | MendError::ServerNotFound { .. }
                | MendError::MissingToken
                | MendError::UnknownRule(_)
                | MendError::Settings(_)
        )
    }
}

/// A convenience alias for `Result<T, MendError>`.
pub type Result<T> = std::result::Result<T, MendError>;
