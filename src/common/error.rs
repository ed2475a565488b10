//! Error types for the table test runner
//!
//! Failures below the top level are recovered into verdict state by the
//! runners; only configuration, document and genuinely unexpected faults
//! propagate to the process boundary.

use std::io;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the table test runner
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === Document Errors ===
    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    #[error("Failed to parse document '{path}': {message}")]
    DocumentParse { path: String, message: String },

    // === Session Errors ===
    #[error("Failed to start session on {server}: {message}")]
    SessionStart { server: String, message: String },

    #[error("No active session. Start the session before dispatching commands")]
    SessionNotStarted,

    #[error("Session already started")]
    SessionAlreadyStarted,

    // === Command Errors ===
    /// Protocol-level command failure. The display form is the raw server
    /// message so it can serve directly as a command's result text.
    #[error("{0}")]
    Command(String),

    // === Transport Errors ===
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Create a document parse error carrying its source location
    pub fn document_parse(path: impl std::fmt::Display, message: impl Into<String>) -> Self {
        Self::DocumentParse {
            path: path.to_string(),
            message: message.into(),
        }
    }

    /// Create a session start error
    pub fn session_start(server: &str, message: impl Into<String>) -> Self {
        Self::SessionStart {
            server: server.to_string(),
            message: message.into(),
        }
    }
}
