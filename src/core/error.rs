// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for nuscenes2mcap.
//!
//! Provides the error taxonomy of the converter:
//! - I/O failures on metadata, raw sensor files and output logs
//! - Malformed metadata records
//! - Unknown scene tokens
//! - Invalid configuration
//! - Output encoding failures
//!
//! Unclassifiable files and per-file decode failures are not errors: they are
//! reported as `tracing` diagnostics and skipped.

use std::fmt;
use std::path::{Path, PathBuf};

/// Errors that can occur while converting a dataset.
#[derive(Debug, Clone)]
pub enum ConvertError {
    /// Missing or unreadable file or directory
    Io {
        /// Path that was being accessed
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Malformed metadata record or table
    ParseError {
        /// What was being parsed (table or file name)
        context: String,
        /// Error message
        message: String,
    },

    /// Scene token not present in the metadata index
    MissingScene {
        /// Token (or selector) that was not found
        token: String,
    },

    /// Configuration value out of range
    InvalidConfig {
        /// Offending field
        field: String,
        /// Why it was rejected
        reason: String,
    },

    /// Failure while writing the output log
    EncodeError {
        /// Writer context (e.g., "McapWriter", "SceneLog")
        context: String,
        /// Error message
        message: String,
    },

    /// Other error
    Other(String),
}

impl ConvertError {
    /// Create an I/O error for a path.
    pub fn io(path: impl AsRef<Path>, message: impl Into<String>) -> Self {
        ConvertError::Io {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Create a parse error.
    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        ConvertError::ParseError {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Create a missing scene error.
    pub fn missing_scene(token: impl Into<String>) -> Self {
        ConvertError::MissingScene {
            token: token.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConvertError::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an output encoding error.
    pub fn encode(context: impl Into<String>, message: impl Into<String>) -> Self {
        ConvertError::EncodeError {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Whether this error only affects the scene being converted.
    ///
    /// Load-time parse errors and configuration errors abort the whole run.
    pub fn is_scene_local(&self) -> bool {
        matches!(
            self,
            ConvertError::MissingScene { .. }
                | ConvertError::EncodeError { .. }
                | ConvertError::Io { .. }
        )
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            ConvertError::Io { path, message } => vec![
                ("path", path.display().to_string()),
                ("message", message.clone()),
            ],
            ConvertError::ParseError { context, message } => {
                vec![("context", context.clone()), ("message", message.clone())]
            }
            ConvertError::MissingScene { token } => vec![("scene", token.clone())],
            ConvertError::InvalidConfig { field, reason } => {
                vec![("field", field.clone()), ("reason", reason.clone())]
            }
            ConvertError::EncodeError { context, message } => {
                vec![("context", context.clone()), ("message", message.clone())]
            }
            ConvertError::Other(msg) => vec![("message", msg.clone())],
        }
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::Io { path, message } => {
                write!(f, "I/O error on '{}': {message}", path.display())
            }
            ConvertError::ParseError { context, message } => {
                write!(f, "Parse error in {context}: {message}")
            }
            ConvertError::MissingScene { token } => {
                write!(f, "Scene not found: '{token}'")
            }
            ConvertError::InvalidConfig { field, reason } => {
                write!(f, "Invalid configuration '{field}': {reason}")
            }
            ConvertError::EncodeError { context, message } => {
                write!(f, "{context} encode error: {message}")
            }
            ConvertError::Other(msg) => write!(f, "Other error: {msg}"),
        }
    }
}

impl std::error::Error for ConvertError {}

impl From<std::io::Error> for ConvertError {
    fn from(err: std::io::Error) -> Self {
        ConvertError::EncodeError {
            context: "IO".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ConvertError {
    fn from(err: serde_json::Error) -> Self {
        ConvertError::ParseError {
            context: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type for nuscenes2mcap operations.
pub type Result<T> = std::result::Result<T, ConvertError>;
