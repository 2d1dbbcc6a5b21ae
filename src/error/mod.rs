//! Error handling for skill-console.
//!
//! This module provides:
//! - [`ConsoleError`]: The main error enum for all console operations
//! - [`ErrorCode`]: Standardized error codes for machine parsing
//! - [`StructuredError`]: Serializable error with suggestion and context

mod codes;
mod suggestions;

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use codes::ErrorCode;
pub use suggestions::suggest_for_error;

/// Main error type for console operations.
#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Skill not found: {0}")]
    SkillNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Service rejected request (HTTP {status}): {message}")]
    Service { status: u16, message: String },

    #[error("Invalid SKILL.md: {0}")]
    InvalidManifest(String),

    #[error("Refused: {0}")]
    Refused(String),

    #[error("Confirmation required: {0}")]
    ConfirmationRequired(String),

    #[error("No skill selected")]
    NoActiveSkill,

    #[error("No file open")]
    NoOpenFile,

    #[error("Config error: {0}")]
    Config(String),

    #[error("Missing required config: {0}")]
    MissingConfig(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Import error: {0}")]
    Import(String),

    #[error("Export error: {0}")]
    Export(String),
}

impl ConsoleError {
    /// Get the error code for this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) | Self::Yaml(_) => ErrorCode::SerializationError,
            Self::Http(err) if err.is_timeout() => ErrorCode::NetworkTimeout,
            Self::Http(err) if err.is_decode() => ErrorCode::SerializationError,
            Self::Http(_) => ErrorCode::NetworkUnreachable,
            Self::SkillNotFound(_) => ErrorCode::SkillNotFound,
            Self::NotFound(_) => ErrorCode::ResourceNotFound,
            Self::Service { .. } => ErrorCode::ServiceRejected,
            Self::InvalidManifest(_) => ErrorCode::ManifestInvalid,
            Self::Refused(_) => ErrorCode::PolicyRefused,
            Self::ConfirmationRequired(_) => ErrorCode::ConfirmationRequired,
            Self::NoActiveSkill => ErrorCode::NoActiveSkill,
            Self::NoOpenFile => ErrorCode::NoOpenFile,
            Self::Config(_) => ErrorCode::ConfigInvalid,
            Self::MissingConfig(_) => ErrorCode::ConfigMissingRequired,
            Self::ValidationFailed(_) => ErrorCode::ValidationFailed,
            Self::Import(_) => ErrorCode::ImportFailed,
            Self::Export(_) => ErrorCode::ExportFailed,
        }
    }

    /// Get context information for this error as JSON.
    #[must_use]
    pub fn context(&self) -> Option<Value> {
        match self {
            Self::SkillNotFound(slug) => Some(serde_json::json!({ "slug": slug })),
            Self::NotFound(resource) => Some(serde_json::json!({ "resource": resource })),
            Self::Service { status, message } => {
                Some(serde_json::json!({ "status": status, "message": message }))
            }
            Self::Refused(reason) => Some(serde_json::json!({ "reason": reason })),
            Self::MissingConfig(key) => Some(serde_json::json!({ "config_key": key })),
            _ => None,
        }
    }

    /// Missing resources are an expected state (a fresh skill has no
    /// SKILL.md yet) and are kept apart from real failures.
    #[must_use]
    pub const fn is_missing_resource(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::SkillNotFound(_))
    }

    /// Policy refusals are raised before any request leaves the console.
    #[must_use]
    pub const fn is_policy_refusal(&self) -> bool {
        matches!(self, Self::Refused(_) | Self::ConfirmationRequired(_))
    }

    /// Convert this error to a structured error.
    #[must_use]
    pub fn to_structured(&self) -> StructuredError {
        StructuredError::from_console_error(self)
    }
}

/// A structured error with machine-readable code, suggestion, and context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// The error code (e.g., "SKILL_NOT_FOUND")
    pub code: ErrorCode,

    /// The numeric error code (e.g., 101)
    pub numeric_code: u16,

    /// Human-readable error message
    pub message: String,

    /// Actionable suggestion for recovery
    pub suggestion: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    pub recoverable: bool,

    /// Error category (e.g., "skill", "session", "network")
    pub category: String,
}

impl StructuredError {
    /// Create a new structured error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            numeric_code: code.numeric(),
            suggestion: code.suggestion().to_string(),
            context: None,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
            code,
            message: message.into(),
        }
    }

    /// Create a structured error from a [`ConsoleError`].
    #[must_use]
    pub fn from_console_error(err: &ConsoleError) -> Self {
        let code = err.code();
        let context = err.context();
        let suggestion = suggest_for_error(code, context.as_ref());

        Self {
            code,
            numeric_code: code.numeric(),
            message: err.to_string(),
            suggestion,
            context,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
        }
    }

    /// Add context to this error, regenerating the suggestion.
    #[must_use]
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self.suggestion = suggest_for_error(self.code, self.context.as_ref());
        self
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<&ConsoleError> for StructuredError {
    fn from(err: &ConsoleError) -> Self {
        Self::from_console_error(err)
    }
}

impl From<toml::de::Error> for ConsoleError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type alias using [`ConsoleError`].
pub type Result<T> = std::result::Result<T, ConsoleError>;
