//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 1xx: Skill errors
//! - 2xx: Session errors
//! - 3xx: Config errors
//! - 5xx: Network / service errors
//! - 8xx: Validation and policy errors
//! - 9xx: Internal errors

use serde::{Deserialize, Serialize};

/// Standardized error codes for `--json` output.
///
/// Each variant maps to a numeric code (e.g., `SkillNotFound` -> E101).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================
    // Skill errors (1xx)
    // ========================================
    /// E101: Requested skill does not exist on the service
    SkillNotFound,
    /// E102: SKILL.md frontmatter is missing or invalid
    ManifestInvalid,
    /// E103: A file or directory inside a skill does not exist
    ResourceNotFound,

    // ========================================
    // Session errors (2xx)
    // ========================================
    /// E201: Operation needs a selected skill
    NoActiveSkill,
    /// E202: Operation needs an open file
    NoOpenFile,

    // ========================================
    // Config errors (3xx)
    // ========================================
    /// E302: Config file has invalid syntax or values
    ConfigInvalid,
    /// E304: Required config value is missing
    ConfigMissingRequired,

    // ========================================
    // Network errors (5xx)
    // ========================================
    /// E501: Cannot reach the skill service
    NetworkUnreachable,
    /// E502: Request to the skill service timed out
    NetworkTimeout,
    /// E504: Service answered with an error status
    ServiceRejected,

    // ========================================
    // Validation errors (8xx)
    // ========================================
    /// E801: Input failed validation
    ValidationFailed,
    /// E802: Destructive operation issued without confirmation
    ConfirmationRequired,
    /// E803: Operation refused by console policy before any request
    PolicyRefused,
    /// E885: Archive import failed
    ImportFailed,
    /// E886: Archive export failed
    ExportFailed,

    // ========================================
    // Internal errors (9xx)
    // ========================================
    /// E901: Unexpected internal error
    InternalError,
    /// E905: Serialization/deserialization failed
    SerializationError,
    /// E906: File operation failed
    IoError,
}

impl ErrorCode {
    /// Get the numeric code.
    #[must_use]
    pub const fn numeric(&self) -> u16 {
        match self {
            Self::SkillNotFound => 101,
            Self::ManifestInvalid => 102,
            Self::ResourceNotFound => 103,

            Self::NoActiveSkill => 201,
            Self::NoOpenFile => 202,

            Self::ConfigInvalid => 302,
            Self::ConfigMissingRequired => 304,

            Self::NetworkUnreachable => 501,
            Self::NetworkTimeout => 502,
            Self::ServiceRejected => 504,

            Self::ValidationFailed => 801,
            Self::ConfirmationRequired => 802,
            Self::PolicyRefused => 803,
            Self::ImportFailed => 885,
            Self::ExportFailed => 886,

            Self::InternalError => 901,
            Self::SerializationError => 905,
            Self::IoError => 906,
        }
    }

    /// Get the string form of the code (e.g., "E101").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("E{}", self.numeric())
    }

    /// Default recovery hint for this code.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::SkillNotFound => "Run `skc list` to see the skills known to the service",
            Self::ManifestInvalid => "SKILL.md must start with `---` frontmatter holding `name` (equal to the slug) and `description`",
            Self::ResourceNotFound => "Run `skc tree <slug>` to see which files exist",

            Self::NoActiveSkill => "Select a skill first",
            Self::NoOpenFile => "Open a file before saving",

            Self::ConfigInvalid => "Check TOML syntax and values in the config file",
            Self::ConfigMissingRequired => "Set the value in config.toml or via the matching SKC_* environment variable",

            Self::NetworkUnreachable => "Check that the skill service is running and `service.base_url` is correct",
            Self::NetworkTimeout => "The service may be slow. Retry, or raise `service.timeout_secs`",
            Self::ServiceRejected => "The service refused the request. Read the message and retry after fixing the input",

            Self::ValidationFailed => "Review the input and try again",
            Self::ConfirmationRequired => "Re-run with --yes to confirm the destructive operation",
            Self::PolicyRefused => "The console never sends this request. Pick a different target",
            Self::ImportFailed => "Check that the archive is a .zip holding exactly one SKILL.md",
            Self::ExportFailed => "Check that the output directory exists and is writable",

            Self::InternalError => "An unexpected error occurred. Please report this issue with full error output",
            Self::SerializationError => "The service sent data in an unexpected shape",
            Self::IoError => "File operation failed. Check path exists and permissions are correct",
        }
    }

    /// Whether repeating the action (possibly after a fix) can succeed.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::SkillNotFound
            | Self::ManifestInvalid
            | Self::ResourceNotFound
            | Self::NoActiveSkill
            | Self::NoOpenFile
            | Self::ConfigInvalid
            | Self::ConfigMissingRequired
            | Self::NetworkUnreachable
            | Self::NetworkTimeout
            | Self::ServiceRejected
            | Self::ValidationFailed
            | Self::ConfirmationRequired
            | Self::PolicyRefused
            | Self::ImportFailed
            | Self::ExportFailed
            | Self::IoError => true,

            Self::InternalError | Self::SerializationError => false,
        }
    }

    /// Get the category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self.numeric() / 100 {
            1 => "skill",
            2 => "session",
            3 => "config",
            5 => "network",
            8 => "validation",
            9 => "internal",
            _ => "unknown",
        }
    }

    /// Iterate over all error codes.
    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::SkillNotFound,
            Self::ManifestInvalid,
            Self::ResourceNotFound,
            Self::NoActiveSkill,
            Self::NoOpenFile,
            Self::ConfigInvalid,
            Self::ConfigMissingRequired,
            Self::NetworkUnreachable,
            Self::NetworkTimeout,
            Self::ServiceRejected,
            Self::ValidationFailed,
            Self::ConfirmationRequired,
            Self::PolicyRefused,
            Self::ImportFailed,
            Self::ExportFailed,
            Self::InternalError,
            Self::SerializationError,
            Self::IoError,
        ]
        .into_iter()
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E{}", self.numeric())
    }
}
