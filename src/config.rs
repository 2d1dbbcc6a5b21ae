use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConsoleError, Result};
use crate::session::DEFAULT_NOTICE_CAPACITY;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration: explicit path, else `SKC_CONFIG`, else the user
    /// config file; then `SKC_*` environment overrides.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| env_string("SKC_CONFIG").map(PathBuf::from));

        if let Some(path) = explicit {
            match Self::load_patch(&path)? {
                Some(patch) => config.merge_patch(patch),
                None => {
                    return Err(ConsoleError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
            }
        } else if let Some(global) = Self::load_global()? {
            config.merge_patch(global);
        }

        config.apply_env_overrides()?;

        Ok(config)
    }

    /// Path of the per-user config file, if the platform has a config dir.
    #[must_use]
    pub fn global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("skc/config.toml"))
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        match Self::global_path() {
            Some(path) => Self::load_patch(&path),
            None => Ok(None),
        }
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path).map_err(|err| {
            ConsoleError::Config(format!("read config {}: {err}", path.display()))
        })?;
        let patch = toml::from_str(&raw).map_err(|err| {
            ConsoleError::Config(format!("parse config {}: {err}", path.display()))
        })?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.service {
            self.service.merge(patch);
        }
        if let Some(patch) = patch.console {
            self.console.merge(patch);
        }
        if let Some(patch) = patch.output {
            self.output.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply `SKC_*` overrides read through `lookup`.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(value) = lookup("SKC_BASE_URL") {
            self.service.base_url = value;
        }
        if let Some(value) = parse_u64(&lookup, "SKC_TIMEOUT_SECS")? {
            self.service.timeout_secs = value;
        }
        if let Some(value) = lookup("SKC_TOKEN") {
            let value = value.trim().to_string();
            self.service.token = if value.is_empty() { None } else { Some(value) };
        }

        if let Some(value) = parse_u64(&lookup, "SKC_NOTICE_CAPACITY")? {
            self.console.notice_capacity = usize::try_from(value).map_err(|err| {
                ConsoleError::Config(format!("invalid SKC_NOTICE_CAPACITY value {value}: {err}"))
            })?;
        }
        if let Some(value) = lookup("SKC_AUTO_EXPAND") {
            self.console.auto_expand_tree = parse_bool(&value);
        }

        if let Some(value) = lookup("SKC_OUTPUT_FORMAT") {
            self.output.format = value.parse()?;
        }

        self.validate()
    }

    /// Reject values no component can work with.
    pub fn validate(&self) -> Result<()> {
        if self.service.base_url.trim().is_empty() {
            return Err(ConsoleError::MissingConfig("service.base_url".to_string()));
        }
        if !(self.service.base_url.starts_with("http://")
            || self.service.base_url.starts_with("https://"))
        {
            return Err(ConsoleError::Config(format!(
                "service.base_url must start with http:// or https://, got {}",
                self.service.base_url
            )));
        }
        if self.service.timeout_secs == 0 {
            return Err(ConsoleError::Config(
                "service.timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.console.notice_capacity == 0 {
            return Err(ConsoleError::Config(
                "console.notice_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub timeout_secs: u64,
    /// Bearer token forwarded verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            token: None,
        }
    }
}

impl ServiceConfig {
    fn merge(&mut self, patch: ServicePatch) {
        if let Some(value) = patch.base_url {
            self.base_url = value;
        }
        if let Some(value) = patch.timeout_secs {
            self.timeout_secs = value;
        }
        if let Some(value) = patch.token {
            self.token = Some(value);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub notice_capacity: usize,
    #[serde(default)]
    pub auto_expand_tree: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            notice_capacity: DEFAULT_NOTICE_CAPACITY,
            auto_expand_tree: true,
        }
    }
}

impl ConsoleConfig {
    fn merge(&mut self, patch: ConsolePatch) {
        if let Some(value) = patch.notice_capacity {
            self.notice_capacity = value;
        }
        if let Some(value) = patch.auto_expand_tree {
            self.auto_expand_tree = value;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "human" | "text" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            other => Err(ConsoleError::Config(format!(
                "invalid output format {other} (expected human|json)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

impl OutputConfig {
    fn merge(&mut self, patch: OutputPatch) {
        if let Some(value) = patch.format {
            self.format = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub service: Option<ServicePatch>,
    pub console: Option<ConsolePatch>,
    pub output: Option<OutputPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ServicePatch {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConsolePatch {
    pub notice_capacity: Option<usize>,
    pub auto_expand_tree: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct OutputPatch {
    pub format: Option<OutputFormat>,
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn parse_bool(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<u64>> {
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|err| ConsoleError::Config(format!("invalid {key} value {value}: {err}"))),
        None => Ok(None),
    }
}
