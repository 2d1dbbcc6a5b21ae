//! `SKILL.md` frontmatter inspection.
//!
//! The service validates the manifest on every save; the console reads the
//! same frontmatter to preview a skill's name/description and to warn before
//! sending a draft the service would reject.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::error::{ConsoleError, Result};

/// Path of the manifest, relative to the skill root.
pub const MANIFEST_PATH: &str = "SKILL.md";

/// Longest accepted skill name.
pub const MAX_NAME_LEN: usize = 128;

static FRONTMATTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^---\s*\n(.*?)\n---\s*\n").expect("valid regex"));

static SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("valid regex"));

/// The two frontmatter fields the console cares about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestSummary {
    pub name: String,
    pub description: String,
}

#[must_use]
pub fn is_manifest(path: &str) -> bool {
    path == MANIFEST_PATH
}

/// Lowercase alphanumerics separated by single hyphens, at most 128 chars.
#[must_use]
pub fn slug_is_valid(slug: &str) -> bool {
    slug.len() <= MAX_NAME_LEN && SLUG.is_match(slug)
}

fn frontmatter_mapping(content: &str) -> Result<(Mapping, usize)> {
    let caps = FRONTMATTER.captures(content).ok_or_else(|| {
        ConsoleError::InvalidManifest("missing frontmatter (--- ... ---)".to_string())
    })?;
    let end = caps.get(0).map_or(0, |m| m.end());
    let yaml = caps.get(1).map_or("", |m| m.as_str());

    let value: Value = serde_yaml::from_str(yaml)
        .map_err(|e| ConsoleError::InvalidManifest(format!("frontmatter YAML error: {e}")))?;
    match value {
        Value::Mapping(map) => Ok((map, end)),
        Value::Null => Ok((Mapping::new(), end)),
        _ => Err(ConsoleError::InvalidManifest(
            "frontmatter must be a mapping".to_string(),
        )),
    }
}

/// Scalars are read the way the service stringifies them, so `name: 123`
/// is the name "123" and `name: true` the (invalid) name "True".
fn string_field(map: &Mapping, key: &str) -> String {
    let text = match map.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(true)) => "True".to_string(),
        Some(Value::Bool(false)) => "False".to_string(),
        Some(Value::Null) => "None".to_string(),
        _ => String::new(),
    };
    text.trim().to_string()
}

/// Parse the frontmatter block at the start of a manifest.
pub fn parse_frontmatter(content: &str) -> Result<ManifestSummary> {
    let (map, _) = frontmatter_mapping(content)?;

    let name = string_field(&map, "name");
    if name.is_empty() {
        return Err(ConsoleError::InvalidManifest(
            "frontmatter is missing `name`".to_string(),
        ));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ConsoleError::InvalidManifest(format!(
            "name is longer than {MAX_NAME_LEN} characters"
        )));
    }
    if !SLUG.is_match(&name) {
        return Err(ConsoleError::InvalidManifest(format!(
            "name '{name}' must be lowercase letters/digits separated by single hyphens"
        )));
    }

    let description = string_field(&map, "description");
    if description.is_empty() {
        return Err(ConsoleError::InvalidManifest(
            "frontmatter is missing `description`".to_string(),
        ));
    }

    Ok(ManifestSummary { name, description })
}

/// Replace the frontmatter `name`, keeping the body untouched.
pub fn rewrite_name(content: &str, new_name: &str) -> Result<String> {
    let (mut map, end) = frontmatter_mapping(content)?;
    map.insert(
        Value::String("name".to_string()),
        Value::String(new_name.to_string()),
    );
    let yaml = serde_yaml::to_string(&map)?;
    Ok(format!("---\n{}\n---\n{}", yaml.trim_end(), &content[end..]))
}

/// Warning to show before saving a manifest draft the service would reject.
///
/// Never blocks the save: the service stays the authority on validity.
#[must_use]
pub fn manifest_warning(slug: &str, draft: &str) -> Option<String> {
    match parse_frontmatter(draft) {
        Ok(summary) if summary.name == slug => None,
        Ok(summary) => Some(format!(
            "SKILL.md name '{}' does not match skill slug '{slug}'; the service will reject it",
            summary.name
        )),
        Err(err) => Some(format!("{err}; the service will reject it")),
    }
}
