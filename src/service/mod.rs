//! Skill service port.
//!
//! The console never stores skills itself. Everything it knows comes from a
//! remote service reached through [`SkillService`]: the HTTP adapter in
//! [`http`] for real use, and [`mock::MockSkillService`] for tests.

pub mod http;
pub mod mock;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use http::HttpSkillService;
pub use mock::MockSkillService;

/// A skill record as mirrored in the service database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub slug: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub tool_dependencies: Vec<String>,
    #[serde(default)]
    pub mcp_dependencies: Vec<String>,
    #[serde(default)]
    pub skill_dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Skill {
    /// Minimal record, mostly useful for fixtures.
    #[must_use]
    pub fn new(slug: &str, description: &str) -> Self {
        Self {
            slug: slug.to_string(),
            name: slug.to_string(),
            description: description.to_string(),
            updated_at: None,
            tool_dependencies: Vec::new(),
            mcp_dependencies: Vec::new(),
            skill_dependencies: Vec::new(),
            dir_path: None,
            created_by: None,
            updated_by: None,
            created_at: None,
        }
    }

    /// True when both records declare the same dependency sets.
    #[must_use]
    pub fn same_dependencies(&self, other: &Self) -> bool {
        same_set(&self.tool_dependencies, &other.tool_dependencies)
            && same_set(&self.mcp_dependencies, &other.mcp_dependencies)
            && same_set(&self.skill_dependencies, &other.skill_dependencies)
    }
}

/// Order- and duplicate-insensitive comparison.
#[must_use]
pub fn same_set(a: &[String], b: &[String]) -> bool {
    use std::collections::BTreeSet;
    a.iter().collect::<BTreeSet<_>>() == b.iter().collect::<BTreeSet<_>>()
}

/// One entry of the nested directory description returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    pub path: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_dir: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TreeEntry>>,
}

impl TreeEntry {
    #[must_use]
    pub fn file(path: &str) -> Self {
        Self {
            path: path.to_string(),
            name: last_segment(path).to_string(),
            is_dir: false,
            children: None,
        }
    }

    #[must_use]
    pub fn dir(path: &str, children: Vec<Self>) -> Self {
        Self {
            path: path.to_string(),
            name: last_segment(path).to_string(),
            is_dir: true,
            children: Some(children),
        }
    }
}

/// Last `/`-separated segment of a skill-relative path.
#[must_use]
pub fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileUpdate {
    pub path: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCreate {
    pub path: String,
    pub is_dir: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Archive bytes plus the raw `Content-Disposition` header, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPayload {
    pub bytes: Vec<u8>,
    pub content_disposition: Option<String>,
}

/// An archive picked by the operator for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportResult {
    pub slug: String,
}

/// Selectable values for the three dependency lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyOptions {
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default)]
    pub mcps: Vec<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyUpdate {
    pub tool_dependencies: Vec<String>,
    pub mcp_dependencies: Vec<String>,
    pub skill_dependencies: Vec<String>,
}

/// Remote skill storage, as seen by the console.
///
/// Implementations report a missing skill, file or directory as
/// [`ConsoleError::NotFound`](crate::error::ConsoleError::NotFound) or
/// [`ConsoleError::SkillNotFound`](crate::error::ConsoleError::SkillNotFound)
/// so callers can tell expected absences from real failures.
#[async_trait]
pub trait SkillService: Send + Sync {
    async fn list_skills(&self) -> Result<Vec<Skill>>;

    async fn get_skill_tree(&self, slug: &str) -> Result<Vec<TreeEntry>>;

    async fn get_skill_file(&self, slug: &str, path: &str) -> Result<FileContent>;

    async fn update_skill_file(&self, slug: &str, update: &FileUpdate) -> Result<()>;

    async fn create_skill_file(&self, slug: &str, create: &FileCreate) -> Result<()>;

    async fn delete_skill_file(&self, slug: &str, path: &str) -> Result<()>;

    async fn delete_skill(&self, slug: &str) -> Result<()>;

    async fn export_skill(&self, slug: &str) -> Result<ExportPayload>;

    async fn import_skill_zip(&self, upload: &ArchiveUpload) -> Result<ImportResult>;

    async fn get_skill_dependency_options(&self) -> Result<DependencyOptions>;

    async fn update_skill_dependencies(
        &self,
        slug: &str,
        update: &DependencyUpdate,
    ) -> Result<Skill>;
}
