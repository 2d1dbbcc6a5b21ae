//! Draft of a skill's three dependency lists.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConsoleError;
use crate::service::{DependencyOptions, DependencyUpdate, Skill, same_set};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Tool,
    Mcp,
    Skill,
}

impl DependencyKind {
    pub const ALL: [Self; 3] = [Self::Tool, Self::Mcp, Self::Skill];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Tool => "tools",
            Self::Mcp => "mcps",
            Self::Skill => "skills",
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DependencyKind {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tool" | "tools" => Ok(Self::Tool),
            "mcp" | "mcps" => Ok(Self::Mcp),
            "skill" | "skills" => Ok(Self::Skill),
            other => Err(ConsoleError::ValidationFailed(format!(
                "unknown dependency kind '{other}'"
            ))),
        }
    }
}

/// Editable copy of the dependency lists of the selected skill.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyDraft {
    pub tools: Vec<String>,
    pub mcps: Vec<String>,
    pub skills: Vec<String>,
}

impl DependencyDraft {
    /// Copy the lists of `record`.
    #[must_use]
    pub fn seed(record: &Skill) -> Self {
        Self {
            tools: record.tool_dependencies.clone(),
            mcps: record.mcp_dependencies.clone(),
            skills: record.skill_dependencies.clone(),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn list(&self, kind: DependencyKind) -> &[String] {
        match kind {
            DependencyKind::Tool => &self.tools,
            DependencyKind::Mcp => &self.mcps,
            DependencyKind::Skill => &self.skills,
        }
    }

    fn list_mut(&mut self, kind: DependencyKind) -> &mut Vec<String> {
        match kind {
            DependencyKind::Tool => &mut self.tools,
            DependencyKind::Mcp => &mut self.mcps,
            DependencyKind::Skill => &mut self.skills,
        }
    }

    /// Replace one list. A skill never depends on itself, so `own_slug` is
    /// dropped from skill dependencies.
    pub fn set(&mut self, kind: DependencyKind, values: &[String], own_slug: Option<&str>) {
        let mut cleaned: Vec<String> = Vec::with_capacity(values.len());
        for value in values {
            let value = value.trim();
            if value.is_empty() || cleaned.iter().any(|v| v == value) {
                continue;
            }
            if kind == DependencyKind::Skill && Some(value) == own_slug {
                continue;
            }
            cleaned.push(value.to_string());
        }
        *self.list_mut(kind) = cleaned;
    }

    pub fn set_tools(&mut self, values: &[String]) {
        self.set(DependencyKind::Tool, values, None);
    }

    pub fn set_mcps(&mut self, values: &[String]) {
        self.set(DependencyKind::Mcp, values, None);
    }

    pub fn set_skills(&mut self, values: &[String], own_slug: Option<&str>) {
        self.set(DependencyKind::Skill, values, own_slug);
    }

    /// Add or remove one value. Returns whether it is now present.
    pub fn toggle(&mut self, kind: DependencyKind, value: &str, own_slug: Option<&str>) -> bool {
        if kind == DependencyKind::Skill && Some(value) == own_slug {
            return false;
        }
        let list = self.list_mut(kind);
        if let Some(index) = list.iter().position(|v| v == value) {
            list.remove(index);
            false
        } else {
            list.push(value.to_string());
            true
        }
    }

    /// True when any list differs from `record` as a set.
    #[must_use]
    pub fn is_changed(&self, record: &Skill) -> bool {
        !same_set(&self.tools, &record.tool_dependencies)
            || !same_set(&self.mcps, &record.mcp_dependencies)
            || !same_set(&self.skills, &record.skill_dependencies)
    }

    #[must_use]
    pub fn to_update(&self) -> DependencyUpdate {
        DependencyUpdate {
            tool_dependencies: self.tools.clone(),
            mcp_dependencies: self.mcps.clone(),
            skill_dependencies: self.skills.clone(),
        }
    }
}

/// Skill options offered for `own_slug`; a skill is never offered to itself.
#[must_use]
pub fn skill_options(options: &DependencyOptions, own_slug: Option<&str>) -> Vec<String> {
    options
        .skills
        .iter()
        .filter(|slug| Some(slug.as_str()) != own_slug)
        .cloned()
        .collect()
}
