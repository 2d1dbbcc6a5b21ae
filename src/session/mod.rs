//! Session state of the console.
//!
//! [`SessionState`] is the single source of truth the console mutates: the
//! cached skill list, the active skill with its tree, the open document and
//! the dependency draft. Derived values (`is_dirty`, filtered options) are
//! plain functions over it.
//!
//! Requests are tagged with a generation number when issued; a response is
//! committed only while its generation is still current, so the last
//! selection always wins.

pub mod dependencies;
pub mod editing;

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::service::{DependencyOptions, Skill};
use crate::tree::{ExpansionState, TreeNode};

pub use dependencies::{DependencyDraft, DependencyKind, skill_options};
pub use editing::EditingSession;

/// Default bound of the notice queue.
pub const DEFAULT_NOTICE_CAPACITY: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warn,
    Error,
}

/// A transient message for the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Requests currently in flight, for status display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Loading {
    pub skills: bool,
    pub tree: bool,
    pub file: bool,
    pub saving: bool,
}

/// Identifies a file fetch so its result can be checked for staleness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeTicket {
    pub slug: String,
    pub path: String,
    pub generation: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionState {
    pub skills: Vec<Skill>,
    pub active: Option<Skill>,
    pub tree: Vec<TreeNode>,
    #[serde(skip)]
    pub expansion: ExpansionState,
    pub editing: EditingSession,
    pub dependency_options: DependencyOptions,
    pub dependencies: DependencyDraft,
    pub loading: Loading,
    #[serde(skip)]
    generation: u64,
    notices: VecDeque<Notice>,
    #[serde(skip)]
    notice_capacity: usize,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_CAPACITY)
    }
}

impl SessionState {
    #[must_use]
    pub fn new(notice_capacity: usize) -> Self {
        Self {
            skills: Vec::new(),
            active: None,
            tree: Vec::new(),
            expansion: ExpansionState::new(),
            editing: EditingSession::new(),
            dependency_options: DependencyOptions::default(),
            dependencies: DependencyDraft::default(),
            loading: Loading::default(),
            generation: 0,
            notices: VecDeque::new(),
            notice_capacity: notice_capacity.max(1),
        }
    }

    #[must_use]
    pub fn active_slug(&self) -> Option<&str> {
        self.active.as_ref().map(|skill| skill.slug.as_str())
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Invalidate every outstanding selection request.
    pub fn next_generation(&mut self) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    /// Whether a file fetch issued with `ticket` may still commit.
    #[must_use]
    pub fn is_current(&self, ticket: &NodeTicket) -> bool {
        ticket.generation == self.generation
            && self.active_slug() == Some(ticket.slug.as_str())
            && self.editing.selected_path() == ticket.path
    }

    /// Ticket for a fetch of the currently selected file.
    #[must_use]
    pub fn ticket(&self) -> Option<NodeTicket> {
        let slug = self.active_slug()?;
        if !self.editing.has_file() {
            return None;
        }
        Some(NodeTicket {
            slug: slug.to_string(),
            path: self.editing.selected_path().to_string(),
            generation: self.generation,
        })
    }

    /// Make `record` the active skill with a fresh document and draft.
    pub fn activate(&mut self, record: Skill) {
        self.next_generation();
        self.dependencies = DependencyDraft::seed(&record);
        self.active = Some(record);
        self.tree.clear();
        self.expansion.clear();
        self.editing.reset();
    }

    /// Drop the active skill and everything hanging off it.
    pub fn clear_selection(&mut self) {
        self.next_generation();
        self.active = None;
        self.tree.clear();
        self.expansion.clear();
        self.editing.reset();
        self.dependencies.clear();
        self.loading.tree = false;
        self.loading.file = false;
    }

    /// Reset the open document, invalidating pending fetches.
    pub fn reset_editing(&mut self) {
        self.next_generation();
        self.editing.reset();
        self.loading.file = false;
    }

    /// Replace the tree, keeping expansion of directories that still exist.
    pub fn set_tree(&mut self, nodes: Vec<TreeNode>, expand_all: bool) {
        if expand_all {
            self.expansion.clear();
            self.expansion.expand_all(&nodes);
        } else {
            self.expansion.retain_existing(&nodes);
        }
        self.tree = nodes;
    }

    /// Install a fresh skill list and keep the selection consistent with it.
    ///
    /// A vanished active skill clears the selection. A surviving one takes
    /// the new record; the dependency draft is reseeded only when the
    /// record's dependency sets changed, so pending edits survive plain
    /// refreshes.
    pub fn replace_skills(&mut self, skills: Vec<Skill>) {
        self.skills = skills;
        let Some(active) = self.active.as_ref() else {
            return;
        };
        let fresh = self.skills.iter().find(|s| s.slug == active.slug).cloned();
        match fresh {
            None => {
                tracing::debug!(slug = %active.slug, "active skill vanished from list");
                self.clear_selection();
            }
            Some(fresh) => {
                if !fresh.same_dependencies(active) {
                    self.dependencies = DependencyDraft::seed(&fresh);
                }
                self.active = Some(fresh);
            }
        }
    }

    /// Swap in the authoritative record after a dependency update.
    pub fn replace_record(&mut self, record: Skill) {
        if let Some(slot) = self.skills.iter_mut().find(|s| s.slug == record.slug) {
            *slot = record.clone();
        }
        if self.active_slug() == Some(record.slug.as_str()) {
            self.dependencies = DependencyDraft::seed(&record);
            self.active = Some(record);
        }
    }

    pub fn remove_skill(&mut self, slug: &str) {
        self.skills.retain(|s| s.slug != slug);
    }

    #[must_use]
    pub fn find_skill(&self, slug: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.slug == slug)
    }

    /// Skills whose slug, name or description contains `filter`
    /// (case-insensitive). An empty filter keeps everything.
    #[must_use]
    pub fn filtered_skills(&self, filter: &str) -> Vec<&Skill> {
        let needle = filter.trim().to_lowercase();
        self.skills
            .iter()
            .filter(|skill| {
                needle.is_empty()
                    || skill.slug.to_lowercase().contains(&needle)
                    || skill.name.to_lowercase().contains(&needle)
                    || skill.description.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Skill dependency options, minus the active skill.
    #[must_use]
    pub fn skill_dependency_options(&self) -> Vec<String> {
        skill_options(&self.dependency_options, self.active_slug())
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.editing.is_dirty()
    }

    #[must_use]
    pub fn can_save(&self) -> bool {
        self.editing.can_save() && !self.loading.saving && !self.loading.file
    }

    #[must_use]
    pub fn can_save_dependencies(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|record| self.dependencies.is_changed(record))
    }

    pub fn push_notice(&mut self, level: NoticeLevel, message: impl Into<String>) {
        if self.notices.len() >= self.notice_capacity {
            self.notices.pop_front();
        }
        self.notices.push_back(Notice {
            level,
            message: message.into(),
            at: Utc::now(),
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push_notice(NoticeLevel::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.push_notice(NoticeLevel::Warn, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push_notice(NoticeLevel::Error, message);
    }

    #[must_use]
    pub fn notices(&self) -> impl Iterator<Item = &Notice> {
        self.notices.iter()
    }

    #[must_use]
    pub fn latest_notice(&self) -> Option<&Notice> {
        self.notices.back()
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }
}
