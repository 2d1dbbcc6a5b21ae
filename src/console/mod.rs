//! The console: session state plus the service it talks to.
//!
//! Every user action enters through a [`Console`] method. Methods take
//! `&self`, so several may be in flight at once; the state lock is never
//! held across an `.await`. Responses are committed only if the request
//! that produced them is still current.

pub mod mutations;

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::config::ConsoleConfig;
use crate::error::{ConsoleError, Result};
use crate::manifest::MANIFEST_PATH;
use crate::service::{Skill, SkillService};
use crate::session::{
    DEFAULT_NOTICE_CAPACITY, DependencyKind, NodeTicket, Notice, SessionState,
};
use crate::tree;

pub use mutations::{ConfirmedDelete, DeleteIntent, DeleteTarget, check_deletable, normalize_new_path};

/// Console behavior knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleOptions {
    /// Expand every directory when a skill's tree is first loaded.
    pub auto_expand_tree: bool,
    pub notice_capacity: usize,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self {
            auto_expand_tree: true,
            notice_capacity: DEFAULT_NOTICE_CAPACITY,
        }
    }
}

impl From<&ConsoleConfig> for ConsoleOptions {
    fn from(config: &ConsoleConfig) -> Self {
        Self {
            auto_expand_tree: config.auto_expand_tree,
            notice_capacity: config.notice_capacity,
        }
    }
}

/// Orchestrates the session state against a [`SkillService`].
#[derive(Clone)]
pub struct Console {
    service: Arc<dyn SkillService>,
    state: Arc<Mutex<SessionState>>,
    options: ConsoleOptions,
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl Console {
    #[must_use]
    pub fn new(service: Arc<dyn SkillService>, options: ConsoleOptions) -> Self {
        Self {
            service,
            state: Arc::new(Mutex::new(SessionState::new(options.notice_capacity))),
            options,
        }
    }

    #[must_use]
    pub fn service(&self) -> &Arc<dyn SkillService> {
        &self.service
    }

    #[must_use]
    pub const fn options(&self) -> ConsoleOptions {
        self.options
    }

    /// A copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.state.lock().clone()
    }

    /// Run `f` against the current state without copying it.
    pub fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&*self.state.lock())
    }

    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        f(&mut *self.state.lock())
    }

    pub fn drain_notices(&self) -> Vec<Notice> {
        self.update(SessionState::drain_notices)
    }

    /// Record a policy refusal. No request is sent.
    pub(crate) fn refuse(&self, message: impl Into<String>) -> ConsoleError {
        let message = message.into();
        debug!(%message, "refused");
        self.update(|s| s.warn(message.clone()));
        ConsoleError::Refused(message)
    }

    pub(crate) fn require_active(&self) -> Result<String> {
        self.read(|s| s.active_slug().map(str::to_string))
            .ok_or(ConsoleError::NoActiveSkill)
    }

    /// Initial load: the skill list and the dependency options.
    pub async fn mount(&self) -> Result<()> {
        let (skills, options) = tokio::join!(self.refresh_skills(), self.load_dependency_options());
        skills.and(options)
    }

    /// Fetch the skill list. The last response to arrive wins.
    pub async fn refresh_skills(&self) -> Result<()> {
        self.update(|s| s.loading.skills = true);
        let result = self.service.list_skills().await;
        self.update(|s| {
            s.loading.skills = false;
            match result {
                Ok(skills) => {
                    debug!(count = skills.len(), "skill list loaded");
                    s.replace_skills(skills);
                    Ok(())
                }
                Err(err) => {
                    warn!(error = %err, "failed to load skills");
                    s.error(format!("Failed to load skills: {err}"));
                    Err(err)
                }
            }
        })
    }

    pub async fn load_dependency_options(&self) -> Result<()> {
        let result = self.service.get_skill_dependency_options().await;
        self.update(|s| match result {
            Ok(options) => {
                s.dependency_options = options;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "failed to load dependency options");
                s.error(format!("Failed to load dependency options: {err}"));
                Err(err)
            }
        })
    }

    /// Make `record` the active skill, then load its tree and its manifest
    /// together.
    ///
    /// A skill without `SKILL.md` simply opens with nothing selected.
    pub async fn select_skill(&self, record: Skill) -> Result<()> {
        let slug = record.slug.clone();
        let ticket = self.update(|s| {
            s.activate(record);
            s.editing.select_file(MANIFEST_PATH);
            s.loading.tree = true;
            s.loading.file = true;
            NodeTicket {
                slug: slug.clone(),
                path: MANIFEST_PATH.to_string(),
                generation: s.generation(),
            }
        });
        debug!(%slug, "skill selected");

        let (tree, manifest) = tokio::join!(
            self.reload_tree(&slug, self.options.auto_expand_tree),
            self.fetch_file(ticket, true)
        );
        tree.and(manifest)
    }

    /// Select a skill from the cached list, refreshing it once if needed.
    pub async fn select_skill_by_slug(&self, slug: &str) -> Result<()> {
        let mut record = self.read(|s| s.find_skill(slug).cloned());
        if record.is_none() {
            self.refresh_skills().await?;
            record = self.read(|s| s.find_skill(slug).cloned());
        }
        match record {
            Some(record) => self.select_skill(record).await,
            None => Err(ConsoleError::SkillNotFound(slug.to_string())),
        }
    }

    /// Select a tree node.
    ///
    /// Directories are selected without a request. Files are selected
    /// immediately with empty content, then filled once fetched. Unsaved
    /// edits of the previous file are discarded without asking.
    pub async fn select_node(&self, path: &str, is_dir: bool) -> Result<()> {
        let ticket = self.update(|s| {
            if s.active.is_none() {
                return Err(ConsoleError::NoActiveSkill);
            }
            if s.editing.is_dirty() {
                debug!(path = s.editing.selected_path(), "discarding unsaved draft");
            }
            s.next_generation();
            if is_dir {
                s.editing.select_directory(path);
                s.loading.file = false;
                Ok(None)
            } else {
                s.editing.select_file(path);
                s.loading.file = true;
                Ok(s.ticket())
            }
        })?;

        match ticket {
            Some(ticket) => self.fetch_file(ticket, false).await,
            None => Ok(()),
        }
    }

    /// Select `path` by looking up its kind in the loaded tree.
    pub async fn open_path(&self, path: &str) -> Result<()> {
        let is_dir = self
            .read(|s| tree::find(&s.tree, path).map(tree::TreeNode::is_dir))
            .ok_or_else(|| ConsoleError::NotFound(path.to_string()))?;
        self.select_node(path, is_dir).await
    }

    /// Replace the draft of the open file. Returns false when no file is
    /// open or its content has not arrived yet.
    pub fn update_draft(&self, text: &str) -> bool {
        self.update(|s| !s.loading.file && s.editing.update_draft(text))
    }

    /// Toggle a directory in the tree view. Returns the new state.
    pub fn toggle_expansion(&self, path: &str) -> bool {
        self.update(|s| s.expansion.toggle(path))
    }

    pub fn set_dependencies(&self, kind: DependencyKind, values: &[String]) {
        self.update(|s| {
            let own = s.active_slug().map(str::to_string);
            s.dependencies.set(kind, values, own.as_deref());
        });
    }

    /// Returns whether `value` is now in the draft.
    pub fn toggle_dependency(&self, kind: DependencyKind, value: &str) -> bool {
        self.update(|s| {
            let own = s.active_slug().map(str::to_string);
            s.dependencies.toggle(kind, value, own.as_deref())
        })
    }

    /// Reload the tree of `slug`. Dropped if another skill became active.
    pub(crate) async fn reload_tree(&self, slug: &str, expand_all: bool) -> Result<()> {
        self.update(|s| s.loading.tree = true);
        let result = self.service.get_skill_tree(slug).await;
        self.update(|s| {
            if s.active_slug() != Some(slug) {
                debug!(%slug, "dropping tree of inactive skill");
                return Ok(());
            }
            s.loading.tree = false;
            match result {
                Ok(entries) => {
                    s.set_tree(tree::normalize(&entries), expand_all);
                    Ok(())
                }
                Err(err) => {
                    warn!(%slug, error = %err, "failed to load tree");
                    s.error(format!("Failed to load files of {slug}: {err}"));
                    Err(err)
                }
            }
        })
    }

    /// Fetch the file named by `ticket` and commit it if still current.
    async fn fetch_file(&self, ticket: NodeTicket, missing_ok: bool) -> Result<()> {
        let result = self
            .service
            .get_skill_file(&ticket.slug, &ticket.path)
            .await;
        self.update(|s| {
            if !s.is_current(&ticket) {
                debug!(slug = %ticket.slug, path = %ticket.path, "dropping stale file content");
                return Ok(());
            }
            s.loading.file = false;
            match result {
                Ok(file) => {
                    s.editing.load(&file.content);
                    Ok(())
                }
                Err(err) if missing_ok && err.is_missing_resource() => {
                    debug!(slug = %ticket.slug, "skill has no manifest yet");
                    s.editing.reset();
                    Ok(())
                }
                Err(err) => {
                    warn!(path = %ticket.path, error = %err, "failed to load file");
                    s.error(format!("Failed to load {}: {err}", ticket.path));
                    Err(err)
                }
            }
        })
    }
}
