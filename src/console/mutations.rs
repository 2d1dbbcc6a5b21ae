//! Save, create and delete, with their effects on the open document.
//!
//! Mutations are never optimistic: local state changes only after the
//! service accepted the request. Inputs the service would refuse anyway
//! (empty paths, `..`, deleting `SKILL.md`) are refused before a request
//! is made.

use tracing::{debug, info, warn};

use crate::error::{ConsoleError, Result};
use crate::manifest::{self, MANIFEST_PATH};
use crate::service::{DependencyUpdate, FileCreate, FileUpdate, Skill};

use super::Console;

/// What a delete would remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    Node { slug: String, path: String },
    Skill { slug: String },
}

/// A delete that still needs the operator's confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a delete only happens once the intent is confirmed"]
pub struct DeleteIntent {
    target: DeleteTarget,
}

impl DeleteIntent {
    #[must_use]
    pub const fn target(&self) -> &DeleteTarget {
        &self.target
    }

    /// Question to put to the operator.
    #[must_use]
    pub fn description(&self) -> String {
        match &self.target {
            DeleteTarget::Node { slug, path } => {
                format!("Delete '{path}' from skill '{slug}'? This cannot be undone.")
            }
            DeleteTarget::Skill { slug } => {
                format!("Delete skill '{slug}' and all of its files? This cannot be undone.")
            }
        }
    }

    /// The operator said yes.
    pub fn confirm(self) -> ConfirmedDelete {
        ConfirmedDelete {
            target: self.target,
        }
    }
}

/// A confirmed delete, accepted by [`Console::delete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmedDelete {
    target: DeleteTarget,
}

impl ConfirmedDelete {
    #[must_use]
    pub const fn target(&self) -> &DeleteTarget {
        &self.target
    }
}

/// Normalize a user-typed path for a new node: trim, `\` to `/`, no
/// leading `/`. Empty paths and `..` segments are refused.
pub fn normalize_new_path(raw: &str) -> Result<String> {
    let path = raw.trim().replace('\\', "/");
    let path = path.trim_start_matches('/').trim_end_matches('/');
    if path.is_empty() {
        return Err(ConsoleError::Refused("path must not be empty".to_string()));
    }
    if path.split('/').any(|segment| segment == "..") {
        return Err(ConsoleError::Refused(
            "path must not contain '..' segments".to_string(),
        ));
    }
    Ok(path.to_string())
}

/// Refuse deleting nothing or the manifest.
pub fn check_deletable(path: &str) -> Result<String> {
    let path = path.trim().trim_matches('/');
    if path.is_empty() {
        return Err(ConsoleError::Refused("path must not be empty".to_string()));
    }
    if manifest::is_manifest(path) {
        return Err(ConsoleError::Refused(format!(
            "{MANIFEST_PATH} is required and cannot be deleted"
        )));
    }
    Ok(path.to_string())
}

fn ancestors(path: &str) -> Vec<String> {
    let segments: Vec<&str> = path.split('/').collect();
    (1..segments.len())
        .map(|end| segments[..end].join("/"))
        .collect()
}

impl Console {
    /// Send the draft of the open file.
    ///
    /// Saving `SKILL.md` refreshes the skill list once, since the service
    /// derives name and description from it.
    pub async fn commit_save(&self) -> Result<()> {
        let prepared = self.update(|s| -> Result<std::result::Result<_, &'static str>> {
            let slug = s
                .active_slug()
                .map(str::to_string)
                .ok_or(ConsoleError::NoActiveSkill)?;
            if !s.editing.has_selection() {
                return Err(ConsoleError::NoOpenFile);
            }
            if s.editing.selected_is_dir() {
                return Ok(Err("a directory cannot be saved"));
            }
            if s.loading.file {
                return Ok(Err("the file is still loading"));
            }
            if s.loading.saving {
                return Ok(Err("a save is already in progress"));
            }
            if !s.editing.is_dirty() {
                return Ok(Err("nothing to save"));
            }
            let path = s.editing.selected_path().to_string();
            let content = s.editing.draft().to_string();
            if manifest::is_manifest(&path) {
                if let Some(warning) = manifest::manifest_warning(&slug, &content) {
                    s.warn(warning);
                }
            }
            s.loading.saving = true;
            Ok(Ok((slug, path, content)))
        })?;
        let (slug, path, content) = prepared.map_err(|reason| self.refuse(reason))?;

        let update = FileUpdate {
            path: path.clone(),
            content,
        };
        let result = self.service.update_skill_file(&slug, &update).await;

        self.update(|s| {
            s.loading.saving = false;
            match result {
                Ok(()) => {
                    let still_open = s.active_slug() == Some(slug.as_str())
                        && s.editing.has_file()
                        && s.editing.selected_path() == path;
                    if still_open {
                        s.editing.mark_saved(&update.content);
                    }
                    info!(%slug, %path, "file saved");
                    s.info(format!("Saved {path}"));
                    Ok(())
                }
                Err(err) => {
                    warn!(%slug, %path, error = %err, "save failed");
                    s.error(format!("Failed to save {path}: {err}"));
                    Err(err)
                }
            }
        })?;

        if manifest::is_manifest(&path) {
            if let Err(err) = self.refresh_skills().await {
                debug!(error = %err, "refresh after manifest save failed");
            }
        }
        Ok(())
    }

    /// Create a file or directory in the active skill. Returns the
    /// normalized path.
    pub async fn create_node(
        &self,
        raw_path: &str,
        is_dir: bool,
        content: Option<String>,
    ) -> Result<String> {
        let path = normalize_new_path(raw_path).map_err(|err| self.refuse(err_reason(err)))?;
        let slug = self.require_active()?;

        let create = FileCreate {
            path: path.clone(),
            is_dir,
            content: if is_dir {
                None
            } else {
                Some(content.unwrap_or_default())
            },
        };
        if let Err(err) = self.service.create_skill_file(&slug, &create).await {
            warn!(%slug, %path, error = %err, "create failed");
            self.update(|s| s.error(format!("Failed to create {path}: {err}")));
            return Err(err);
        }

        info!(%slug, %path, is_dir, "node created");
        self.update(|s| s.info(format!("Created {path}")));
        self.reload_tree(&slug, false).await?;
        self.update(|s| {
            if s.active_slug() == Some(slug.as_str()) {
                for dir in ancestors(&path) {
                    s.expansion.expand(&dir);
                }
            }
        });
        Ok(path)
    }

    /// Ask to delete a node of the active skill.
    pub fn prepare_delete_node(&self, path: &str) -> Result<DeleteIntent> {
        let path = check_deletable(path).map_err(|err| self.refuse(err_reason(err)))?;
        let slug = self.require_active()?;
        Ok(DeleteIntent {
            target: DeleteTarget::Node { slug, path },
        })
    }

    /// Ask to delete a whole skill.
    pub fn prepare_delete_skill(&self, slug: &str) -> Result<DeleteIntent> {
        let slug = slug.trim();
        if slug.is_empty() {
            return Err(self.refuse("skill slug must not be empty"));
        }
        Ok(DeleteIntent {
            target: DeleteTarget::Skill {
                slug: slug.to_string(),
            },
        })
    }

    /// Carry out a confirmed delete.
    pub async fn delete(&self, confirmed: ConfirmedDelete) -> Result<()> {
        match confirmed.target {
            DeleteTarget::Node { slug, path } => self.delete_node(&slug, &path).await,
            DeleteTarget::Skill { slug } => self.delete_skill(&slug).await,
        }
    }

    async fn delete_node(&self, slug: &str, path: &str) -> Result<()> {
        if let Err(err) = self.service.delete_skill_file(slug, path).await {
            warn!(%slug, %path, error = %err, "delete failed");
            self.update(|s| s.error(format!("Failed to delete {path}: {err}")));
            return Err(err);
        }

        info!(%slug, %path, "node deleted");
        let still_active = self.update(|s| {
            s.info(format!("Deleted {path}"));
            let active = s.active_slug() == Some(slug);
            if active {
                s.reset_editing();
            }
            active
        });
        if still_active {
            self.reload_tree(slug, false).await?;
        }
        Ok(())
    }

    async fn delete_skill(&self, slug: &str) -> Result<()> {
        if let Err(err) = self.service.delete_skill(slug).await {
            warn!(%slug, error = %err, "skill delete failed");
            self.update(|s| s.error(format!("Failed to delete skill {slug}: {err}")));
            return Err(err);
        }

        info!(%slug, "skill deleted");
        self.update(|s| {
            s.clear_selection();
            s.remove_skill(slug);
            s.info(format!("Deleted skill {slug}"));
        });
        if let Err(err) = self.refresh_skills().await {
            debug!(error = %err, "refresh after skill delete failed");
        }
        Ok(())
    }

    /// Send the dependency draft. Returns the record the service stored.
    pub async fn save_dependencies(&self) -> Result<Skill> {
        let prepared = self.update(|s| -> Result<Option<(String, DependencyUpdate)>> {
            let record = s.active.as_ref().ok_or(ConsoleError::NoActiveSkill)?;
            if !s.dependencies.is_changed(record) {
                return Ok(None);
            }
            Ok(Some((record.slug.clone(), s.dependencies.to_update())))
        })?;
        let Some((slug, update)) = prepared else {
            return Err(self.refuse("dependencies are unchanged"));
        };

        let record = match self.service.update_skill_dependencies(&slug, &update).await {
            Ok(record) => record,
            Err(err) => {
                warn!(%slug, error = %err, "dependency update failed");
                self.update(|s| s.error(format!("Failed to update dependencies: {err}")));
                return Err(err);
            }
        };

        info!(%slug, "dependencies updated");
        self.update(|s| {
            s.replace_record(record.clone());
            s.info(format!("Updated dependencies of {slug}"));
        });
        if let Err(err) = self.refresh_skills().await {
            debug!(error = %err, "refresh after dependency update failed");
        }
        Ok(record)
    }
}

fn err_reason(err: ConsoleError) -> String {
    match err {
        ConsoleError::Refused(reason) => reason,
        other => other.to_string(),
    }
}
