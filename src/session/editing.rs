//! The open document: which node is selected and its draft vs. saved text.

use serde::Serialize;

use crate::manifest;

/// Editing state for the selected node.
///
/// `draft == saved` exactly when there is nothing to save. Selecting a
/// directory, or nothing, forces both to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditingSession {
    selected_path: String,
    selected_is_dir: bool,
    draft_content: String,
    saved_content: String,
}

impl EditingSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Select a directory. Directories have no content.
    pub fn select_directory(&mut self, path: &str) {
        self.selected_path = path.to_string();
        self.selected_is_dir = true;
        self.draft_content.clear();
        self.saved_content.clear();
    }

    /// Move the selection to a file whose content is still being fetched.
    ///
    /// Any unsaved draft of the previous file is discarded.
    pub fn select_file(&mut self, path: &str) {
        self.selected_path = path.to_string();
        self.selected_is_dir = false;
        self.draft_content.clear();
        self.saved_content.clear();
    }

    /// Fetched content becomes both the draft and the saved baseline.
    pub fn load(&mut self, content: &str) {
        self.draft_content = content.to_string();
        self.saved_content = content.to_string();
    }

    /// Replace the draft. Ignored (returns false) unless a file is selected.
    pub fn update_draft(&mut self, text: &str) -> bool {
        if !self.has_file() {
            return false;
        }
        self.draft_content = text.to_string();
        true
    }

    /// Record `sent` as the saved content after the service accepted it.
    /// Edits made while the save was in flight stay dirty.
    pub fn mark_saved(&mut self, sent: &str) {
        self.saved_content = sent.to_string();
    }

    #[must_use]
    pub fn selected_path(&self) -> &str {
        &self.selected_path
    }

    #[must_use]
    pub const fn selected_is_dir(&self) -> bool {
        self.selected_is_dir
    }

    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft_content
    }

    #[must_use]
    pub fn saved(&self) -> &str {
        &self.saved_content
    }

    #[must_use]
    pub fn has_selection(&self) -> bool {
        !self.selected_path.is_empty()
    }

    #[must_use]
    pub fn has_file(&self) -> bool {
        self.has_selection() && !self.selected_is_dir
    }

    #[must_use]
    pub fn is_manifest_open(&self) -> bool {
        self.has_file() && manifest::is_manifest(&self.selected_path)
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.has_file() && self.draft_content != self.saved_content
    }

    #[must_use]
    pub fn can_save(&self) -> bool {
        self.is_dirty()
    }
}
