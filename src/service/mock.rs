//! In-memory [`SkillService`] for tests.
//!
//! `MockSkillService` keeps skills, their file trees and dependency options
//! in memory and mimics the policies of the real service closely enough for
//! state-machine tests: manifest `name` must equal the slug, `SKILL.md`
//! cannot be deleted, imports must be `.zip` and get `-v2`, `-v3`... on slug
//! conflicts.
//!
//! Three testing hooks:
//! - [`ErrorInjection`] fails a chosen operation, optionally only once.
//! - The call log ([`MockSkillService::calls`]) records every request.
//! - [`MockSkillService::gate_file`] holds a file read until released, so
//!   tests can resolve requests out of order.
//!
//! ```rust,ignore
//! let mock = MockSkillService::new().with_skill("demo", "Demo skill");
//! let gate = mock.gate_file("demo", "src/a.py");
//! // ... start a read of src/a.py, let another finish first ...
//! gate.release();
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::error::{ConsoleError, Result};
use crate::manifest::{self, MANIFEST_PATH};

use super::{
    ArchiveUpload, DependencyOptions, DependencyUpdate, ExportPayload, FileContent, FileCreate,
    FileUpdate, ImportResult, Skill, SkillService, TreeEntry, last_segment,
};

const TEXT_EXTENSIONS: &[&str] = &[
    "md", "txt", "py", "js", "ts", "json", "yaml", "yml", "toml", "ini", "cfg", "conf", "xml",
    "html", "css", "sql", "sh", "bat", "ps1", "env", "csv", "tsv", "rst", "ipynb", "vue", "jsx",
    "tsx",
];

/// Operations of the [`SkillService`] port, used to target injections and
/// to filter the call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    ListSkills,
    GetSkillTree,
    GetSkillFile,
    UpdateSkillFile,
    CreateSkillFile,
    DeleteSkillFile,
    DeleteSkill,
    ExportSkill,
    ImportSkillZip,
    GetDependencyOptions,
    UpdateDependencies,
}

/// Kind of error to inject.
#[derive(Debug, Clone)]
pub enum MockErrorKind {
    /// The resource is missing (HTTP 404).
    NotFound,
    /// The service answered 503.
    Unavailable,
    /// The service rejected the request with this status.
    Rejected(u16),
    Custom(String),
}

impl MockErrorKind {
    fn to_error(&self, context: &str) -> ConsoleError {
        match self {
            Self::NotFound => ConsoleError::NotFound(format!("mock error: {context}")),
            Self::Unavailable => ConsoleError::Service {
                status: 503,
                message: format!("mock error: {context}"),
            },
            Self::Rejected(status) => ConsoleError::Service {
                status: *status,
                message: format!("mock error: {context}"),
            },
            Self::Custom(message) => ConsoleError::Service {
                status: 500,
                message: message.clone(),
            },
        }
    }
}

/// Error injection configuration.
#[derive(Debug, Clone)]
pub enum ErrorInjection {
    /// Fail every operation.
    All(MockErrorKind),
    /// Fail every call of one operation.
    Operation(MockOperation, MockErrorKind),
    /// Fail the next call of one operation, then disarm.
    Once(MockOperation, MockErrorKind),
    /// Fail any operation addressing this path.
    Path(String, MockErrorKind),
}

/// One recorded request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub operation: MockOperation,
    pub slug: Option<String>,
    pub path: Option<String>,
}

/// Releases a gated file read.
#[derive(Debug, Clone)]
pub struct MockGate {
    notify: Arc<Notify>,
}

impl MockGate {
    /// Let the held read continue. A release before the read arrives is
    /// remembered.
    pub fn release(&self) {
        self.notify.notify_one();
    }
}

#[derive(Debug, Clone)]
enum MockNode {
    File(String),
    Dir,
}

#[derive(Debug, Default)]
struct MockState {
    skills: Vec<Skill>,
    files: HashMap<String, BTreeMap<String, MockNode>>,
    options: DependencyOptions,
    archives: HashMap<String, BTreeMap<String, String>>,
    exports: HashMap<String, ExportPayload>,
    injections: Vec<ErrorInjection>,
    gates: HashMap<(String, String), Arc<Notify>>,
    calls: Vec<MockCall>,
}

/// In-memory skill service.
#[derive(Debug, Default)]
pub struct MockSkillService {
    state: Mutex<MockState>,
}

fn rejected(message: impl Into<String>) -> ConsoleError {
    ConsoleError::Service {
        status: 400,
        message: message.into(),
    }
}

fn is_text_path(path: &str) -> bool {
    if last_segment(path) == MANIFEST_PATH {
        return true;
    }
    last_segment(path)
        .rsplit_once('.')
        .is_some_and(|(_, ext)| TEXT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn clean_path(path: &str) -> Result<String> {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Err(rejected("path must not be empty"));
    }
    if trimmed.split('/').any(|segment| segment == "..") {
        return Err(rejected("parent references are not allowed"));
    }
    Ok(trimmed.to_string())
}

fn now() -> String {
    Utc::now().to_rfc3339()
}

fn manifest_stub(slug: &str, description: &str) -> String {
    format!("---\nname: {slug}\ndescription: {description}\n---\n\n# {slug}\n")
}

fn dedup_sorted(values: &[String]) -> Vec<String> {
    let mut out: Vec<String> = values
        .iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}

fn insert_parents(tree: &mut BTreeMap<String, MockNode>, path: &str) {
    let segments: Vec<&str> = path.split('/').collect();
    for end in 1..segments.len() {
        tree.entry(segments[..end].join("/"))
            .or_insert(MockNode::Dir);
    }
}

fn build_entries(tree: &BTreeMap<String, MockNode>, parent: &str) -> Vec<TreeEntry> {
    let mut entries: Vec<TreeEntry> = tree
        .iter()
        .filter(|(path, _)| match path.rsplit_once('/') {
            Some((dir, _)) => dir == parent,
            None => parent.is_empty(),
        })
        .map(|(path, node)| match node {
            MockNode::Dir => TreeEntry::dir(path, build_entries(tree, path)),
            MockNode::File(_) => TreeEntry::file(path),
        })
        .collect();
    entries.sort_by_key(|entry| (!entry.is_dir, entry.name.to_lowercase()));
    entries
}

impl MockSkillService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a skill with a valid `SKILL.md`.
    #[must_use]
    pub fn with_skill(self, slug: &str, description: &str) -> Self {
        self.insert_skill(Skill::new(slug, description));
        self.insert_file(slug, MANIFEST_PATH, &manifest_stub(slug, description));
        self
    }

    /// Add a file (parents are created as needed).
    #[must_use]
    pub fn with_file(self, slug: &str, path: &str, content: &str) -> Self {
        self.insert_file(slug, path, content);
        self
    }

    #[must_use]
    pub fn with_dependency_options(self, options: DependencyOptions) -> Self {
        self.state.lock().options = options;
        self
    }

    /// Insert or replace a skill record. No files are created.
    pub fn insert_skill(&self, skill: Skill) {
        let mut state = self.state.lock();
        state.files.entry(skill.slug.clone()).or_default();
        match state.skills.iter_mut().find(|s| s.slug == skill.slug) {
            Some(existing) => *existing = skill,
            None => state.skills.push(skill),
        }
    }

    pub fn insert_file(&self, slug: &str, path: &str, content: &str) {
        let mut state = self.state.lock();
        let tree = state.files.entry(slug.to_string()).or_default();
        insert_parents(tree, path);
        tree.insert(path.to_string(), MockNode::File(content.to_string()));
    }

    pub fn remove_file(&self, slug: &str, path: &str) {
        if let Some(tree) = self.state.lock().files.get_mut(slug) {
            tree.remove(path);
        }
    }

    /// Register the contents of an archive the next import of `file_name`
    /// will unpack.
    pub fn register_archive(&self, file_name: &str, files: &[(&str, &str)]) {
        let files = files
            .iter()
            .map(|(path, content)| ((*path).to_string(), (*content).to_string()))
            .collect();
        self.state
            .lock()
            .archives
            .insert(file_name.to_string(), files);
    }

    /// Override the export response for a slug.
    pub fn set_export(&self, slug: &str, payload: ExportPayload) {
        self.state.lock().exports.insert(slug.to_string(), payload);
    }

    pub fn inject_error(&self, injection: ErrorInjection) {
        self.state.lock().injections.push(injection);
    }

    pub fn clear_errors(&self) {
        self.state.lock().injections.clear();
    }

    /// Hold the next read of `path` in `slug` until the gate is released.
    #[must_use]
    pub fn gate_file(&self, slug: &str, path: &str) -> MockGate {
        let notify = Arc::new(Notify::new());
        self.state
            .lock()
            .gates
            .insert((slug.to_string(), path.to_string()), Arc::clone(&notify));
        MockGate { notify }
    }

    #[must_use]
    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().calls.clone()
    }

    #[must_use]
    pub fn call_count(&self, operation: MockOperation) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|call| call.operation == operation)
            .count()
    }

    /// Total number of requests of any kind.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.state.lock().calls.len()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    #[must_use]
    pub fn skills(&self) -> Vec<Skill> {
        self.state.lock().skills.clone()
    }

    /// Stored content of a file, if it exists.
    #[must_use]
    pub fn file_content(&self, slug: &str, path: &str) -> Option<String> {
        match self.state.lock().files.get(slug)?.get(path)? {
            MockNode::File(content) => Some(content.clone()),
            MockNode::Dir => None,
        }
    }

    #[must_use]
    pub fn has_node(&self, slug: &str, path: &str) -> bool {
        self.state
            .lock()
            .files
            .get(slug)
            .is_some_and(|tree| tree.contains_key(path))
    }

    /// Record the call and apply any matching injection.
    fn begin(&self, operation: MockOperation, slug: Option<&str>, path: Option<&str>) -> Result<()> {
        let mut state = self.state.lock();
        state.calls.push(MockCall {
            operation,
            slug: slug.map(str::to_string),
            path: path.map(str::to_string),
        });

        let context = match (slug, path) {
            (Some(slug), Some(path)) => format!("{operation:?} {slug}/{path}"),
            (Some(slug), None) => format!("{operation:?} {slug}"),
            _ => format!("{operation:?}"),
        };

        let hit = state.injections.iter().position(|injection| match injection {
            ErrorInjection::All(_) => true,
            ErrorInjection::Operation(op, _) | ErrorInjection::Once(op, _) => *op == operation,
            ErrorInjection::Path(target, _) => path == Some(target.as_str()),
        });
        let Some(index) = hit else {
            return Ok(());
        };
        let error = match &state.injections[index] {
            ErrorInjection::All(kind)
            | ErrorInjection::Operation(_, kind)
            | ErrorInjection::Once(_, kind)
            | ErrorInjection::Path(_, kind) => kind.to_error(&context),
        };
        if matches!(state.injections[index], ErrorInjection::Once(..)) {
            state.injections.remove(index);
        }
        Err(error)
    }

    fn touch_skill(state: &mut MockState, slug: &str) {
        if let Some(skill) = state.skills.iter_mut().find(|s| s.slug == slug) {
            skill.updated_at = Some(now());
        }
    }

    /// Check a manifest draft and copy its metadata onto the record.
    fn apply_manifest(state: &mut MockState, slug: &str, content: &str) -> Result<()> {
        let summary = manifest::parse_frontmatter(content).map_err(|e| rejected(e.to_string()))?;
        if summary.name != slug {
            return Err(rejected("SKILL.md frontmatter.name must equal the skill slug"));
        }
        if let Some(skill) = state.skills.iter_mut().find(|s| s.slug == slug) {
            skill.name = summary.name;
            skill.description = summary.description;
        }
        Ok(())
    }

    fn available_slug(state: &MockState, base: &str) -> String {
        let taken = |candidate: &str| state.skills.iter().any(|s| s.slug == candidate);
        if !taken(base) {
            return base.to_string();
        }
        let mut index = 2;
        loop {
            let candidate = format!("{base}-v{index}");
            if !taken(&candidate) {
                return candidate;
            }
            index += 1;
        }
    }
}

fn tree_mut<'a>(
    state: &'a mut MockState,
    slug: &str,
) -> Result<&'a mut BTreeMap<String, MockNode>> {
    if !state.skills.iter().any(|s| s.slug == slug) {
        return Err(ConsoleError::SkillNotFound(slug.to_string()));
    }
    Ok(state.files.entry(slug.to_string()).or_default())
}

#[async_trait]
impl SkillService for MockSkillService {
    async fn list_skills(&self) -> Result<Vec<Skill>> {
        self.begin(MockOperation::ListSkills, None, None)?;
        Ok(self.state.lock().skills.clone())
    }

    async fn get_skill_tree(&self, slug: &str) -> Result<Vec<TreeEntry>> {
        self.begin(MockOperation::GetSkillTree, Some(slug), None)?;
        let mut state = self.state.lock();
        let tree = tree_mut(&mut state, slug)?;
        Ok(build_entries(tree, ""))
    }

    async fn get_skill_file(&self, slug: &str, path: &str) -> Result<FileContent> {
        self.begin(MockOperation::GetSkillFile, Some(slug), Some(path))?;

        let gate = self
            .state
            .lock()
            .gates
            .remove(&(slug.to_string(), path.to_string()));
        if let Some(notify) = gate {
            notify.notified().await;
        }

        let mut state = self.state.lock();
        let tree = tree_mut(&mut state, slug)?;
        match tree.get(path) {
            Some(MockNode::File(content)) => {
                if !is_text_path(path) {
                    return Err(rejected("only text files can be read"));
                }
                Ok(FileContent {
                    path: Some(path.to_string()),
                    content: content.clone(),
                })
            }
            Some(MockNode::Dir) => Err(rejected(format!("{path} is a directory"))),
            None => Err(ConsoleError::NotFound(path.to_string())),
        }
    }

    async fn update_skill_file(&self, slug: &str, update: &FileUpdate) -> Result<()> {
        self.begin(MockOperation::UpdateSkillFile, Some(slug), Some(&update.path))?;
        let path = clean_path(&update.path)?;

        let mut state = self.state.lock();
        let tree = tree_mut(&mut state, slug)?;
        match tree.get(&path) {
            Some(MockNode::File(_)) => {}
            Some(MockNode::Dir) => return Err(rejected(format!("{path} is a directory"))),
            None => return Err(ConsoleError::NotFound(path)),
        }
        if !is_text_path(&path) {
            return Err(rejected("only text files can be edited"));
        }
        if manifest::is_manifest(&path) {
            Self::apply_manifest(&mut state, slug, &update.content)?;
        }

        let tree = tree_mut(&mut state, slug)?;
        tree.insert(path, MockNode::File(update.content.clone()));
        Self::touch_skill(&mut state, slug);
        Ok(())
    }

    async fn create_skill_file(&self, slug: &str, create: &FileCreate) -> Result<()> {
        self.begin(MockOperation::CreateSkillFile, Some(slug), Some(&create.path))?;
        let path = clean_path(&create.path)?;

        let mut state = self.state.lock();
        let tree = tree_mut(&mut state, slug)?;
        if tree.contains_key(&path) {
            return Err(rejected("target already exists"));
        }

        if create.is_dir {
            insert_parents(tree, &path);
            tree.insert(path, MockNode::Dir);
        } else {
            if !is_text_path(&path) {
                return Err(rejected("only text files can be created"));
            }
            let content = create.content.clone().unwrap_or_default();
            if manifest::is_manifest(&path) {
                Self::apply_manifest(&mut state, slug, &content)?;
            }
            let tree = tree_mut(&mut state, slug)?;
            insert_parents(tree, &path);
            tree.insert(path, MockNode::File(content));
        }
        Self::touch_skill(&mut state, slug);
        Ok(())
    }

    async fn delete_skill_file(&self, slug: &str, path: &str) -> Result<()> {
        self.begin(MockOperation::DeleteSkillFile, Some(slug), Some(path))?;
        let path = clean_path(path)?;

        let mut state = self.state.lock();
        let tree = tree_mut(&mut state, slug)?;
        if !tree.contains_key(&path) {
            return Err(ConsoleError::NotFound(path));
        }
        if manifest::is_manifest(&path) {
            return Err(rejected("the root SKILL.md cannot be deleted"));
        }
        let prefix = format!("{path}/");
        tree.retain(|key, _| key != &path && !key.starts_with(&prefix));
        Self::touch_skill(&mut state, slug);
        Ok(())
    }

    async fn delete_skill(&self, slug: &str) -> Result<()> {
        self.begin(MockOperation::DeleteSkill, Some(slug), None)?;
        let mut state = self.state.lock();
        let before = state.skills.len();
        state.skills.retain(|s| s.slug != slug);
        if state.skills.len() == before {
            return Err(ConsoleError::SkillNotFound(slug.to_string()));
        }
        state.files.remove(slug);
        Ok(())
    }

    async fn export_skill(&self, slug: &str) -> Result<ExportPayload> {
        self.begin(MockOperation::ExportSkill, Some(slug), None)?;
        let mut state = self.state.lock();
        if let Some(payload) = state.exports.get(slug) {
            return Ok(payload.clone());
        }
        let tree = tree_mut(&mut state, slug)?;

        // Not a real zip: the local file header magic followed by a listing.
        let mut bytes = b"PK\x03\x04".to_vec();
        for path in tree.keys() {
            bytes.extend_from_slice(path.as_bytes());
            bytes.push(b'\n');
        }
        Ok(ExportPayload {
            bytes,
            content_disposition: Some(format!("attachment; filename=\"{slug}.zip\"")),
        })
    }

    async fn import_skill_zip(&self, upload: &ArchiveUpload) -> Result<ImportResult> {
        self.begin(MockOperation::ImportSkillZip, None, Some(&upload.file_name))?;
        if !upload.file_name.to_lowercase().ends_with(".zip") {
            return Err(rejected("only .zip archives are accepted"));
        }

        let mut state = self.state.lock();
        let files = state
            .archives
            .get(&upload.file_name)
            .cloned()
            .ok_or_else(|| rejected("archive could not be read"))?;

        let manifests: Vec<&String> = files
            .keys()
            .filter(|path| last_segment(path) == MANIFEST_PATH)
            .collect();
        let [manifest_path] = manifests.as_slice() else {
            return Err(rejected("archive must contain exactly one SKILL.md"));
        };
        let root = manifest_path
            .rsplit_once('/')
            .map(|(dir, _)| format!("{dir}/"))
            .unwrap_or_default();

        let content = &files[*manifest_path];
        let summary = manifest::parse_frontmatter(content).map_err(|e| rejected(e.to_string()))?;
        let slug = Self::available_slug(&state, &summary.name);
        let content = if slug == summary.name {
            content.clone()
        } else {
            manifest::rewrite_name(content, &slug)?
        };

        let mut tree = BTreeMap::new();
        for (path, body) in &files {
            let Some(relative) = path.strip_prefix(&root) else {
                continue;
            };
            let body = if relative == MANIFEST_PATH {
                content.clone()
            } else {
                body.clone()
            };
            insert_parents(&mut tree, relative);
            tree.insert(relative.to_string(), MockNode::File(body));
        }

        let mut skill = Skill::new(&slug, &summary.description);
        skill.dir_path = Some(format!("skills/{slug}"));
        skill.created_at = Some(now());
        skill.updated_at = skill.created_at.clone();
        state.skills.push(skill);
        state.files.insert(slug.clone(), tree);
        Ok(ImportResult { slug })
    }

    async fn get_skill_dependency_options(&self) -> Result<DependencyOptions> {
        self.begin(MockOperation::GetDependencyOptions, None, None)?;
        let state = self.state.lock();
        let mut options = state.options.clone();
        if options.skills.is_empty() {
            options.skills = state.skills.iter().map(|s| s.slug.clone()).collect();
        }
        Ok(options)
    }

    async fn update_skill_dependencies(
        &self,
        slug: &str,
        update: &DependencyUpdate,
    ) -> Result<Skill> {
        self.begin(MockOperation::UpdateDependencies, Some(slug), None)?;
        let mut state = self.state.lock();
        let skill = state
            .skills
            .iter_mut()
            .find(|s| s.slug == slug)
            .ok_or_else(|| ConsoleError::SkillNotFound(slug.to_string()))?;
        skill.tool_dependencies = dedup_sorted(&update.tool_dependencies);
        skill.mcp_dependencies = dedup_sorted(&update.mcp_dependencies);
        skill.skill_dependencies = dedup_sorted(&update.skill_dependencies);
        skill.updated_at = Some(now());
        Ok(skill.clone())
    }
}
