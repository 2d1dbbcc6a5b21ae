//! Tree model adapter.
//!
//! Converts the nested directory description sent by the service into
//! [`TreeNode`]s keyed by their skill-relative path, and tracks which
//! directories are expanded in a view.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::service::TreeEntry;

/// A node of a skill's file tree. Files cannot have children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    File {
        path: String,
        name: String,
    },
    Directory {
        path: String,
        name: String,
        children: Vec<TreeNode>,
    },
}

impl TreeNode {
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::File { path, .. } | Self::Directory { path, .. } => path,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::File { name, .. } | Self::Directory { name, .. } => name,
        }
    }

    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self, Self::Directory { .. })
    }

    #[must_use]
    pub fn children(&self) -> &[Self] {
        match self {
            Self::Directory { children, .. } => children,
            Self::File { .. } => &[],
        }
    }
}

/// Convert service entries into tree nodes, keeping order and hierarchy.
///
/// Children attached to a file entry are dropped.
#[must_use]
pub fn normalize(entries: &[TreeEntry]) -> Vec<TreeNode> {
    entries.iter().map(normalize_entry).collect()
}

fn normalize_entry(entry: &TreeEntry) -> TreeNode {
    if entry.is_dir {
        TreeNode::Directory {
            path: entry.path.clone(),
            name: entry.name.clone(),
            children: entry.children.as_deref().map(normalize).unwrap_or_default(),
        }
    } else {
        TreeNode::File {
            path: entry.path.clone(),
            name: entry.name.clone(),
        }
    }
}

/// Inverse of [`normalize`].
#[must_use]
pub fn to_entries(nodes: &[TreeNode]) -> Vec<TreeEntry> {
    nodes
        .iter()
        .map(|node| match node {
            TreeNode::File { path, name } => TreeEntry {
                path: path.clone(),
                name: name.clone(),
                is_dir: false,
                children: None,
            },
            TreeNode::Directory {
                path,
                name,
                children,
            } => TreeEntry {
                path: path.clone(),
                name: name.clone(),
                is_dir: true,
                children: Some(to_entries(children)),
            },
        })
        .collect()
}

/// Every directory path, depth-first.
#[must_use]
pub fn directory_keys(nodes: &[TreeNode]) -> Vec<String> {
    let mut keys = Vec::new();
    collect_directories(nodes, &mut keys);
    keys
}

fn collect_directories(nodes: &[TreeNode], keys: &mut Vec<String>) {
    for node in nodes {
        if let TreeNode::Directory { path, children, .. } = node {
            keys.push(path.clone());
            collect_directories(children, keys);
        }
    }
}

#[must_use]
pub fn find<'a>(nodes: &'a [TreeNode], path: &str) -> Option<&'a TreeNode> {
    for node in nodes {
        if node.path() == path {
            return Some(node);
        }
        if let Some(found) = find(node.children(), path) {
            return Some(found);
        }
    }
    None
}

#[must_use]
pub fn contains(nodes: &[TreeNode], path: &str) -> bool {
    find(nodes, path).is_some()
}

/// Directory a new node should be created in when `selected` is the current
/// selection: the directory itself, or the parent of a file.
#[must_use]
pub fn parent_directory(selected: &str, selected_is_dir: bool) -> String {
    if selected_is_dir {
        return selected.to_string();
    }
    selected
        .rsplit_once('/')
        .map(|(dir, _)| dir.to_string())
        .unwrap_or_default()
}

/// Expanded directories of one tree view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionState {
    expanded: BTreeSet<String>,
}

impl ExpansionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_expanded(&self, path: &str) -> bool {
        self.expanded.contains(path)
    }

    pub fn expand(&mut self, path: &str) {
        self.expanded.insert(path.to_string());
    }

    pub fn collapse(&mut self, path: &str) {
        self.expanded.remove(path);
    }

    /// Returns the new state of `path`.
    pub fn toggle(&mut self, path: &str) -> bool {
        if self.expanded.remove(path) {
            false
        } else {
            self.expanded.insert(path.to_string());
            true
        }
    }

    pub fn expand_all(&mut self, nodes: &[TreeNode]) {
        self.expanded.extend(directory_keys(nodes));
    }

    pub fn clear(&mut self) {
        self.expanded.clear();
    }

    /// Forget directories that no longer exist after a reload.
    pub fn retain_existing(&mut self, nodes: &[TreeNode]) {
        let existing: BTreeSet<String> = directory_keys(nodes).into_iter().collect();
        self.expanded.retain(|path| existing.contains(path));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.expanded.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.expanded.is_empty()
    }
}

/// A tree node flattened for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleRow {
    pub path: String,
    pub name: String,
    pub depth: usize,
    pub is_dir: bool,
    pub expanded: bool,
}

/// Rows shown for `nodes`, descending only into expanded directories.
#[must_use]
pub fn visible_rows(nodes: &[TreeNode], expansion: &ExpansionState) -> Vec<VisibleRow> {
    let mut rows = Vec::new();
    push_rows(nodes, expansion, 0, &mut rows);
    rows
}

fn push_rows(
    nodes: &[TreeNode],
    expansion: &ExpansionState,
    depth: usize,
    rows: &mut Vec<VisibleRow>,
) {
    for node in nodes {
        let expanded = node.is_dir() && expansion.is_expanded(node.path());
        rows.push(VisibleRow {
            path: node.path().to_string(),
            name: node.name().to_string(),
            depth,
            is_dir: node.is_dir(),
            expanded,
        });
        if expanded {
            push_rows(node.children(), expansion, depth + 1, rows);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<TreeEntry> {
        vec![
            TreeEntry::dir(
                "src",
                vec![
                    TreeEntry::dir("src/lib", vec![TreeEntry::file("src/lib/util.py")]),
                    TreeEntry::file("src/main.py"),
                ],
            ),
            TreeEntry::file("SKILL.md"),
        ]
    }

    #[test]
    fn normalize_keeps_order_and_hierarchy() {
        let nodes = normalize(&sample());
        assert_eq!(nodes.len(), 2);
        assert!(nodes[0].is_dir());
        assert_eq!(nodes[0].children()[1].path(), "src/main.py");
        assert!(!nodes[1].is_dir());
    }

    #[test]
    fn file_children_are_dropped() {
        let mut entry = TreeEntry::file("odd.md");
        entry.children = Some(vec![TreeEntry::file("odd.md/ghost")]);
        let nodes = normalize(&[entry]);
        assert!(nodes[0].children().is_empty());
        assert!(!contains(&nodes, "odd.md/ghost"));
    }

    #[test]
    fn directory_without_children_list_is_empty() {
        let mut entry = TreeEntry::dir("empty", vec![]);
        entry.children = None;
        let nodes = normalize(&[entry]);
        assert!(nodes[0].is_dir());
        assert!(nodes[0].children().is_empty());
    }

    #[test]
    fn directory_keys_are_depth_first() {
        let nodes = normalize(&sample());
        assert_eq!(directory_keys(&nodes), vec!["src", "src/lib"]);
    }

    #[test]
    fn find_locates_nested_nodes() {
        let nodes = normalize(&sample());
        assert_eq!(find(&nodes, "src/lib/util.py").map(TreeNode::name), Some("util.py"));
        assert!(find(&nodes, "missing").is_none());
    }

    #[test]
    fn parent_directory_for_new_nodes() {
        assert_eq!(parent_directory("src/lib", true), "src/lib");
        assert_eq!(parent_directory("src/main.py", false), "src");
        assert_eq!(parent_directory("SKILL.md", false), "");
    }

    #[test]
    fn visible_rows_follow_expansion() {
        let nodes = normalize(&sample());
        let mut expansion = ExpansionState::new();
        assert_eq!(visible_rows(&nodes, &expansion).len(), 2);

        expansion.expand("src");
        let rows = visible_rows(&nodes, &expansion);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1].path, "src/lib");
        assert_eq!(rows[1].depth, 1);

        expansion.expand_all(&nodes);
        assert_eq!(visible_rows(&nodes, &expansion).len(), 5);
    }

    #[test]
    fn retain_existing_drops_vanished_directories() {
        let nodes = normalize(&sample());
        let mut expansion = ExpansionState::new();
        expansion.expand_all(&nodes);
        expansion.expand("gone");
        expansion.retain_existing(&nodes);
        assert_eq!(expansion.len(), 2);
        assert!(!expansion.toggle("src"));
        assert!(expansion.toggle("src"));
    }
}
