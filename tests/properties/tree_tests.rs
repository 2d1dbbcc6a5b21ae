//! Tree conversion keeps shape, order and paths.

use proptest::prelude::*;

use skill_console::service::TreeEntry;
use skill_console::tree::{self, ExpansionState};

fn arb_entries(prefix: String, depth: u32) -> BoxedStrategy<Vec<TreeEntry>> {
    let names = prop::collection::btree_set("[a-z][a-z0-9_]{0,6}", 0..4);
    names
        .prop_flat_map(move |names| {
            let prefix = prefix.clone();
            let nodes: Vec<BoxedStrategy<TreeEntry>> = names
                .into_iter()
                .map(|name| {
                    let path = if prefix.is_empty() {
                        name.clone()
                    } else {
                        format!("{prefix}/{name}")
                    };
                    if depth == 0 {
                        Just(file(&path, &name)).boxed()
                    } else {
                        let dir_path = path.clone();
                        prop_oneof![
                            Just(file(&path, &name)),
                            arb_entries(dir_path.clone(), depth - 1).prop_map(move |children| {
                                TreeEntry {
                                    path: dir_path.clone(),
                                    name: name.clone(),
                                    is_dir: true,
                                    children: Some(children),
                                }
                            }),
                        ]
                        .boxed()
                    }
                })
                .collect();
            nodes
        })
        .boxed()
}

fn file(path: &str, name: &str) -> TreeEntry {
    TreeEntry {
        path: path.to_string(),
        name: name.to_string(),
        is_dir: false,
        children: None,
    }
}

fn count(entries: &[TreeEntry]) -> (usize, usize) {
    entries.iter().fold((0, 0), |(dirs, files), entry| {
        if entry.is_dir {
            let (d, f) = count(entry.children.as_deref().unwrap_or_default());
            (dirs + 1 + d, files + f)
        } else {
            (dirs, files + 1)
        }
    })
}

proptest! {
    #[test]
    fn normalize_round_trips_through_entries(entries in arb_entries(String::new(), 3)) {
        let nodes = tree::normalize(&entries);
        prop_assert_eq!(tree::to_entries(&nodes), entries.clone());
        prop_assert_eq!(tree::normalize(&tree::to_entries(&nodes)), nodes);
    }

    #[test]
    fn fully_expanded_rows_cover_every_node(entries in arb_entries(String::new(), 3)) {
        let nodes = tree::normalize(&entries);
        let (dirs, files) = count(&entries);

        let mut expansion = ExpansionState::new();
        expansion.expand_all(&nodes);
        prop_assert_eq!(expansion.len(), dirs);
        prop_assert_eq!(tree::directory_keys(&nodes).len(), dirs);

        let rows = tree::visible_rows(&nodes, &expansion);
        prop_assert_eq!(rows.len(), dirs + files);
        for row in &rows {
            prop_assert!(tree::contains(&nodes, &row.path));
            prop_assert_eq!(row.depth, row.path.matches('/').count());
        }
    }

    #[test]
    fn collapsed_tree_shows_only_top_level(entries in arb_entries(String::new(), 2)) {
        let nodes = tree::normalize(&entries);
        let rows = tree::visible_rows(&nodes, &ExpansionState::new());
        prop_assert_eq!(rows.len(), entries.len());
        prop_assert!(rows.iter().all(|row| row.depth == 0 && !row.expanded));
    }

    #[test]
    fn retain_existing_drops_vanished_directories(entries in arb_entries(String::new(), 2)) {
        let nodes = tree::normalize(&entries);
        let mut expansion = ExpansionState::new();
        expansion.expand_all(&nodes);
        expansion.expand("gone/away");
        expansion.retain_existing(&nodes);
        prop_assert!(!expansion.is_expanded("gone/away"));
        prop_assert_eq!(expansion.len(), tree::directory_keys(&nodes).len());
    }
}
