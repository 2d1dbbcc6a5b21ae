//! Path guards never panic and never let an escaping path through.

use proptest::prelude::*;

use skill_console::console::{check_deletable, normalize_new_path};
use skill_console::manifest::MANIFEST_PATH;
use skill_console::transfer::resolve_export_filename;

proptest! {
    #[test]
    fn normalized_paths_are_relative_and_stable(
        lead in " {0,3}",
        core in r"[/\\a-z.]{0,24}",
        trail in " {0,3}",
    ) {
        let raw = format!("{lead}{core}{trail}");
        if let Ok(path) = normalize_new_path(&raw) {
            prop_assert!(!path.is_empty());
            prop_assert!(!path.starts_with('/'));
            prop_assert!(!path.contains('\\'));
            prop_assert!(path.split('/').all(|segment| segment != ".."));
            prop_assert_eq!(normalize_new_path(&path).ok(), Some(path.clone()));
        }
    }

    #[test]
    fn manifest_is_never_deletable(pad in "( {0,3}|/{0,3})") {
        let raw = format!("{pad}{MANIFEST_PATH}{pad}");
        prop_assert!(check_deletable(&raw).is_err());
    }

    #[test]
    fn export_name_stays_in_target_dir(header in ".{0,60}", slug in "[a-z]{1,8}") {
        let name = resolve_export_filename(Some(&header), &slug);
        prop_assert!(!name.is_empty());
        prop_assert!(!name.contains('/'));
        prop_assert!(!name.contains('\\'));
        prop_assert!(name != "." && name != "..");
    }
}
