use skill_console::ConsoleError;
use skill_console::console::DeleteTarget;
use skill_console::service::mock::{ErrorInjection, MockErrorKind, MockOperation};
use skill_console::test_utils::{DEMO_SLUG, console_over, demo_service};
use skill_console::tree;

#[tokio::test]
async fn deleting_the_manifest_is_refused_without_a_request() {
    let service = demo_service();
    let console = console_over(&service);
    console.select_skill_by_slug(DEMO_SLUG).await.unwrap();
    service.clear_calls();

    for path in ["SKILL.md", " SKILL.md ", ""] {
        let err = console.prepare_delete_node(path).unwrap_err();
        assert!(matches!(err, ConsoleError::Refused(_)), "{path:?}: {err}");
    }
    assert_eq!(service.total_calls(), 0);
    assert!(service.has_node(DEMO_SLUG, "SKILL.md"));
}

#[tokio::test]
async fn blank_create_paths_are_refused_without_a_request() {
    let service = demo_service();
    let console = console_over(&service);
    console.select_skill_by_slug(DEMO_SLUG).await.unwrap();
    service.clear_calls();

    for path in ["", "   ", "../escape.md"] {
        let err = console.create_node(path, false, None).await.unwrap_err();
        assert!(err.is_policy_refusal(), "{path:?}: {err}");
    }
    assert_eq!(service.total_calls(), 0);
}

#[tokio::test]
async fn created_file_appears_with_parents_expanded() {
    let service = demo_service();
    let console = console_over(&service);
    console.select_skill_by_slug(DEMO_SLUG).await.unwrap();

    let path = console
        .create_node(" scripts\\setup.sh ", false, Some("#!/bin/sh\n".into()))
        .await
        .unwrap();

    assert_eq!(path, "scripts/setup.sh");
    assert_eq!(
        service.file_content(DEMO_SLUG, "scripts/setup.sh").as_deref(),
        Some("#!/bin/sh\n")
    );
    console.read(|s| {
        assert!(tree::contains(&s.tree, "scripts/setup.sh"));
        assert!(s.expansion.is_expanded("scripts"));
    });
}

#[tokio::test]
async fn creating_an_existing_path_fails_without_changing_state() {
    let service = demo_service();
    let console = console_over(&service);
    console.select_skill_by_slug(DEMO_SLUG).await.unwrap();
    let before = console.read(|s| s.tree.clone());

    let err = console.create_node("src/main.py", false, None).await.unwrap_err();

    assert!(matches!(err, ConsoleError::Service { .. }));
    assert_eq!(console.read(|s| s.tree.clone()), before);
}

#[tokio::test]
async fn deleting_a_directory_removes_its_subtree() {
    let service = demo_service();
    let console = console_over(&service);
    console.select_skill_by_slug(DEMO_SLUG).await.unwrap();
    console.open_path("src/main.py").await.unwrap();

    let intent = console.prepare_delete_node("src").unwrap();
    assert_eq!(
        intent.target(),
        &DeleteTarget::Node {
            slug: DEMO_SLUG.into(),
            path: "src".into()
        }
    );
    console.delete(intent.confirm()).await.unwrap();

    assert!(!service.has_node(DEMO_SLUG, "src/main.py"));
    console.read(|s| {
        assert!(!tree::contains(&s.tree, "src"));
        assert!(!s.editing.has_selection());
    });
}

#[tokio::test]
async fn deleting_another_file_still_closes_the_open_one() {
    let service = demo_service();
    let console = console_over(&service);
    console.select_skill_by_slug(DEMO_SLUG).await.unwrap();
    console.open_path("docs/usage.md").await.unwrap();
    console.update_draft("# Usage\nunsaved\n");

    let intent = console.prepare_delete_node("src/main.py").unwrap();
    console.delete(intent.confirm()).await.unwrap();

    assert!(!service.has_node(DEMO_SLUG, "src/main.py"));
    assert!(service.has_node(DEMO_SLUG, "docs/usage.md"));
    console.read(|s| {
        assert!(!s.editing.has_selection());
        assert!(!s.is_dirty());
        assert!(tree::contains(&s.tree, "docs/usage.md"));
    });
    let err = console.commit_save().await.unwrap_err();
    assert!(matches!(err, ConsoleError::NoOpenFile));
}

#[tokio::test]
async fn deleting_a_skill_clears_everything_about_it() {
    let service = demo_service();
    let console = console_over(&service);
    console.select_skill_by_slug(DEMO_SLUG).await.unwrap();

    let intent = console.prepare_delete_skill(DEMO_SLUG).unwrap();
    console.delete(intent.confirm()).await.unwrap();

    console.read(|s| {
        assert!(s.find_skill(DEMO_SLUG).is_none());
        assert!(s.active.is_none());
        assert!(s.tree.is_empty());
        assert!(!s.editing.has_selection());
    });
    assert!(service.skills().iter().all(|s| s.slug != DEMO_SLUG));
}

#[tokio::test]
async fn failed_skill_delete_keeps_the_selection() {
    let service = demo_service();
    let console = console_over(&service);
    console.select_skill_by_slug(DEMO_SLUG).await.unwrap();
    service.inject_error(ErrorInjection::Operation(
        MockOperation::DeleteSkill,
        MockErrorKind::Rejected(409),
    ));

    let intent = console.prepare_delete_skill(DEMO_SLUG).unwrap();
    let err = console.delete(intent.confirm()).await.unwrap_err();

    assert!(matches!(err, ConsoleError::Service { status: 409, .. }));
    console.read(|s| {
        assert_eq!(s.active_slug(), Some(DEMO_SLUG));
        assert!(s.find_skill(DEMO_SLUG).is_some());
    });
}
