use skill_console::service::mock::MockOperation;
use skill_console::session::DependencyKind;
use skill_console::test_utils::{DEMO_SLUG, console_over, demo_service};

#[tokio::test]
async fn skill_options_never_include_the_selected_skill() {
    let service = demo_service();
    let console = console_over(&service);
    console.mount().await.unwrap();
    console.select_skill_by_slug(DEMO_SLUG).await.unwrap();

    let options = console.read(|s| s.skill_dependency_options());
    assert_eq!(options, vec!["helper".to_string()]);

    assert!(!console.toggle_dependency(DependencyKind::Skill, DEMO_SLUG));
    assert!(console.read(|s| s.dependencies.skills.is_empty()));
}

#[tokio::test]
async fn saved_dependencies_replace_the_record() {
    let service = demo_service();
    let console = console_over(&service);
    console.select_skill_by_slug(DEMO_SLUG).await.unwrap();

    assert!(console.toggle_dependency(DependencyKind::Tool, "jq"));
    console.set_dependencies(DependencyKind::Mcp, &["filesystem".to_string()]);
    assert!(console.read(|s| s.can_save_dependencies()));

    let record = console.save_dependencies().await.unwrap();

    assert_eq!(record.tool_dependencies, vec!["git".to_string(), "jq".to_string()]);
    assert_eq!(record.mcp_dependencies, vec!["filesystem".to_string()]);
    console.read(|s| {
        assert!(!s.can_save_dependencies());
        assert_eq!(s.active.as_ref().unwrap().tool_dependencies, record.tool_dependencies);
    });
}

#[tokio::test]
async fn unchanged_dependencies_are_not_sent() {
    let service = demo_service();
    let console = console_over(&service);
    console.select_skill_by_slug(DEMO_SLUG).await.unwrap();

    let err = console.save_dependencies().await.unwrap_err();

    assert!(err.is_policy_refusal());
    assert_eq!(service.call_count(MockOperation::UpdateDependencies), 0);
}
