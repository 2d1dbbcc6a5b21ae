use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use crate::console::{Console, ConsoleOptions};
use crate::service::{DependencyOptions, MockSkillService, Skill, SkillService};

/// Slug of the skill every fixture service carries.
pub const DEMO_SLUG: &str = "demo";

/// A `SKILL.md` whose frontmatter names `slug`.
#[must_use]
pub fn demo_manifest(slug: &str) -> String {
    format!("---\nname: {slug}\ndescription: Demo skill used in tests\n---\n\n# {slug}\n\nRun `src/main.py`.\n")
}

/// A service holding `demo` (manifest, one script, a docs directory) plus a
/// second skill `helper`, with dependency options for all three kinds.
#[must_use]
pub fn demo_service() -> Arc<MockSkillService> {
    let mut demo = Skill::new(DEMO_SLUG, "Demo skill used in tests");
    demo.tool_dependencies = vec!["git".to_string()];
    demo.updated_at = Some("2026-01-02T03:04:05Z".to_string());

    let service = MockSkillService::new()
        .with_skill("helper", "Helper skill")
        .with_file(DEMO_SLUG, "SKILL.md", &demo_manifest(DEMO_SLUG))
        .with_file(DEMO_SLUG, "src/main.py", "print('hello')\n")
        .with_file(DEMO_SLUG, "docs/usage.md", "# Usage\n")
        .with_dependency_options(DependencyOptions {
            tools: vec!["git".to_string(), "jq".to_string()],
            mcps: vec!["filesystem".to_string()],
            skills: vec![DEMO_SLUG.to_string(), "helper".to_string()],
        });
    service.insert_skill(demo);
    Arc::new(service)
}

/// A console over `service` with default options.
#[must_use]
pub fn console_over(service: &Arc<MockSkillService>) -> Console {
    let service: Arc<dyn SkillService> = Arc::clone(service) as Arc<dyn SkillService>;
    Console::new(service, ConsoleOptions::default())
}

/// Temporary directory for config files and export targets.
pub struct ConfigFixture {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl ConfigFixture {
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        Self { temp_dir, root }
    }

    /// Write `content` to `relative_path`, creating parents.
    ///
    /// # Panics
    ///
    /// Panics on filesystem errors.
    #[must_use]
    pub fn write(&self, relative_path: &str, content: &str) -> PathBuf {
        let full_path = self.root.join(relative_path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }
}

impl Default for ConfigFixture {
    fn default() -> Self {
        Self::new()
    }
}
