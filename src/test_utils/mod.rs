//! Shared test utilities for skill-console.
//!
//! Fixtures build a [`MockSkillService`](crate::service::MockSkillService)
//! seeded with a small, realistic skill set and a console on top of it.

pub mod fixtures;

pub use fixtures::{ConfigFixture, DEMO_SLUG, console_over, demo_manifest, demo_service};
