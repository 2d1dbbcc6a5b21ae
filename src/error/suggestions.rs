//! Context-aware error suggestions.
//!
//! Complements the static suggestions in the `codes` module with hints that
//! mention the skill or path the error was about.

use serde_json::Value;

use super::codes::ErrorCode;

/// Generate a context-aware suggestion for an error.
pub fn suggest_for_error(code: ErrorCode, context: Option<&Value>) -> String {
    match code {
        ErrorCode::SkillNotFound => suggest_skill_not_found(context),
        ErrorCode::ResourceNotFound => suggest_resource_not_found(context),
        ErrorCode::PolicyRefused => suggest_policy_refused(context),
        ErrorCode::ServiceRejected => suggest_service_rejected(context),
        _ => code.suggestion().to_string(),
    }
}

fn str_field<'a>(context: Option<&'a Value>, key: &str) -> Option<&'a str> {
    context.and_then(|c| c.get(key)).and_then(Value::as_str)
}

fn suggest_skill_not_found(context: Option<&Value>) -> String {
    match str_field(context, "slug") {
        Some(slug) => format!(
            "Skill '{slug}' is not known to the service. Run `skc list` to refresh the skill list"
        ),
        None => ErrorCode::SkillNotFound.suggestion().to_string(),
    }
}

fn suggest_resource_not_found(context: Option<&Value>) -> String {
    match str_field(context, "resource") {
        Some(resource) => format!(
            "'{resource}' does not exist. It may have been deleted; reload the tree and pick another node"
        ),
        None => ErrorCode::ResourceNotFound.suggestion().to_string(),
    }
}

fn suggest_policy_refused(context: Option<&Value>) -> String {
    match str_field(context, "reason") {
        Some(reason) if reason.contains("SKILL.md") => {
            "SKILL.md is required by every skill and cannot be deleted. Edit it instead".to_string()
        }
        Some(reason) if reason.contains("empty") => {
            "Enter a path relative to the skill root, e.g. `scripts/run.py`".to_string()
        }
        _ => ErrorCode::PolicyRefused.suggestion().to_string(),
    }
}

fn suggest_service_rejected(context: Option<&Value>) -> String {
    match context.and_then(|c| c.get("status")).and_then(Value::as_u64) {
        Some(401 | 403) => {
            "The service refused the credentials. Set `service.token` or SKC_TOKEN".to_string()
        }
        Some(status) if status >= 500 => {
            "The service failed internally. Retry shortly; nothing was changed locally".to_string()
        }
        _ => ErrorCode::ServiceRejected.suggestion().to_string(),
    }
}
