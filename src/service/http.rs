//! HTTP adapter for the skill service.
//!
//! All routes live under `/api/system/skills`. JSON responses come wrapped
//! as `{"success": true, "data": ...}`; bare payloads are accepted too.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ServiceConfig;
use crate::error::{ConsoleError, Result};

use super::{
    ArchiveUpload, DependencyOptions, DependencyUpdate, ExportPayload, FileContent, FileCreate,
    FileUpdate, ImportResult, Skill, SkillService, TreeEntry,
};

const API_PREFIX: &str = "/api/system/skills";
const USER_AGENT: &str = concat!("skc/", env!("CARGO_PKG_VERSION"));

/// [`SkillService`] over HTTP.
pub struct HttpSkillService {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl std::fmt::Debug for HttpSkillService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSkillService")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl HttpSkillService {
    pub fn new(base_url: &str, timeout: Duration, token: Option<String>) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ConsoleError::MissingConfig("service.base_url".to_string()));
        }
        if base_url.starts_with("http://") && token.is_some() {
            tracing::warn!("Skill service uses unencrypted HTTP. The token will be sent in plain text.");
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        Self::new(
            &config.base_url,
            Duration::from_secs(config.timeout_secs.max(1)),
            config.token.clone(),
        )
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, tail: &str) -> String {
        format!("{}{API_PREFIX}{tail}", self.base_url)
    }

    fn skill_url(&self, slug: &str, tail: &str) -> String {
        self.url(&format!("/{}{tail}", urlencoding::encode(slug)))
    }

    fn file_url(&self, slug: &str, path: &str) -> String {
        self.skill_url(slug, &format!("/file?path={}", urlencoding::encode(path)))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(
        &self,
        request: RequestBuilder,
        label: &str,
        missing: impl FnOnce() -> ConsoleError,
    ) -> Result<Response> {
        let response = self.authorize(request).send().await?;
        tracing::debug!(label, status = %response.status(), "skill service response");
        check_status(response, missing).await
    }
}

async fn check_status(
    response: Response,
    missing: impl FnOnce() -> ConsoleError,
) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::NOT_FOUND {
        return Err(missing());
    }
    let body = response.text().await.unwrap_or_default();
    Err(ConsoleError::Service {
        status: status.as_u16(),
        message: extract_message(&body, status),
    })
}

/// Pull a human message out of an error body (`detail` or `message`).
fn extract_message(body: &str, status: StatusCode) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["detail", "message", "error"] {
            if let Some(Value::String(text)) = map.get(key) {
                return text.clone();
            }
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        trimmed.to_string()
    }
}

async fn parse_data<T: DeserializeOwned>(response: Response) -> Result<T> {
    let value: Value = response.json().await?;
    unwrap_envelope(value)
}

fn unwrap_envelope<T: DeserializeOwned>(value: Value) -> Result<T> {
    if let Value::Object(map) = &value {
        if let Some(success) = map.get("success").and_then(Value::as_bool) {
            if !success {
                let message = map
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("service reported failure")
                    .to_string();
                return Err(ConsoleError::Service {
                    status: 200,
                    message,
                });
            }
            let data = map.get("data").cloned().unwrap_or(Value::Null);
            return Ok(serde_json::from_value(data)?);
        }
    }
    Ok(serde_json::from_value(value)?)
}

#[async_trait]
impl SkillService for HttpSkillService {
    async fn list_skills(&self) -> Result<Vec<Skill>> {
        let request = self.client.get(self.url(""));
        let response = self
            .send(request, "list skills", || {
                ConsoleError::NotFound("skill list endpoint".to_string())
            })
            .await?;
        parse_data(response).await
    }

    async fn get_skill_tree(&self, slug: &str) -> Result<Vec<TreeEntry>> {
        let request = self.client.get(self.skill_url(slug, "/tree"));
        let response = self
            .send(request, "skill tree", || {
                ConsoleError::SkillNotFound(slug.to_string())
            })
            .await?;
        parse_data(response).await
    }

    async fn get_skill_file(&self, slug: &str, path: &str) -> Result<FileContent> {
        let request = self.client.get(self.file_url(slug, path));
        let response = self
            .send(request, "read file", || ConsoleError::NotFound(path.to_string()))
            .await?;
        parse_data(response).await
    }

    async fn update_skill_file(&self, slug: &str, update: &FileUpdate) -> Result<()> {
        let request = self.client.put(self.skill_url(slug, "/file")).json(update);
        self.send(request, "update file", || {
            ConsoleError::NotFound(update.path.clone())
        })
        .await?;
        Ok(())
    }

    async fn create_skill_file(&self, slug: &str, create: &FileCreate) -> Result<()> {
        let request = self.client.post(self.skill_url(slug, "/file")).json(create);
        self.send(request, "create node", || {
            ConsoleError::SkillNotFound(slug.to_string())
        })
        .await?;
        Ok(())
    }

    async fn delete_skill_file(&self, slug: &str, path: &str) -> Result<()> {
        let request = self.client.delete(self.file_url(slug, path));
        self.send(request, "delete node", || ConsoleError::NotFound(path.to_string()))
            .await?;
        Ok(())
    }

    async fn delete_skill(&self, slug: &str) -> Result<()> {
        let request = self.client.delete(self.skill_url(slug, ""));
        self.send(request, "delete skill", || {
            ConsoleError::SkillNotFound(slug.to_string())
        })
        .await?;
        Ok(())
    }

    async fn export_skill(&self, slug: &str) -> Result<ExportPayload> {
        let request = self.client.get(self.skill_url(slug, "/export"));
        let response = self
            .send(request, "export skill", || {
                ConsoleError::SkillNotFound(slug.to_string())
            })
            .await?;
        let content_disposition = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?.to_vec();
        Ok(ExportPayload {
            bytes,
            content_disposition,
        })
    }

    async fn import_skill_zip(&self, upload: &ArchiveUpload) -> Result<ImportResult> {
        let part = Part::bytes(upload.bytes.clone())
            .file_name(upload.file_name.clone())
            .mime_str("application/zip")?;
        let form = Form::new().part("file", part);
        let request = self.client.post(self.url("/import")).multipart(form);
        let response = self
            .send(request, "import archive", || {
                ConsoleError::Import("import endpoint not found".to_string())
            })
            .await?;
        parse_data(response).await
    }

    async fn get_skill_dependency_options(&self) -> Result<DependencyOptions> {
        let request = self.client.get(self.url("/dependency-options"));
        let response = self
            .send(request, "dependency options", || {
                ConsoleError::NotFound("dependency options endpoint".to_string())
            })
            .await?;
        parse_data(response).await
    }

    async fn update_skill_dependencies(
        &self,
        slug: &str,
        update: &DependencyUpdate,
    ) -> Result<Skill> {
        let request = self
            .client
            .put(self.skill_url(slug, "/dependencies"))
            .json(update);
        let response = self
            .send(request, "update dependencies", || {
                ConsoleError::SkillNotFound(slug.to_string())
            })
            .await?;
        parse_data(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn service(server: &MockServer, token: Option<&str>) -> HttpSkillService {
        HttpSkillService::new(
            &server.base_url(),
            Duration::from_secs(5),
            token.map(str::to_string),
        )
        .unwrap()
    }

    #[test]
    fn rejects_empty_base_url() {
        let err = HttpSkillService::new("  ", Duration::from_secs(1), None).unwrap_err();
        assert!(matches!(err, ConsoleError::MissingConfig(_)));
    }

    #[test]
    fn unwraps_success_envelope() {
        let skills: Vec<Skill> =
            unwrap_envelope(json!({ "success": true, "data": [{ "slug": "demo" }] })).unwrap();
        assert_eq!(skills[0].slug, "demo");

        let bare: Vec<Skill> = unwrap_envelope(json!([{ "slug": "bare" }])).unwrap();
        assert_eq!(bare[0].slug, "bare");
    }

    #[test]
    fn failed_envelope_becomes_service_error() {
        let err = unwrap_envelope::<Vec<Skill>>(json!({ "success": false, "message": "nope" }))
            .unwrap_err();
        assert!(matches!(err, ConsoleError::Service { message, .. } if message == "nope"));
    }

    #[test]
    fn extracts_detail_from_error_body() {
        let message = extract_message(r#"{"detail":"目标已存在"}"#, StatusCode::BAD_REQUEST);
        assert_eq!(message, "目标已存在");
        assert_eq!(
            extract_message("", StatusCode::BAD_GATEWAY),
            "Bad Gateway"
        );
    }

    #[tokio::test]
    async fn lists_skills_with_bearer_token() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/system/skills")
                    .header("authorization", "Bearer secret");
                then.status(200).json_body(json!({
                    "success": true,
                    "data": [{ "slug": "demo", "name": "demo", "description": "d" }]
                }));
            })
            .await;

        let skills = service(&server, Some("secret")).list_skills().await.unwrap();
        mock.assert_async().await;
        assert_eq!(skills.len(), 1);
        assert_eq!(skills[0].description, "d");
    }

    #[tokio::test]
    async fn missing_file_maps_to_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/system/skills/demo/file")
                    .query_param("path", "SKILL.md");
                then.status(404).json_body(json!({ "detail": "文件不存在" }));
            })
            .await;

        let err = service(&server, None)
            .get_skill_file("demo", "SKILL.md")
            .await
            .unwrap_err();
        assert!(err.is_missing_resource());
    }

    #[tokio::test]
    async fn update_sends_path_and_content() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path("/api/system/skills/demo/file")
                    .json_body(json!({ "path": "src/main.py", "content": "print(2)" }));
                then.status(200).json_body(json!({ "success": true, "data": null }));
            })
            .await;

        service(&server, None)
            .update_skill_file(
                "demo",
                &FileUpdate {
                    path: "src/main.py".to_string(),
                    content: "print(2)".to_string(),
                },
            )
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn server_errors_carry_status_and_detail() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/system/skills/demo/file");
                then.status(400).json_body(json!({ "detail": "target exists" }));
            })
            .await;

        let err = service(&server, None)
            .create_skill_file(
                "demo",
                &FileCreate {
                    path: "notes.md".to_string(),
                    is_dir: false,
                    content: None,
                },
            )
            .await
            .unwrap_err();
        match err {
            ConsoleError::Service { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "target exists");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn export_returns_bytes_and_disposition() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/system/skills/demo/export");
                then.status(200)
                    .header("content-disposition", "attachment; filename=\"demo.zip\"")
                    .body("PK\u{3}\u{4}");
            })
            .await;

        let payload = service(&server, None).export_skill("demo").await.unwrap();
        assert_eq!(payload.bytes, b"PK\x03\x04".to_vec());
        assert_eq!(
            payload.content_disposition.as_deref(),
            Some("attachment; filename=\"demo.zip\"")
        );
    }

    #[tokio::test]
    async fn import_posts_multipart_and_reads_slug() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/system/skills/import");
                then.status(200).json_body(json!({
                    "success": true,
                    "data": { "slug": "new-one", "name": "new-one" }
                }));
            })
            .await;

        let result = service(&server, None)
            .import_skill_zip(&ArchiveUpload {
                file_name: "new-one.zip".to_string(),
                bytes: vec![1, 2, 3],
            })
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(result.slug, "new-one");
    }

    #[tokio::test]
    async fn dependency_update_returns_server_record() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(PUT).path("/api/system/skills/demo/dependencies");
                then.status(200).json_body(json!({
                    "success": true,
                    "data": { "slug": "demo", "tool_dependencies": ["search"] }
                }));
            })
            .await;

        let skill = service(&server, None)
            .update_skill_dependencies(
                "demo",
                &DependencyUpdate {
                    tool_dependencies: vec!["search".to_string(), "search".to_string()],
                    ..DependencyUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(skill.tool_dependencies, vec!["search".to_string()]);
    }
}
