//! Archive import and export.
//!
//! Import uploads one `.zip` and, once the service has unpacked it, selects
//! the new skill. Export downloads a skill's archive and hands it to a
//! [`DownloadSink`]; whatever the sink staged is released afterwards, even
//! when delivery fails.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use regex::Regex;
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::console::Console;
use crate::error::{ConsoleError, Result};
use crate::service::{ArchiveUpload, ImportResult};

static FILENAME_STAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)filename\*\s*=\s*UTF-8''([^;]+)"#).expect("valid regex")
});

static FILENAME_QUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)filename\s*=\s*"([^"]+)""#).expect("valid regex"));

static FILENAME_BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)filename\s*=\s*([^;\s]+)").expect("valid regex"));

/// Pick the download name from a `Content-Disposition` header.
///
/// `filename*=UTF-8''...` wins over `filename="..."` and bare
/// `filename=...`; without a usable name the archive is `<slug>.zip`.
/// Path separators are stripped so the name cannot escape the target
/// directory.
#[must_use]
pub fn resolve_export_filename(content_disposition: Option<&str>, slug: &str) -> String {
    let fallback = || format!("{slug}.zip");
    let Some(header) = content_disposition else {
        return fallback();
    };

    let candidate = FILENAME_STAR
        .captures(header)
        .and_then(|caps| {
            let raw = caps.get(1)?.as_str().trim();
            urlencoding::decode(raw).ok().map(|name| name.into_owned())
        })
        .or_else(|| {
            FILENAME_QUOTED
                .captures(header)
                .and_then(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        })
        .or_else(|| {
            FILENAME_BARE
                .captures(header)
                .and_then(|caps| caps.get(1).map(|m| m.as_str().trim_matches('"').to_string()))
        });

    let name = candidate
        .map(|name| sanitize_file_name(&name))
        .unwrap_or_default();
    if name.is_empty() { fallback() } else { name }
}

fn sanitize_file_name(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let last = last.trim();
    if last == "." || last == ".." {
        String::new()
    } else {
        last.to_string()
    }
}

/// A payload staged by a [`DownloadSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedHandle {
    pub id: u64,
    pub file_name: String,
}

/// Where exported archives go.
///
/// Staging and delivery are separate so the staged resource can be
/// released no matter how delivery went.
pub trait DownloadSink: Send + Sync {
    fn stage(&self, file_name: &str, bytes: &[u8]) -> Result<StagedHandle>;

    /// Hand the staged payload to the operator. Returns its final location.
    fn deliver(&self, handle: &StagedHandle) -> Result<PathBuf>;

    fn release(&self, handle: StagedHandle);
}

/// Releases a staged payload when dropped.
struct StagedDownload<'a> {
    sink: &'a dyn DownloadSink,
    handle: Option<StagedHandle>,
}

impl<'a> StagedDownload<'a> {
    fn stage(sink: &'a dyn DownloadSink, file_name: &str, bytes: &[u8]) -> Result<Self> {
        let handle = sink.stage(file_name, bytes)?;
        Ok(Self {
            sink,
            handle: Some(handle),
        })
    }

    fn deliver(&self) -> Result<PathBuf> {
        match &self.handle {
            Some(handle) => self.sink.deliver(handle),
            None => Err(ConsoleError::Export("download already released".to_string())),
        }
    }
}

impl Drop for StagedDownload<'_> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            debug!(id = handle.id, "releasing staged download");
            self.sink.release(handle);
        }
    }
}

/// Saves archives into a directory, staging them in a temp file first.
#[derive(Debug)]
pub struct FileDownloadSink {
    dir: PathBuf,
    next_id: AtomicU64,
    staged: Mutex<HashMap<u64, NamedTempFile>>,
}

impl FileDownloadSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            next_id: AtomicU64::new(1),
            staged: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of payloads staged and not yet released.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.staged.lock().len()
    }
}

impl DownloadSink for FileDownloadSink {
    fn stage(&self, file_name: &str, bytes: &[u8]) -> Result<StagedHandle> {
        std::fs::create_dir_all(&self.dir)?;
        let mut temp = NamedTempFile::new_in(&self.dir)?;
        temp.write_all(bytes)?;
        temp.flush()?;

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.staged.lock().insert(id, temp);
        Ok(StagedHandle {
            id,
            file_name: file_name.to_string(),
        })
    }

    fn deliver(&self, handle: &StagedHandle) -> Result<PathBuf> {
        let staged = self.staged.lock();
        let temp = staged.get(&handle.id).ok_or_else(|| {
            ConsoleError::Export(format!("nothing staged for {}", handle.file_name))
        })?;
        let target = self.dir.join(&handle.file_name);
        std::fs::copy(temp.path(), &target)?;
        Ok(target)
    }

    fn release(&self, handle: StagedHandle) {
        // Dropping the temp file deletes it.
        self.staged.lock().remove(&handle.id);
    }
}

/// Outcome of an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportedArchive {
    pub slug: String,
    pub file_name: String,
    pub location: PathBuf,
    pub size: usize,
}

fn is_zip_name(file_name: &str) -> bool {
    file_name.to_lowercase().ends_with(".zip")
}

impl Console {
    /// Upload an archive and select the skill it created.
    pub async fn import_archive(&self, upload: ArchiveUpload) -> Result<ImportResult> {
        if !is_zip_name(&upload.file_name) {
            return Err(self.refuse(format!(
                "only .zip archives can be imported, got '{}'",
                upload.file_name
            )));
        }

        let result = match self.service().import_skill_zip(&upload).await {
            Ok(result) => result,
            Err(err) => {
                warn!(file = %upload.file_name, error = %err, "import failed");
                self.update(|s| s.error(format!("Failed to import {}: {err}", upload.file_name)));
                return Err(err);
            }
        };

        info!(slug = %result.slug, "skill imported");
        self.update(|s| s.info(format!("Imported skill {}", result.slug)));
        self.refresh_skills().await?;

        let record = self.read(|s| s.find_skill(&result.slug).cloned());
        match record {
            Some(record) => self.select_skill(record).await?,
            None => debug!(slug = %result.slug, "imported skill not in list yet"),
        }
        Ok(result)
    }

    /// Read an archive from disk and import it.
    pub async fn import_file(&self, path: &Path) -> Result<ImportResult> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !is_zip_name(&file_name) {
            return Err(self.refuse(format!(
                "only .zip archives can be imported, got '{}'",
                path.display()
            )));
        }
        let bytes = tokio::fs::read(path).await?;
        self.import_archive(ArchiveUpload { file_name, bytes }).await
    }

    /// Export the active skill.
    pub async fn export_selected(&self, sink: &dyn DownloadSink) -> Result<ExportedArchive> {
        let slug = self.require_active()?;
        self.export_skill(&slug, sink).await
    }

    /// Download `slug`'s archive into `sink`.
    pub async fn export_skill(&self, slug: &str, sink: &dyn DownloadSink) -> Result<ExportedArchive> {
        let payload = match self.service().export_skill(slug).await {
            Ok(payload) => payload,
            Err(err) => {
                warn!(%slug, error = %err, "export failed");
                self.update(|s| s.error(format!("Failed to export {slug}: {err}")));
                return Err(err);
            }
        };

        let file_name = resolve_export_filename(payload.content_disposition.as_deref(), slug);
        let delivered = StagedDownload::stage(sink, &file_name, &payload.bytes)
            .and_then(|staged| staged.deliver());

        match delivered {
            Ok(location) => {
                info!(%slug, location = %location.display(), "skill exported");
                self.update(|s| s.info(format!("Exported {slug} to {}", location.display())));
                Ok(ExportedArchive {
                    slug: slug.to_string(),
                    file_name,
                    location,
                    size: payload.bytes.len(),
                })
            }
            Err(err) => {
                warn!(%slug, error = %err, "saving export failed");
                self.update(|s| s.error(format!("Failed to save {file_name}: {err}")));
                Err(ConsoleError::Export(err.to_string()))
            }
        }
    }
}
