use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::error::{Result, RunboxError};
use crate::job::JobId;
use crate::languages::LanguageDescriptor;

/// A rendered source file written to a caller's staging directory.
#[derive(Debug, Clone)]
pub struct StagedSource {
    pub path: PathBuf,
    pub file_name: String,
}

/// Per-caller directories holding rendered sources before they are copied
/// into a container.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn caller_dir(&self, caller: &str) -> PathBuf {
        self.root.join(sanitize_caller(caller))
    }

    /// Render `code` for `lang` and write it as `<job_id>.<ext>`.
    ///
    /// Never overwrites: an existing file with the same name yields
    /// [`RunboxError::JobIdCollision`].
    pub async fn write(
        &self,
        caller: &str,
        job_id: &JobId,
        lang: &LanguageDescriptor,
        code: &str,
    ) -> Result<StagedSource> {
        let dir = self.caller_dir(caller);
        fs::create_dir_all(&dir).await?;

        let file_name = lang.file_name(job_id.as_str());
        let path = dir.join(&file_name);

        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(RunboxError::JobIdCollision {
                    path: path.display().to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let source = lang.render_source(code, job_id.as_str());
        file.write_all(source.as_bytes()).await?;
        file.flush().await?;

        debug!(path = %path.display(), bytes = source.len(), "Staged source");
        Ok(StagedSource { path, file_name })
    }

    /// Best-effort removal of a staged file.
    pub async fn remove(&self, staged: &StagedSource) {
        if let Err(e) = fs::remove_file(&staged.path).await {
            warn!(path = %staged.path.display(), error = %e, "Failed to remove staged source");
        }
    }
}

/// Map a caller key onto a single safe path component.
fn sanitize_caller(caller: &str) -> String {
    let cleaned: String = caller
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}
