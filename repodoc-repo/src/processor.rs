//! Repository acquisition
//!
//! Fetches a remote repository with the system `git` binary so it can be
//! scanned like any local directory.

use std::path::Path;

use repodoc_core::{ErrorContext, RepodocError, RepodocResult};
use tokio::process::Command;
use tracing::info;

/// Options passed through to `git clone`
#[derive(Debug, Clone, Default)]
pub struct CloneOptions {
    /// `None` clones full history, `Some(1)` makes a shallow clone
    pub depth: Option<u32>,
}

/// Clone `url` into `target_path` using the git command line
pub async fn clone_repository(
    url: &str,
    target_path: &Path,
    options: &CloneOptions,
) -> RepodocResult<()> {
    info!(
        repo_url = %url,
        target_path = %target_path.display(),
        "Starting repository clone"
    );

    if let Some(parent) = target_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| RepodocError::Repository {
                message: format!("Failed to create parent directory: {}", e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("repository_processor")
                    .with_operation("clone_repository"),
            })?;
    }

    let mut cmd = Command::new("git");
    cmd.arg("clone");

    if let Some(depth) = options.depth {
        cmd.arg("--depth").arg(depth.to_string());
        cmd.arg("--single-branch");
    }

    cmd.arg(url).arg(target_path);

    let output = cmd.output().await.map_err(|e| RepodocError::Repository {
        message: format!("Failed to execute git clone: {}", e),
        source: Some(Box::new(e)),
        context: ErrorContext::new("repository_processor")
            .with_operation("clone_repository")
            .with_suggestion("Ensure git is installed and accessible"),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(RepodocError::Repository {
            message: format!("Git clone failed: {}", stderr.trim()),
            source: None,
            context: ErrorContext::new("repository_processor")
                .with_operation("clone_repository")
                .with_metadata("repo_url", url)
                .with_suggestion("Check repository URL and access permissions"),
        });
    }

    info!(
        repo_url = %url,
        target_path = %target_path.display(),
        "Repository cloned successfully"
    );

    Ok(())
}
