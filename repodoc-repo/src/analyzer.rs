//! Repository analysis entry point

use std::path::Path;

use repodoc_core::{performance, RepodocConfig, RepodocResult, Summarizer};
use tracing::info;

use crate::record::AnalysisRecord;
use crate::scanner::RepositoryScanner;

/// Scan `repo_path` and run technology detection through `summarizer`
pub async fn analyze_repository<P: AsRef<Path>>(
    repo_path: P,
    config: &RepodocConfig,
    summarizer: &dyn Summarizer,
) -> RepodocResult<AnalysisRecord> {
    let scanner = RepositoryScanner::new(repo_path, config, summarizer)?;

    info!(root = %scanner.root().display(), "Analyzing repository");

    let record = performance::measure_async("repository_scan", scanner.scan()).await?;

    info!(
        repo = record.repo_name(),
        total_files = record.total_files(),
        total_lines = record.total_lines(),
        languages = record.languages().len(),
        frameworks = record.frameworks().len(),
        dependencies = record.dependencies().len(),
        project_type = record.project_type(),
        "Repository analysis complete"
    );

    Ok(record)
}
