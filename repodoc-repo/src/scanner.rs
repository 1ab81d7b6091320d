//! Repository scanner
//!
//! Drives one scan through `Initialized -> Walking -> Summarizing -> Finalized`.
//! A scanner is consumed by [`RepositoryScanner::scan`], so it runs exactly once.

use std::path::{Path, PathBuf};

use repodoc_core::{
    not_found_error, repository_error, ErrorContext, RepodocConfig, RepodocError, RepodocResult,
    Summarizer,
};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::aggregator::StructuralAggregator;
use crate::budget::{Budget, ContentBudgeter};
use crate::detection::{ContextAccumulator, ContextExcerpt, TechnologyDetector};
use crate::filter::{file_extension, PathFilter};
use crate::record::{AnalysisRecord, FileRecord};
use crate::selector::KeyFileSelector;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Initialized,
    Walking,
    Summarizing,
    Finalized,
}

impl ScanState {
    fn successor(self) -> Option<ScanState> {
        match self {
            ScanState::Initialized => Some(ScanState::Walking),
            ScanState::Walking => Some(ScanState::Summarizing),
            ScanState::Summarizing => Some(ScanState::Finalized),
            ScanState::Finalized => None,
        }
    }
}

pub struct RepositoryScanner<'a> {
    root: PathBuf,
    repo_name: String,
    config: &'a RepodocConfig,
    summarizer: &'a dyn Summarizer,
    filter: PathFilter,
    budgeter: ContentBudgeter,
    selector: KeyFileSelector,
    aggregator: StructuralAggregator,
    state: ScanState,
}

impl<'a> RepositoryScanner<'a> {
    /// Validate the root and build the per-scan components from `config`
    pub fn new<P: AsRef<Path>>(
        repo_path: P,
        config: &'a RepodocConfig,
        summarizer: &'a dyn Summarizer,
    ) -> RepodocResult<Self> {
        let repo_path = repo_path.as_ref();

        if !repo_path.exists() {
            return Err(not_found_error!(repo_path.display(), "repository_scanner"));
        }

        if !repo_path.is_dir() {
            return Err(RepodocError::Repository {
                message: format!("Repository path is not a directory: {}", repo_path.display()),
                source: None,
                context: ErrorContext::new("repository_scanner")
                    .with_operation("new")
                    .with_suggestion("Pass the repository root directory, not a file inside it"),
            });
        }

        let root = std::fs::canonicalize(repo_path).map_err(|e| {
            repository_error!(
                format!("Failed to resolve repository path {}", repo_path.display()),
                "repository_scanner",
                e
            )
        })?;

        let repo_name = root
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| root.display().to_string());

        Ok(Self {
            root,
            repo_name,
            config,
            summarizer,
            filter: PathFilter::new(&config.scan),
            budgeter: ContentBudgeter::new(config.budget.clone()),
            selector: KeyFileSelector::new(&config.scan),
            aggregator: StructuralAggregator::new(&config.scan),
            state: ScanState::Initialized,
        })
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the tree, run detection once, and hand back the finished record
    pub async fn scan(mut self) -> RepodocResult<AnalysisRecord> {
        let mut record = AnalysisRecord::new(self.repo_name.clone(), self.root.display().to_string());
        let mut accumulator = ContextAccumulator::default();

        self.advance(ScanState::Walking);
        self.walk(&mut record, &mut accumulator).await;

        info!(
            repo = %self.repo_name,
            total_files = record.total_files(),
            total_lines = record.total_lines(),
            key_files = accumulator.len(),
            "Repository walk finished"
        );

        self.advance(ScanState::Summarizing);
        let report = TechnologyDetector::new(self.summarizer, &self.config.llm)
            .detect(&record, &accumulator)
            .await;
        record.apply_technology_report(report);

        self.advance(ScanState::Finalized);
        drop(accumulator);

        Ok(record)
    }

    fn advance(&mut self, next: ScanState) {
        debug_assert_eq!(
            self.state.successor(),
            Some(next),
            "scanner states only move forward"
        );
        debug!(from = ?self.state, to = ?next, "Scanner state transition");
        self.state = next;
    }

    async fn walk(&self, record: &mut AnalysisRecord, accumulator: &mut ContextAccumulator) {
        let walker = WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| self.should_traverse_entry(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(error = %e, "Could not read directory entry, skipping");
                    continue;
                }
            };

            if !self.is_regular_file(&entry).await || !self.filter.is_text_file(entry.path()) {
                continue;
            }

            if let Err(e) = self.process_file(entry.path(), record, accumulator).await {
                warn!(path = %entry.path().display(), error = %e, "Could not read file, skipping");
            }
        }
    }

    /// Plain files, plus symlinks whose target is a file.
    ///
    /// Directory links are never followed. A dangling link is logged and skipped.
    async fn is_regular_file(&self, entry: &walkdir::DirEntry) -> bool {
        if !entry.path_is_symlink() {
            return entry.file_type().is_file();
        }

        match tokio::fs::metadata(entry.path()).await {
            Ok(metadata) => metadata.is_file(),
            Err(e) => {
                warn!(path = %entry.path().display(), error = %e, "Broken symlink, skipping");
                false
            }
        }
    }

    fn should_traverse_entry(&self, entry: &walkdir::DirEntry) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return true;
        }

        let dir_name = entry.file_name().to_string_lossy();
        let skip = self.filter.should_skip_directory(&dir_name);
        if skip {
            debug!(path = %entry.path().display(), "Pruning directory");
        }
        !skip
    }

    async fn process_file(
        &self,
        file_path: &Path,
        record: &mut AnalysisRecord,
        accumulator: &mut ContextAccumulator,
    ) -> RepodocResult<()> {
        let bytes = tokio::fs::read(file_path)
            .await
            .map_err(|e| RepodocError::Repository {
                message: format!("Failed to read file {}: {}", file_path.display(), e),
                source: Some(Box::new(e)),
                context: ErrorContext::new("repository_scanner")
                    .with_operation("read_file")
                    .with_metadata("file_path", &file_path.to_string_lossy()),
            })?;

        let content = String::from_utf8_lossy(&bytes);
        let relative_path = self.relative_path(file_path);
        let file_name = file_path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = file_extension(file_path).unwrap_or_default();

        record.insert_file(FileRecord {
            path: relative_path.clone(),
            size: bytes.len() as u64,
            lines: count_lines(&content),
            extension,
            content: self.budgeter.apply(&content, Budget::Record).to_string(),
        });

        if !accumulator.is_full() && self.selector.is_key_file(file_path, &content) {
            accumulator.push(ContextExcerpt {
                path: relative_path.clone(),
                content: self.budgeter.apply(&content, Budget::AiContext).to_string(),
            });
        }

        self.aggregator
            .observe(&relative_path, &file_name, &content, record);

        Ok(())
    }

    fn relative_path(&self, file_path: &Path) -> String {
        let relative = file_path.strip_prefix(&self.root).unwrap_or(file_path);
        relative
            .components()
            .map(|component| component.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Line count treating `\n`, `\r\n` and a lone `\r` as terminators
pub fn count_lines(content: &str) -> usize {
    let mut lines = 0;
    let mut chars = content.chars().peekable();
    let mut open_line = false;

    while let Some(ch) = chars.next() {
        match ch {
            '\n' => {
                lines += 1;
                open_line = false;
            }
            '\r' => {
                chars.next_if_eq(&'\n');
                lines += 1;
                open_line = false;
            }
            _ => open_line = true,
        }
    }

    if open_line {
        lines += 1;
    }
    lines
}
