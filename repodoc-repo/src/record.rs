//! Analysis record produced by one repository scan

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Project type used when detection yields nothing
pub const UNKNOWN_PROJECT_TYPE: &str = "Unknown";

/// One accepted text file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// Path relative to the repository root, `/` separated
    pub path: String,
    /// Bytes read from disk
    pub size: u64,
    pub lines: usize,
    /// Extension with its leading dot as found on disk, empty when none
    pub extension: String,
    /// Record-budgeted content
    #[serde(skip_serializing_if = "String::is_empty")]
    pub content: String,
}

impl FileRecord {
    /// Same record without its content, as written to the audit file
    pub fn without_content(&self) -> Self {
        Self {
            content: String::new(),
            ..self.clone()
        }
    }
}

/// Result of technology detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TechnologyReport {
    #[serde(default)]
    pub frameworks: Vec<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default = "unknown_project_type")]
    pub project_type: String,
}

fn unknown_project_type() -> String {
    UNKNOWN_PROJECT_TYPE.to_string()
}

impl Default for TechnologyReport {
    fn default() -> Self {
        Self {
            frameworks: Vec::new(),
            technologies: Vec::new(),
            project_type: unknown_project_type(),
        }
    }
}

/// Aggregate result of one repository scan.
///
/// Only the scanner in this crate mutates a record; callers get read access.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRecord {
    repo_name: String,
    repo_path: String,
    files: IndexMap<String, FileRecord>,
    languages: BTreeSet<String>,
    frameworks: BTreeSet<String>,
    technologies: Vec<String>,
    dependencies: BTreeMap<String, String>,
    config_files: Vec<String>,
    total_files: usize,
    total_lines: usize,
    project_type: String,
}

impl AnalysisRecord {
    pub(crate) fn new(repo_name: String, repo_path: String) -> Self {
        Self {
            repo_name,
            repo_path,
            files: IndexMap::new(),
            languages: BTreeSet::new(),
            frameworks: BTreeSet::new(),
            technologies: Vec::new(),
            dependencies: BTreeMap::new(),
            config_files: Vec::new(),
            total_files: 0,
            total_lines: 0,
            project_type: unknown_project_type(),
        }
    }

    /// Add a file and keep the totals and extension set in step with it.
    ///
    /// Paths are unique per walk; a repeated path replaces the earlier entry
    /// and its contribution to the totals.
    pub(crate) fn insert_file(&mut self, record: FileRecord) {
        if let Some(previous) = self.files.get(&record.path) {
            self.total_lines -= previous.lines;
            self.total_files -= 1;
        }

        if !record.extension.is_empty() {
            self.languages.insert(record.extension.to_lowercase());
        }
        self.total_files += 1;
        self.total_lines += record.lines;
        self.files.insert(record.path.clone(), record);
    }

    pub(crate) fn push_config_file(&mut self, path: String) {
        self.config_files.push(path);
    }

    /// Last write wins across manifests
    pub(crate) fn merge_dependencies<I>(&mut self, dependencies: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.dependencies.extend(dependencies);
    }

    pub(crate) fn apply_technology_report(&mut self, report: TechnologyReport) {
        self.frameworks.extend(report.frameworks);
        self.technologies = report.technologies;
        self.project_type = report.project_type;
    }

    pub fn repo_name(&self) -> &str {
        &self.repo_name
    }

    pub fn repo_path(&self) -> &str {
        &self.repo_path
    }

    /// Files in traversal order
    pub fn files(&self) -> &IndexMap<String, FileRecord> {
        &self.files
    }

    pub fn file(&self, path: &str) -> Option<&FileRecord> {
        self.files.get(path)
    }

    /// Distinct lowercase extensions
    pub fn languages(&self) -> &BTreeSet<String> {
        &self.languages
    }

    pub fn frameworks(&self) -> &BTreeSet<String> {
        &self.frameworks
    }

    pub fn technologies(&self) -> &[String] {
        &self.technologies
    }

    pub fn dependencies(&self) -> &BTreeMap<String, String> {
        &self.dependencies
    }

    /// Config files in discovery order, duplicates kept
    pub fn config_files(&self) -> &[String] {
        &self.config_files
    }

    pub fn total_files(&self) -> usize {
        self.total_files
    }

    pub fn total_lines(&self) -> usize {
        self.total_lines
    }

    pub fn project_type(&self) -> &str {
        &self.project_type
    }

    /// Copy of the record with every file's content dropped
    pub fn without_content(&self) -> Self {
        Self {
            files: self
                .files
                .iter()
                .map(|(path, record)| (path.clone(), record.without_content()))
                .collect(),
            ..self.clone()
        }
    }

    /// Pretty JSON of the content-stripped record
    pub fn to_audit_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.without_content())
    }
}
