//! Core configuration data types
//!
//! Scanning policy lives here as plain tables so that every list the scanner
//! consults can be overridden from a config file.

use serde::{Deserialize, Serialize};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RepodocConfig {
    pub scan: ScanProfile,
    pub budget: BudgetConfig,
    pub llm: LlmConfig,
    pub readme: ReadmeConfig,
}

/// Declarative tables driving traversal, classification and aggregation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanProfile {
    /// Directory names never descended into (matched case-insensitively)
    pub skip_dirs: Vec<String>,
    /// Extensions (with leading dot) treated as text without further checks
    pub text_extensions: Vec<String>,
    /// Extensionless file names treated as text
    pub extensionless_text_names: Vec<String>,
    /// Manifest and build descriptor names that always count as key files
    pub key_file_names: Vec<String>,
    /// Filename substrings marking entry points
    pub entry_point_markers: Vec<String>,
    /// Keywords looked for in the head of a file to spot imports
    pub import_keywords: Vec<String>,
    /// Names recorded in the config-file list
    pub config_file_names: Vec<String>,
    /// The one manifest whose dependencies are extracted
    pub package_manifest: String,
}

/// Character caps for the three places content crosses a boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Stored with each file record
    pub record_cap: usize,
    /// Excerpts sent for technology detection
    pub ai_context_cap: usize,
    /// Snippets embedded into the README prompt
    pub prompt_snippet_cap: usize,
}

/// Settings for the chat completion service
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider label, used in logs and errors
    pub provider: String,
    /// Base URL of an OpenAI-compatible API
    pub base_url: String,
    /// API key (optional, can be set via environment)
    pub api_key: Option<String>,
    /// Environment variable consulted when `api_key` is unset
    pub api_key_env: String,
    pub detection_model: String,
    pub detection_max_tokens: u32,
    pub detection_temperature: f32,
    pub documentation_model: String,
    pub documentation_max_tokens: u32,
    pub documentation_temperature: f32,
}

/// README context assembly
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadmeConfig {
    /// Number of files listed in the structure sample
    pub listing_limit: usize,
    /// Number of files whose snippets are embedded
    pub snippet_file_limit: usize,
    /// Path substrings that make a listed file worth a snippet
    pub snippet_path_markers: Vec<String>,
    /// Content markers (setup hints, secrets) that make a file worth a snippet
    pub snippet_content_markers: Vec<String>,
}

/// One outbound chat completion request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}
