//! Technology detection through the external summarizer
//!
//! Excerpts of key files are collected during the walk into a bounded
//! accumulator, sent once, and whatever comes back is turned into a
//! [`TechnologyReport`]. Nothing in this phase can fail the scan.

use std::sync::LazyLock;

use regex::Regex;
use repodoc_core::{ChatRequest, LlmConfig, Summarizer};
use tracing::{debug, error, info, warn};

use crate::record::{AnalysisRecord, TechnologyReport};

/// Most excerpts ever sent for detection
pub const AI_CONTEXT_LIMIT: usize = 10;

const DETECTION_SYSTEM_PROMPT: &str = "You are a senior software engineer who identifies frameworks, \
technologies and project types from source code. Reply with a single JSON object and nothing else.";

const DETECTION_INSTRUCTIONS: &str = r#"Identify the following for the codebase described below:

1. frameworks: every framework in use (for example React, Django, Express.js, Spring Boot)
2. technologies: libraries, tools and services (for example Docker, Redis, PostgreSQL)
3. project_type: the kind of project (for example Web Application, API, CLI Tool, Library)

Look for evidence in dependency manifests, import statements, configuration files and code structure.

Answer with exactly this JSON shape:
{
    "frameworks": ["Framework1", "Framework2"],
    "technologies": ["Technology1", "Technology2"],
    "project_type": "Project Type"
}"#;

/// Widest `{...}` span, the last resort when no balanced object parses
static GREEDY_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("greedy object pattern is valid"));

/// Excerpt of one key file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextExcerpt {
    pub path: String,
    /// AI-context budgeted content
    pub content: String,
}

/// Bounded, append-only excerpt buffer owned by a single scan
#[derive(Debug)]
pub struct ContextAccumulator {
    entries: Vec<ContextExcerpt>,
    capacity: usize,
}

impl ContextAccumulator {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Keep the excerpt if there is room; first come, first kept
    pub fn push(&mut self, excerpt: ContextExcerpt) {
        if self.is_full() {
            debug!(path = %excerpt.path, "Detection context full, dropping excerpt");
            return;
        }
        self.entries.push(excerpt);
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ContextExcerpt] {
        &self.entries
    }
}

impl Default for ContextAccumulator {
    fn default() -> Self {
        Self::new(AI_CONTEXT_LIMIT)
    }
}

/// Sends the one detection request of a scan
pub struct TechnologyDetector<'a> {
    summarizer: &'a dyn Summarizer,
    llm: &'a LlmConfig,
}

impl<'a> TechnologyDetector<'a> {
    pub fn new(summarizer: &'a dyn Summarizer, llm: &'a LlmConfig) -> Self {
        Self { summarizer, llm }
    }

    /// Ask the summarizer and recover a report; failures degrade to defaults
    pub async fn detect(
        &self,
        record: &AnalysisRecord,
        accumulator: &ContextAccumulator,
    ) -> TechnologyReport {
        let request = self.build_request(record, accumulator);

        info!(
            provider = self.summarizer.provider(),
            model = %request.model,
            excerpts = accumulator.len(),
            "Detecting frameworks and technologies"
        );

        match self.summarizer.complete(request).await {
            Ok(reply) => recover_report(&reply).unwrap_or_else(|| {
                warn!("Could not parse summarizer reply for technology detection");
                TechnologyReport::default()
            }),
            Err(e) if e.is_degradable() => {
                warn!(error = %e, "Technology detection failed, continuing without it");
                TechnologyReport::default()
            }
            Err(e) => {
                error!(
                    error_id = ?e.context().map(|c| &c.error_id),
                    error = %e,
                    "Unexpected error during technology detection, continuing without it"
                );
                TechnologyReport::default()
            }
        }
    }

    pub fn build_request(
        &self,
        record: &AnalysisRecord,
        accumulator: &ContextAccumulator,
    ) -> ChatRequest {
        let context = build_detection_context(record, accumulator);
        ChatRequest {
            model: self.llm.detection_model.clone(),
            system_prompt: DETECTION_SYSTEM_PROMPT.to_string(),
            user_prompt: format!(
                "{}\n\nCodebase analysis:\n{}\n\nRespond with ONLY the JSON object.",
                DETECTION_INSTRUCTIONS, context
            ),
            max_tokens: self.llm.detection_max_tokens,
            temperature: self.llm.detection_temperature,
        }
    }
}

/// Condensed description of the repository plus the collected excerpts
pub fn build_detection_context(record: &AnalysisRecord, accumulator: &ContextAccumulator) -> String {
    let languages: Vec<&str> = record.languages().iter().map(String::as_str).collect();

    let mut context = format!(
        "Repository: {}\nFile extensions found: {}\nTotal files: {}\n\nKey file contents:\n",
        record.repo_name(),
        languages.join(", "),
        record.total_files()
    );

    for excerpt in accumulator.entries().iter().take(AI_CONTEXT_LIMIT) {
        context.push_str(&format!("\n--- {} ---\n{}\n", excerpt.path, excerpt.content));
    }

    context
}

/// Recover a report from a reply that may wrap the JSON in prose.
///
/// Tries the whole reply, then each balanced `{...}` span in order, then the
/// widest span from the first `{` to the last `}`.
pub fn recover_report(reply: &str) -> Option<TechnologyReport> {
    let trimmed = reply.trim();

    if let Ok(report) = serde_json::from_str::<TechnologyReport>(trimmed) {
        return Some(report);
    }

    let mut search_from = 0;
    while let Some(offset) = trimmed[search_from..].find('{') {
        let start = search_from + offset;
        if let Some(candidate) = balanced_object_at(trimmed, start) {
            if let Ok(report) = serde_json::from_str::<TechnologyReport>(candidate) {
                debug!("Recovered detection report from embedded JSON");
                return Some(report);
            }
        }
        search_from = start + 1;
    }

    GREEDY_OBJECT
        .find(trimmed)
        .and_then(|found| serde_json::from_str::<TechnologyReport>(found.as_str()).ok())
}

/// The `{...}` span opening at `start`, honouring JSON strings and escapes
fn balanced_object_at(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use repodoc_core::{async_trait, config_error, ErrorContext, RepodocError, RepodocResult};

    #[test]
    fn test_plain_json_reply() {
        let report = recover_report(
            r#"{"frameworks": ["React"], "technologies": ["Docker"], "project_type": "Web Application"}"#,
        )
        .unwrap();
        assert_eq!(report.frameworks, vec!["React".to_string()]);
        assert_eq!(report.technologies, vec!["Docker".to_string()]);
        assert_eq!(report.project_type, "Web Application");
    }

    #[test]
    fn test_json_embedded_in_prose() {
        let report = recover_report(
            r#"Sure! Here you go: {"frameworks": ["Flask"], "technologies": [], "project_type": "API"}"#,
        )
        .unwrap();
        assert_eq!(report.frameworks, vec!["Flask".to_string()]);
        assert!(report.technologies.is_empty());
        assert_eq!(report.project_type, "API");
    }

    #[test]
    fn test_fenced_json_with_trailing_text() {
        let reply = "```json\n{\"frameworks\": [\"Axum\"], \"technologies\": [\"Tokio\"], \"project_type\": \"API\"}\n```\nLet me know {if} you need more.";
        let report = recover_report(reply).unwrap();
        assert_eq!(report.frameworks, vec!["Axum".to_string()]);
        assert_eq!(report.technologies, vec!["Tokio".to_string()]);
    }

    #[test]
    fn test_braces_inside_strings_do_not_end_the_object() {
        let reply = r#"Result: {"frameworks": ["Vue"], "technologies": ["a } b"], "project_type": "SPA \"{x}\""} done"#;
        let report = recover_report(reply).unwrap();
        assert_eq!(report.technologies, vec!["a } b".to_string()]);
        assert_eq!(report.project_type, "SPA \"{x}\"");
    }

    #[test]
    fn test_missing_fields_default() {
        let report = recover_report(r#"{"frameworks": ["Rails"]}"#).unwrap();
        assert_eq!(report.frameworks, vec!["Rails".to_string()]);
        assert!(report.technologies.is_empty());
        assert_eq!(report.project_type, "Unknown");
    }

    #[test]
    fn test_unparseable_reply() {
        assert!(recover_report("I could not determine anything about this project.").is_none());
        assert!(recover_report("{ definitely not json }").is_none());
        assert!(recover_report("").is_none());
    }

    #[test]
    fn test_accumulator_is_bounded() {
        let mut accumulator = ContextAccumulator::default();
        for i in 0..25 {
            accumulator.push(ContextExcerpt {
                path: format!("src/file{}.py", i),
                content: String::new(),
            });
            assert_eq!(accumulator.len(), (i + 1).min(AI_CONTEXT_LIMIT));
        }
        assert_eq!(accumulator.len(), AI_CONTEXT_LIMIT);
        assert!(accumulator.is_full());
        assert_eq!(accumulator.entries()[0].path, "src/file0.py");
        assert_eq!(accumulator.entries()[9].path, "src/file9.py");
    }

    #[test]
    fn test_greedy_span_crosses_lines() {
        let found = GREEDY_OBJECT.find("x {\n\"a\": {}\n} y").map(|m| m.as_str());
        assert_eq!(found, Some("{\n\"a\": {}\n}"));
    }

    struct ErrSummarizer(fn() -> RepodocError);

    #[async_trait]
    impl Summarizer for ErrSummarizer {
        async fn complete(&self, _request: ChatRequest) -> RepodocResult<String> {
            Err((self.0)())
        }

        fn provider(&self) -> &str {
            "failing"
        }
    }

    #[tokio::test]
    async fn test_detection_degrades_on_any_summarizer_error() {
        let record = AnalysisRecord::new("demo".to_string(), "/tmp/demo".to_string());
        let accumulator = ContextAccumulator::default();
        let llm = LlmConfig::default();

        let network = ErrSummarizer(|| RepodocError::Network {
            message: "connection reset".to_string(),
            source: None,
            context: ErrorContext::new("test"),
        });
        let config = ErrSummarizer(|| config_error!("bad settings", "test"));

        for summarizer in [&network, &config] {
            let report = TechnologyDetector::new(summarizer, &llm)
                .detect(&record, &accumulator)
                .await;
            assert!(report.frameworks.is_empty());
            assert!(report.technologies.is_empty());
            assert_eq!(report.project_type, "Unknown");
        }
    }

    #[test]
    fn test_detection_context_layout() {
        let record = AnalysisRecord::new("demo".to_string(), "/tmp/demo".to_string());
        let mut accumulator = ContextAccumulator::default();
        accumulator.push(ContextExcerpt {
            path: "package.json".to_string(),
            content: "{\"name\": \"demo\"}".to_string(),
        });

        let context = build_detection_context(&record, &accumulator);
        assert!(context.starts_with("Repository: demo\n"));
        assert!(context.contains("Total files: 0"));
        assert!(context.contains("\n--- package.json ---\n{\"name\": \"demo\"}\n"));
    }
}
