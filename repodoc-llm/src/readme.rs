//! README generation from an analysis record
//!
//! The context sent to the model is a short summary of the record, a sample
//! of the file listing, and a handful of snippets from files likely to show
//! how the project is configured and run.

use repodoc_core::{ChatRequest, ErrorContext, ReadmeConfig, RepodocConfig, RepodocError, RepodocResult, Summarizer};
use repodoc_repo::{char_prefix, AnalysisRecord, Budget, ContentBudgeter, FileRecord};
use tracing::info;

use crate::prompts::{create_readme_prompt, README_SYSTEM_PROMPT};

/// Files from the head of the listing that are worth a snippet, in listing order
pub fn select_snippet_files<'r>(
    record: &'r AnalysisRecord,
    readme: &ReadmeConfig,
    budgeter: &ContentBudgeter,
) -> Vec<&'r FileRecord> {
    let marker_scan_chars = budgeter.cap(Budget::PromptSnippet);

    record
        .files()
        .values()
        .take(readme.listing_limit)
        .filter(|file| {
            let path = file.path.to_lowercase();
            if readme
                .snippet_path_markers
                .iter()
                .any(|marker| path.contains(marker.as_str()))
            {
                return true;
            }

            let head = char_prefix(&file.content, marker_scan_chars).to_lowercase();
            readme
                .snippet_content_markers
                .iter()
                .any(|marker| head.contains(marker.as_str()))
        })
        .take(readme.snippet_file_limit)
        .collect()
}

/// Prompt context describing the repository
pub fn build_readme_context(
    record: &AnalysisRecord,
    readme: &ReadmeConfig,
    budgeter: &ContentBudgeter,
) -> String {
    let mut context = format!(
        "- Name: {}\n- Total Files: {}\n- Total Lines of Code: {}\n- Languages: {}\n- Frameworks/Technologies: {}\n- Configuration files: {}\n\nFile Structure (sample):\n",
        record.repo_name(),
        record.total_files(),
        record.total_lines(),
        join(record.languages().iter()),
        join(record.frameworks().iter().chain(record.technologies())),
        join(record.config_files().iter()),
    );

    for file in record.files().values().take(readme.listing_limit) {
        context.push_str(&format!("- {} ({} lines)\n", file.path, file.lines));
    }

    let total = record.files().len();
    if total > readme.listing_limit {
        context.push_str(&format!("... and {} more files\n", total - readme.listing_limit));
    }

    context.push_str("\nKey File Contents (snippets):\n");
    for file in select_snippet_files(record, readme, budgeter) {
        context.push_str(&format!(
            "\n--- {} ---\n{}...\n",
            file.path,
            budgeter.apply(&file.content, Budget::PromptSnippet)
        ));
    }

    context
}

fn join<'s>(items: impl Iterator<Item = &'s String>) -> String {
    items.map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// Produces README text through a summarizer
pub struct ReadmeGenerator<'a> {
    summarizer: &'a dyn Summarizer,
    config: &'a RepodocConfig,
    budgeter: ContentBudgeter,
}

impl<'a> ReadmeGenerator<'a> {
    pub fn new(summarizer: &'a dyn Summarizer, config: &'a RepodocConfig) -> Self {
        Self {
            summarizer,
            config,
            budgeter: ContentBudgeter::new(config.budget.clone()),
        }
    }

    pub fn build_request(&self, record: &AnalysisRecord) -> ChatRequest {
        let context = build_readme_context(record, &self.config.readme, &self.budgeter);
        ChatRequest {
            model: self.config.llm.documentation_model.clone(),
            system_prompt: README_SYSTEM_PROMPT.to_string(),
            user_prompt: create_readme_prompt(&context),
            max_tokens: self.config.llm.documentation_max_tokens,
            temperature: self.config.llm.documentation_temperature,
        }
    }

    /// Generate the README; unlike detection, any summarizer failure is fatal
    pub async fn generate(&self, record: &AnalysisRecord) -> RepodocResult<String> {
        let request = self.build_request(record);
        let model = request.model.clone();

        info!(
            provider = self.summarizer.provider(),
            model = %model,
            prompt_chars = request.user_prompt.len(),
            "Generating README"
        );

        let readme = self
            .summarizer
            .complete(request)
            .await
            .map_err(|e| RepodocError::Llm {
                message: format!("Error generating README: {}", e),
                provider: Some(self.summarizer.provider().to_string()),
                model: Some(model.clone()),
                context: ErrorContext::new("readme_generator")
                    .with_operation("generate")
                    .with_suggestion("Check the API key and that the model name is available"),
            })?;

        if readme.trim().is_empty() {
            return Err(RepodocError::Llm {
                message: "Summarizer returned an empty README".to_string(),
                provider: Some(self.summarizer.provider().to_string()),
                model: Some(model),
                context: ErrorContext::new("readme_generator").with_operation("generate"),
            });
        }

        info!(readme_chars = readme.len(), "README generated");
        Ok(readme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use repodoc_repo::analyze_repository;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const DETECTION_REPLY: &str =
        r#"{"frameworks": ["Flask"], "technologies": ["Docker"], "project_type": "API"}"#;

    /// Replies with `reply`, or fails with a network error when it is `None`
    struct ScriptedSummarizer {
        reply: Option<String>,
        seen: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedSummarizer {
        fn replying(text: &str) -> Self {
            Self {
                reply: Some(text.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Summarizer for ScriptedSummarizer {
        async fn complete(&self, request: ChatRequest) -> RepodocResult<String> {
            self.seen.lock().unwrap().push(request);
            self.reply.clone().ok_or_else(|| RepodocError::Network {
                message: "connection reset".to_string(),
                source: None,
                context: ErrorContext::new("test"),
            })
        }

        fn provider(&self) -> &str {
            "scripted"
        }
    }

    /// Repository named `demo` inside a fresh temp dir
    fn demo_repo(files: &[(&str, &str)]) -> (TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("demo");
        for (relative, content) in files {
            let path = root.join(relative);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, content).unwrap();
        }
        std::fs::create_dir_all(&root).unwrap();
        (dir, root)
    }

    async fn scan(root: &Path) -> AnalysisRecord {
        let detector = ScriptedSummarizer::replying(DETECTION_REPLY);
        analyze_repository(root, &RepodocConfig::default(), &detector)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_context_header_and_listing() {
        let (_dir, root) = demo_repo(&[
            ("app.py", "from flask import Flask\n"),
            ("requirements.txt", "flask\n"),
            ("utils/strings.py", "def f():\n    pass\n"),
        ]);
        let record = scan(&root).await;

        let context = build_readme_context(&record, &ReadmeConfig::default(), &ContentBudgeter::default());

        assert!(context.starts_with("- Name: demo\n- Total Files: 3\n- Total Lines of Code: 4\n"));
        assert!(context.contains("- Languages: .py, .txt\n"));
        assert!(context.contains("- Frameworks/Technologies: Flask, Docker\n"));
        assert!(context.contains("- Configuration files: requirements.txt\n"));
        assert!(context.contains(
            "- app.py (1 lines)\n- requirements.txt (1 lines)\n- utils/strings.py (2 lines)\n"
        ));
        assert!(!context.contains("more files"));
        assert!(context.contains("\n--- app.py ---\nfrom flask import Flask\n...\n"));
        assert!(!context.contains("--- utils/strings.py ---"));
    }

    #[tokio::test]
    async fn test_listing_is_truncated_with_remainder_count() {
        let paths: Vec<String> = (0..25).map(|i| format!("pkg/mod{:02}.py", i)).collect();
        let files: Vec<(&str, &str)> = paths.iter().map(|p| (p.as_str(), "x = 1\n")).collect();
        let (_dir, root) = demo_repo(&files);
        let record = scan(&root).await;

        let context = build_readme_context(&record, &ReadmeConfig::default(), &ContentBudgeter::default());

        assert!(context.contains("- pkg/mod19.py (1 lines)\n"));
        assert!(!context.contains("- pkg/mod20.py"));
        assert!(context.contains("... and 5 more files\n"));
    }

    #[tokio::test]
    async fn test_snippets_limited_to_listing_head() {
        let paths: Vec<String> = (0..20).map(|i| format!("lib/part{:02}.py", i)).collect();
        let mut files: Vec<(&str, &str)> = paths.iter().map(|p| (p.as_str(), "x = 1\n")).collect();
        files.push(("main.py", "print('hi')\n"));
        let (_dir, root) = demo_repo(&files);
        let record = scan(&root).await;
        assert_eq!(record.files().get_index(20).map(|(path, _)| path.as_str()), Some("main.py"));

        let selected = select_snippet_files(&record, &ReadmeConfig::default(), &ContentBudgeter::default());
        assert!(selected.is_empty());
    }

    #[tokio::test]
    async fn test_snippet_selection_by_path_and_content() {
        let (_dir, root) = demo_repo(&[
            ("cli.py", "import argparse\nparser = argparse.ArgumentParser()\n"),
            ("docs/notes.py", "nothing here\n"),
            ("keys.py", "TOKEN = os.getenv('API_KEY')\n"),
            ("lib/util.py", "def helper():\n    return 1\n"),
            ("server.py", "run()\n"),
            ("setup.py", "setup()\n"),
            ("src/config.py", "DEBUG = True\n"),
            ("zz_main.py", "pass\n"),
        ]);
        let record = scan(&root).await;

        let selected: Vec<&str> = select_snippet_files(&record, &ReadmeConfig::default(), &ContentBudgeter::default())
            .into_iter()
            .map(|f| f.path.as_str())
            .collect();

        assert_eq!(
            selected,
            vec!["cli.py", "keys.py", "server.py", "setup.py", "src/config.py"]
        );
    }

    #[tokio::test]
    async fn test_snippet_is_capped() {
        let long = "a".repeat(1500);
        let (_dir, root) = demo_repo(&[("main.py", long.as_str())]);
        let record = scan(&root).await;

        let context = build_readme_context(&record, &ReadmeConfig::default(), &ContentBudgeter::default());
        let expected = format!("\n--- main.py ---\n{}...\n", "a".repeat(1000));
        assert!(context.contains(&expected));
        assert!(!context.contains(&"a".repeat(1001)));
    }

    #[tokio::test]
    async fn test_generate_uses_documentation_settings() {
        let (_dir, root) = demo_repo(&[("app.py", "from flask import Flask\n")]);
        let record = scan(&root).await;
        let summarizer = ScriptedSummarizer::replying("# demo\n\nA Flask API.\n");
        let config = RepodocConfig::default();

        let readme = ReadmeGenerator::new(&summarizer, &config)
            .generate(&record)
            .await
            .unwrap();
        assert_eq!(readme, "# demo\n\nA Flask API.\n");

        let seen = summarizer.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, "llama-3.1-8b-instant");
        assert_eq!(seen[0].max_tokens, 4000);
        assert!((seen[0].temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(seen[0].system_prompt, README_SYSTEM_PROMPT);
        assert!(seen[0].user_prompt.contains("- Name: demo"));
    }

    #[tokio::test]
    async fn test_generate_failure_is_fatal() {
        let (_dir, root) = demo_repo(&[("app.py", "pass\n")]);
        let record = scan(&root).await;
        let config = RepodocConfig::default();

        let failing = ScriptedSummarizer::failing();
        let error = ReadmeGenerator::new(&failing, &config)
            .generate(&record)
            .await
            .unwrap_err();
        assert!(matches!(error, RepodocError::Llm { .. }));
        assert!(error.to_string().contains("Error generating README"));

        let empty = ScriptedSummarizer::replying("   \n");
        let error = ReadmeGenerator::new(&empty, &config)
            .generate(&record)
            .await
            .unwrap_err();
        assert!(matches!(error, RepodocError::Llm { .. }));
    }
}
