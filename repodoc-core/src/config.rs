//! Configuration management

use crate::config_error;
use crate::error::{ErrorContext, RepodocError, RepodocResult};
use crate::types::{BudgetConfig, LlmConfig, ReadmeConfig, RepodocConfig, ScanProfile};

use std::path::Path;

const SKIP_DIRS: &[&str] = &[
    "node_modules", ".git", ".svn", ".hg", "__pycache__",
    ".pytest_cache", ".mypy_cache", "venv", "env", ".env",
    "build", "dist", ".next", ".nuxt", "target", "bin", "obj",
    ".idea", ".vscode", ".vs", "coverage", ".coverage",
    "logs", "log", "tmp", "temp", ".tmp", ".temp",
];

#[rustfmt::skip]
const TEXT_EXTENSIONS: &[&str] = &[
    // programming languages
    ".py", ".js", ".ts", ".java", ".cpp", ".c", ".h", ".hpp", ".cs", ".php", ".rb", ".go", ".rs", ".swift", ".kt", ".kts",
    ".scala", ".r", ".m", ".jl", ".dart", ".pl", ".pm", ".lua", ".groovy", ".vb", ".vbs", ".fs", ".fsi", ".fsx", ".f90", ".f95",
    ".f", ".f03", ".f08", ".asm", ".s", ".d", ".nim", ".clj", ".cljs", ".cljc", ".edn", ".erl", ".hrl", ".ex", ".exs", ".elm",
    ".ml", ".mli", ".mll", ".mly", ".hs", ".lhs", ".purs", ".ada", ".adb", ".ads", ".v", ".sv", ".vhd", ".vhdl", ".cob", ".cbl",
    ".lisp", ".lsp", ".scm", ".rkt", ".ss", ".awk", ".ps1", ".bat", ".cmd", ".sh", ".zsh", ".fish", ".tcsh", ".csh", ".bsh",
    ".tcl", ".exp", ".expect", ".bas", ".pas", ".pp", ".dpr", ".cr", ".vala", ".hx", ".hxsl", ".hxproj",
    ".mm", ".objc", ".objcpp", ".cu", ".cuh", ".cl", ".opencl", ".glsl", ".vert", ".frag", ".comp", ".tesc", ".tese",
    ".geom", ".wgsl", ".metal", ".vapi", ".odin", ".zig", ".pony", ".factor", ".jsx", ".tsx", ".mjs", ".cjs",
    // web, markup, templates
    ".html", ".htm", ".xhtml", ".xml", ".svg", ".xsd", ".xslt", ".jsp", ".asp", ".aspx", ".ejs", ".hbs", ".handlebars", ".mustache",
    ".twig", ".liquid", ".jade", ".pug", ".haml", ".slim", ".mjml", ".md", ".markdown", ".rst", ".adoc", ".asciidoc",
    ".tex", ".latex", ".sty", ".cls", ".bib", ".rmd", ".ipynb", ".vue", ".svelte",
    // stylesheets
    ".css", ".scss", ".sass", ".less", ".styl", ".pcss", ".sss",
    // data and config
    ".json", ".jsonc", ".json5", ".yaml", ".yml", ".toml", ".ini", ".cfg", ".conf", ".env", ".properties", ".prop", ".prefs",
    ".plist", ".rc", ".config", ".tsv", ".csv", ".psv", ".db", ".sqlite", ".db3", ".sql", ".dbf",
    // build and packaging
    ".gradle", ".maven", ".pom", ".sbt", ".cmake", ".make", ".mak", ".mk", ".ninja", ".bazel", ".bzl", ".buck", ".build",
    ".pro", ".pri", ".qbs", ".xcconfig", ".xcworkspace", ".xcodeproj", ".xcsettings", ".xcuserstate", ".xcuserdata",
    ".nuspec", ".csproj", ".vbproj", ".fsproj", ".sln", ".vcxproj", ".vcproj", ".props", ".targets", ".gyp", ".gypi",
    ".am", ".ac", ".m4", ".autogen", ".configure", ".spec", ".ebuild", ".mix", ".rebar", ".lock",
    // dotfiles, matched on their full name
    ".tox", ".flake8", ".coveragerc", ".babelrc", ".eslintrc", ".eslintignore", ".prettierrc", ".prettierignore",
    ".stylelintrc", ".stylelintignore", ".editorconfig", ".gitattributes", ".gitignore", ".dockerignore",
    ".dockerfile", ".vagrantfile", ".procfile", ".jenkinsfile", ".npmrc", ".nvmrc",
    // misc
    ".txt", ".log", ".out", ".err", ".lst", ".list", ".changelog", ".changes", ".news", ".todo", ".tasks", ".license", ".licence",
    ".copying", ".notice", ".authors", ".contributors", ".credits", ".readme",
];

const EXTENSIONLESS_TEXT_NAMES: &[&str] = &["makefile", "dockerfile", "readme", "license", "changelog"];

const KEY_FILE_NAMES: &[&str] = &[
    "package.json", "requirements.txt", "pom.xml", "build.gradle",
    "cargo.toml", "go.mod", "composer.json", "pyproject.toml",
    "setup.py", "dockerfile", "docker-compose.yml", "makefile",
];

const ENTRY_POINT_MARKERS: &[&str] = &["main", "index", "app", "server", "__init__"];

const IMPORT_KEYWORDS: &[&str] = &["import", "require", "include", "using", "from"];

const CONFIG_FILE_NAMES: &[&str] = &[
    "package.json", "yarn.lock", "package-lock.json",
    "requirements.txt", "pyproject.toml", "setup.py", "pipfile",
    "pom.xml", "build.gradle", "build.gradle.kts",
    "cargo.toml", "cargo.lock",
    "go.mod", "go.sum",
    "composer.json", "composer.lock",
    "dockerfile", "docker-compose.yml",
    "makefile", ".gitignore", "readme.md",
];

const SNIPPET_PATH_MARKERS: &[&str] = &["main", "index", "app", "server", "__init__", "setup", "config"];

const SNIPPET_CONTENT_MARKERS: &[&str] = &["argparse", "os.getenv", "api_key", "api key", "secret_key"];

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ScanProfile {
    fn default() -> Self {
        Self {
            skip_dirs: owned(SKIP_DIRS),
            text_extensions: owned(TEXT_EXTENSIONS),
            extensionless_text_names: owned(EXTENSIONLESS_TEXT_NAMES),
            key_file_names: owned(KEY_FILE_NAMES),
            entry_point_markers: owned(ENTRY_POINT_MARKERS),
            import_keywords: owned(IMPORT_KEYWORDS),
            config_file_names: owned(CONFIG_FILE_NAMES),
            package_manifest: "package.json".to_string(),
        }
    }
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            record_cap: 2000,
            ai_context_cap: 1500,
            prompt_snippet_cap: 1000,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "groq".to_string(),
            base_url: "https://api.groq.com/openai/v1".to_string(),
            api_key: None,
            api_key_env: "GROQ_API_KEY".to_string(),
            detection_model: "meta-llama/llama-guard-4-12b".to_string(),
            detection_max_tokens: 1000,
            detection_temperature: 0.3,
            documentation_model: "llama-3.1-8b-instant".to_string(),
            documentation_max_tokens: 4000,
            documentation_temperature: 0.7,
        }
    }
}

impl LlmConfig {
    /// Explicit key first, then the configured environment variable
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .filter(|key| !key.trim().is_empty())
    }
}

impl Default for ReadmeConfig {
    fn default() -> Self {
        Self {
            listing_limit: 20,
            snippet_file_limit: 5,
            snippet_path_markers: owned(SNIPPET_PATH_MARKERS),
            snippet_content_markers: owned(SNIPPET_CONTENT_MARKERS),
        }
    }
}

impl RepodocConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> RepodocResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| RepodocError::Config {
            message: format!("Failed to read config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("read_file")
                .with_metadata("path", &path.to_string_lossy())
                .with_suggestion("Check if the config file exists and is readable"),
        })?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text; missing sections keep their defaults
    pub fn from_toml_str(content: &str) -> RepodocResult<Self> {
        let config: RepodocConfig = toml::from_str(content).map_err(|e| RepodocError::Config {
            message: format!("Failed to parse config: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("parse_toml")
                .with_suggestion("Check TOML syntax in config file"),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> RepodocResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| config_error!(format!("Failed to serialize config: {}", e), "config", e))?;

        std::fs::write(path, content).map_err(|e| RepodocError::Config {
            message: format!("Failed to write config file: {}", e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("config")
                .with_operation("write_file")
                .with_suggestion("Check if the directory exists and is writable"),
        })?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> RepodocResult<()> {
        let caps = [
            ("budget.record_cap", self.budget.record_cap),
            ("budget.ai_context_cap", self.budget.ai_context_cap),
            ("budget.prompt_snippet_cap", self.budget.prompt_snippet_cap),
        ];
        for (field, cap) in caps {
            if cap == 0 {
                return Err(config_error!(
                    format!("{} must be greater than 0", field),
                    "config"
                ));
            }
        }

        if self.scan.package_manifest.trim().is_empty() {
            return Err(config_error!("scan.package_manifest must not be empty", "config"));
        }

        if self.llm.detection_model.trim().is_empty()
            || self.llm.documentation_model.trim().is_empty()
        {
            return Err(config_error!(
                "llm.detection_model and llm.documentation_model must not be empty",
                "config"
            ));
        }

        Ok(())
    }
}
