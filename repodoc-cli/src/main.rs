//! Repodoc CLI - Command-line interface for Repodoc
//!
//! Scans a repository, detects its technology stack and writes a README

use clap::{Parser, Subcommand};
use repodoc_core::{
    config_error, init_logging, log_operation_error, log_operation_start, log_operation_success, ErrorContext,
    LoggingConfig, RepodocConfig, RepodocError, RepodocResult,
};
use repodoc_llm::{ReadmeGenerator, RepodocLlmClient};
use repodoc_repo::{analyze_repository, clone_repository, AnalysisRecord, CloneOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

/// File name of the audit record written next to the README
const ANALYSIS_FILE_NAME: &str = "repository_analysis.json";

#[derive(Parser)]
#[command(name = "repodoc")]
#[command(about = "Generate a comprehensive README for any repository")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a repository and generate its README
    Generate {
        /// Path to the repository (local path, or clone target with --clone)
        repo_path: PathBuf,

        /// Groq API key (or set GROQ_API_KEY env var)
        #[arg(long)]
        api_key: Option<String>,

        /// Output file name, relative to the repository
        #[arg(short, long, default_value = "README.md")]
        output: PathBuf,

        /// Git URL to clone into the repository path first
        #[arg(long)]
        clone: Option<String>,

        /// Shallow clone depth
        #[arg(long, requires = "clone")]
        depth: Option<u32>,
    },

    /// Analyze a repository and write the analysis record only
    Analyze {
        /// Path to the repository
        repo_path: PathBuf,

        /// Groq API key; without one technology detection is skipped
        #[arg(long)]
        api_key: Option<String>,

        /// Where to write the analysis JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Manage configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,

        /// Initialize default configuration
        #[arg(long)]
        init: bool,

        /// Validate current configuration
        #[arg(long)]
        validate: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let logging_config = if cli.verbose {
        LoggingConfig::verbose()
    } else {
        LoggingConfig::default()
    };

    if let Err(e) = init_logging(&logging_config) {
        eprintln!("Error: Failed to initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Some(suggestion) = e
                .context()
                .and_then(|context| context.recovery_suggestions.first())
            {
                eprintln!("Hint: {}", suggestion);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> RepodocResult<()> {
    info!("Starting Repodoc CLI v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Generate {
            repo_path,
            api_key,
            output,
            clone,
            depth,
        } => handle_generate(repo_path, api_key, output, clone, depth, config).await,
        Commands::Analyze {
            repo_path,
            api_key,
            output,
        } => handle_analyze(repo_path, api_key, output, config).await,
        Commands::Config {
            show,
            init,
            validate,
        } => handle_config(show, init, validate, &config).await,
    }
}

fn load_config(config_path: Option<&PathBuf>) -> RepodocResult<RepodocConfig> {
    if let Some(path) = config_path {
        info!("Loading configuration from {:?}", path);
        return RepodocConfig::from_file(path);
    }

    let default_paths = [
        dirs::config_dir().map(|d| d.join("repodoc").join("config.toml")),
        dirs::home_dir().map(|d| d.join(".repodoc").join("config.toml")),
        Some(PathBuf::from("repodoc.toml")),
    ];

    for path in default_paths.iter().flatten() {
        if path.exists() {
            info!("Loading configuration from {:?}", path);
            return RepodocConfig::from_file(path);
        }
    }

    info!("No configuration file found, using defaults");
    Ok(RepodocConfig::default())
}

/// Build the summarizer, preferring a key given on the command line
fn build_client(config: &mut RepodocConfig, api_key: Option<String>) -> RepodocResult<RepodocLlmClient> {
    if api_key.is_some() {
        config.llm.api_key = api_key;
    }
    RepodocLlmClient::new(config.llm.clone())
}

async fn handle_generate(
    repo_path: PathBuf,
    api_key: Option<String>,
    output: PathBuf,
    clone: Option<String>,
    depth: Option<u32>,
    mut config: RepodocConfig,
) -> RepodocResult<()> {
    log_operation_start!("generate_readme", repo_path = %repo_path.display());

    let client = build_client(&mut config, api_key)?;
    if !client.has_api_key() {
        return Err(RepodocError::Config {
            message: "Groq API key required".to_string(),
            source: None,
            context: ErrorContext::new("cli")
                .with_operation("generate")
                .with_suggestion(&format!(
                    "Use --api-key or set the {} environment variable",
                    config.llm.api_key_env
                )),
        });
    }

    if let Some(url) = clone {
        println!("Cloning repository from {}...", url);
        clone_repository(&url, &repo_path, &CloneOptions { depth })
            .await
            .map_err(|e| {
                log_operation_error!("clone_repository", e, url = %url);
                e
            })?;
    }

    println!("Analyzing repository: {}", repo_path.display());
    let record = analyze_repository(&repo_path, &config, &client).await?;
    print_summary(&record);

    println!("Generating README with {}...", client.config().provider);
    let readme = ReadmeGenerator::new(&client, &config)
        .generate(&record)
        .await
        .map_err(|e| {
            log_operation_error!("generate_readme", e, repo = %record.repo_name());
            e
        })?;

    let readme_path = repo_path.join(&output);
    write_file(&readme_path, &readme).await?;
    println!("✅ README generated successfully: {}", readme_path.display());

    let analysis_path = repo_path.join(ANALYSIS_FILE_NAME);
    write_file(&analysis_path, &record.to_audit_json()?).await?;
    println!("📊 Analysis saved to: {}", analysis_path.display());

    log_operation_success!("generate_readme",
        repo = %record.repo_name(),
        total_files = record.total_files(),
        readme_chars = readme.len()
    );
    Ok(())
}

async fn handle_analyze(
    repo_path: PathBuf,
    api_key: Option<String>,
    output: Option<PathBuf>,
    mut config: RepodocConfig,
) -> RepodocResult<()> {
    log_operation_start!("analyze_repository", repo_path = %repo_path.display());

    let client = build_client(&mut config, api_key)?;
    if !client.has_api_key() {
        println!("No API key configured, technology detection will be skipped");
    }

    println!("Analyzing repository: {}", repo_path.display());
    let record = analyze_repository(&repo_path, &config, &client).await?;
    print_summary(&record);

    if !record.dependencies().is_empty() {
        println!("Dependencies: {}", record.dependencies().len());
    }
    println!("Project type: {}", record.project_type());

    let analysis_path = output.unwrap_or_else(|| repo_path.join(ANALYSIS_FILE_NAME));
    write_file(&analysis_path, &record.to_audit_json()?).await?;
    println!("📊 Analysis saved to: {}", analysis_path.display());

    log_operation_success!("analyze_repository",
        repo = %record.repo_name(),
        total_files = record.total_files(),
        total_lines = record.total_lines()
    );
    Ok(())
}

async fn handle_config(
    show: bool,
    init: bool,
    validate: bool,
    config: &RepodocConfig,
) -> RepodocResult<()> {
    if init {
        let config_path = default_config_path()?;
        if let Some(config_dir) = config_path.parent() {
            tokio::fs::create_dir_all(config_dir).await?;
        }

        RepodocConfig::default().save_to_file(&config_path)?;
        println!("✅ Configuration initialized at: {:?}", config_path);
        println!("📝 Edit the file to add your API key and customize scanning.");
    }

    if show {
        let rendered = toml::to_string_pretty(config)
            .map_err(|e| config_error!(format!("Failed to render configuration: {}", e), "cli", e))?;
        println!("📋 Current configuration:");
        println!("{}", rendered);
    }

    if validate {
        match config.validate() {
            Ok(()) => println!("✅ Configuration is valid"),
            Err(e) => {
                println!("❌ Configuration validation failed: {}", e);
                return Err(e);
            }
        }
    }

    if !(init || show || validate) {
        println!("Nothing to do. Pass --init, --show or --validate.");
    }

    Ok(())
}

/// Get the default configuration file path
fn default_config_path() -> RepodocResult<PathBuf> {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|d| d.join(".config")))
        .map(|dir| dir.join("repodoc").join("config.toml"))
        .ok_or_else(|| RepodocError::Config {
            message: "Could not determine a configuration directory".to_string(),
            source: None,
            context: ErrorContext::new("cli")
                .with_operation("config_init")
                .with_suggestion("Pass --config with an explicit path instead"),
        })
}

fn print_summary(record: &AnalysisRecord) {
    let join = |items: Vec<&str>| items.join(", ");

    println!(
        "Found {} files with {} total lines",
        record.total_files(),
        record.total_lines()
    );
    println!(
        "Languages detected: {}",
        join(record.languages().iter().map(String::as_str).collect())
    );
    println!(
        "Frameworks detected: {}",
        join(record.frameworks().iter().map(String::as_str).collect())
    );
}

async fn write_file(path: &Path, content: &str) -> RepodocResult<()> {
    tokio::fs::write(path, content)
        .await
        .map_err(|e| RepodocError::Repository {
            message: format!("Failed to write {}: {}", path.display(), e),
            source: Some(Box::new(e)),
            context: ErrorContext::new("cli")
                .with_operation("write_output")
                .with_metadata("path", &path.to_string_lossy()),
        })
}
