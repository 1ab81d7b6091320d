//! Unified error handling system
//!
//! Provides structured error types with context, recovery suggestions, and proper error chaining

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type RepodocResult<T> = Result<T, RepodocError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Additional metadata
    pub metadata: std::collections::HashMap<String, String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            metadata: std::collections::HashMap::new(),
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_metadata(mut self, key: &str, value: &str) -> Self {
        self.metadata.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for repodoc
#[derive(Error, Debug)]
pub enum RepodocError {
    #[error("Repository error: {message}")]
    Repository {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Resource not found: {resource}")]
    NotFound {
        resource: String,
        context: ErrorContext,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("LLM error: {message}")]
    Llm {
        message: String,
        provider: Option<String>,
        model: Option<String>,
        context: ErrorContext,
    },
}

impl RepodocError {
    /// Get the error context
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            RepodocError::Repository { context, .. } => Some(context),
            RepodocError::Config { context, .. } => Some(context),
            RepodocError::Network { context, .. } => Some(context),
            RepodocError::NotFound { context, .. } => Some(context),
            RepodocError::Llm { context, .. } => Some(context),
            RepodocError::Io(_) | RepodocError::Serialization(_) => None,
        }
    }

    /// Whether the error comes from talking to the summarizer.
    ///
    /// Technology detection logs these at warn level and falls back to an
    /// empty report; any other error also falls back but is logged as an error.
    pub fn is_degradable(&self) -> bool {
        matches!(
            self,
            RepodocError::Network { .. } | RepodocError::Llm { .. } | RepodocError::Serialization(_)
        )
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! repository_error {
    ($msg:expr, $component:expr) => {
        $crate::RepodocError::Repository {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::RepodocError::Repository {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component),
        }
    };
}

#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::RepodocError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file")
                .with_suggestion("Run 'repodoc config --init' to create default config"),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::RepodocError::Config {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file")
                .with_suggestion("Run 'repodoc config --init' to create default config"),
        }
    };
}

#[macro_export]
macro_rules! not_found_error {
    ($resource:expr, $component:expr) => {
        $crate::RepodocError::NotFound {
            resource: $resource.to_string(),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Verify the repository path")
                .with_suggestion("Use --clone to fetch a remote repository first"),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_macro_carries_context() {
        let err = not_found_error!("/missing/repo", "repository_scanner");
        match &err {
            RepodocError::NotFound { resource, context } => {
                assert_eq!(resource, "/missing/repo");
                assert_eq!(context.component, "repository_scanner");
                assert!(!context.error_id.is_empty());
                assert_eq!(context.recovery_suggestions.len(), 2);
            }
            other => panic!("Expected NotFound error, got {:?}", other),
        }
        assert!(!err.is_degradable());
    }

    #[test]
    fn test_summarizer_errors_are_degradable() {
        let err = RepodocError::Llm {
            message: "empty choices".to_string(),
            provider: Some("groq".to_string()),
            model: None,
            context: ErrorContext::new("test"),
        };
        assert!(err.is_degradable());
        assert!(err.context().is_some());

        let io = RepodocError::from(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        assert!(!io.is_degradable());
        assert!(io.context().is_none());
    }

    #[test]
    fn test_config_macro_keeps_source() {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = config_error!("Failed to write config", "config", source);
        match &err {
            RepodocError::Config { message, source, context } => {
                assert_eq!(message, "Failed to write config");
                assert!(source.is_some());
                assert_eq!(context.recovery_suggestions.len(), 2);
            }
            other => panic!("Expected Config error, got {:?}", other),
        }
        assert!(!err.is_degradable());
    }

    #[test]
    fn test_context_builder() {
        let context = ErrorContext::new("config")
            .with_operation("parse_toml")
            .with_metadata("path", "repodoc.toml")
            .with_suggestion("Check TOML syntax");
        assert_eq!(context.operation.as_deref(), Some("parse_toml"));
        assert_eq!(context.metadata.get("path").map(String::as_str), Some("repodoc.toml"));
        assert_eq!(context.recovery_suggestions, vec!["Check TOML syntax".to_string()]);
    }
}
