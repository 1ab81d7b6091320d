//! Repodoc LLM - chat completion client and README generation
//!
//! Provides the HTTP [`Summarizer`](repodoc_core::Summarizer) implementation
//! and turns an [`AnalysisRecord`](repodoc_repo::AnalysisRecord) into a README.

pub mod llm_client;
pub mod prompts;
pub mod readme;

pub use llm_client::*;
pub use prompts::*;
pub use readme::*;
