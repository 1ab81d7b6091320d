//! Repodoc Repository - scanning and analysis of source trees
//!
//! Walks a repository, classifies and budgets file content, picks key files,
//! aggregates structure, and asks the summarizer once for a technology report.

pub mod aggregator;
pub mod analyzer;
pub mod budget;
pub mod detection;
pub mod filter;
pub mod processor;
pub mod record;
pub mod scanner;
pub mod selector;

pub use aggregator::*;
pub use analyzer::*;
pub use budget::*;
pub use detection::*;
pub use filter::*;
pub use processor::*;
pub use record::*;
pub use scanner::*;
pub use selector::*;
