//! Core trait definitions

use crate::error::RepodocResult;
use crate::types::ChatRequest;
use async_trait::async_trait;

/// External text generation service.
///
/// The scanner and the README generator only ever send one prompt and read
/// back one block of text; everything provider specific stays behind this
/// trait.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Send a single chat completion request and return the raw reply text
    async fn complete(&self, request: ChatRequest) -> RepodocResult<String>;

    /// Provider label used in logs
    fn provider(&self) -> &str;
}
