//! Semantic chunking of protocol documents.
//!
//! Chunking is a capability contract, not an algorithm implemented here: raw
//! document bytes plus a fixed instruction set go in, schema-validated
//! [`DocumentChunk`](crate::pipeline::DocumentChunk) records come out.
//! Providers are swappable behind the [`ChunkingClient`] trait without
//! touching the orchestrator.

pub mod gemini;
mod prompt;

use crate::pipeline::DocumentChunk;
use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

pub use gemini::GeminiChunker;
pub(crate) use prompt::SEGMENTATION_PROMPT;

/// Errors raised while chunking a document through the external service.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid chunking service URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The service responded with an unexpected status code.
    #[error("Unexpected chunking service response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from the service.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// The service returned no usable candidate text.
    #[error("Chunking service returned no content")]
    EmptyResponse,
    /// The returned text was not a JSON array conforming to the chunk schema.
    #[error("Chunking service output violates the chunk schema: {0}")]
    Schema(#[from] serde_json::Error),
}

/// Interface to the external semantic-segmentation service.
#[async_trait]
pub trait ChunkingClient: Send + Sync {
    /// Segment one complete document into ordered chunks.
    ///
    /// `display_name` identifies the document to the service; it is not
    /// required to appear in the returned chunks' `source_file` fields.
    async fn chunk(
        &self,
        document: &[u8],
        display_name: &str,
    ) -> Result<Vec<DocumentChunk>, ChunkingError>;
}
