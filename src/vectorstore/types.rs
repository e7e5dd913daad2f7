//! Shared types and helpers for the Firestore vector store.

use crate::embedding::EmbeddingError;
use reqwest::StatusCode;
use thiserror::Error;

/// Errors returned while persisting chunks to the vector store.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid Firestore URL: {0}")]
    InvalidUrl(String),
    /// Embedding provider failed to produce vectors for the chunk contents.
    #[error("Failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingError),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Firestore responded with an unexpected status code.
    #[error("Unexpected Firestore response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from Firestore.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
}

/// Derive the flat storage key for one chunk.
///
/// The key concatenates the display name and chunk id, then replaces every
/// path separator and period with an underscore so the result satisfies
/// Firestore document-id constraints and stays collision-resistant. Pure:
/// the same inputs always yield the same key.
pub fn derive_document_key(display_name: &str, chunk_id: u32) -> String {
    format!("{display_name}_{chunk_id}").replace(['/', '.'], "_")
}
