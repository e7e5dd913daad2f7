//! Core data types and error definitions for the ingestion pipeline.

use crate::{chunking::ChunkingError, storage::StorageError, vectorstore::PersistenceError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One semantically coherent text segment extracted from a protocol document.
///
/// This is the wire schema of the chunking service: the service must return a
/// JSON array of objects deserializable into this type, and any deviation
/// surfaces as a [`ChunkingError`] rather than being coerced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Sequence number, unique within a document; ordering is extraction order.
    pub chunk_id: u32,
    /// Date extracted from the document header; `None` when undeterminable.
    #[serde(default)]
    pub document_date: Option<String>,
    /// Section tag such as "Header and Agenda", "Topic Discussion", or
    /// "Closing and Decisions". Membership is not validated by the pipeline.
    pub section_type: String,
    /// Verbatim text in the original language and layout.
    pub content: String,
    /// Name of the originating document, when the service reported one.
    #[serde(default)]
    pub source_file: Option<String>,
}

impl DocumentChunk {
    /// Return a copy of the chunk whose `source_file` is guaranteed to be set,
    /// backfilling `fallback` when the chunking service left it empty.
    ///
    /// A pre-set `source_file` is never overwritten. Pure: same inputs always
    /// produce the same chunk, and `self` is left untouched.
    pub fn resolve_source(&self, fallback: &str) -> Self {
        let mut resolved = self.clone();
        if resolved.source_file.is_none() {
            resolved.source_file = Some(fallback.to_string());
        }
        resolved
    }
}

/// Aggregated outcome of processing one document.
///
/// Created once per document after chunking completes and immutable
/// thereafter; the full pipeline run returns one result per discovered
/// document, in discovery order.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingResult {
    /// Display name of the source document.
    pub file_name: String,
    /// Extracted chunks, in extraction order.
    pub chunks: Vec<DocumentChunk>,
}

impl ProcessingResult {
    /// Build a result for one processed document.
    pub fn new(file_name: impl Into<String>, chunks: Vec<DocumentChunk>) -> Self {
        Self {
            file_name: file_name.into(),
            chunks,
        }
    }

    /// Number of chunks extracted from the document.
    pub fn total_chunks(&self) -> usize {
        self.chunks.len()
    }
}

/// Errors emitted by the pipeline orchestrator. Every variant is fatal to the
/// run: the first failure propagates and no partial result list is returned.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Listing the document source failed.
    #[error("Failed to list source documents: {0}")]
    Discovery(#[source] StorageError),
    /// Reading one document's bytes failed.
    #[error("Failed to read document '{name}': {source}")]
    Acquisition {
        /// Identifier of the document that could not be read.
        name: String,
        /// Underlying storage failure.
        #[source]
        source: StorageError,
    },
    /// The chunking service failed or returned output violating the chunk schema.
    #[error("Failed to chunk document '{name}': {source}")]
    Chunking {
        /// Display name of the document being chunked.
        name: String,
        /// Underlying chunking failure.
        #[source]
        source: ChunkingError,
    },
    /// Upserting a document's chunks into the vector store failed.
    #[error("Failed to persist chunks for '{name}': {source}")]
    Persistence {
        /// Display name of the document being persisted.
        name: String,
        /// Underlying persistence failure.
        #[source]
        source: PersistenceError,
    },
}
