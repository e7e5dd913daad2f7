//! Orchestrator driving the acquire → chunk → persist sequence per document.

use crate::{
    chunking::ChunkingClient,
    pipeline::types::{PipelineError, ProcessingResult},
    storage::DocumentSource,
    vectorstore::VectorWriter,
};

/// Object-name suffix recognized as a source document.
const DOCUMENT_EXTENSION: &str = ".pdf";

/// Coordinates the end-to-end ingestion run.
///
/// The runner owns exactly one instance of each collaborator for its
/// lifetime and processes documents strictly one at a time, in discovery
/// order. Both collaborators are rate-limited stateful services, so serial
/// processing is a correctness decision, not an optimization gap: it avoids
/// overwhelming them and avoids interleaved partial writes for a document.
pub struct PipelineRunner {
    source: Box<dyn DocumentSource>,
    chunker: Box<dyn ChunkingClient>,
    store: Box<dyn VectorWriter>,
    folder_prefix: String,
}

impl PipelineRunner {
    /// Assemble a runner from its collaborators and the discovery prefix.
    pub fn new(
        source: Box<dyn DocumentSource>,
        chunker: Box<dyn ChunkingClient>,
        store: Box<dyn VectorWriter>,
        folder_prefix: impl Into<String>,
    ) -> Self {
        Self {
            source,
            chunker,
            store,
            folder_prefix: folder_prefix.into(),
        }
    }

    /// Enumerate the source documents to process, in listing order.
    ///
    /// Filters the object listing to names ending in `.pdf`
    /// (case-insensitive). An empty result is not an error; a failed listing
    /// is fatal to the run.
    pub async fn discover_documents(&self) -> Result<Vec<String>, PipelineError> {
        let objects = self
            .source
            .list(&self.folder_prefix)
            .await
            .map_err(PipelineError::Discovery)?;

        let documents: Vec<String> = objects
            .into_iter()
            .filter(|name| is_document(name))
            .collect();
        tracing::info!(
            prefix = %self.folder_prefix,
            count = documents.len(),
            "Discovered source documents"
        );
        Ok(documents)
    }

    /// Run the full pipeline over every discovered document.
    ///
    /// Documents are processed in discovery order and the returned results
    /// preserve that order one-to-one. The first failure aborts the run and
    /// propagates; no partial result list is ever returned.
    pub async fn process_all(&self) -> Result<Vec<ProcessingResult>, PipelineError> {
        let documents = self.discover_documents().await?;
        if documents.is_empty() {
            tracing::warn!("No documents found; nothing to process");
            return Ok(Vec::new());
        }

        let total = documents.len();
        let mut results = Vec::with_capacity(total);
        for (position, object_name) in documents.iter().enumerate() {
            tracing::info!(position = position + 1, total, object = %object_name, "Processing document");
            let result = self.process_document(object_name).await?;
            results.push(result);
        }

        tracing::info!(processed = results.len(), total, "Pipeline complete");
        Ok(results)
    }

    /// Acquire, chunk, and persist one document.
    async fn process_document(&self, object_name: &str) -> Result<ProcessingResult, PipelineError> {
        let name = display_name(object_name);

        let bytes = self
            .source
            .read(object_name)
            .await
            .map_err(|source| PipelineError::Acquisition {
                name: object_name.to_string(),
                source,
            })?;
        tracing::info!(file = name, bytes = bytes.len(), "Document acquired");

        let chunks = self
            .chunker
            .chunk(&bytes, name)
            .await
            .map_err(|source| PipelineError::Chunking {
                name: name.to_string(),
                source,
            })?;
        let result = ProcessingResult::new(name, chunks);
        tracing::info!(file = name, chunks = result.total_chunks(), "Document chunked");

        self.store
            .upsert(&result.chunks, name)
            .await
            .map_err(|source| PipelineError::Persistence {
                name: name.to_string(),
                source,
            })?;

        Ok(result)
    }
}

/// Last path segment of an object name, used as the document's display name.
fn display_name(object_name: &str) -> &str {
    object_name.rsplit('/').next().unwrap_or(object_name)
}

fn is_document(object_name: &str) -> bool {
    object_name.to_ascii_lowercase().ends_with(DOCUMENT_EXTENSION)
}
