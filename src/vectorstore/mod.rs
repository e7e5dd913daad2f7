//! Vector persistence into Firestore.

pub mod firestore;
pub mod types;

use crate::pipeline::DocumentChunk;
use async_trait::async_trait;

pub use firestore::FirestoreVectorStore;
pub use types::{PersistenceError, derive_document_key};

/// Interface to the vector store receiving embedded chunks.
///
/// Upserts are idempotent per derived key: re-running with the same
/// `display_name`/`chunk_id` pair overwrites rather than duplicates.
#[async_trait]
pub trait VectorWriter: Send + Sync {
    /// Embed and upsert all chunks of one document in a single write batch.
    ///
    /// Chunks with an unset `source_file` are persisted with `display_name`
    /// backfilled; pre-set values are stored unchanged.
    async fn upsert(
        &self,
        chunks: &[DocumentChunk],
        display_name: &str,
    ) -> Result<(), PersistenceError>;
}
