//! Document source abstraction over cloud object storage.

pub mod gcs;
pub mod types;

use async_trait::async_trait;

pub use gcs::GcsDocumentSource;
pub use types::StorageError;

/// Interface to the external object store holding source documents.
///
/// Identifiers are opaque object names; callers decide which of them are
/// documents worth processing.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Enumerate object names under the given prefix, in listing order.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Download the raw bytes of one object.
    async fn read(&self, identifier: &str) -> Result<Vec<u8>, StorageError>;
}
