//! Firestore adapter: embeds chunk contents and upserts vector documents.

use crate::config::get_config;
use crate::embedding::{EmbeddingClient, get_embedding_client};
use crate::pipeline::DocumentChunk;
use crate::vectorstore::{VectorWriter, derive_document_key, types::PersistenceError};
use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{Value, json};
use time::OffsetDateTime;

const DEFAULT_FIRESTORE_API_URL: &str = "https://firestore.googleapis.com";

/// Vector store client writing embedded chunks into a Firestore collection.
pub struct FirestoreVectorStore {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) project_id: String,
    pub(crate) database: String,
    pub(crate) collection: String,
    pub(crate) access_token: String,
    pub(crate) embedder: Box<dyn EmbeddingClient + Send + Sync>,
}

impl FirestoreVectorStore {
    /// Construct a new client using configuration derived from the environment.
    pub fn from_config() -> Result<Self, PersistenceError> {
        let config = get_config();
        let client = Client::builder().user_agent("protodex/0.1").build()?;

        let raw_url = config
            .firestore_api_url
            .as_deref()
            .unwrap_or(DEFAULT_FIRESTORE_API_URL);
        let base_url = normalize_base_url(raw_url).map_err(PersistenceError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            database = %config.firestore_database,
            collection = %config.firestore_collection,
            "Initialized Firestore vector store"
        );

        Ok(Self {
            client,
            base_url,
            project_id: config.project_id.clone(),
            database: config.firestore_database.clone(),
            collection: config.firestore_collection.clone(),
            access_token: config.google_access_token.clone(),
            embedder: get_embedding_client()?,
        })
    }

    fn document_name(&self, key: &str) -> String {
        format!(
            "projects/{}/databases/{}/documents/{}/{}",
            self.project_id, self.database, self.collection, key
        )
    }

    async fn commit(&self, writes: Vec<Value>) -> Result<(), PersistenceError> {
        let path = format!(
            "v1/projects/{}/databases/{}/documents:commit",
            self.project_id, self.database
        );
        let url = format_endpoint(&self.base_url, &path);
        let response = self
            .client
            .request(Method::POST, url)
            .bearer_auth(&self.access_token)
            .json(&json!({ "writes": writes }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = PersistenceError::UnexpectedStatus { status, body };
            tracing::error!(collection = %self.collection, error = %error, "Firestore commit failed");
            return Err(error);
        }

        Ok(())
    }
}

#[async_trait]
impl VectorWriter for FirestoreVectorStore {
    async fn upsert(
        &self,
        chunks: &[DocumentChunk],
        display_name: &str,
    ) -> Result<(), PersistenceError> {
        if chunks.is_empty() {
            tracing::debug!(file = display_name, "No chunks to persist");
            return Ok(());
        }

        let resolved: Vec<DocumentChunk> = chunks
            .iter()
            .map(|chunk| chunk.resolve_source(display_name))
            .collect();

        let texts: Vec<String> = resolved.iter().map(|chunk| chunk.content.clone()).collect();
        let vectors = self.embedder.generate_embeddings(texts).await?;

        let now = current_timestamp_rfc3339();
        let writes: Vec<Value> = resolved
            .iter()
            .zip(vectors.iter())
            .map(|(chunk, vector)| {
                let key = derive_document_key(display_name, chunk.chunk_id);
                json!({
                    "update": {
                        "name": self.document_name(&key),
                        "fields": chunk_fields(chunk, vector, &now),
                    }
                })
            })
            .collect();

        // One commit per source document; updates without preconditions are
        // create-or-overwrite, so re-runs land on the same keys.
        self.commit(writes).await?;
        tracing::debug!(
            file = display_name,
            chunks = chunks.len(),
            collection = %self.collection,
            "Chunks persisted"
        );
        Ok(())
    }
}

/// Encode one chunk as typed Firestore fields: verbatim content, the
/// embedding vector value, and a metadata map for retrieval filters.
fn chunk_fields(chunk: &DocumentChunk, vector: &[f32], timestamp_rfc3339: &str) -> Value {
    let document_date = match &chunk.document_date {
        Some(date) => json!({ "stringValue": date }),
        None => json!({ "nullValue": null }),
    };
    let source_file = match &chunk.source_file {
        Some(name) => json!({ "stringValue": name }),
        None => json!({ "nullValue": null }),
    };
    let values: Vec<Value> = vector
        .iter()
        .map(|component| json!({ "doubleValue": component }))
        .collect();

    json!({
        "content": { "stringValue": chunk.content },
        "embedding": {
            "mapValue": {
                "fields": {
                    "__type__": { "stringValue": "__vector__" },
                    "value": { "arrayValue": { "values": values } }
                }
            }
        },
        "metadata": {
            "mapValue": {
                "fields": {
                    "source_file": source_file,
                    "chunk_id": { "integerValue": chunk.chunk_id.to_string() },
                    "document_date": document_date,
                    "section_type": { "stringValue": chunk.section_type },
                }
            }
        },
        "indexed_at": { "timestampValue": timestamp_rfc3339 },
    })
}

/// Current timestamp formatted for the `indexed_at` field.
fn current_timestamp_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
