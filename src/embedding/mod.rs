//! Embedding client abstraction and the Vertex AI adapter.

use crate::config::get_config;
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid embedding service URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The service responded with an unexpected status code.
    #[error("Unexpected embedding service response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from the service.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// The service returned a different number of vectors than inputs.
    #[error("Embedding count mismatch: expected {expected}, got {actual}")]
    CountMismatch {
        /// Number of texts submitted for embedding.
        expected: usize,
        /// Number of vectors present in the response.
        actual: usize,
    },
}

/// Interface implemented by embedding backends.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Produce an embedding vector for each supplied chunk of text.
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError>;
}

/// Embedding client backed by a Vertex AI text-embedding model.
pub struct VertexEmbedder {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) project_id: String,
    pub(crate) location: String,
    pub(crate) model: String,
    pub(crate) access_token: String,
}

impl VertexEmbedder {
    /// Construct a new client using configuration derived from the environment.
    pub fn from_config() -> Result<Self, EmbeddingError> {
        let config = get_config();
        let client = Client::builder().user_agent("protodex/0.1").build()?;

        let raw_url = config
            .vertex_api_url
            .clone()
            .unwrap_or_else(|| format!("https://{}-aiplatform.googleapis.com", config.location));
        let base_url = normalize_base_url(&raw_url).map_err(EmbeddingError::InvalidUrl)?;
        tracing::debug!(url = %base_url, model = %config.embedding_model, "Initialized embedding client");

        Ok(Self {
            client,
            base_url,
            project_id: config.project_id.clone(),
            location: config.location.clone(),
            model: config.embedding_model.clone(),
            access_token: config.google_access_token.clone(),
        })
    }
}

#[async_trait]
impl EmbeddingClient for VertexEmbedder {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let expected = texts.len();
        let instances: Vec<_> = texts
            .into_iter()
            .map(|content| json!({ "content": content }))
            .collect();

        let path = format!(
            "v1/projects/{}/locations/{}/publishers/google/models/{}:predict",
            self.project_id, self.location, self.model
        );
        let url = format_endpoint(&self.base_url, &path);
        let response = self
            .client
            .request(Method::POST, url)
            .bearer_auth(&self.access_token)
            .json(&json!({ "instances": instances }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = EmbeddingError::UnexpectedStatus { status, body };
            tracing::error!(model = %self.model, error = %error, "Embedding request failed");
            return Err(error);
        }

        let payload: PredictResponse = response.json().await?;
        let vectors: Vec<Vec<f32>> = payload
            .predictions
            .into_iter()
            .map(|prediction| prediction.embeddings.values)
            .collect();

        if vectors.len() != expected {
            return Err(EmbeddingError::CountMismatch {
                expected,
                actual: vectors.len(),
            });
        }

        Ok(vectors)
    }
}

/// Build an embedding client suitable for the current configuration.
pub fn get_embedding_client() -> Result<Box<dyn EmbeddingClient + Send + Sync>, EmbeddingError> {
    Ok(Box::new(VertexEmbedder::from_config()?))
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

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
struct Prediction {
    embeddings: EmbeddingValues,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};
    use serde_json::json;

    const MODEL_PATH: &str =
        "/v1/projects/demo/locations/us-central1/publishers/google/models/text-embedding-004:predict";

    fn service(server: &MockServer) -> VertexEmbedder {
        VertexEmbedder {
            client: Client::builder()
                .user_agent("protodex-test")
                .build()
                .expect("client"),
            base_url: server.base_url(),
            project_id: "demo".into(),
            location: "us-central1".into(),
            model: "text-embedding-004".into(),
            access_token: "test-token".into(),
        }
    }

    #[tokio::test]
    async fn generate_embeddings_maps_predictions_in_order() {
        let server = MockServer::start_async().await;

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(MODEL_PATH)
                    .body_contains("first chunk")
                    .body_contains("second chunk");
                then.status(200).json_body(json!({
                    "predictions": [
                        { "embeddings": { "values": [0.1, 0.2] } },
                        { "embeddings": { "values": [0.3, 0.4] } }
                    ]
                }));
            })
            .await;

        let vectors = service(&server)
            .generate_embeddings(vec!["first chunk".into(), "second chunk".into()])
            .await
            .expect("embedding succeeds");

        mock.assert();
        assert_eq!(vectors, vec![vec![0.1, 0.2], vec![0.3, 0.4]]);
    }

    #[tokio::test]
    async fn generate_embeddings_skips_request_for_empty_input() {
        let server = MockServer::start_async().await;

        let vectors = service(&server)
            .generate_embeddings(Vec::new())
            .await
            .expect("empty input is fine");

        assert!(vectors.is_empty());
    }

    #[tokio::test]
    async fn generate_embeddings_detects_count_mismatch() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST).path(MODEL_PATH);
                then.status(200).json_body(json!({
                    "predictions": [
                        { "embeddings": { "values": [0.1] } }
                    ]
                }));
            })
            .await;

        let error = service(&server)
            .generate_embeddings(vec!["a".into(), "b".into()])
            .await
            .expect_err("mismatch fails");

        assert!(matches!(
            error,
            EmbeddingError::CountMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }
}
