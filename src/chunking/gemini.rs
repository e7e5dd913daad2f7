//! Gemini adapter for the chunking contract, speaking the Vertex AI
//! `generateContent` API.

use crate::chunking::{ChunkingClient, ChunkingError, SEGMENTATION_PROMPT};
use crate::config::get_config;
use crate::pipeline::DocumentChunk;
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::{Client, Method};
use serde::Deserialize;
use serde_json::json;

/// Chunking client backed by a Gemini model on Vertex AI.
pub struct GeminiChunker {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) project_id: String,
    pub(crate) location: String,
    pub(crate) model: String,
    pub(crate) access_token: String,
}

impl GeminiChunker {
    /// Construct a new client using configuration derived from the environment.
    pub fn from_config() -> Result<Self, ChunkingError> {
        let config = get_config();
        let client = Client::builder().user_agent("protodex/0.1").build()?;

        let raw_url = config
            .vertex_api_url
            .clone()
            .unwrap_or_else(|| default_vertex_url(&config.location));
        let base_url = normalize_base_url(&raw_url).map_err(ChunkingError::InvalidUrl)?;
        tracing::debug!(url = %base_url, model = %config.chunking_model, "Initialized Gemini chunking client");

        Ok(Self {
            client,
            base_url,
            project_id: config.project_id.clone(),
            location: config.location.clone(),
            model: config.chunking_model.clone(),
            access_token: config.google_access_token.clone(),
        })
    }

    async fn generate(&self, document: &[u8], display_name: &str) -> Result<String, ChunkingError> {
        let body = json!({
            "systemInstruction": {
                "parts": [{ "text": SEGMENTATION_PROMPT }]
            },
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": format!("Process this PDF document: {display_name}") },
                    {
                        "inlineData": {
                            "mimeType": "application/pdf",
                            "data": STANDARD.encode(document)
                        }
                    }
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json"
            }
        });

        let path = format!(
            "v1/projects/{}/locations/{}/publishers/google/models/{}:generateContent",
            self.project_id, self.location, self.model
        );
        let url = format_endpoint(&self.base_url, &path);
        let response = self
            .client
            .request(Method::POST, url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = ChunkingError::UnexpectedStatus { status, body };
            tracing::error!(model = %self.model, error = %error, "Chunking request failed");
            return Err(error);
        }

        let payload: GenerateContentResponse = response.json().await?;
        payload
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
            .ok_or(ChunkingError::EmptyResponse)
    }
}

#[async_trait]
impl ChunkingClient for GeminiChunker {
    async fn chunk(
        &self,
        document: &[u8],
        display_name: &str,
    ) -> Result<Vec<DocumentChunk>, ChunkingError> {
        let text = self.generate(document, display_name).await?;
        // Strict contract: the whole response text must be the chunk array.
        let chunks: Vec<DocumentChunk> = serde_json::from_str(text.trim())?;
        Ok(chunks)
    }
}

fn default_vertex_url(location: &str) -> String {
    format!("https://{location}-aiplatform.googleapis.com")
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
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};
    use serde_json::json;

    const MODEL_PATH: &str =
        "/v1/projects/demo/locations/us-central1/publishers/google/models/gemini-2.5-pro:generateContent";

    fn service(server: &MockServer) -> GeminiChunker {
        GeminiChunker {
            client: Client::builder()
                .user_agent("protodex-test")
                .build()
                .expect("client"),
            base_url: server.base_url(),
            project_id: "demo".into(),
            location: "us-central1".into(),
            model: "gemini-2.5-pro".into(),
            access_token: "test-token".into(),
        }
    }

    #[tokio::test]
    async fn chunk_parses_candidate_text_into_chunks() {
        let server = MockServer::start_async().await;

        let chunk_array = json!([
            {
                "chunk_id": 0,
                "document_date": "2024-01-15",
                "section_type": "Header and Agenda",
                "content": "Committee meeting\nParticipants: A, B",
                "source_file": null
            },
            {
                "chunk_id": 1,
                "document_date": "2024-01-15",
                "section_type": "Topic Discussion",
                "content": "2.1 Budget review",
                "source_file": null
            }
        ]);
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(MODEL_PATH)
                    .header("authorization", "Bearer test-token")
                    .body_contains("inlineData")
                    .body_contains("Process this PDF document: report.pdf");
                then.status(200).json_body(json!({
                    "candidates": [{
                        "content": {
                            "role": "model",
                            "parts": [{ "text": chunk_array.to_string() }]
                        }
                    }]
                }));
            })
            .await;

        let chunks = service(&server)
            .chunk(b"%PDF-1.7", "report.pdf")
            .await
            .expect("chunking succeeds");

        mock.assert();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chunk_id, 0);
        assert_eq!(chunks[1].section_type, "Topic Discussion");
        assert!(chunks[0].source_file.is_none());
    }

    #[tokio::test]
    async fn chunk_rejects_non_schema_output() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST).path(MODEL_PATH);
                then.status(200).json_body(json!({
                    "candidates": [{
                        "content": {
                            "parts": [{ "text": "Sure! Here are the chunks you asked for." }]
                        }
                    }]
                }));
            })
            .await;

        let error = service(&server)
            .chunk(b"%PDF-1.7", "report.pdf")
            .await
            .expect_err("conversational output fails");

        assert!(matches!(error, ChunkingError::Schema(_)));
    }

    #[tokio::test]
    async fn chunk_surfaces_missing_candidates() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST).path(MODEL_PATH);
                then.status(200).json_body(json!({ "candidates": [] }));
            })
            .await;

        let error = service(&server)
            .chunk(b"%PDF-1.7", "report.pdf")
            .await
            .expect_err("empty candidates fail");

        assert!(matches!(error, ChunkingError::EmptyResponse));
    }

    #[tokio::test]
    async fn chunk_surfaces_unexpected_status() {
        let server = MockServer::start_async().await;

        server
            .mock_async(|when, then| {
                when.method(POST).path(MODEL_PATH);
                then.status(429).body("Resource exhausted");
            })
            .await;

        let error = service(&server)
            .chunk(b"%PDF-1.7", "report.pdf")
            .await
            .expect_err("rate limit surfaces");

        assert!(matches!(
            error,
            ChunkingError::UnexpectedStatus { status, .. } if status == 429
        ));
    }
}
