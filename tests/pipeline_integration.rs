//! End-to-end pipeline run against mocked Cloud Storage, Vertex AI, and
//! Firestore endpoints.

use httpmock::{Method::GET, Method::POST, MockServer};
use protodex::{
    chunking::GeminiChunker, config, pipeline::PipelineRunner, storage::GcsDocumentSource,
    vectorstore::FirestoreVectorStore,
};
use serde_json::json;

fn set_env(key: &str, value: &str) {
    // SAFETY: The single test in this binary establishes deterministic
    // configuration up front, before any other thread exists.
    unsafe { std::env::set_var(key, value) }
}

const GENERATE_PATH: &str =
    "/v1/projects/demo/locations/us-central1/publishers/google/models/gemini-2.5-pro:generateContent";
const PREDICT_PATH: &str =
    "/v1/projects/demo/locations/us-central1/publishers/google/models/text-embedding-004:predict";
const COMMIT_PATH: &str = "/v1/projects/demo/databases/(default)/documents:commit";

#[tokio::test]
async fn full_run_discovers_chunks_embeds_and_persists_in_order() {
    let server = MockServer::start_async().await;
    let base_url = server.base_url();

    set_env("GOOGLE_ACCESS_TOKEN", "test-token");
    set_env("GCP_PROJECT_ID", "demo");
    set_env("GCP_LOCATION", "us-central1");
    set_env("GCS_BUCKET", "protocols");
    set_env("GCS_FOLDER_PREFIX", "a/");
    set_env("FIRESTORE_DATABASE", "(default)");
    set_env("FIRESTORE_COLLECTION", "protocols");
    set_env("CHUNKING_MODEL", "gemini-2.5-pro");
    set_env("EMBEDDING_MODEL", "text-embedding-004");
    set_env("STORAGE_API_URL", &base_url);
    set_env("VERTEX_API_URL", &base_url);
    set_env("FIRESTORE_API_URL", &base_url);
    config::init_config();

    let listing = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/storage/v1/b/protocols/o")
                .query_param("prefix", "a/");
            then.status(200).json_body(json!({
                "items": [
                    { "name": "a/report.pdf" },
                    { "name": "a/notes.txt" },
                    { "name": "a/minutes.PDF" }
                ]
            }));
        })
        .await;

    let report_download = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/storage/v1/b/protocols/o/a%2Freport.pdf")
                .query_param("alt", "media");
            then.status(200).body("%PDF report");
        })
        .await;
    let minutes_download = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/storage/v1/b/protocols/o/a%2Fminutes.PDF")
                .query_param("alt", "media");
            then.status(200).body("%PDF minutes");
        })
        .await;

    let report_chunks = json!([
        {
            "chunk_id": 0,
            "document_date": "2024-01-15",
            "section_type": "Header and Agenda",
            "content": "Committee meeting\nParticipants",
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
    let report_chunking = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(GENERATE_PATH)
                .body_contains("Process this PDF document: report.pdf");
            then.status(200).json_body(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": report_chunks.to_string() }] }
                }]
            }));
        })
        .await;

    let minutes_chunks = json!([
        {
            "chunk_id": 0,
            "document_date": null,
            "section_type": "Closing and Decisions",
            "content": "Decisions adopted unanimously",
            "source_file": "minutes.PDF"
        }
    ]);
    let minutes_chunking = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(GENERATE_PATH)
                .body_contains("Process this PDF document: minutes.PDF");
            then.status(200).json_body(json!({
                "candidates": [{
                    "content": { "parts": [{ "text": minutes_chunks.to_string() }] }
                }]
            }));
        })
        .await;

    let report_embedding = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(PREDICT_PATH)
                .body_contains("2.1 Budget review");
            then.status(200).json_body(json!({
                "predictions": [
                    { "embeddings": { "values": [0.1, 0.2] } },
                    { "embeddings": { "values": [0.3, 0.4] } }
                ]
            }));
        })
        .await;
    let minutes_embedding = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(PREDICT_PATH)
                .body_contains("Decisions adopted unanimously");
            then.status(200).json_body(json!({
                "predictions": [
                    { "embeddings": { "values": [0.5, 0.6] } }
                ]
            }));
        })
        .await;

    // The report chunks carried no source_file, so the persisted metadata
    // must be backfilled with the display name.
    let report_commit = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(COMMIT_PATH)
                .body_contains("documents/protocols/report_pdf_0")
                .body_contains("documents/protocols/report_pdf_1")
                .body_contains(r#""source_file":{"stringValue":"report.pdf"}"#);
            then.status(200).json_body(json!({ "writeResults": [{}, {}] }));
        })
        .await;
    // The minutes chunk arrived with source_file pre-set; it must be stored
    // unchanged.
    let minutes_commit = server
        .mock_async(|when, then| {
            when.method(POST)
                .path(COMMIT_PATH)
                .body_contains("documents/protocols/minutes_PDF_0")
                .body_contains(r#""source_file":{"stringValue":"minutes.PDF"}"#);
            then.status(200).json_body(json!({ "writeResults": [{}] }));
        })
        .await;

    let runner = PipelineRunner::new(
        Box::new(GcsDocumentSource::from_config().expect("storage client")),
        Box::new(GeminiChunker::from_config().expect("chunking client")),
        Box::new(FirestoreVectorStore::from_config().expect("vector store client")),
        config::get_config().folder_prefix.clone(),
    );

    let results = runner.process_all().await.expect("pipeline run succeeds");

    listing.assert();
    report_download.assert();
    minutes_download.assert();
    report_chunking.assert();
    minutes_chunking.assert();
    report_embedding.assert();
    minutes_embedding.assert();
    report_commit.assert();
    minutes_commit.assert();

    // The .txt object is filtered out; order follows the listing.
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].file_name, "report.pdf");
    assert_eq!(results[0].total_chunks(), 2);
    assert_eq!(results[1].file_name, "minutes.PDF");
    assert_eq!(results[1].total_chunks(), 1);
    assert_eq!(
        results[1].chunks[0].source_file.as_deref(),
        Some("minutes.PDF")
    );
}
