#![deny(missing_docs)]

//! Core library for the protodex ingestion pipeline.

/// Semantic chunking client backed by the Gemini document-understanding service.
pub mod chunking;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and the Vertex AI adapter.
pub mod embedding;
/// Structured logging and tracing setup.
pub mod logging;
/// Pipeline orchestration: discovery, per-document sequencing, aggregation.
pub mod pipeline;
/// Document source abstraction and the Cloud Storage adapter.
pub mod storage;
/// Vector persistence into Firestore.
pub mod vectorstore;
