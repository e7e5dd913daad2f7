use serde::Deserialize;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
}

/// Runtime configuration for the ingestion pipeline.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// OAuth bearer token used for every Google API request.
    pub google_access_token: String,
    /// Google Cloud project that hosts the bucket, the models, and Firestore.
    pub project_id: String,
    /// Region used for Vertex AI model endpoints.
    pub location: String,
    /// Cloud Storage bucket holding the source protocol documents.
    pub bucket: String,
    /// Object-name prefix under which documents are discovered.
    pub folder_prefix: String,
    /// Firestore database identifier.
    pub firestore_database: String,
    /// Firestore collection receiving the embedded chunks.
    pub firestore_collection: String,
    /// Gemini model identifier used for semantic chunking.
    pub chunking_model: String,
    /// Embedding model identifier passed to Vertex AI.
    pub embedding_model: String,
    /// Optional override for the Cloud Storage endpoint.
    pub storage_api_url: Option<String>,
    /// Optional override for the Vertex AI endpoint.
    pub vertex_api_url: Option<String>,
    /// Optional override for the Firestore endpoint.
    pub firestore_api_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables, applying defaults where the
    /// variable is optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            google_access_token: load_env("GOOGLE_ACCESS_TOKEN")?,
            project_id: load_env("GCP_PROJECT_ID")?,
            location: load_env_optional("GCP_LOCATION")
                .unwrap_or_else(|| "us-central1".to_string()),
            bucket: load_env("GCS_BUCKET")?,
            folder_prefix: load_env_optional("GCS_FOLDER_PREFIX").unwrap_or_default(),
            firestore_database: load_env_optional("FIRESTORE_DATABASE")
                .unwrap_or_else(|| "(default)".to_string()),
            firestore_collection: load_env_optional("FIRESTORE_COLLECTION")
                .unwrap_or_else(|| "protocols".to_string()),
            chunking_model: load_env_optional("CHUNKING_MODEL")
                .unwrap_or_else(|| "gemini-2.5-pro".to_string()),
            embedding_model: load_env_optional("EMBEDDING_MODEL")
                .unwrap_or_else(|| "text-embedding-004".to_string()),
            storage_api_url: load_env_optional("STORAGE_API_URL"),
            vertex_api_url: load_env_optional("VERTEX_API_URL"),
            firestore_api_url: load_env_optional("FIRESTORE_API_URL"),
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        project = %config.project_id,
        location = %config.location,
        bucket = %config.bucket,
        prefix = %config.folder_prefix,
        database = %config.firestore_database,
        collection = %config.firestore_collection,
        chunking_model = %config.chunking_model,
        embedding_model = %config.embedding_model,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
