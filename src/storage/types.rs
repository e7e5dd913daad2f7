//! Shared types used by the Cloud Storage client.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors returned while interacting with the object store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid storage URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// The storage API responded with an unexpected status code.
    #[error("Unexpected storage response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from the storage API.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
}

#[derive(Deserialize)]
pub(crate) struct ListObjectsResponse {
    #[serde(default)]
    pub(crate) items: Vec<ObjectDescription>,
    #[serde(default, rename = "nextPageToken")]
    pub(crate) next_page_token: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct ObjectDescription {
    pub(crate) name: String,
}
