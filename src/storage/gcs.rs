//! HTTP client for the Cloud Storage JSON API.

use crate::config::get_config;
use crate::storage::types::{ListObjectsResponse, StorageError};
use crate::storage::DocumentSource;
use async_trait::async_trait;
use reqwest::{Client, Method};

const DEFAULT_STORAGE_API_URL: &str = "https://storage.googleapis.com";

/// Lightweight HTTP client reading protocol documents from a GCS bucket.
pub struct GcsDocumentSource {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) bucket: String,
    pub(crate) access_token: String,
}

impl GcsDocumentSource {
    /// Construct a new client using configuration derived from the environment.
    pub fn from_config() -> Result<Self, StorageError> {
        let config = get_config();
        let client = Client::builder().user_agent("protodex/0.1").build()?;

        let raw_url = config
            .storage_api_url
            .as_deref()
            .unwrap_or(DEFAULT_STORAGE_API_URL);
        let base_url = normalize_base_url(raw_url).map_err(StorageError::InvalidUrl)?;
        tracing::debug!(url = %base_url, bucket = %config.bucket, "Initialized Cloud Storage client");

        Ok(Self {
            client,
            base_url,
            bucket: config.bucket.clone(),
            access_token: config.google_access_token.clone(),
        })
    }

    /// Enumerate object names under the prefix, following `nextPageToken`
    /// until the listing is exhausted.
    pub async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut names = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .request(Method::GET, &format!("storage/v1/b/{}/o", self.bucket))
                .query(&[("prefix", prefix)]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request.send().await?;
            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                let error = StorageError::UnexpectedStatus { status, body };
                tracing::error!(bucket = %self.bucket, error = %error, "Failed to list objects");
                return Err(error);
            }

            let page: ListObjectsResponse = response.json().await?;
            names.extend(page.items.into_iter().map(|object| object.name));

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(names)
    }

    /// Download one object's raw bytes via `alt=media`.
    pub async fn download_object(&self, name: &str) -> Result<Vec<u8>, StorageError> {
        let encoded = urlencoding::encode(name);
        let response = self
            .request(
                Method::GET,
                &format!("storage/v1/b/{}/o/{encoded}", self.bucket),
            )
            .query(&[("alt", "media")])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = StorageError::UnexpectedStatus { status, body };
            tracing::error!(object = name, error = %error, "Failed to download object");
            return Err(error);
        }

        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(&self.base_url, path);
        self.client.request(method, url).bearer_auth(&self.access_token)
    }
}

#[async_trait]
impl DocumentSource for GcsDocumentSource {
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        self.list_objects(prefix).await
    }

    async fn read(&self, identifier: &str) -> Result<Vec<u8>, StorageError> {
        self.download_object(identifier).await
    }
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
