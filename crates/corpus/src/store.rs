//! Document-and-embedding store client.
//!
//! The store owns embedding, indexing and persistence. Documents are
//! immutable once accepted, and a document whose content repeats one
//! already stored is rejected rather than overwritten.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use versekit_chunker::ChunkDocument;
use versekit_core::{AppError, AppResult};

/// Largest batch the import endpoint accepts.
pub const MAX_BATCH_SIZE: usize = 100;

/// Response of the corpus import endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportResponse {
    #[serde(default)]
    pub total: usize,
    #[serde(default)]
    pub imported: usize,
    #[serde(default)]
    pub failed: usize,
    #[serde(default)]
    pub results: Vec<ImportResult>,
}

/// Per-document outcome within a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

fn default_true() -> bool {
    true
}

impl ImportResult {
    /// Rejected because the store already holds identical content.
    pub fn is_duplicate(&self) -> bool {
        !self.success
            && self
                .error
                .as_deref()
                .is_some_and(|e| e.to_ascii_lowercase().contains("duplicate"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreStats {
    #[serde(default)]
    pub total_documents: u64,
    #[serde(default)]
    pub corpus_documents: u64,
    #[serde(default)]
    pub kb_documents: u64,
    #[serde(default)]
    pub total_chunks: u64,
    #[serde(default)]
    pub embedded_chunks: u64,
    #[serde(default)]
    pub domains: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(alias = "document_title", default)]
    pub title: String,
    #[serde(default)]
    pub similarity: f64,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchHit>,
}

#[derive(Debug, Serialize)]
struct ImportRequest<'a> {
    documents: &'a [ChunkDocument],
    embed: bool,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    top_k: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    domain: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct DocumentListing {
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    documents: Vec<serde_json::Value>,
}

/// The operations the uploader needs from a store.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Where the store lives, for log and error messages.
    fn endpoint(&self) -> &str;

    /// Whether the store is reachable and healthy.
    async fn health(&self) -> AppResult<bool>;

    /// Import up to [`MAX_BATCH_SIZE`] documents.
    ///
    /// # Errors
    /// `Transient` for transport failures, timeouts, 429 and 5xx;
    /// `Store` for other rejections; `InvalidInput` for oversized batches.
    async fn import_batch(
        &self,
        documents: &[ChunkDocument],
        embed: bool,
    ) -> AppResult<ImportResponse>;
}

/// HTTP client for the store's REST API.
pub struct StoreClient {
    base_url: String,
    client: reqwest::Client,
}

impl StoreClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &versekit_core::AppConfig) -> AppResult<Self> {
        Self::new(
            config.store_url.clone(),
            Duration::from_secs(config.store_timeout_secs),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn stats(&self) -> AppResult<StoreStats> {
        let response = self
            .client
            .get(self.url("/api/v1/admin/stats"))
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| AppError::Store(format!("Failed to parse stats response: {}", e)))
    }

    pub async fn search(
        &self,
        query: &str,
        domain: Option<&str>,
        top_k: usize,
    ) -> AppResult<SearchResponse> {
        tracing::debug!("Searching store: query={:?} domain={:?}", query, domain);
        let response = self
            .client
            .post(self.url("/api/v1/search"))
            .json(&SearchRequest {
                query,
                top_k,
                domain,
            })
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| AppError::Store(format!("Failed to parse search response: {}", e)))
    }

    /// Number of documents stored under a domain.
    pub async fn count_domain(&self, domain: &str) -> AppResult<u64> {
        let response = self
            .client
            .get(self.url("/api/v1/documents"))
            .query(&[("domain", domain), ("limit", "1")])
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response).await?;
        let listing: DocumentListing = response
            .json()
            .await
            .map_err(|e| AppError::Store(format!("Failed to parse document listing: {}", e)))?;
        Ok(listing
            .total
            .unwrap_or(listing.documents.len() as u64))
    }
}

#[async_trait::async_trait]
impl DocumentStore for StoreClient {
    fn endpoint(&self) -> &str {
        &self.base_url
    }

    async fn health(&self) -> AppResult<bool> {
        match self.client.get(self.url("/health")).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                tracing::debug!("Health check against {} failed: {}", self.base_url, e);
                Ok(false)
            }
        }
    }

    async fn import_batch(
        &self,
        documents: &[ChunkDocument],
        embed: bool,
    ) -> AppResult<ImportResponse> {
        if documents.len() > MAX_BATCH_SIZE {
            return Err(AppError::InvalidInput(format!(
                "Batch size {} exceeds maximum of {}",
                documents.len(),
                MAX_BATCH_SIZE
            )));
        }

        let response = self
            .client
            .post(self.url("/api/v1/corpus/import"))
            .json(&ImportRequest { documents, embed })
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| AppError::Store(format!("Failed to parse import response: {}", e)))
    }
}

fn transport_error(err: reqwest::Error) -> AppError {
    AppError::Transient(format!("Request to store failed: {}", err))
}

async fn check_status(response: reqwest::Response) -> AppResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(status_error(status, &body))
}

/// Map a failed HTTP status to a retryable or permanent error.
fn status_error(status: StatusCode, body: &str) -> AppError {
    let message = format!("Store API error ({}): {}", status, body);
    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        AppError::Transient(message)
    } else {
        AppError::Store(message)
    }
}
