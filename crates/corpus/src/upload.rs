//! Batch upload of chunk documents with bounded concurrency and retry.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;

use versekit_chunker::ChunkDocument;
use versekit_core::{AppConfig, AppError, AppResult};

use crate::progress::ProgressReporter;
use crate::store::{DocumentStore, ImportResponse, MAX_BATCH_SIZE};

/// Tuning for one upload run.
#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub batch_size: usize,
    /// Batches in flight at once
    pub concurrency: usize,
    /// Extra attempts after a transient failure
    pub max_retries: u32,
    /// Delay before the first retry; doubles on every further attempt
    pub retry_backoff: Duration,
    pub embed: bool,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            batch_size: MAX_BATCH_SIZE,
            concurrency: 4,
            max_retries: 3,
            retry_backoff: Duration::from_millis(500),
            embed: true,
        }
    }
}

impl UploadOptions {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            batch_size: config.batch_size,
            concurrency: config.upload_concurrency,
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
            embed: config.embed,
        }
    }

    fn validate(&self) -> AppResult<()> {
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(AppError::InvalidInput(format!(
                "batch_size must be between 1 and {}, got {}",
                MAX_BATCH_SIZE, self.batch_size
            )));
        }
        if self.concurrency == 0 {
            return Err(AppError::InvalidInput(
                "upload concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A document or batch that did not make it into the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadError {
    /// Document title, or `batch N` for a whole-batch failure
    pub target: String,
    pub error: String,
}

/// Outcome of an upload run.
#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    pub total_documents: usize,
    /// Dropped before upload because an earlier document had the same content
    pub skipped_duplicates: usize,
    pub total_batches: usize,
    pub imported: usize,
    /// Rejected by the store as already present
    pub duplicates: usize,
    pub failed: usize,
    pub errors: Vec<UploadError>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl UploadReport {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn duration_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

/// Result of one batch after retries.
struct BatchOutcome {
    index: usize,
    imported: usize,
    duplicates: usize,
    failed: usize,
    errors: Vec<UploadError>,
}

/// Upload documents to a store.
///
/// Checks store health first, drops documents whose content repeats an
/// earlier one, then sends batches with at most `options.concurrency` in
/// flight. Transient failures are retried with exponential backoff.
/// A batch that still fails counts all of its documents as failed; the
/// run carries on with the remaining batches.
///
/// # Errors
/// `InvalidInput` for bad options, `Store` when the health check fails.
pub async fn upload_documents<S>(
    store: &S,
    documents: &[ChunkDocument],
    options: &UploadOptions,
    progress: &ProgressReporter,
) -> AppResult<UploadReport>
where
    S: DocumentStore + ?Sized,
{
    options.validate()?;
    let started_at = Utc::now();

    if !store.health().await? {
        return Err(AppError::Store(format!(
            "Document store not accessible at {}",
            store.endpoint()
        )));
    }

    let mut hashes = HashSet::new();
    let unique: Vec<ChunkDocument> = documents
        .iter()
        .filter(|doc| hashes.insert(doc.content_hash()))
        .cloned()
        .collect();
    let skipped_duplicates = documents.len() - unique.len();
    if skipped_duplicates > 0 {
        tracing::warn!(
            "Skipping {} documents with repeated content",
            skipped_duplicates
        );
    }

    let batches: Vec<&[ChunkDocument]> = unique.chunks(options.batch_size).collect();
    let total_batches = batches.len();
    tracing::info!(
        "Uploading {} documents in {} batches to {} (concurrency {})",
        unique.len(),
        total_batches,
        store.endpoint(),
        options.concurrency
    );

    let mut outcomes: Vec<BatchOutcome> = Vec::with_capacity(total_batches);
    let mut in_flight = stream::iter(batches.into_iter().enumerate())
        .map(|(index, batch)| upload_batch(store, index, batch, options))
        .buffer_unordered(options.concurrency);

    while let Some(outcome) = in_flight.next().await {
        progress.upload(
            outcomes.len() as u64 + 1,
            total_batches as u64,
            outcome.imported,
            outcome.failed,
        );
        outcomes.push(outcome);
    }

    outcomes.sort_by_key(|o| o.index);

    let mut report = UploadReport {
        total_documents: documents.len(),
        skipped_duplicates,
        total_batches,
        imported: 0,
        duplicates: 0,
        failed: 0,
        errors: Vec::new(),
        started_at,
        finished_at: started_at,
    };
    for outcome in outcomes {
        report.imported += outcome.imported;
        report.duplicates += outcome.duplicates;
        report.failed += outcome.failed;
        report.errors.extend(outcome.errors);
    }
    report.finished_at = Utc::now();

    tracing::info!(
        "Upload finished: {} imported, {} duplicates, {} failed in {:.1}s",
        report.imported,
        report.duplicates,
        report.failed,
        report.duration_secs()
    );
    Ok(report)
}

async fn upload_batch<S>(
    store: &S,
    index: usize,
    batch: &[ChunkDocument],
    options: &UploadOptions,
) -> BatchOutcome
where
    S: DocumentStore + ?Sized,
{
    match import_with_retry(store, index, batch, options).await {
        Ok(response) => summarize(index, batch, response),
        Err(e) => {
            tracing::warn!("Batch {} failed: {}", index + 1, e);
            BatchOutcome {
                index,
                imported: 0,
                duplicates: 0,
                failed: batch.len(),
                errors: vec![UploadError {
                    target: format!("batch {}", index + 1),
                    error: e.to_string(),
                }],
            }
        }
    }
}

async fn import_with_retry<S>(
    store: &S,
    index: usize,
    batch: &[ChunkDocument],
    options: &UploadOptions,
) -> AppResult<ImportResponse>
where
    S: DocumentStore + ?Sized,
{
    let mut attempt = 0u32;
    loop {
        match store.import_batch(batch, options.embed).await {
            Ok(response) => return Ok(response),
            Err(e) if e.is_retryable() && attempt < options.max_retries => {
                let delay = options.retry_backoff * 2u32.saturating_pow(attempt);
                attempt += 1;
                tracing::warn!(
                    "Batch {} attempt {} failed, retrying in {:?}: {}",
                    index + 1,
                    attempt,
                    delay,
                    e
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Fold a store response into counts. Duplicate rejections are not failures.
fn summarize(index: usize, batch: &[ChunkDocument], response: ImportResponse) -> BatchOutcome {
    if response.results.is_empty() {
        return BatchOutcome {
            index,
            imported: response.imported,
            duplicates: 0,
            failed: response.failed,
            errors: Vec::new(),
        };
    }

    let mut outcome = BatchOutcome {
        index,
        imported: 0,
        duplicates: 0,
        failed: 0,
        errors: Vec::new(),
    };
    for result in &response.results {
        if result.success {
            outcome.imported += 1;
        } else if result.is_duplicate() {
            tracing::debug!("Store already holds {}", result.title);
            outcome.duplicates += 1;
        } else {
            outcome.failed += 1;
            outcome.errors.push(UploadError {
                target: result.title.clone(),
                error: result
                    .error
                    .clone()
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }
    }
    if response.results.len() < batch.len() {
        tracing::warn!(
            "Store reported {} results for a batch of {}",
            response.results.len(),
            batch.len()
        );
    }
    outcome
}
