//! Versekit Corpus
//!
//! Everything around the chunking engine that touches the outside world:
//! - Verse source parsing and integrity checks (`parse_verses_csv`)
//! - Document store client (`DocumentStore`, `StoreClient`)
//! - Bounded-concurrency batch upload with retry (`upload_documents`)
//! - Progress reporting (`ProgressReporter`)

pub mod progress;
pub mod source;
pub mod store;
pub mod upload;

#[cfg(test)]
mod test_support;

pub use progress::{ProgressCallback, ProgressEvent, ProgressReporter};
pub use source::{available_books, parse_verses_csv, validate_integrity, IntegrityReport};
pub use store::{
    DocumentStore, ImportResponse, ImportResult, SearchHit, SearchResponse, StoreClient,
    StoreStats,
};
pub use upload::{upload_documents, UploadError, UploadOptions, UploadReport};
