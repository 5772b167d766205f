//! Versekit Chunker
//!
//! Turns an ordered stream of verses into token-budgeted chunks ready for
//! embedding:
//! - Token counting (`TokenCounter`)
//! - Canon and genre tables (`Canon`, `GenreTable`)
//! - Greedy chapter-scoped assembly with optional overlap (`ChunkAssembler`)
//! - Cross-reference and parallel-passage enrichment (`MetadataEnricher`)
//! - Quality statistics (`analyze`)
//! - Chapter-parallel batch driver (`ChunkPipeline`)

pub mod assemble;
pub mod canon;
pub mod document;
pub mod enrich;
pub mod genre;
pub mod pipeline;
pub mod quality;
pub mod tokens;
pub mod types;

pub use assemble::ChunkAssembler;
pub use canon::{Book, Canon};
pub use document::{content_hash, ChunkDocument, DocumentMetadata};
pub use enrich::{MetadataEnricher, ParallelGroup, ParallelPassageTable, ReferenceDetector};
pub use genre::{Genre, GenreProfile, GenreTable};
pub use pipeline::{ChapterFailure, ChunkPipeline, ChunkRun};
pub use quality::{analyze, QualityReport};
pub use tokens::{create_counter, Cl100kCounter, TokenCounter, WordCounter};
pub use types::{Chunk, ChunkVerse, Testament, Verse};
