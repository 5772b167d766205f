//! Post-assembly metadata: cross-references and parallel passages.

mod parallels;
mod references;

pub use parallels::{ParallelGroup, ParallelPassageTable, PassageRange};
pub use references::ReferenceDetector;

use versekit_core::AppResult;

use crate::canon::Canon;
use crate::types::Chunk;

/// Attaches citation and parallel-passage metadata to finished chunks.
///
/// Verse boundaries, text and token counts are never touched.
#[derive(Debug, Clone)]
pub struct MetadataEnricher {
    references: ReferenceDetector,
    parallels: ParallelPassageTable,
}

impl MetadataEnricher {
    pub fn new(canon: &Canon, parallels: ParallelPassageTable) -> AppResult<Self> {
        Ok(Self {
            references: ReferenceDetector::new(canon)?,
            parallels,
        })
    }

    pub fn parallels(&self) -> &ParallelPassageTable {
        &self.parallels
    }

    pub fn enrich(&self, mut chunk: Chunk) -> Chunk {
        // Raw verse text: a rendered "2 John 3:16" would read as II John.
        chunk.cross_references = self
            .references
            .detect_all(chunk.verses.iter().map(|v| v.text.as_str()));
        chunk.parallel_passage_id = self
            .parallels
            .lookup(&chunk.book, chunk.chapter, chunk.verse_start, chunk.verse_end)
            .map(str::to_string);
        chunk
    }
}
