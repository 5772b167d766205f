//! Fixtures shared by the unit tests.

use versekit_chunker::{ChunkDocument, DocumentMetadata, Genre, Testament};

/// A small Genesis 1 document whose content is unique per `n`.
pub fn document(n: u32) -> ChunkDocument {
    ChunkDocument {
        title: format!("Genesis 1:{} (KJV)", n),
        content: format!("{} verse text number {}", n, n),
        domain: "bible/kjv".to_string(),
        metadata: DocumentMetadata {
            book: "Genesis".to_string(),
            chapter: 1,
            verse_start: n,
            verse_end: n,
            testament: Testament::Old,
            genre: Genre::Narrative,
            token_count: 5,
            cross_references: Vec::new(),
            parallel_passage_id: None,
            translation: "KJV".to_string(),
            total_verses: 1,
            oversized: false,
        },
    }
}
