//! Store-ready document records rendered from chunks.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::genre::Genre;
use crate::types::{Chunk, Testament};

/// One document as accepted by the store's corpus import endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkDocument {
    pub title: String,
    pub content: String,
    pub domain: String,
    pub metadata: DocumentMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub book: String,
    pub chapter: u32,
    pub verse_start: u32,
    pub verse_end: u32,
    pub testament: Testament,
    pub genre: Genre,
    pub token_count: usize,
    pub cross_references: Vec<String>,
    pub parallel_passage_id: Option<String>,
    pub translation: String,
    /// Primary verses in the chunk
    pub total_verses: usize,
    #[serde(default, skip_serializing_if = "is_false")]
    pub oversized: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl ChunkDocument {
    /// Render a chunk for one translation under a corpus namespace.
    pub fn from_chunk(chunk: &Chunk, translation: &str, namespace: &str) -> Self {
        let code = translation.to_uppercase();
        let title = format!("{} ({})", chunk.reference(), code);
        let domain = format!("{}/{}", namespace, translation.to_lowercase());

        Self {
            title,
            content: chunk.text.clone(),
            domain,
            metadata: DocumentMetadata {
                book: chunk.book.clone(),
                chapter: chunk.chapter,
                verse_start: chunk.verse_start,
                verse_end: chunk.verse_end,
                testament: chunk.testament,
                genre: chunk.genre,
                token_count: chunk.token_count,
                cross_references: chunk.cross_references.clone(),
                parallel_passage_id: chunk.parallel_passage_id.clone(),
                translation: code,
                total_verses: chunk.primary_verses().count(),
                oversized: chunk.oversized,
            },
        }
    }

    /// SHA-256 of the content, hex encoded. The store deduplicates on it.
    pub fn content_hash(&self) -> String {
        content_hash(&self.content)
    }
}

/// SHA-256 hash of text as lowercase hex.
pub fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genre::GenreProfile;
    use crate::types::ChunkVerse;

    fn chunk(start: u32, end: u32) -> Chunk {
        let verses: Vec<ChunkVerse> = (start..=end)
            .map(|n| ChunkVerse {
                number: n,
                text: format!("verse {}", n),
                tokens: 2,
                overlap: false,
            })
            .collect();
        let text = verses
            .iter()
            .map(ChunkVerse::render)
            .collect::<Vec<_>>()
            .join(" ");
        Chunk {
            book: "John".to_string(),
            chapter: 11,
            testament: Testament::New,
            verse_start: start,
            verse_end: end,
            text,
            token_count: verses.len() * 2,
            genre: Genre::Gospel,
            profile: GenreProfile::new(350, 50, 500),
            verses,
            oversized: false,
            cross_references: vec!["Isaiah 53:5".to_string()],
            parallel_passage_id: None,
        }
    }

    #[test]
    fn test_document_shape() {
        let doc = ChunkDocument::from_chunk(&chunk(35, 37), "kjv", "bible");
        assert_eq!(doc.title, "John 11:35-37 (KJV)");
        assert_eq!(doc.domain, "bible/kjv");
        assert_eq!(doc.content, "35 verse 35 36 verse 36 37 verse 37");

        let json = serde_json::to_value(&doc).unwrap();
        let metadata = &json["metadata"];
        assert_eq!(metadata["book"], "John");
        assert_eq!(metadata["chapter"], 11);
        assert_eq!(metadata["verse_start"], 35);
        assert_eq!(metadata["verse_end"], 37);
        assert_eq!(metadata["testament"], "NT");
        assert_eq!(metadata["genre"], "gospel");
        assert_eq!(metadata["token_count"], 6);
        assert_eq!(metadata["cross_references"][0], "Isaiah 53:5");
        assert!(metadata["parallel_passage_id"].is_null());
        assert!(metadata.get("oversized").is_none());
    }

    #[test]
    fn test_single_verse_title() {
        let doc = ChunkDocument::from_chunk(&chunk(35, 35), "KJV", "bible");
        assert_eq!(doc.title, "John 11:35 (KJV)");
    }

    #[test]
    fn test_oversized_flag_serialized_when_set() {
        let mut big = chunk(1, 1);
        big.oversized = true;
        let json = serde_json::to_value(ChunkDocument::from_chunk(&big, "KJV", "bible")).unwrap();
        assert_eq!(json["metadata"]["oversized"], true);
    }

    #[test]
    fn test_content_hash() {
        let doc = ChunkDocument::from_chunk(&chunk(1, 2), "KJV", "bible");
        let hash = doc.content_hash();
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, content_hash(&doc.content));
        assert_ne!(hash, ChunkDocument::from_chunk(&chunk(1, 3), "KJV", "bible").content_hash());
    }
}
