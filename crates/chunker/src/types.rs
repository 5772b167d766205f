//! Verse and chunk types shared across the engine.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::genre::{Genre, GenreProfile};

/// Which half of the canon a book belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Testament {
    #[serde(rename = "OT")]
    Old,
    #[serde(rename = "NT")]
    New,
}

impl Testament {
    pub fn as_str(&self) -> &'static str {
        match self {
            Testament::Old => "OT",
            Testament::New => "NT",
        }
    }
}

impl fmt::Display for Testament {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single verse as delivered by the source parser.
///
/// Identity is `(book, chapter, verse)`; verses are never mutated after
/// parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    /// Canonical book name (e.g., "Genesis", "I Samuel")
    pub book: String,

    /// Chapter number (1-based)
    pub chapter: u32,

    /// Verse number within the chapter (1-based)
    pub verse: u32,

    /// Verse text, trimmed and non-empty
    pub text: String,

    /// Testament derived from the book
    pub testament: Testament,
}

impl Verse {
    pub fn new(
        book: impl Into<String>,
        chapter: u32,
        verse: u32,
        text: impl Into<String>,
        testament: Testament,
    ) -> Self {
        Self {
            book: book.into(),
            chapter,
            verse,
            text: text.into(),
            testament,
        }
    }

    /// Human-readable reference, e.g. "Genesis 1:1".
    pub fn reference(&self) -> String {
        format!("{} {}:{}", self.book, self.chapter, self.verse)
    }
}

/// A verse as it sits inside a chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkVerse {
    pub number: u32,
    pub text: String,
    pub tokens: usize,

    /// Repeated from the previous chunk; not part of the primary range
    pub overlap: bool,
}

impl ChunkVerse {
    /// Render as `N text`, or `[N] text` for an overlap verse.
    pub fn render(&self) -> String {
        if self.overlap {
            format!("[{}] {}", self.number, self.text)
        } else {
            format!("{} {}", self.number, self.text)
        }
    }
}

/// A token-bounded group of consecutive verses from one chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub book: String,
    pub chapter: u32,
    pub testament: Testament,

    /// First primary (non-overlap) verse
    pub verse_start: u32,

    /// Last primary verse, inclusive
    pub verse_end: u32,

    /// Rendered verses joined by single spaces, overlap verses first
    pub text: String,

    /// Sum of verse token counts, overlap verses included
    pub token_count: usize,

    pub genre: Genre,

    /// Budget the chunk was assembled under
    pub profile: GenreProfile,

    /// Every verse in the chunk, in order
    pub verses: Vec<ChunkVerse>,

    /// A single verse larger than `profile.max_tokens`
    pub oversized: bool,

    /// Citations detected in the text, normalized, first-seen order
    pub cross_references: Vec<String>,

    pub parallel_passage_id: Option<String>,
}

impl Chunk {
    /// Verses that belong to the primary range.
    pub fn primary_verses(&self) -> impl Iterator<Item = &ChunkVerse> {
        self.verses.iter().filter(|v| !v.overlap)
    }

    /// Verses carried over from the previous chunk.
    pub fn overlap_verses(&self) -> impl Iterator<Item = &ChunkVerse> {
        self.verses.iter().filter(|v| v.overlap)
    }

    pub fn overlap_tokens(&self) -> usize {
        self.overlap_verses().map(|v| v.tokens).sum()
    }

    /// Reference for the primary range, e.g. "Psalms 23:1-6" or "John 11:35".
    pub fn reference(&self) -> String {
        if self.verse_start == self.verse_end {
            format!("{} {}:{}", self.book, self.chapter, self.verse_start)
        } else {
            format!(
                "{} {}:{}-{}",
                self.book, self.chapter, self.verse_start, self.verse_end
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verse_reference() {
        let verse = Verse::new("Genesis", 1, 1, "In the beginning", Testament::Old);
        assert_eq!(verse.reference(), "Genesis 1:1");
    }

    #[test]
    fn test_chunk_verse_render_marks_overlap() {
        let primary = ChunkVerse {
            number: 14,
            text: "And the Word was made flesh".to_string(),
            tokens: 6,
            overlap: false,
        };
        let carried = ChunkVerse {
            overlap: true,
            ..primary.clone()
        };
        assert_eq!(primary.render(), "14 And the Word was made flesh");
        assert_eq!(carried.render(), "[14] And the Word was made flesh");
    }

    #[test]
    fn test_testament_serializes_short_form() {
        assert_eq!(serde_json::to_string(&Testament::Old).unwrap(), "\"OT\"");
        assert_eq!(serde_json::to_string(&Testament::New).unwrap(), "\"NT\"");
    }
}
