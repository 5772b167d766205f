//! Greedy, chapter-scoped verse grouping.
//!
//! Verses are accumulated in order until the chunk reaches its target
//! budget, or until the next verse would push it past the ceiling. A
//! verse is never split: one that is larger than the ceiling on its own
//! becomes a standalone, flagged chunk. Chapters are assembled
//! independently, so the caller hands over exactly one chapter at a time.

mod overlap;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use versekit_core::{AppError, AppResult};

use crate::genre::{Genre, GenreProfile};
use crate::tokens::TokenCounter;
use crate::types::{Chunk, ChunkVerse, Testament, Verse};

/// Builds chunks for one chapter at a time.
#[derive(Debug, Clone)]
pub struct ChunkAssembler {
    counter: Arc<dyn TokenCounter>,
    overlap_ratio: f64,
}

/// Fields every chunk of a chapter shares.
struct ChapterContext<'a> {
    book: &'a str,
    chapter: u32,
    testament: Testament,
    genre: Genre,
    profile: GenreProfile,
}

/// Verses gathered for the chunk being built.
#[derive(Default)]
struct Accumulator {
    verses: Vec<ChunkVerse>,
    tokens: usize,
}

impl Accumulator {
    fn seeded(tail: Vec<ChunkVerse>) -> Self {
        let tokens = tail.iter().map(|v| v.tokens).sum();
        Self {
            verses: tail,
            tokens,
        }
    }

    fn has_primary(&self) -> bool {
        self.verses.iter().any(|v| !v.overlap)
    }

    fn push(&mut self, verse: ChunkVerse) {
        self.tokens += verse.tokens;
        self.verses.push(verse);
    }

    /// Drop the oldest overlap verse. Returns false when none is left.
    fn shed_overlap(&mut self) -> bool {
        match self.verses.first() {
            Some(first) if first.overlap => {
                self.tokens -= first.tokens;
                self.verses.remove(0);
                true
            }
            _ => false,
        }
    }
}

impl ChunkAssembler {
    pub fn new(counter: Arc<dyn TokenCounter>, overlap_ratio: f64) -> Self {
        Self {
            counter,
            overlap_ratio,
        }
    }

    pub fn counter(&self) -> &dyn TokenCounter {
        self.counter.as_ref()
    }

    /// Group one chapter's verses into chunks.
    ///
    /// # Errors
    /// `InvalidInput` if `verses` is empty, not strictly increasing by verse
    /// number, or drawn from more than one chapter.
    pub fn assemble(
        &self,
        verses: &[Verse],
        genre: Genre,
        profile: &GenreProfile,
        overlap_enabled: bool,
    ) -> AppResult<Vec<Chunk>> {
        validate_chapter(verses)?;

        let first = &verses[0];
        let ctx = ChapterContext {
            book: &first.book,
            chapter: first.chapter,
            testament: first.testament,
            genre,
            profile: *profile,
        };
        let overlap_target = if overlap_enabled {
            profile.overlap_tokens(self.overlap_ratio)
        } else {
            0
        };

        let mut chunks = Vec::new();
        let mut acc = Accumulator::default();

        for verse in verses {
            let item = ChunkVerse {
                number: verse.verse,
                text: verse.text.clone(),
                tokens: self.counter.count(&verse.text),
                overlap: false,
            };

            loop {
                if !acc.has_primary() {
                    if item.tokens > profile.max_tokens {
                        tracing::warn!(
                            book = ctx.book,
                            chapter = ctx.chapter,
                            verse = item.number,
                            tokens = item.tokens,
                            max_tokens = profile.max_tokens,
                            "Oversized verse emitted as a standalone chunk"
                        );
                        let mut single = Accumulator::default();
                        single.push(item.clone());
                        chunks.push(build_chunk(&ctx, single, true));
                        acc = Accumulator::default();
                        break;
                    }

                    // Overlap never forces the ceiling; give up the oldest
                    // carried verses first.
                    while acc.tokens + item.tokens > profile.max_tokens && acc.shed_overlap() {}
                } else if acc.tokens + item.tokens > profile.max_tokens {
                    let closed = build_chunk(&ctx, std::mem::take(&mut acc), false);
                    acc = Accumulator::seeded(self.seed_from(&closed, overlap_target));
                    chunks.push(closed);
                    continue;
                }

                acc.push(item.clone());
                if acc.tokens >= profile.target_tokens {
                    let closed = build_chunk(&ctx, std::mem::take(&mut acc), false);
                    acc = Accumulator::seeded(self.seed_from(&closed, overlap_target));
                    chunks.push(closed);
                }
                break;
            }
        }

        // The chapter's last chunk may fall below min_tokens.
        if acc.has_primary() {
            chunks.push(build_chunk(&ctx, acc, false));
        }

        tracing::debug!(
            book = ctx.book,
            chapter = ctx.chapter,
            verses = verses.len(),
            chunks = chunks.len(),
            genre = %genre,
            "Assembled chapter"
        );

        Ok(chunks)
    }

    /// Overlap verses to open the chunk after `closed`.
    fn seed_from(&self, closed: &Chunk, overlap_target: usize) -> Vec<ChunkVerse> {
        if overlap_target == 0 || closed.oversized {
            return Vec::new();
        }
        let primary: Vec<ChunkVerse> = closed.primary_verses().cloned().collect();
        overlap::select_tail(&primary, overlap_target)
    }
}

/// Reject input that is not a single, ordered, non-empty chapter.
fn validate_chapter(verses: &[Verse]) -> AppResult<()> {
    let first = verses
        .first()
        .ok_or_else(|| AppError::InvalidInput("empty verse sequence".to_string()))?;

    for pair in verses.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.book != first.book || next.chapter != first.chapter {
            return Err(AppError::InvalidInput(format!(
                "verses span more than one chapter: {} {} and {} {}",
                first.book, first.chapter, next.book, next.chapter
            )));
        }
        if next.verse <= prev.verse {
            return Err(AppError::InvalidInput(format!(
                "verses out of order in {} {}: {} follows {}",
                first.book, first.chapter, next.verse, prev.verse
            )));
        }
    }

    Ok(())
}

fn build_chunk(ctx: &ChapterContext<'_>, acc: Accumulator, oversized: bool) -> Chunk {
    let (verse_start, verse_end) = {
        let mut primary = acc.verses.iter().filter(|v| !v.overlap).map(|v| v.number);
        let start = primary.next().unwrap_or_default();
        let end = primary.last().unwrap_or(start);
        (start, end)
    };

    let text = acc
        .verses
        .iter()
        .map(ChunkVerse::render)
        .collect::<Vec<_>>()
        .join(" ");

    Chunk {
        book: ctx.book.to_string(),
        chapter: ctx.chapter,
        testament: ctx.testament,
        verse_start,
        verse_end,
        text,
        token_count: acc.tokens,
        genre: ctx.genre,
        profile: ctx.profile,
        verses: acc.verses,
        oversized,
        cross_references: Vec::new(),
        parallel_passage_id: None,
    }
}
