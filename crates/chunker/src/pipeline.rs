//! Batch driver: chapters in, enriched chunks out.

use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;

use versekit_core::{AppConfig, AppError, AppResult, ChunkingConfig};

use crate::assemble::ChunkAssembler;
use crate::canon::Canon;
use crate::enrich::{MetadataEnricher, ParallelPassageTable};
use crate::genre::GenreTable;
use crate::tokens::{create_counter, TokenCounter};
use crate::types::{Chunk, Verse};

/// A chapter that could not be chunked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterFailure {
    pub book: String,
    pub chapter: u32,
    pub error: String,
}

/// Output of one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct ChunkRun {
    /// Chunks in input order
    pub chunks: Vec<Chunk>,
    pub failures: Vec<ChapterFailure>,
    /// Chapters seen, including failed ones
    pub chapters: usize,
}

impl ChunkRun {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failure counts per book, in order of first failure.
    pub fn failures_by_book(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for failure in &self.failures {
            match counts.iter_mut().find(|(book, _)| *book == failure.book) {
                Some((_, count)) => *count += 1,
                None => counts.push((failure.book.clone(), 1)),
            }
        }
        counts
    }
}

/// One contiguous chapter run from the input, or the reason it was rejected.
enum ChapterSlice<'a> {
    Verses(&'a [Verse]),
    Rejected(ChapterFailure),
}

/// Chunks a whole verse stream, one chapter per task.
///
/// Tables are built once and shared read-only across workers.
#[derive(Debug, Clone)]
pub struct ChunkPipeline {
    genres: GenreTable,
    assembler: ChunkAssembler,
    enricher: MetadataEnricher,
    overlap_enabled: bool,
}

impl ChunkPipeline {
    pub fn new(
        config: &ChunkingConfig,
        counter: Arc<dyn TokenCounter>,
        parallels: ParallelPassageTable,
    ) -> AppResult<Self> {
        let genres = GenreTable::from_config(config)?;
        let enricher = MetadataEnricher::new(&Canon::standard(), parallels)?;
        Ok(Self {
            genres,
            assembler: ChunkAssembler::new(counter, config.overlap_ratio),
            enricher,
            overlap_enabled: config.overlap_enabled,
        })
    }

    /// Build from application config: tokenizer, budgets and the
    /// parallel-passage table (built-in unless a file is configured).
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let counter = create_counter(config.chunking.tokenizer)?;
        let parallels = match &config.parallel_passages_file {
            Some(path) => ParallelPassageTable::from_yaml_file(path)?,
            None => ParallelPassageTable::builtin(),
        };
        Self::new(&config.chunking, counter, parallels)
    }

    pub fn genres(&self) -> &GenreTable {
        &self.genres
    }

    pub fn counter(&self) -> &dyn TokenCounter {
        self.assembler.counter()
    }

    /// Chunk and enrich every chapter in `verses`.
    ///
    /// `verses` must be grouped by book and chapter. A failing chapter is
    /// recorded and skipped; the rest of the run continues.
    pub fn run(&self, verses: &[Verse]) -> ChunkRun {
        let slices = split_chapters(verses);
        let chapters = slices.len();

        let results: Vec<Result<Vec<Chunk>, ChapterFailure>> = slices
            .into_par_iter()
            .map(|slice| match slice {
                ChapterSlice::Verses(chapter) => self.chunk_chapter(chapter),
                ChapterSlice::Rejected(failure) => Err(failure),
            })
            .collect();

        let mut run = ChunkRun {
            chapters,
            ..ChunkRun::default()
        };
        for result in results {
            match result {
                Ok(chunks) => run.chunks.extend(chunks),
                Err(failure) => {
                    tracing::warn!(
                        "Skipping {} {}: {}",
                        failure.book,
                        failure.chapter,
                        failure.error
                    );
                    run.failures.push(failure);
                }
            }
        }

        tracing::info!(
            "Chunked {} verses in {} chapters into {} chunks ({} chapters failed)",
            verses.len(),
            run.chapters,
            run.chunks.len(),
            run.failures.len()
        );
        run
    }

    fn chunk_chapter(&self, verses: &[Verse]) -> Result<Vec<Chunk>, ChapterFailure> {
        let first = &verses[0];
        let (genre, profile) = self.genres.resolve(&first.book);

        let chunks = self
            .assembler
            .assemble(verses, genre, &profile, self.overlap_enabled)
            .map_err(|e| ChapterFailure {
                book: first.book.clone(),
                chapter: first.chapter,
                error: e.to_string(),
            })?;

        tracing::debug!(
            "{} {}: {} verses -> {} chunks ({})",
            first.book,
            first.chapter,
            verses.len(),
            chunks.len(),
            genre
        );

        Ok(chunks
            .into_iter()
            .map(|chunk| self.enricher.enrich(chunk))
            .collect())
    }
}

/// Split the stream into contiguous `(book, chapter)` runs.
///
/// A chapter that shows up again after another chapter has started is
/// rejected, since its verses were not handed over together.
fn split_chapters(verses: &[Verse]) -> Vec<ChapterSlice<'_>> {
    let mut slices = Vec::new();
    let mut seen: HashSet<(&str, u32)> = HashSet::new();
    let mut start = 0;

    while start < verses.len() {
        let key = (verses[start].book.as_str(), verses[start].chapter);
        let len = verses[start..]
            .iter()
            .take_while(|v| v.book == key.0 && v.chapter == key.1)
            .count();
        let end = start + len;

        if seen.insert(key) {
            slices.push(ChapterSlice::Verses(&verses[start..end]));
        } else {
            let error = AppError::InvalidInput(format!(
                "{} {} appears more than once in the verse stream",
                key.0, key.1
            ));
            slices.push(ChapterSlice::Rejected(ChapterFailure {
                book: key.0.to_string(),
                chapter: key.1,
                error: error.to_string(),
            }));
        }
        start = end;
    }

    slices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::WordCounter;
    use crate::types::Testament;

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    fn verse(book: &str, chapter: u32, number: u32, tokens: usize) -> Verse {
        let testament = if book == "Genesis" || book == "Psalms" {
            Testament::Old
        } else {
            Testament::New
        };
        Verse::new(book, chapter, number, words(tokens), testament)
    }

    fn pipeline(config: ChunkingConfig) -> ChunkPipeline {
        ChunkPipeline::new(
            &config,
            Arc::new(WordCounter),
            ParallelPassageTable::builtin(),
        )
        .unwrap()
    }

    #[test]
    fn test_run_preserves_order_across_chapters() {
        let mut verses = Vec::new();
        for chapter in 1..=5 {
            for number in 1..=20 {
                verses.push(verse("Genesis", chapter, number, 40));
            }
        }
        let run = pipeline(ChunkingConfig::default()).run(&verses);

        assert!(run.is_complete());
        assert_eq!(run.chapters, 5);
        let keys: Vec<(u32, u32)> = run
            .chunks
            .iter()
            .map(|c| (c.chapter, c.verse_start))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert!(run.chunks.iter().all(|c| c.token_count <= 500));
    }

    #[test]
    fn test_run_enriches_chunks() {
        let verses = vec![
            verse("Mark", 6, 30, 10),
            Verse::new(
                "Mark",
                6,
                31,
                "as it is written in Isaiah 53:5",
                Testament::New,
            ),
        ];
        let run = pipeline(ChunkingConfig::default()).run(&verses);
        assert_eq!(run.chunks.len(), 1);
        let chunk = &run.chunks[0];
        assert_eq!(chunk.cross_references, vec!["Isaiah 53:5".to_string()]);
        assert_eq!(
            chunk.parallel_passage_id.as_deref(),
            Some("feeding-of-the-five-thousand")
        );
        assert_eq!(chunk.genre.as_str(), "gospel");
    }

    #[test]
    fn test_genre_aware_budget_applies_per_book() {
        let config = ChunkingConfig {
            genre_aware: true,
            ..ChunkingConfig::default()
        };
        let verses: Vec<Verse> = (1..=10).map(|n| verse("Psalms", 119, n, 40)).collect();
        let run = pipeline(config).run(&verses);
        // poetry closes at 225 tokens
        assert_eq!(run.chunks[0].profile.target_tokens, 225);
        assert_eq!(run.chunks[0].verse_end, 6);
    }

    #[test]
    fn test_failed_chapters_do_not_abort_run() {
        let verses = vec![
            verse("Genesis", 1, 1, 10),
            verse("Genesis", 1, 3, 10),
            verse("Genesis", 1, 2, 10),
            verse("Genesis", 2, 1, 10),
            verse("Genesis", 1, 4, 10),
            verse("John", 1, 1, 10),
        ];
        let run = pipeline(ChunkingConfig::default()).run(&verses);

        assert_eq!(run.chapters, 4);
        assert_eq!(run.failures.len(), 2);
        assert!(run.failures[0].error.contains("out of order"));
        assert!(run.failures[1].error.contains("more than once"));
        assert_eq!(run.failures_by_book(), vec![("Genesis".to_string(), 2)]);
        let chapters: Vec<(&str, u32)> = run
            .chunks
            .iter()
            .map(|c| (c.book.as_str(), c.chapter))
            .collect();
        assert_eq!(chapters, vec![("Genesis", 2), ("John", 1)]);
    }

    #[test]
    fn test_empty_input() {
        let run = pipeline(ChunkingConfig::default()).run(&[]);
        assert!(run.chunks.is_empty());
        assert_eq!(run.chapters, 0);
        assert!(run.is_complete());
    }

    #[test]
    fn test_from_config_reads_parallel_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            file.path(),
            "- id: creation\n  passages:\n    - { book: Genesis, chapter: 1, verse_start: 1, verse_end: 31 }\n",
        )
        .unwrap();
        let config = AppConfig {
            parallel_passages_file: Some(file.path().to_path_buf()),
            chunking: ChunkingConfig {
                tokenizer: versekit_core::TokenizerKind::Words,
                ..ChunkingConfig::default()
            },
            ..AppConfig::default()
        };
        let pipeline = ChunkPipeline::from_config(&config).unwrap();
        let run = pipeline.run(&[verse("Genesis", 1, 1, 5)]);
        assert_eq!(run.chunks[0].parallel_passage_id.as_deref(), Some("creation"));
    }
}
