//! Command handlers for the versekit CLI.
//!
//! Each subcommand lives in its own module; helpers shared by the
//! source-reading commands live here.

pub mod analyze;
pub mod import;
pub mod search;
pub mod status;
pub mod validate;

pub use analyze::AnalyzeCommand;
pub use import::ImportCommand;
pub use search::SearchCommand;
pub use status::StatusCommand;
pub use validate::ValidateCommand;

use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use versekit_chunker::{ChunkPipeline, ChunkRun, QualityReport, Verse};
use versekit_core::config::AppConfig;
use versekit_corpus::{parse_verses_csv, ProgressEvent, ProgressReporter};

/// Where the verses come from.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Translation code (e.g., KJV)
    #[arg(short, long)]
    pub translation: String,

    /// Path to the verses CSV (Book, Chapter, Verse, Text)
    #[arg(long)]
    pub verses_csv: PathBuf,

    /// Comma-separated list of books to include (default: all)
    #[arg(long, value_delimiter = ',')]
    pub books: Vec<String>,
}

impl SourceArgs {
    pub fn translation_code(&self) -> String {
        self.translation.trim().to_uppercase()
    }

    pub fn load(&self, progress: &ProgressReporter) -> anyhow::Result<Vec<Verse>> {
        let filter = if self.books.is_empty() {
            None
        } else {
            tracing::info!("Filtering to books: {}", self.books.join(", "));
            Some(self.books.as_slice())
        };
        let verses = parse_verses_csv(&self.verses_csv, filter)?;
        progress.parse(verses.len() as u64, &display_name(&self.verses_csv));
        Ok(verses)
    }
}

/// Drop verses whose text is blank. Returns how many were removed.
pub fn drop_empty_verses(verses: &mut Vec<Verse>) -> usize {
    let before = verses.len();
    verses.retain(|v| !v.text.trim().is_empty());
    let dropped = before - verses.len();
    if dropped > 0 {
        tracing::warn!("Dropped {} verses with empty text", dropped);
    }
    dropped
}

/// Chunking switches that override the config file.
#[derive(Args, Debug, Clone, Default)]
pub struct ChunkingArgs {
    /// Use per-genre token budgets
    #[arg(long)]
    pub genre_aware: bool,

    /// Carry trailing verses of each chunk into the next
    #[arg(long)]
    pub overlap: bool,
}

impl ChunkingArgs {
    pub fn apply(&self, config: &mut AppConfig) {
        if self.genre_aware {
            config.chunking.genre_aware = true;
        }
        if self.overlap {
            config.chunking.overlap_enabled = true;
        }
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("verses")
        .to_string()
}

/// Reporter that prints each event as one line on stderr.
pub fn console_progress() -> ProgressReporter {
    ProgressReporter::new(Arc::new(|event: ProgressEvent| {
        eprintln!("{}", event.format_simple());
    }))
}

/// Chunk verses with the configured pipeline.
pub fn run_pipeline(
    config: &AppConfig,
    verses: &[Verse],
    progress: &ProgressReporter,
) -> anyhow::Result<ChunkRun> {
    let pipeline = ChunkPipeline::from_config(config)?;
    tracing::debug!(
        "Chunking with {} tokenizer, genre_aware={}, overlap={}",
        pipeline.counter().name(),
        pipeline.genres().is_genre_aware(),
        config.chunking.overlap_enabled
    );
    let run = pipeline.run(verses);
    progress.chunk(run.chapters as u64, Some(run.chapters as u64), run.chunks.len());
    Ok(run)
}

pub fn print_quality(report: &QualityReport) {
    println!();
    println!("Chunking quality:");
    for line in report.to_string().lines() {
        println!("  {}", line);
    }
}

/// Print per-book chapter failures. Returns how many chapters failed.
pub fn print_failures(run: &ChunkRun) -> usize {
    if run.failures.is_empty() {
        return 0;
    }
    println!();
    println!("Chapters that could not be chunked:");
    for (book, count) in run.failures_by_book() {
        println!("  {}: {} chapter(s)", book, count);
    }
    for failure in run.failures.iter().take(10) {
        println!("  - {} {}: {}", failure.book, failure.chapter, failure.error);
    }
    run.failures.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use versekit_chunker::Testament;

    fn verse(number: u32, text: &str) -> Verse {
        Verse::new("Ruth", 1, number, text, Testament::Old)
    }

    #[test]
    fn test_drop_empty_verses() {
        let mut verses = vec![verse(1, "In the days"), verse(2, "   "), verse(3, ""), verse(4, "And")];
        assert_eq!(drop_empty_verses(&mut verses), 2);
        let numbers: Vec<u32> = verses.iter().map(|v| v.verse).collect();
        assert_eq!(numbers, vec![1, 4]);

        assert_eq!(drop_empty_verses(&mut verses), 0);
        assert_eq!(verses.len(), 2);
    }

    #[test]
    fn test_load_with_book_filter() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Book,Chapter,Verse,Text").unwrap();
        writeln!(file, "Ruth,1,1,In the days when the judges ruled").unwrap();
        writeln!(file, "Jonah,1,1,Now the word of the LORD came").unwrap();
        file.flush().unwrap();

        let source = SourceArgs {
            translation: " kjv ".to_string(),
            verses_csv: file.path().to_path_buf(),
            books: vec!["Jonah".to_string()],
        };
        let verses = source.load(&ProgressReporter::noop()).unwrap();
        assert_eq!(source.translation_code(), "KJV");
        assert_eq!(verses.len(), 1);
        assert_eq!(verses[0].book, "Jonah");
    }
}
