//! Analyze command handler.
//!
//! Chunks a translation and reports token statistics without importing.

use anyhow::bail;
use clap::Args;

use versekit_chunker::{analyze, ChunkRun, Genre, QualityReport};
use versekit_core::config::AppConfig;

use super::{
    console_progress, drop_empty_verses, print_failures, print_quality, run_pipeline,
    ChunkingArgs, SourceArgs,
};

/// Report chunking quality without importing
#[derive(Args, Debug)]
pub struct AnalyzeCommand {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub chunking: ChunkingArgs,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl AnalyzeCommand {
    pub fn execute(&self, mut config: AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing analyze command");

        self.chunking.apply(&mut config);
        config.validate()?;

        let progress = console_progress();
        let mut verses = self.source.load(&progress)?;
        drop_empty_verses(&mut verses);
        let run = run_pipeline(&config, &verses, &progress)?;
        let report = analyze(&run.chunks);

        let by_genre = chunks_by_genre(&run);

        if self.json {
            let output = report_json(&self.source.translation_code(), verses.len(), &run, &report);
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!(
                "{}: {} verses in {} chapters",
                self.source.translation_code(),
                verses.len(),
                run.chapters
            );
            print_quality(&report);
            if !by_genre.is_empty() {
                println!();
                println!("Chunks by genre:");
                for (genre, count) in &by_genre {
                    println!("  {:<10} {}", genre.as_str(), count);
                }
            }
            print_failures(&run);
        }

        if !run.is_complete() {
            bail!("{} chapters failed to chunk", run.failures.len());
        }
        Ok(())
    }
}

fn chunks_by_genre(run: &ChunkRun) -> Vec<(Genre, usize)> {
    Genre::ALL
        .iter()
        .map(|&genre| (genre, run.chunks.iter().filter(|c| c.genre == genre).count()))
        .filter(|(_, count)| *count > 0)
        .collect()
}

/// The `--json` document; the only thing analyze writes to stdout in that mode.
fn report_json(
    translation: &str,
    verses: usize,
    run: &ChunkRun,
    report: &QualityReport,
) -> serde_json::Value {
    serde_json::json!({
        "translation": translation,
        "verses": verses,
        "chapters": run.chapters,
        "quality": report,
        "chunksByGenre": chunks_by_genre(run)
            .iter()
            .map(|(genre, count)| (genre.as_str().to_string(), serde_json::Value::from(*count)))
            .collect::<serde_json::Map<String, serde_json::Value>>(),
        "failures": run.failures,
    })
}
