//! Validate command handler.

use anyhow::bail;
use clap::Args;

use versekit_chunker::analyze;
use versekit_core::config::AppConfig;
use versekit_corpus::{validate_integrity, ProgressReporter};

use super::{print_failures, run_pipeline, SourceArgs};

/// Check a verses CSV for data problems
#[derive(Args, Debug)]
pub struct ValidateCommand {
    #[command(flatten)]
    pub source: SourceArgs,
}

impl ValidateCommand {
    pub fn execute(&self, config: AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing validate command");

        let translation = self.source.translation_code();
        println!(
            "Validating {} from {}...",
            translation,
            self.source.verses_csv.display()
        );

        let progress = ProgressReporter::noop();
        let verses = self.source.load(&progress)?;
        let integrity = validate_integrity(&verses);

        println!();
        println!("Validation results:");
        println!("  Total verses: {}", integrity.total_verses);
        println!("  Books: {}", integrity.books_found);
        println!("  Chapters: {}", integrity.chapters_found);

        if !integrity.is_clean() {
            println!();
            println!("Issues found ({}):", integrity.issues.len());
            for issue in &integrity.issues {
                println!("  - {}", issue);
            }
            bail!("{} data issues found", integrity.issues.len());
        }
        println!();
        println!("No issues found");

        let run = run_pipeline(&config, &verses, &progress)?;
        let report = analyze(&run.chunks);
        println!();
        println!("Chunking estimate:");
        println!("  Chunks: {}", report.total_chunks);
        println!("  Verses per chunk (avg): {:.1}", report.avg_verses_per_chunk);
        println!("  Token range: {}-{}", report.min_tokens, report.max_tokens);
        println!("  Token average: {:.0}", report.mean_tokens);

        let failed = print_failures(&run);
        if failed > 0 {
            bail!("{} chapters failed to chunk", failed);
        }
        Ok(())
    }
}
