//! Import command handler.
//!
//! Parses a translation, chunks it, and uploads the documents.

use anyhow::{bail, Context};
use clap::Args;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use versekit_chunker::{analyze, ChunkDocument};
use versekit_core::config::AppConfig;
use versekit_corpus::{upload_documents, validate_integrity, StoreClient, UploadOptions};

use super::{
    console_progress, drop_empty_verses, print_failures, print_quality, run_pipeline,
    ChunkingArgs, SourceArgs,
};

/// Parse, chunk and import a translation
#[derive(Args, Debug)]
pub struct ImportCommand {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub chunking: ChunkingArgs,

    /// Documents per import request (max 100)
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Skip embedding generation in the store
    #[arg(long)]
    pub no_embed: bool,

    /// Parse and chunk only; do not contact the store
    #[arg(long)]
    pub dry_run: bool,

    /// Also write the documents as JSON lines to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ImportCommand {
    pub async fn execute(&self, mut config: AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing import command");
        tracing::debug!("Import options: {:?}", self);

        self.chunking.apply(&mut config);
        if let Some(batch_size) = self.batch_size {
            config.batch_size = batch_size;
        }
        if self.no_embed {
            config.embed = false;
        }
        config.validate()?;

        let translation = self.source.translation_code();
        let progress = console_progress();

        println!(
            "Parsing {} from {}...",
            translation,
            self.source.verses_csv.display()
        );
        let mut verses = self.source.load(&progress)?;
        println!("Parsed {} verses", verses.len());

        let integrity = validate_integrity(&verses);
        println!("  Books: {}", integrity.books_found);
        println!("  Chapters: {}", integrity.chapters_found);
        if !integrity.is_clean() {
            println!("Found {} issues:", integrity.issues.len());
            for issue in integrity.issues.iter().take(5) {
                println!("  - {}", issue);
            }
        }
        drop_empty_verses(&mut verses);

        println!();
        println!("Chunking verses...");
        let run = run_pipeline(&config, &verses, &progress)?;
        println!("Created {} chunks", run.chunks.len());
        print_quality(&analyze(&run.chunks));
        let failed_chapters = print_failures(&run);

        let documents: Vec<ChunkDocument> = run
            .chunks
            .iter()
            .map(|chunk| ChunkDocument::from_chunk(chunk, &translation, &config.corpus_namespace))
            .collect();

        if let Some(path) = &self.output {
            write_jsonl(path, &documents)?;
            println!("Wrote {} documents to {}", documents.len(), path.display());
        }

        if self.dry_run {
            println!();
            println!("Dry run complete (no data imported)");
            if failed_chapters > 0 {
                bail!("{} chapters failed to chunk", failed_chapters);
            }
            return Ok(());
        }

        let domain = format!("{}/{}", config.corpus_namespace, translation.to_lowercase());
        println!();
        println!("Importing to {}...", config.store_url);
        println!("  Domain: {}", domain);
        println!("  Batch size: {}", config.batch_size);
        println!(
            "  Embedding: {}",
            if config.embed { "enabled" } else { "disabled" }
        );

        let store = StoreClient::from_config(&config)?;
        let options = UploadOptions::from_config(&config);
        let report = upload_documents(&store, &documents, &options, &progress).await?;

        println!();
        println!("Import complete in {:.1}s", report.duration_secs());
        println!("  Total documents: {}", report.total_documents);
        println!("  Imported: {}", report.imported);
        println!("  Already present: {}", report.duplicates);
        if report.skipped_duplicates > 0 {
            println!("  Skipped (repeated content): {}", report.skipped_duplicates);
        }
        println!("  Errors: {}", report.failed);
        for error in report.errors.iter().take(10) {
            println!("  - {}: {}", error.target, error.error);
        }

        if failed_chapters > 0 || !report.is_success() {
            bail!(
                "import incomplete: {} chapters failed to chunk, {} documents failed to upload",
                failed_chapters,
                report.failed
            );
        }
        Ok(())
    }
}

/// Write one JSON document per line.
fn write_jsonl(path: &Path, documents: &[ChunkDocument]) -> anyhow::Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for document in documents {
        serde_json::to_writer(&mut writer, document)
            .with_context(|| format!("Failed to serialize {}", document.title))?;
        writer.write_all(b"\n")?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
