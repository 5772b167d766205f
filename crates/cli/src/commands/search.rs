//! Search command handler.

use clap::Args;

use versekit_core::config::AppConfig;
use versekit_corpus::StoreClient;

const PREVIEW_CHARS: usize = 200;

/// Run a semantic search against the store
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// Search query text
    #[arg(short, long)]
    pub query: String,

    /// Restrict to one translation (e.g., KJV)
    #[arg(short, long)]
    pub translation: Option<String>,

    /// Number of results to return
    #[arg(short = 'k', long, default_value = "5")]
    pub top_k: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing search command");

        let domain = self.translation.as_ref().map(|t| {
            format!(
                "{}/{}",
                config.corpus_namespace,
                t.trim().to_lowercase()
            )
        });

        let store = StoreClient::from_config(config)?;
        let response = store
            .search(&self.query, domain.as_deref(), self.top_k)
            .await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&response)?);
            return Ok(());
        }

        println!("Searching for: '{}'", self.query);
        if let Some(domain) = &domain {
            println!("  Domain: {}", domain);
        }

        if response.results.is_empty() {
            println!();
            println!("No results found");
            return Ok(());
        }

        println!();
        println!("Found {} results:", response.results.len());
        println!();
        for (i, hit) in response.results.iter().enumerate() {
            println!("{}. {} (similarity: {:.3})", i + 1, hit.title, hit.similarity);
            println!("   {}", preview(&hit.content));
            println!();
        }
        Ok(())
    }
}

/// First `PREVIEW_CHARS` characters, with an ellipsis when cut.
fn preview(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
