//! Status command handler.

use anyhow::bail;
use clap::Args;

use versekit_core::config::AppConfig;
use versekit_corpus::{DocumentStore, StoreClient};

/// Show document store health and counts
#[derive(Args, Debug)]
pub struct StatusCommand {
    /// Also count documents for this translation (e.g., KJV)
    #[arg(short, long)]
    pub translation: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatusCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing status command");

        let store = StoreClient::from_config(config)?;
        if !store.health().await? {
            bail!("Document store not accessible at {}", store.endpoint());
        }

        let stats = store.stats().await?;
        let domain = self.translation.as_ref().map(|t| {
            format!(
                "{}/{}",
                config.corpus_namespace,
                t.trim().to_lowercase()
            )
        });
        let domain_count = match &domain {
            Some(domain) => Some(store.count_domain(domain).await?),
            None => None,
        };

        if self.json {
            let output = serde_json::json!({
                "store": store.endpoint(),
                "healthy": true,
                "stats": stats,
                "domain": domain,
                "domainDocuments": domain_count,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        println!("Document store at {} is healthy", store.endpoint());
        println!();
        println!("Statistics:");
        println!("  Total documents: {}", stats.total_documents);
        println!("  Corpus documents: {}", stats.corpus_documents);
        println!("  KB documents: {}", stats.kb_documents);
        println!("  Total chunks: {}", stats.total_chunks);
        println!("  Embedded chunks: {}", stats.embedded_chunks);
        println!("  Unique domains: {}", stats.domains);

        if let (Some(domain), Some(count)) = (domain, domain_count) {
            println!();
            println!("  Documents in {}: {}", domain, count);
        }
        Ok(())
    }
}
