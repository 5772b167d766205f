//! Token counting.
//!
//! The engine only ever asks "how many tokens is this text", so the
//! tokenizer sits behind a small trait. Production runs use tiktoken's
//! `cl100k_base`; the word counter gives exact, hand-computable counts.

use std::sync::{Arc, OnceLock};

use tiktoken_rs::CoreBPE;
use unicode_segmentation::UnicodeSegmentation;
use versekit_core::{AppError, AppResult, TokenizerKind};

/// Measures the token length of a string. Must be deterministic.
pub trait TokenCounter: Send + Sync + std::fmt::Debug {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    fn count(&self, text: &str) -> usize;
}

/// tiktoken `cl100k_base` (GPT-4 family) encoder.
#[derive(Clone)]
pub struct Cl100kCounter {
    bpe: &'static CoreBPE,
}

impl std::fmt::Debug for Cl100kCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cl100kCounter").finish_non_exhaustive()
    }
}

impl Cl100kCounter {
    /// Load the encoder. The BPE table is built once per process.
    pub fn new() -> AppResult<Self> {
        static ENCODER: OnceLock<Option<CoreBPE>> = OnceLock::new();
        let bpe = ENCODER
            .get_or_init(|| tiktoken_rs::cl100k_base().ok())
            .as_ref()
            .ok_or_else(|| AppError::Config("Failed to load cl100k_base encoder".to_string()))?;
        Ok(Self { bpe })
    }
}

impl TokenCounter for Cl100kCounter {
    fn name(&self) -> &str {
        "cl100k"
    }

    fn count(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        self.bpe.encode_with_special_tokens(text).len()
    }
}

/// Counts Unicode words.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordCounter;

impl TokenCounter for WordCounter {
    fn name(&self) -> &str {
        "words"
    }

    fn count(&self, text: &str) -> usize {
        text.unicode_words().count()
    }
}

/// Build the counter selected in configuration.
pub fn create_counter(kind: TokenizerKind) -> AppResult<Arc<dyn TokenCounter>> {
    match kind {
        TokenizerKind::Cl100k => Ok(Arc::new(Cl100kCounter::new()?)),
        TokenizerKind::Words => Ok(Arc::new(WordCounter)),
    }
}
