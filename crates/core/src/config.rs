//! Configuration management for Versekit.
//!
//! Configuration is merged from several sources, lowest precedence first:
//! - Built-in defaults
//! - A YAML config file (`--config`, `VERSEKIT_CONFIG`, or `./versekit.yaml`)
//! - Environment variables (`VERSEKIT_*`)
//! - Command-line flags (see [`AppConfig::with_overrides`])
//!
//! The result is validated once, at load time.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "versekit.yaml";

/// Which tokenizer the chunker measures verses with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenizerKind {
    /// tiktoken `cl100k_base`
    #[default]
    Cl100k,
    /// Unicode word count
    Words,
}

impl std::str::FromStr for TokenizerKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cl100k" | "cl100k_base" | "tiktoken" => Ok(TokenizerKind::Cl100k),
            "words" | "word" => Ok(TokenizerKind::Words),
            other => Err(AppError::Config(format!(
                "Unknown tokenizer: {}. Supported: cl100k, words",
                other
            ))),
        }
    }
}

/// Token budget and feature flags consumed by the chunking engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Close a chunk once it reaches this many tokens
    pub target_chunk_tokens: usize,

    /// Floor for every chunk except a chapter's last one
    pub min_chunk_tokens: usize,

    /// Hard ceiling; only a single oversized verse may exceed it
    pub max_chunk_tokens: usize,

    /// Use per-genre budgets instead of the single default budget
    pub genre_aware: bool,

    /// Seed each chunk with the tail of the previous one
    pub overlap_enabled: bool,

    /// Overlap size as a fraction of the active target
    pub overlap_ratio: f64,

    /// Tokenizer used to measure verse text
    pub tokenizer: TokenizerKind,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            target_chunk_tokens: 350,
            min_chunk_tokens: 50,
            max_chunk_tokens: 500,
            genre_aware: false,
            overlap_enabled: false,
            overlap_ratio: 0.15,
            tokenizer: TokenizerKind::Cl100k,
        }
    }
}

impl ChunkingConfig {
    /// Check `0 < min <= target <= max` and `0 < overlap_ratio < 1`.
    pub fn validate(&self) -> AppResult<()> {
        validate_budget(
            "default",
            self.target_chunk_tokens,
            self.min_chunk_tokens,
            self.max_chunk_tokens,
        )?;

        if !(self.overlap_ratio > 0.0 && self.overlap_ratio < 1.0) {
            return Err(AppError::Config(format!(
                "overlap_ratio must be between 0 and 1 (exclusive), got {}",
                self.overlap_ratio
            )));
        }

        Ok(())
    }
}

/// Validate a single token budget. Shared with the genre profile table.
pub fn validate_budget(name: &str, target: usize, min: usize, max: usize) -> AppResult<()> {
    if min == 0 {
        return Err(AppError::Config(format!(
            "Profile '{}': min_tokens must be positive",
            name
        )));
    }
    if min > target || target > max {
        return Err(AppError::Config(format!(
            "Profile '{}': expected min <= target <= max, got {} / {} / {}",
            name, min, target, max
        )));
    }
    Ok(())
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Config file the values were merged from, if any
    #[serde(skip)]
    pub config_file: Option<PathBuf>,

    /// Base URL of the document-and-embedding store
    pub store_url: String,

    /// Per-request timeout for store calls
    pub store_timeout_secs: u64,

    /// Documents per import call (the store accepts at most 100)
    pub batch_size: usize,

    /// Import batches in flight at once
    pub upload_concurrency: usize,

    /// Retries for a batch that failed with a transient error
    pub max_retries: u32,

    /// Base delay for exponential retry backoff
    pub retry_backoff_ms: u64,

    /// Ask the store to embed imported documents
    pub embed: bool,

    /// Domain prefix for every document (`<namespace>/<translation>`)
    pub corpus_namespace: String,

    /// Optional YAML file replacing the built-in parallel-passage table
    pub parallel_passages_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    #[serde(skip)]
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Chunking engine settings
    pub chunking: ChunkingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            store_url: "http://localhost:8100".to_string(),
            store_timeout_secs: 300,
            batch_size: 100,
            upload_concurrency: 4,
            max_retries: 3,
            retry_backoff_ms: 500,
            embed: true,
            corpus_namespace: "bible".to_string(),
            parallel_passages_file: None,
            log_level: None,
            verbose: false,
            no_color: false,
            chunking: ChunkingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the config file and environment.
    ///
    /// Environment variables:
    /// - `VERSEKIT_CONFIG`: Path to config file
    /// - `VERSEKIT_STORE_URL`, `VERSEKIT_STORE_TIMEOUT`
    /// - `VERSEKIT_BATCH_SIZE`, `VERSEKIT_UPLOAD_CONCURRENCY`, `VERSEKIT_MAX_RETRIES`
    /// - `VERSEKIT_EMBED`, `VERSEKIT_NAMESPACE`
    /// - `VERSEKIT_TARGET_TOKENS`, `VERSEKIT_MIN_TOKENS`, `VERSEKIT_MAX_TOKENS`
    /// - `VERSEKIT_GENRE_AWARE`, `VERSEKIT_OVERLAP`, `VERSEKIT_TOKENIZER`
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    pub fn load(config_file: Option<&Path>) -> AppResult<Self> {
        let explicit = config_file
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("VERSEKIT_CONFIG").ok().map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                Self::from_yaml_file(&path)?
            }
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_yaml_file(&path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Read a YAML config file. Missing keys keep their defaults.
    pub fn from_yaml_file(path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let mut config: AppConfig = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;
        config.config_file = Some(path.to_path_buf());

        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Apply `VERSEKIT_*` overrides using the given variable lookup.
    pub fn apply_env<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("VERSEKIT_STORE_URL") {
            self.store_url = url;
        }
        if let Some(v) = lookup("VERSEKIT_STORE_TIMEOUT") {
            self.store_timeout_secs = parse_env("VERSEKIT_STORE_TIMEOUT", &v)?;
        }
        if let Some(v) = lookup("VERSEKIT_BATCH_SIZE") {
            self.batch_size = parse_env("VERSEKIT_BATCH_SIZE", &v)?;
        }
        if let Some(v) = lookup("VERSEKIT_UPLOAD_CONCURRENCY") {
            self.upload_concurrency = parse_env("VERSEKIT_UPLOAD_CONCURRENCY", &v)?;
        }
        if let Some(v) = lookup("VERSEKIT_MAX_RETRIES") {
            self.max_retries = parse_env("VERSEKIT_MAX_RETRIES", &v)?;
        }
        if let Some(v) = lookup("VERSEKIT_EMBED") {
            self.embed = parse_bool("VERSEKIT_EMBED", &v)?;
        }
        if let Some(ns) = lookup("VERSEKIT_NAMESPACE") {
            self.corpus_namespace = ns;
        }
        if let Some(v) = lookup("VERSEKIT_TARGET_TOKENS") {
            self.chunking.target_chunk_tokens = parse_env("VERSEKIT_TARGET_TOKENS", &v)?;
        }
        if let Some(v) = lookup("VERSEKIT_MIN_TOKENS") {
            self.chunking.min_chunk_tokens = parse_env("VERSEKIT_MIN_TOKENS", &v)?;
        }
        if let Some(v) = lookup("VERSEKIT_MAX_TOKENS") {
            self.chunking.max_chunk_tokens = parse_env("VERSEKIT_MAX_TOKENS", &v)?;
        }
        if let Some(v) = lookup("VERSEKIT_GENRE_AWARE") {
            self.chunking.genre_aware = parse_bool("VERSEKIT_GENRE_AWARE", &v)?;
        }
        if let Some(v) = lookup("VERSEKIT_OVERLAP") {
            self.chunking.overlap_enabled = parse_bool("VERSEKIT_OVERLAP", &v)?;
        }
        if let Some(v) = lookup("VERSEKIT_TOKENIZER") {
            self.chunking.tokenizer = v.parse()?;
        }
        if let Some(level) = lookup("RUST_LOG") {
            self.log_level = Some(level);
        }
        if lookup("NO_COLOR").is_some() {
            self.no_color = true;
        }
        Ok(())
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over the file and environment.
    pub fn with_overrides(
        mut self,
        store_url: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(store_url) = store_url {
            self.store_url = store_url;
        }

        if verbose {
            self.verbose = true;
            // Overrides file and RUST_LOG levels; only --log-level beats it
            self.log_level = Some("debug".to_string());
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Validate the merged configuration.
    pub fn validate(&self) -> AppResult<()> {
        self.chunking.validate()?;

        if self.batch_size == 0 || self.batch_size > 100 {
            return Err(AppError::Config(format!(
                "batch_size must be between 1 and 100, got {}",
                self.batch_size
            )));
        }

        if self.upload_concurrency == 0 {
            return Err(AppError::Config(
                "upload_concurrency must be at least 1".to_string(),
            ));
        }

        if self.corpus_namespace.trim().is_empty() {
            return Err(AppError::Config(
                "corpus_namespace must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> AppResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::Config(format!("Invalid value for {}: {:?}", key, value)))
}

fn parse_bool(key: &str, value: &str) -> AppResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AppError::Config(format!(
            "Invalid boolean for {}: {:?}",
            key, value
        ))),
    }
}
