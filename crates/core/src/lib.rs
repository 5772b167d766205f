//! Versekit Core Library
//!
//! This crate provides the foundational utilities shared by the verse
//! chunking engine, the corpus uploader and the CLI:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management (`AppConfig`, `ChunkingConfig`)

pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use config::{AppConfig, ChunkingConfig, TokenizerKind};
pub use error::{AppError, AppResult};
