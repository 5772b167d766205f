//! Genre classification and per-genre token budgets.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use versekit_core::{config::validate_budget, AppResult, ChunkingConfig};

/// Structural category of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Genre {
    Poetry,
    Wisdom,
    Law,
    Narrative,
    Gospel,
    Prophecy,
    Epistle,
}

impl Genre {
    pub const ALL: [Genre; 7] = [
        Genre::Poetry,
        Genre::Wisdom,
        Genre::Law,
        Genre::Narrative,
        Genre::Gospel,
        Genre::Prophecy,
        Genre::Epistle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Poetry => "poetry",
            Genre::Wisdom => "wisdom",
            Genre::Law => "law",
            Genre::Narrative => "narrative",
            Genre::Gospel => "gospel",
            Genre::Prophecy => "prophecy",
            Genre::Epistle => "epistle",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token budget for one genre. Invariant: `0 < min <= target <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreProfile {
    pub target_tokens: usize,
    pub min_tokens: usize,
    pub max_tokens: usize,
}

impl GenreProfile {
    pub const fn new(target_tokens: usize, min_tokens: usize, max_tokens: usize) -> Self {
        Self {
            target_tokens,
            min_tokens,
            max_tokens,
        }
    }

    /// Tokens of overlap carried into the next chunk for the given ratio.
    pub fn overlap_tokens(&self, ratio: f64) -> usize {
        (self.target_tokens as f64 * ratio).floor() as usize
    }

    pub fn validate(&self, name: &str) -> AppResult<()> {
        validate_budget(name, self.target_tokens, self.min_tokens, self.max_tokens)
    }
}

impl From<&ChunkingConfig> for GenreProfile {
    fn from(config: &ChunkingConfig) -> Self {
        Self::new(
            config.target_chunk_tokens,
            config.min_chunk_tokens,
            config.max_chunk_tokens,
        )
    }
}

/// Built-in budget for a genre.
fn builtin_profile(genre: Genre) -> GenreProfile {
    match genre {
        Genre::Poetry => GenreProfile::new(225, 50, 350),
        Genre::Wisdom => GenreProfile::new(300, 50, 450),
        Genre::Law => GenreProfile::new(400, 75, 550),
        Genre::Narrative => GenreProfile::new(350, 50, 500),
        Genre::Gospel => GenreProfile::new(350, 50, 500),
        Genre::Prophecy => GenreProfile::new(375, 60, 525),
        Genre::Epistle => GenreProfile::new(300, 50, 450),
    }
}

/// Book-to-genre assignments for the 66 canonical books.
const BOOK_GENRES: &[(&str, Genre)] = &[
    ("Genesis", Genre::Narrative),
    ("Exodus", Genre::Law),
    ("Leviticus", Genre::Law),
    ("Numbers", Genre::Law),
    ("Deuteronomy", Genre::Law),
    ("Joshua", Genre::Narrative),
    ("Judges", Genre::Narrative),
    ("Ruth", Genre::Narrative),
    ("I Samuel", Genre::Narrative),
    ("II Samuel", Genre::Narrative),
    ("I Kings", Genre::Narrative),
    ("II Kings", Genre::Narrative),
    ("I Chronicles", Genre::Narrative),
    ("II Chronicles", Genre::Narrative),
    ("Ezra", Genre::Narrative),
    ("Nehemiah", Genre::Narrative),
    ("Esther", Genre::Narrative),
    ("Job", Genre::Wisdom),
    ("Psalms", Genre::Poetry),
    ("Proverbs", Genre::Wisdom),
    ("Ecclesiastes", Genre::Wisdom),
    ("Song of Solomon", Genre::Poetry),
    ("Isaiah", Genre::Prophecy),
    ("Jeremiah", Genre::Prophecy),
    ("Lamentations", Genre::Poetry),
    ("Ezekiel", Genre::Prophecy),
    ("Daniel", Genre::Prophecy),
    ("Hosea", Genre::Prophecy),
    ("Joel", Genre::Prophecy),
    ("Amos", Genre::Prophecy),
    ("Obadiah", Genre::Prophecy),
    ("Jonah", Genre::Prophecy),
    ("Micah", Genre::Prophecy),
    ("Nahum", Genre::Prophecy),
    ("Habakkuk", Genre::Prophecy),
    ("Zephaniah", Genre::Prophecy),
    ("Haggai", Genre::Prophecy),
    ("Zechariah", Genre::Prophecy),
    ("Malachi", Genre::Prophecy),
    ("Matthew", Genre::Gospel),
    ("Mark", Genre::Gospel),
    ("Luke", Genre::Gospel),
    ("John", Genre::Gospel),
    ("Acts", Genre::Narrative),
    ("Romans", Genre::Epistle),
    ("I Corinthians", Genre::Epistle),
    ("II Corinthians", Genre::Epistle),
    ("Galatians", Genre::Epistle),
    ("Ephesians", Genre::Epistle),
    ("Philippians", Genre::Epistle),
    ("Colossians", Genre::Epistle),
    ("I Thessalonians", Genre::Epistle),
    ("II Thessalonians", Genre::Epistle),
    ("I Timothy", Genre::Epistle),
    ("II Timothy", Genre::Epistle),
    ("Titus", Genre::Epistle),
    ("Philemon", Genre::Epistle),
    ("Hebrews", Genre::Epistle),
    ("James", Genre::Epistle),
    ("I Peter", Genre::Epistle),
    ("II Peter", Genre::Epistle),
    ("I John", Genre::Epistle),
    ("II John", Genre::Epistle),
    ("III John", Genre::Epistle),
    ("Jude", Genre::Epistle),
    ("Revelation of John", Genre::Prophecy),
];

/// Genre returned for books missing from the table.
pub const DEFAULT_GENRE: Genre = Genre::Narrative;

/// Read-only genre lookup plus the budget for each genre.
#[derive(Debug, Clone)]
pub struct GenreTable {
    books: HashMap<&'static str, Genre>,
    profiles: HashMap<Genre, GenreProfile>,
    genre_aware: bool,
}

impl GenreTable {
    /// Build the table from chunking configuration.
    ///
    /// With `genre_aware` off, every genre resolves to the configured
    /// default budget. Every profile is validated here, once.
    pub fn from_config(config: &ChunkingConfig) -> AppResult<Self> {
        config.validate()?;

        let default_profile = GenreProfile::from(config);
        let profiles = Genre::ALL
            .iter()
            .map(|&genre| {
                let profile = if config.genre_aware {
                    builtin_profile(genre)
                } else {
                    default_profile
                };
                (genre, profile)
            })
            .collect::<HashMap<_, _>>();

        for (genre, profile) in &profiles {
            profile.validate(genre.as_str())?;
        }

        Ok(Self {
            books: BOOK_GENRES.iter().copied().collect(),
            profiles,
            genre_aware: config.genre_aware,
        })
    }

    /// Assign a genre to a book. Unknown books fall back to narrative.
    pub fn classify(&self, book: &str) -> Genre {
        match self.books.get(book) {
            Some(genre) => *genre,
            None => {
                tracing::debug!("Book '{}' not in genre table, using {}", book, DEFAULT_GENRE);
                DEFAULT_GENRE
            }
        }
    }

    /// Active budget for a genre.
    pub fn profile(&self, genre: Genre) -> GenreProfile {
        self.profiles
            .get(&genre)
            .copied()
            .unwrap_or_else(|| builtin_profile(genre))
    }

    /// Classify a book and return its genre with the active budget.
    pub fn resolve(&self, book: &str) -> (Genre, GenreProfile) {
        let genre = self.classify(book);
        (genre, self.profile(genre))
    }

    pub fn is_genre_aware(&self) -> bool {
        self.genre_aware
    }
}
