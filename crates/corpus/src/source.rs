//! Verse source parsing for scrollmapper-style CSV files.
//!
//! Expected columns: `Book, Chapter, Verse, Text`. Extra columns are
//! ignored. Books use canonical names (`I Samuel`, `Revelation of John`).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use versekit_chunker::{Canon, Verse};
use versekit_core::{AppError, AppResult};

const REQUIRED_COLUMNS: [&str; 4] = ["Book", "Chapter", "Verse", "Text"];

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Book")]
    book: String,
    #[serde(rename = "Chapter")]
    chapter: u32,
    #[serde(rename = "Verse")]
    verse: u32,
    #[serde(rename = "Text")]
    text: String,
}

fn open_reader(path: &Path) -> AppResult<csv::Reader<std::fs::File>> {
    if !path.exists() {
        return Err(AppError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Verses CSV not found: {}", path.display()),
        )));
    }
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| AppError::Parse(format!("Failed to open {}: {}", path.display(), e)))
}

/// Parse a verses CSV into canonical order.
///
/// With `filter_books`, only those books are kept; filter entries may use
/// citation aliases such as `1 Samuel`.
///
/// # Errors
/// `Parse` for missing columns, malformed rows, books outside the canon,
/// or a file with no verses left after filtering.
pub fn parse_verses_csv(path: &Path, filter_books: Option<&[String]>) -> AppResult<Vec<Verse>> {
    let canon = Canon::standard();

    let filter: Option<HashSet<&'static str>> = match filter_books {
        Some(names) => Some(
            names
                .iter()
                .map(|name| {
                    canon.resolve(name.trim()).map(|b| b.name).ok_or_else(|| {
                        AppError::InvalidInput(format!("Unknown book in filter: {}", name))
                    })
                })
                .collect::<AppResult<_>>()?,
        ),
        None => None,
    };

    let mut reader = open_reader(path)?;
    let headers = reader
        .headers()
        .map_err(|e| AppError::Parse(format!("Failed to read header: {}", e)))?
        .clone();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|col| !headers.iter().any(|h| h == *col))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Parse(format!(
            "Invalid CSV format in {}: missing columns {}. Expected: {}",
            path.display(),
            missing.join(", "),
            REQUIRED_COLUMNS.join(", ")
        )));
    }

    let mut keyed: Vec<(usize, Verse)> = Vec::new();
    let mut unknown_books: BTreeSet<String> = BTreeSet::new();

    for (idx, record) in reader.deserialize::<CsvRow>().enumerate() {
        let row = record.map_err(|e| {
            // header is line 1
            AppError::Parse(format!("Malformed row at line {}: {}", idx + 2, e))
        })?;

        let Some(book) = canon.book(&row.book) else {
            unknown_books.insert(row.book);
            continue;
        };
        if let Some(filter) = &filter {
            if !filter.contains(book.name) {
                continue;
            }
        }

        keyed.push((
            book.id,
            Verse::new(book.name, row.chapter, row.verse, row.text, book.testament),
        ));
    }

    if !unknown_books.is_empty() {
        let names: Vec<String> = unknown_books.into_iter().collect();
        return Err(AppError::Parse(format!(
            "Unknown books in {}: {}. These books are not in the 66-book canon.",
            path.display(),
            names.join(", ")
        )));
    }
    if keyed.is_empty() {
        return Err(AppError::Parse(format!(
            "No verses found in {}",
            path.display()
        )));
    }

    keyed.sort_by_key(|(book_id, v)| (*book_id, v.chapter, v.verse));
    let verses: Vec<Verse> = keyed.into_iter().map(|(_, v)| v).collect();

    tracing::info!("Parsed {} verses from {}", verses.len(), path.display());
    Ok(verses)
}

/// Book names present in a verses CSV, sorted alphabetically.
pub fn available_books(path: &Path) -> AppResult<Vec<String>> {
    let mut reader = open_reader(path)?;
    let headers = reader
        .headers()
        .map_err(|e| AppError::Parse(format!("Failed to read header: {}", e)))?
        .clone();
    let column = headers
        .iter()
        .position(|h| h == "Book")
        .ok_or_else(|| AppError::Parse(format!("No Book column in {}", path.display())))?;

    let mut books = BTreeSet::new();
    for record in reader.records() {
        let record = record.map_err(|e| AppError::Parse(e.to_string()))?;
        if let Some(book) = record.get(column) {
            books.insert(book.to_string());
        }
    }
    Ok(books.into_iter().collect())
}

/// Summary of a parsed verse set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub total_verses: usize,
    pub books_found: usize,
    pub chapters_found: usize,
    /// Book names in order of first appearance
    pub books: Vec<String>,
    pub issues: Vec<String>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Check a verse set for empty text and repeated references.
pub fn validate_integrity(verses: &[Verse]) -> IntegrityReport {
    let mut books: Vec<String> = Vec::new();
    let mut chapters: BTreeMap<&str, BTreeSet<u32>> = BTreeMap::new();
    let mut seen: HashSet<(&str, u32, u32)> = HashSet::new();
    let mut issues = Vec::new();

    for verse in verses {
        if !books.iter().any(|b| *b == verse.book) {
            books.push(verse.book.clone());
        }
        chapters.entry(verse.book.as_str()).or_default().insert(verse.chapter);

        if verse.text.trim().is_empty() {
            issues.push(format!("Empty text in {}", verse.reference()));
        }
        if !seen.insert((verse.book.as_str(), verse.chapter, verse.verse)) {
            issues.push(format!("Duplicate verse {}", verse.reference()));
        }
    }

    IntegrityReport {
        total_verses: verses.len(),
        books_found: books.len(),
        chapters_found: chapters.values().map(BTreeSet::len).sum(),
        books,
        issues,
    }
}
