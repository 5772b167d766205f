//! The 66-book canon: names, order, testament and citation aliases.

use std::collections::HashMap;

use crate::types::Testament;

/// Canonical book names in canonical order (scrollmapper naming).
pub const BOOKS: [&str; 66] = [
    // Old Testament (1-39)
    "Genesis",
    "Exodus",
    "Leviticus",
    "Numbers",
    "Deuteronomy",
    "Joshua",
    "Judges",
    "Ruth",
    "I Samuel",
    "II Samuel",
    "I Kings",
    "II Kings",
    "I Chronicles",
    "II Chronicles",
    "Ezra",
    "Nehemiah",
    "Esther",
    "Job",
    "Psalms",
    "Proverbs",
    "Ecclesiastes",
    "Song of Solomon",
    "Isaiah",
    "Jeremiah",
    "Lamentations",
    "Ezekiel",
    "Daniel",
    "Hosea",
    "Joel",
    "Amos",
    "Obadiah",
    "Jonah",
    "Micah",
    "Nahum",
    "Habakkuk",
    "Zephaniah",
    "Haggai",
    "Zechariah",
    "Malachi",
    // New Testament (40-66)
    "Matthew",
    "Mark",
    "Luke",
    "John",
    "Acts",
    "Romans",
    "I Corinthians",
    "II Corinthians",
    "Galatians",
    "Ephesians",
    "Philippians",
    "Colossians",
    "I Thessalonians",
    "II Thessalonians",
    "I Timothy",
    "II Timothy",
    "Titus",
    "Philemon",
    "Hebrews",
    "James",
    "I Peter",
    "II Peter",
    "I John",
    "II John",
    "III John",
    "Jude",
    "Revelation of John",
];

/// Last Old Testament book id.
const LAST_OT_BOOK: usize = 39;

/// Alternate spellings seen in citations, mapped to canonical names.
const ALIASES: &[(&str, &str)] = &[
    ("1 Samuel", "I Samuel"),
    ("2 Samuel", "II Samuel"),
    ("1 Kings", "I Kings"),
    ("2 Kings", "II Kings"),
    ("1 Chronicles", "I Chronicles"),
    ("2 Chronicles", "II Chronicles"),
    ("Psalm", "Psalms"),
    ("Song of Songs", "Song of Solomon"),
    ("1 Corinthians", "I Corinthians"),
    ("2 Corinthians", "II Corinthians"),
    ("1 Thessalonians", "I Thessalonians"),
    ("2 Thessalonians", "II Thessalonians"),
    ("1 Timothy", "I Timothy"),
    ("2 Timothy", "II Timothy"),
    ("1 Peter", "I Peter"),
    ("2 Peter", "II Peter"),
    ("1 John", "I John"),
    ("2 John", "II John"),
    ("3 John", "III John"),
    ("Revelation", "Revelation of John"),
    ("Revelations", "Revelation of John"),
];

/// One canonical book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    /// 1-based position in the canon
    pub id: usize,
    pub name: &'static str,
    pub testament: Testament,
}

/// Read-only lookup over the canon. Build once, share by reference.
#[derive(Debug, Clone)]
pub struct Canon {
    books: Vec<Book>,
    by_name: HashMap<&'static str, usize>,
    aliases: HashMap<&'static str, &'static str>,
}

impl Canon {
    /// The standard 66-book Protestant canon.
    pub fn standard() -> Self {
        let books: Vec<Book> = BOOKS
            .iter()
            .enumerate()
            .map(|(idx, name)| Book {
                id: idx + 1,
                name,
                testament: if idx < LAST_OT_BOOK {
                    Testament::Old
                } else {
                    Testament::New
                },
            })
            .collect();

        let by_name = books.iter().map(|b| (b.name, b.id)).collect();
        let aliases = ALIASES.iter().copied().collect();

        Self {
            books,
            by_name,
            aliases,
        }
    }

    /// Look up a book by its exact canonical name.
    pub fn book(&self, name: &str) -> Option<&Book> {
        self.by_name.get(name).map(|id| &self.books[id - 1])
    }

    /// Resolve a canonical name or a citation alias.
    pub fn resolve(&self, name: &str) -> Option<&Book> {
        self.book(name)
            .or_else(|| self.aliases.get(name).and_then(|canonical| self.book(canonical)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn testament(&self, name: &str) -> Option<Testament> {
        self.book(name).map(|b| b.testament)
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    /// Every name a citation may use: canonical names plus aliases.
    pub fn citation_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.books
            .iter()
            .map(|b| b.name)
            .chain(self.aliases.keys().copied())
    }
}

impl Default for Canon {
    fn default() -> Self {
        Self::standard()
    }
}
