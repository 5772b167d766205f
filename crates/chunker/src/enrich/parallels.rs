//! Known parallel and duplicate narrative passages.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use versekit_core::{AppError, AppResult};

/// An inclusive verse range inside one chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassageRange {
    pub book: String,
    pub chapter: u32,
    pub verse_start: u32,
    pub verse_end: u32,
}

impl PassageRange {
    fn overlaps(&self, book: &str, chapter: u32, start: u32, end: u32) -> bool {
        self.book == book && self.chapter == chapter && self.verse_start <= end && start <= self.verse_end
    }
}

/// Passages that recount the same event, sharing one identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParallelGroup {
    pub id: String,
    pub passages: Vec<PassageRange>,
}

/// `(id, [(book, chapter, verse_start, verse_end)])`
type BuiltinGroup = (&'static str, &'static [(&'static str, u32, u32, u32)]);

const BUILTIN: &[BuiltinGroup] = &[
    (
        "ten-commandments",
        &[("Exodus", 20, 1, 17), ("Deuteronomy", 5, 6, 21)],
    ),
    (
        "ark-brought-to-jerusalem",
        &[("II Samuel", 6, 1, 11), ("I Chronicles", 13, 1, 14)],
    ),
    (
        "davids-song-of-deliverance",
        &[("II Samuel", 22, 1, 51), ("Psalms", 18, 1, 50)],
    ),
    (
        "solomon-asks-for-wisdom",
        &[("I Kings", 3, 4, 15), ("II Chronicles", 1, 2, 13)],
    ),
    (
        "sennacherib-invades-judah",
        &[("II Kings", 18, 13, 37), ("Isaiah", 36, 1, 22)],
    ),
    (
        "hezekiahs-illness",
        &[("II Kings", 20, 1, 11), ("Isaiah", 38, 1, 8)],
    ),
    (
        "fall-of-jerusalem",
        &[("II Kings", 25, 1, 21), ("Jeremiah", 52, 4, 27)],
    ),
    ("the-fool-says", &[("Psalms", 14, 1, 7), ("Psalms", 53, 1, 6)]),
    (
        "baptism-of-jesus",
        &[("Matthew", 3, 13, 17), ("Mark", 1, 9, 11), ("Luke", 3, 21, 22)],
    ),
    (
        "temptation-of-jesus",
        &[("Matthew", 4, 1, 11), ("Mark", 1, 12, 13), ("Luke", 4, 1, 13)],
    ),
    ("beatitudes", &[("Matthew", 5, 3, 12), ("Luke", 6, 20, 23)]),
    ("lords-prayer", &[("Matthew", 6, 9, 13), ("Luke", 11, 2, 4)]),
    (
        "feeding-of-the-five-thousand",
        &[
            ("Matthew", 14, 13, 21),
            ("Mark", 6, 30, 44),
            ("Luke", 9, 10, 17),
            ("John", 6, 1, 14),
        ],
    ),
    (
        "walking-on-water",
        &[("Matthew", 14, 22, 33), ("Mark", 6, 45, 52), ("John", 6, 16, 21)],
    ),
    (
        "peters-confession",
        &[("Matthew", 16, 13, 20), ("Mark", 8, 27, 30), ("Luke", 9, 18, 21)],
    ),
    (
        "transfiguration",
        &[("Matthew", 17, 1, 13), ("Mark", 9, 2, 13), ("Luke", 9, 28, 36)],
    ),
    (
        "triumphal-entry",
        &[
            ("Matthew", 21, 1, 11),
            ("Mark", 11, 1, 11),
            ("Luke", 19, 28, 44),
            ("John", 12, 12, 19),
        ],
    ),
    (
        "last-supper",
        &[("Matthew", 26, 17, 30), ("Mark", 14, 12, 26), ("Luke", 22, 7, 23)],
    ),
    (
        "gethsemane",
        &[("Matthew", 26, 36, 46), ("Mark", 14, 32, 42), ("Luke", 22, 39, 46)],
    ),
    (
        "empty-tomb",
        &[
            ("Matthew", 28, 1, 10),
            ("Mark", 16, 1, 8),
            ("Luke", 24, 1, 12),
            ("John", 20, 1, 10),
        ],
    ),
];

/// Read-only table of parallel passage groups.
#[derive(Debug, Clone, Default)]
pub struct ParallelPassageTable {
    groups: Vec<ParallelGroup>,
}

impl ParallelPassageTable {
    /// The built-in table of well-known parallels.
    pub fn builtin() -> Self {
        let groups = BUILTIN
            .iter()
            .map(|(id, ranges)| ParallelGroup {
                id: id.to_string(),
                passages: ranges
                    .iter()
                    .map(|&(book, chapter, verse_start, verse_end)| PassageRange {
                        book: book.to_string(),
                        chapter,
                        verse_start,
                        verse_end,
                    })
                    .collect(),
            })
            .collect();
        Self { groups }
    }

    /// Build a table from explicit groups, validating every range.
    pub fn new(groups: Vec<ParallelGroup>) -> AppResult<Self> {
        let mut seen = HashSet::new();
        for group in &groups {
            if group.id.trim().is_empty() {
                return Err(AppError::Config(
                    "Parallel passage group with empty id".to_string(),
                ));
            }
            if !seen.insert(group.id.as_str()) {
                return Err(AppError::Config(format!(
                    "Duplicate parallel passage id: {}",
                    group.id
                )));
            }
            for range in &group.passages {
                if range.verse_start == 0 || range.verse_start > range.verse_end {
                    return Err(AppError::Config(format!(
                        "Invalid range in group '{}': {} {}:{}-{}",
                        group.id, range.book, range.chapter, range.verse_start, range.verse_end
                    )));
                }
            }
        }
        Ok(Self { groups })
    }

    /// Parse a YAML list of groups.
    pub fn from_yaml_str(yaml: &str) -> AppResult<Self> {
        let groups: Vec<ParallelGroup> = serde_yaml::from_str(yaml)?;
        Self::new(groups)
    }

    pub fn from_yaml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!(
                "Failed to read parallel passages at {:?}: {}",
                path, e
            ))
        })?;
        let table = Self::from_yaml_str(&content)?;
        tracing::debug!(
            "Loaded {} parallel passage groups from {:?}",
            table.groups.len(),
            path
        );
        Ok(table)
    }

    pub fn groups(&self) -> &[ParallelGroup] {
        &self.groups
    }

    /// Group id for a verse range.
    ///
    /// When the range touches several groups, the entry starting at the
    /// lowest verse wins; ties go to the earlier table entry.
    pub fn lookup(&self, book: &str, chapter: u32, start: u32, end: u32) -> Option<&str> {
        let mut best: Option<(u32, &str)> = None;
        for group in &self.groups {
            for range in &group.passages {
                if !range.overlaps(book, chapter, start, end) {
                    continue;
                }
                if best.map_or(true, |(lowest, _)| range.verse_start < lowest) {
                    best = Some((range.verse_start, group.id.as_str()));
                }
            }
        }
        best.map(|(_, id)| id)
    }
}
