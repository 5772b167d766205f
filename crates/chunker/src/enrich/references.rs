//! Citation-style cross-reference detection (`<Book> <chapter>:<verse>[-<verse>]`).

use regex::Regex;
use std::ops::Range;

use versekit_core::{AppError, AppResult};

use crate::canon::Canon;

/// Finds citations of canonical books in free text.
#[derive(Debug, Clone)]
pub struct ReferenceDetector {
    canon: Canon,
    /// Citations of known book names and aliases
    citation: Regex,
    /// Anything shaped like a citation; used to notice ones we drop
    candidate: Regex,
}

impl ReferenceDetector {
    pub fn new(canon: &Canon) -> AppResult<Self> {
        let mut names: Vec<&str> = canon.citation_names().collect();
        // Longest first so "Psalms" wins over "Psalm", "I John" over "John".
        names.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));

        let alternation = names
            .iter()
            .map(|name| regex::escape(name).replace(' ', r"\s+"))
            .collect::<Vec<_>>()
            .join("|");

        let citation = Regex::new(&format!(
            r"\b(?P<book>{})\s+(?P<chapter>\d{{1,3}}):(?P<start>\d{{1,3}})(?:\s*[-–]\s*(?P<end>\d{{1,3}}))?\b",
            alternation
        ))
        .map_err(|e| AppError::Config(format!("Failed to build citation pattern: {}", e)))?;

        let candidate = Regex::new(r"\b(?:[1-3]\s+)?[A-Z][A-Za-z]+\s+\d{1,3}:\d{1,3}\b")
            .map_err(|e| AppError::Config(format!("Failed to build candidate pattern: {}", e)))?;

        Ok(Self {
            canon: canon.clone(),
            citation,
            candidate,
        })
    }

    /// Normalized citations in first-seen order, without duplicates.
    pub fn detect(&self, text: &str) -> Vec<String> {
        let mut found = Vec::new();
        self.collect(text, &mut found);
        found
    }

    /// Citations across several texts, deduplicated in first-seen order.
    ///
    /// Each text is scanned on its own, so no match spans two of them.
    pub fn detect_all<'a, I>(&self, texts: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut found = Vec::new();
        for text in texts {
            self.collect(text, &mut found);
        }
        found
    }

    fn collect(&self, text: &str, found: &mut Vec<String>) {
        let mut matched: Vec<Range<usize>> = Vec::new();

        for caps in self.citation.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            matched.push(whole.range());

            let book_text = collapse_whitespace(&caps["book"]);
            let Some(book) = self.canon.resolve(&book_text) else {
                continue;
            };
            let (Ok(chapter), Ok(start)) = (caps["chapter"].parse::<u32>(), caps["start"].parse::<u32>())
            else {
                continue;
            };
            let end = caps.name("end").and_then(|m| m.as_str().parse::<u32>().ok());

            let normalized = match end {
                Some(end) if end > start => format!("{} {}:{}-{}", book.name, chapter, start, end),
                Some(end) if end < start => {
                    tracing::debug!(citation = whole.as_str(), "Skipping inverted verse range");
                    continue;
                }
                _ => format!("{} {}:{}", book.name, chapter, start),
            };

            if !found.contains(&normalized) {
                found.push(normalized);
            }
        }

        for candidate in self.candidate.find_iter(text) {
            let span = candidate.range();
            if !matched.iter().any(|m| m.start < span.end && span.start < m.end) {
                tracing::debug!(
                    candidate = candidate.as_str(),
                    "Skipping citation with unknown book name"
                );
            }
        }
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> ReferenceDetector {
        ReferenceDetector::new(&Canon::standard()).unwrap()
    }

    #[test]
    fn test_detects_simple_citation() {
        let refs = detector().detect("as it is written in Isaiah 53:5, by his stripes");
        assert_eq!(refs, vec!["Isaiah 53:5"]);
    }

    #[test]
    fn test_ignores_pseudo_citations() {
        assert!(detector().detect("see chapter 3").is_empty());
        assert!(detector().detect("at 10:30 in the morning").is_empty());
        assert!(detector().detect("as Hezekiah 3:4 records").is_empty());
    }

    #[test]
    fn test_ranges_and_aliases_normalized() {
        let refs = detector().detect("compare 1 Samuel 2:1-10 with Psalm 113:7 – 8 and Revelation 21:4");
        assert_eq!(
            refs,
            vec!["I Samuel 2:1-10", "Psalms 113:7-8", "Revelation of John 21:4"]
        );
    }

    #[test]
    fn test_numbered_book_preferred_over_plain_name() {
        assert_eq!(detector().detect("I John 4:8"), vec!["I John 4:8"]);
        assert_eq!(detector().detect("John 3:16"), vec!["John 3:16"]);
    }

    #[test]
    fn test_deduplicates_in_first_seen_order() {
        let refs = detector().detect("Genesis 1:1 and John 1:1, again Genesis 1:1");
        assert_eq!(refs, vec!["Genesis 1:1", "John 1:1"]);
    }

    #[test]
    fn test_multi_word_name_with_extra_spacing() {
        let refs = detector().detect("Song of  Solomon 2:1");
        assert_eq!(refs, vec!["Song of Solomon 2:1"]);
    }

    #[test]
    fn test_detect_all_scans_texts_separately() {
        let refs = detector().detect_all([
            "And it came to pass.",
            "John 3:16 was read aloud, then Isaiah 53:5.",
            "Again Isaiah 53:5.",
        ]);
        assert_eq!(refs, vec!["John 3:16", "Isaiah 53:5"]);
    }

    #[test]
    fn test_inverted_range_dropped() {
        assert!(detector().detect("Isaiah 53:7-5").is_empty());
    }
}
