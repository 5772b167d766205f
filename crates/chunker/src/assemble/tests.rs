//! Assembler scenarios and property tests.

use super::*;
use crate::tokens::WordCounter;
use proptest::prelude::*;

const DEFAULT: GenreProfile = GenreProfile::new(350, 50, 500);

fn assembler() -> ChunkAssembler {
    ChunkAssembler::new(Arc::new(WordCounter), 0.15)
}

/// A verse whose text is exactly `tokens` words under `WordCounter`.
fn verse(chapter: u32, number: u32, tokens: usize) -> Verse {
    let text = vec!["word"; tokens].join(" ");
    Verse::new("Genesis", chapter, number, text, Testament::Old)
}

fn chapter(tokens: &[usize]) -> Vec<Verse> {
    tokens
        .iter()
        .enumerate()
        .map(|(i, &t)| verse(1, i as u32 + 1, t))
        .collect()
}

/// Verses 1-13 = 340, 14-25 = 335, 26-31 = 285 tokens.
fn thirty_one_verse_chapter() -> Vec<Verse> {
    let mut tokens = vec![26; 12];
    tokens.push(28);
    tokens.push(170);
    tokens.extend(std::iter::repeat(15).take(11));
    tokens.push(170);
    tokens.extend(std::iter::repeat(23).take(5));
    assert_eq!(tokens.len(), 31);
    chapter(&tokens)
}

fn ranges(chunks: &[Chunk]) -> Vec<(u32, u32)> {
    chunks.iter().map(|c| (c.verse_start, c.verse_end)).collect()
}

#[test]
fn test_short_chapter_is_single_chunk() {
    let verses = chapter(&[30; 6]);
    let chunks = assembler()
        .assemble(&verses, Genre::Poetry, &DEFAULT, false)
        .unwrap();

    assert_eq!(chunks.len(), 1);
    assert_eq!(ranges(&chunks), vec![(1, 6)]);
    assert_eq!(chunks[0].token_count, 180);
    assert!(!chunks[0].oversized);
    assert_eq!(chunks[0].genre, Genre::Poetry);
}

#[test]
fn test_long_chapter_splits_at_ceiling() {
    let chunks = assembler()
        .assemble(&thirty_one_verse_chapter(), Genre::Narrative, &DEFAULT, false)
        .unwrap();

    assert_eq!(ranges(&chunks), vec![(1, 13), (14, 25), (26, 31)]);
    let tokens: Vec<usize> = chunks.iter().map(|c| c.token_count).collect();
    assert_eq!(tokens, vec![340, 335, 285]);
}

#[test]
fn test_closes_once_target_reached() {
    let chunks = assembler()
        .assemble(&chapter(&[100, 100, 100, 60, 40]), Genre::Narrative, &DEFAULT, false)
        .unwrap();

    assert_eq!(ranges(&chunks), vec![(1, 4), (5, 5)]);
    assert_eq!(chunks[0].token_count, 360);
    // Final chunk may sit below min_tokens
    assert_eq!(chunks[1].token_count, 40);
}

#[test]
fn test_oversized_single_verse() {
    let chunks = assembler()
        .assemble(&chapter(&[520]), Genre::Narrative, &DEFAULT, false)
        .unwrap();

    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].token_count, 520);
    assert!(chunks[0].oversized);
}

#[test]
fn test_oversized_verse_mid_chapter_stands_alone() {
    let chunks = assembler()
        .assemble(&chapter(&[100, 600, 100]), Genre::Narrative, &DEFAULT, true)
        .unwrap();

    assert_eq!(ranges(&chunks), vec![(1, 1), (2, 2), (3, 3)]);
    assert!(!chunks[0].oversized);
    assert!(chunks[1].oversized);
    assert_eq!(chunks[1].verses.len(), 1);
    // Nothing is carried out of an oversized chunk
    assert_eq!(chunks[2].overlap_tokens(), 0);
}

#[test]
fn test_overlap_seeds_next_chunk() {
    let chunks = assembler()
        .assemble(&thirty_one_verse_chapter(), Genre::Narrative, &DEFAULT, true)
        .unwrap();

    let second = &chunks[1];
    assert_eq!(second.verse_start, 14);
    assert!(second.text.starts_with("[12] "));

    let carried: Vec<u32> = second.overlap_verses().map(|v| v.number).collect();
    assert_eq!(carried, vec![12, 13]);
    assert_eq!(second.overlap_tokens(), 54);
    assert!(second.overlap_tokens() >= 52);

    // Overlap counts toward the budget
    let primary: usize = second.primary_verses().map(|v| v.tokens).sum();
    assert_eq!(second.token_count, primary + 54);
}

#[test]
fn test_overlap_shed_to_respect_ceiling() {
    // Tail of chunk one (verse 2, 60 tokens) plus verse 3 (480) would pass 500.
    let chunks = assembler()
        .assemble(&chapter(&[300, 60, 480]), Genre::Narrative, &DEFAULT, true)
        .unwrap();

    assert_eq!(ranges(&chunks), vec![(1, 2), (3, 3)]);
    assert_eq!(chunks[1].overlap_tokens(), 0);
    assert_eq!(chunks[1].token_count, 480);
}

#[test]
fn test_rendered_text_prefixes_verse_numbers() {
    let verses = vec![
        Verse::new("John", 11, 35, "Jesus wept.", Testament::New),
        Verse::new("John", 11, 36, "Then said the Jews, Behold how he loved him!", Testament::New),
    ];
    let chunks = assembler()
        .assemble(&verses, Genre::Gospel, &DEFAULT, false)
        .unwrap();

    assert_eq!(
        chunks[0].text,
        "35 Jesus wept. 36 Then said the Jews, Behold how he loved him!"
    );
    assert_eq!(chunks[0].testament, Testament::New);
}

#[test]
fn test_rejects_empty_input() {
    let err = assembler()
        .assemble(&[], Genre::Narrative, &DEFAULT, false)
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[test]
fn test_rejects_out_of_order_verses() {
    let verses = vec![verse(1, 2, 10), verse(1, 1, 10)];
    let err = assembler()
        .assemble(&verses, Genre::Narrative, &DEFAULT, false)
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[test]
fn test_rejects_duplicate_verse_numbers() {
    let verses = vec![verse(1, 1, 10), verse(1, 1, 10)];
    assert!(assembler()
        .assemble(&verses, Genre::Narrative, &DEFAULT, false)
        .is_err());
}

#[test]
fn test_rejects_multi_chapter_input() {
    let verses = vec![verse(1, 1, 10), verse(2, 2, 10)];
    let err = assembler()
        .assemble(&verses, Genre::Narrative, &DEFAULT, false)
        .unwrap_err();
    assert!(err.to_string().contains("more than one chapter"));
}

fn primary_numbers(chunks: &[Chunk]) -> Vec<u32> {
    chunks
        .iter()
        .flat_map(|c| c.primary_verses().map(|v| v.number))
        .collect()
}

proptest! {
    #[test]
    fn prop_primary_coverage_is_exact(
        tokens in prop::collection::vec(1usize..=700, 1..60),
        overlap in any::<bool>(),
    ) {
        let verses = chapter(&tokens);
        let chunks = assembler().assemble(&verses, Genre::Narrative, &DEFAULT, overlap).unwrap();

        let expected: Vec<u32> = (1..=verses.len() as u32).collect();
        prop_assert_eq!(primary_numbers(&chunks), expected);

        for chunk in &chunks {
            prop_assert_eq!(chunk.chapter, 1);
            let primary: Vec<u32> = chunk.primary_verses().map(|v| v.number).collect();
            prop_assert_eq!(chunk.verse_start, primary[0]);
            prop_assert_eq!(chunk.verse_end, *primary.last().unwrap());
        }
    }

    #[test]
    fn prop_only_single_verses_exceed_ceiling(
        tokens in prop::collection::vec(1usize..=700, 1..60),
        overlap in any::<bool>(),
    ) {
        let chunks = assembler()
            .assemble(&chapter(&tokens), Genre::Narrative, &DEFAULT, overlap)
            .unwrap();

        for chunk in &chunks {
            if chunk.oversized {
                prop_assert_eq!(chunk.verses.len(), 1);
                prop_assert!(chunk.token_count > DEFAULT.max_tokens);
            } else {
                prop_assert!(chunk.token_count <= DEFAULT.max_tokens);
            }
            if chunk.verses.len() > 1 {
                prop_assert!(chunk.verses.iter().all(|v| v.tokens <= DEFAULT.max_tokens));
            }
        }
    }

    #[test]
    fn prop_non_final_chunks_meet_floor(
        tokens in prop::collection::vec(1usize..=450, 1..60),
        overlap in any::<bool>(),
    ) {
        // Verses no larger than max - min can always be added to an
        // under-floor chunk, so only the chapter's last chunk may be short.
        let chunks = assembler()
            .assemble(&chapter(&tokens), Genre::Narrative, &DEFAULT, overlap)
            .unwrap();

        let last = chunks.len() - 1;
        for (i, chunk) in chunks.iter().enumerate() {
            prop_assert!(chunk.token_count <= DEFAULT.max_tokens);
            if i != last {
                prop_assert!(chunk.token_count >= DEFAULT.min_tokens);
            }
        }
    }

    #[test]
    fn prop_overlap_is_minimal_tail_of_previous(
        tokens in prop::collection::vec(1usize..=100, 1..80),
    ) {
        let chunks = assembler()
            .assemble(&chapter(&tokens), Genre::Narrative, &DEFAULT, true)
            .unwrap();
        let overlap_target = DEFAULT.overlap_tokens(0.15);

        prop_assert_eq!(chunks[0].overlap_tokens(), 0);
        for pair in chunks.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            let carried: Vec<u32> = next.overlap_verses().map(|v| v.number).collect();
            let prev_primary: Vec<u32> = prev.primary_verses().map(|v| v.number).collect();

            prop_assert!(!carried.is_empty());
            prop_assert!(next.verses[0].overlap);
            prop_assert!(prev_primary.ends_with(&carried));

            let first_tokens = next.verses[0].tokens;
            prop_assert!(next.overlap_tokens() >= overlap_target);
            prop_assert!(next.overlap_tokens() - first_tokens < overlap_target);
        }
    }

    #[test]
    fn prop_assembly_is_deterministic(
        tokens in prop::collection::vec(1usize..=700, 1..40),
        overlap in any::<bool>(),
    ) {
        let verses = chapter(&tokens);
        let first = assembler().assemble(&verses, Genre::Narrative, &DEFAULT, overlap).unwrap();
        let second = assembler().assemble(&verses, Genre::Narrative, &DEFAULT, overlap).unwrap();
        prop_assert_eq!(first, second);
    }
}
