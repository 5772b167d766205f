//! Overlap seeding: which verses of a closed chunk open the next one.

use crate::types::ChunkVerse;

/// Pick the shortest tail of `primary` whose tokens reach `overlap_target`.
///
/// If the last verse alone reaches the target it is the whole tail. If the
/// whole slice falls short, all of it is returned. The returned verses are
/// in chapter order and marked as overlap.
pub(crate) fn select_tail(primary: &[ChunkVerse], overlap_target: usize) -> Vec<ChunkVerse> {
    if overlap_target == 0 || primary.is_empty() {
        return Vec::new();
    }

    let mut covered = 0usize;
    let mut start = primary.len();
    while start > 0 && covered < overlap_target {
        start -= 1;
        covered += primary[start].tokens;
    }

    primary[start..]
        .iter()
        .map(|v| ChunkVerse {
            overlap: true,
            ..v.clone()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verses(tokens: &[usize]) -> Vec<ChunkVerse> {
        tokens
            .iter()
            .enumerate()
            .map(|(i, &t)| ChunkVerse {
                number: i as u32 + 1,
                text: format!("v{}", i + 1),
                tokens: t,
                overlap: false,
            })
            .collect()
    }

    #[test]
    fn test_minimal_tail_reaching_target() {
        let tail = select_tail(&verses(&[40, 30, 26, 28]), 52);
        let numbers: Vec<u32> = tail.iter().map(|v| v.number).collect();
        assert_eq!(numbers, vec![3, 4]);
        assert!(tail.iter().all(|v| v.overlap));
    }

    #[test]
    fn test_single_large_last_verse() {
        let tail = select_tail(&verses(&[10, 10, 90]), 52);
        assert_eq!(tail.len(), 1);
        assert_eq!(tail[0].number, 3);
    }

    #[test]
    fn test_short_chunk_carries_everything() {
        let tail = select_tail(&verses(&[10, 12]), 52);
        assert_eq!(tail.len(), 2);
    }

    #[test]
    fn test_zero_target_carries_nothing() {
        assert!(select_tail(&verses(&[10, 12]), 0).is_empty());
    }
}
