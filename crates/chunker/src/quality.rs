//! Read-only statistics over a completed chunking run.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Chunk;

/// Lower edge of the target band, as a fraction of the profile target.
pub const TARGET_BAND_LOW: f64 = 0.8;
/// Upper edge of the target band.
pub const TARGET_BAND_HIGH: f64 = 1.2;

/// Token distribution of a set of chunks.
///
/// Bounds are checked against each chunk's own profile, so a genre-aware
/// run is judged per genre.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub total_chunks: usize,
    pub total_tokens: usize,
    /// Verses counted once, overlap excluded
    pub total_verses: usize,
    pub avg_verses_per_chunk: f64,

    pub below_min: usize,
    pub within_bounds: usize,
    pub above_max: usize,
    pub below_min_pct: f64,
    pub within_bounds_pct: f64,
    pub above_max_pct: f64,

    pub oversized: usize,

    /// Chunks within 80-120% of their profile target
    pub in_target_band: usize,
    pub in_target_band_pct: f64,

    pub mean_tokens: f64,
    pub min_tokens: usize,
    pub max_tokens: usize,
}

/// Build a report. An empty slice yields all zeros.
pub fn analyze(chunks: &[Chunk]) -> QualityReport {
    if chunks.is_empty() {
        return QualityReport::default();
    }

    let mut report = QualityReport {
        total_chunks: chunks.len(),
        min_tokens: usize::MAX,
        ..QualityReport::default()
    };

    for chunk in chunks {
        let tokens = chunk.token_count;
        let profile = &chunk.profile;

        report.total_tokens += tokens;
        report.total_verses += chunk.primary_verses().count();
        report.min_tokens = report.min_tokens.min(tokens);
        report.max_tokens = report.max_tokens.max(tokens);

        if tokens < profile.min_tokens {
            report.below_min += 1;
        } else if tokens > profile.max_tokens {
            report.above_max += 1;
        } else {
            report.within_bounds += 1;
        }

        if chunk.oversized {
            report.oversized += 1;
        }

        let target = profile.target_tokens as f64;
        let tokens_f = tokens as f64;
        if tokens_f >= target * TARGET_BAND_LOW && tokens_f <= target * TARGET_BAND_HIGH {
            report.in_target_band += 1;
        }
    }

    let total = report.total_chunks as f64;
    report.avg_verses_per_chunk = report.total_verses as f64 / total;
    report.mean_tokens = report.total_tokens as f64 / total;
    report.below_min_pct = percent(report.below_min, total);
    report.within_bounds_pct = percent(report.within_bounds, total);
    report.above_max_pct = percent(report.above_max, total);
    report.in_target_band_pct = percent(report.in_target_band, total);

    report
}

fn percent(count: usize, total: f64) -> f64 {
    count as f64 * 100.0 / total
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Chunks:            {}", self.total_chunks)?;
        writeln!(f, "Verses:            {}", self.total_verses)?;
        writeln!(f, "Verses per chunk:  {:.1}", self.avg_verses_per_chunk)?;
        writeln!(
            f,
            "Tokens:            mean {:.1}, min {}, max {}",
            self.mean_tokens, self.min_tokens, self.max_tokens
        )?;
        writeln!(
            f,
            "Below minimum:     {} ({:.1}%)",
            self.below_min, self.below_min_pct
        )?;
        writeln!(
            f,
            "Within bounds:     {} ({:.1}%)",
            self.within_bounds, self.within_bounds_pct
        )?;
        writeln!(
            f,
            "Above maximum:     {} ({:.1}%)",
            self.above_max, self.above_max_pct
        )?;
        writeln!(f, "Oversized verses:  {}", self.oversized)?;
        write!(
            f,
            "Target band:       {} ({:.1}%)",
            self.in_target_band, self.in_target_band_pct
        )
    }
}
