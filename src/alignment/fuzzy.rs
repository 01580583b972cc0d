// WHY: last-resort locator for segments whose leading words were misheard; scans the window at
// a coarse step, so its output is only a starting point for the refiner

use tracing::debug;

use super::similarity::ratio;
use super::{scaled, AlignmentConfig, ComparisonBudget};

/// Coarse fuzzy hit, position relative to the searched region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyHit {
    pub position: usize,
    pub score: f64,
}

/// Window length compared against the segment at each step
pub fn fuzzy_window_size(segment_len: usize, config: &AlignmentConfig) -> usize {
    if segment_len < config.fuzzy_short_len {
        scaled(segment_len, config.fuzzy_short_window_factor)
    } else {
        scaled(segment_len, config.fuzzy_long_window_factor)
    }
}

/// Slide a window across `region` in steps of `max(1, L / 10)` and keep the best score
///
/// Returns early on a score at or above `fuzzy_early_exit`; otherwise the best hit is returned
/// only if it reaches `fuzzy_threshold`. Stops scanning when the budget runs out.
pub fn sliding_window_search(
    config: &AlignmentConfig,
    segment: &[char],
    region: &[char],
    budget: &mut ComparisonBudget,
) -> Option<FuzzyHit> {
    let seg_len = segment.len();
    if seg_len == 0 || region.len() < seg_len {
        return None;
    }

    let step = (seg_len / config.fuzzy_step_divisor).max(1);
    let window_size = fuzzy_window_size(seg_len, config);

    let mut best: Option<FuzzyHit> = None;
    for i in (0..=region.len() - seg_len).step_by(step) {
        if !budget.try_spend() {
            break;
        }
        let window_end = (i + window_size).min(region.len());
        let score = ratio(segment, &region[i..window_end]);

        if score > best.map_or(0.0, |hit| hit.score) {
            let hit = FuzzyHit { position: i, score };
            if score >= config.fuzzy_early_exit {
                debug!(position = i, score, "Fuzzy scan early exit");
                return Some(hit);
            }
            best = Some(hit);
        }
    }

    debug!(
        best_position = best.map(|hit| hit.position),
        best_score = best.map(|hit| hit.score),
        "Fuzzy scan finished"
    );
    best.filter(|hit| hit.score >= config.fuzzy_threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::normalization::normalize;

    fn search(segment: &str, region: &str) -> Option<FuzzyHit> {
        let config = AlignmentConfig::default();
        let mut budget = ComparisonBudget::new(config.comparison_budget);
        let segment = normalize(segment);
        let region = normalize(region);
        sliding_window_search(&config, segment.chars(), region.chars(), &mut budget)
    }

    #[test]
    fn test_window_size() {
        let config = AlignmentConfig::default();
        assert_eq!(fuzzy_window_size(19, &config), 22);
        assert_eq!(fuzzy_window_size(100, &config), 114);
    }

    #[test]
    fn test_misspelled_start_found() {
        let hit = search("teh quikc brown fox", "the quick brown fox jumps").unwrap();
        assert_eq!(hit.position, 0);
        assert!(hit.score >= 0.80);
    }

    #[test]
    fn test_early_exit_on_near_identical() {
        // the 1.2x window only scores this high once the region end truncates it
        let hit =
            search("and so the story ends here", "preamble and so the story ends here").unwrap();
        assert_eq!(hit.position, 8);
        assert!(hit.score >= 0.95);
    }

    #[test]
    fn test_early_exit_keeps_first_window_over_cutoff() {
        // position 8 scores 0.963; the scan stops there although position 10 would score 1.0
        let hit =
            search("and so the story ends here", "preambles and so the story ends here").unwrap();
        assert_eq!(hit.position, 8);
        assert!(hit.score >= 0.95 && hit.score < 1.0);
    }

    #[test]
    fn test_region_shorter_than_segment() {
        assert!(search("a fairly long segment of text", "short").is_none());
        assert!(search("", "anything").is_none());
    }

    #[test]
    fn test_below_fuzzy_threshold() {
        let region = "the quick brown fox jumps over the lazy dog";
        assert!(search("zebra xylophone quartz", region).is_none());
    }

    #[test]
    fn test_budget_limits_scan() {
        let config = AlignmentConfig::default();
        let segment = normalize("target phrase here");
        let region =
            normalize("unrelated filler text unrelated filler text then target phrase here");
        let mut budget = ComparisonBudget::new(1);
        let hit = sliding_window_search(&config, segment.chars(), region.chars(), &mut budget);
        assert!(hit.is_none());
        assert!(budget.is_exhausted());
    }
}
