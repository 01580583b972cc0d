// WHY: the coarse scan only localizes to within a step; refinement searches a small start/length
// neighbourhood exhaustively to pin both boundaries

use super::similarity::{prefix_lcs_lengths, ratio_from_lcs};
use super::{scaled, AlignmentConfig, ComparisonBudget, MatchSpan, SearchWindow};

/// True when `start` begins a word in the normalized reference
pub fn is_word_boundary(reference: &[char], start: usize) -> bool {
    start == 0 || reference.get(start - 1).is_some_and(|c| c.is_whitespace())
}

/// Best `(start, end)` around a coarse fuzzy hit
///
/// Starts range over `[coarse - refine_back, coarse + refine_forward)` clamped to `window`;
/// lengths over `[0.9L, 1.1L]` clamped to the reference. Candidates starting on a word boundary
/// get `word_boundary_bonus`. The first candidate with the strictly highest score wins; the
/// reported score is capped at 1.0. `None` when the budget runs out before any candidate scores.
pub fn refine_fuzzy_hit(
    config: &AlignmentConfig,
    segment: &[char],
    reference: &[char],
    window: SearchWindow,
    coarse_start: usize,
    budget: &mut ComparisonBudget,
) -> Option<MatchSpan> {
    let seg_len = segment.len();
    let start_lo = coarse_start.saturating_sub(config.refine_back).max(window.start);
    let start_hi = (coarse_start + config.refine_forward).min(window.end);
    let min_len = scaled(seg_len, config.refine_min_factor);
    let max_len = scaled(seg_len, config.refine_max_factor);

    let mut best: Option<MatchSpan> = None;

    'starts: for test_start in start_lo..start_hi {
        let available = reference.len() - test_start;
        let len_hi = max_len.min(available);
        if min_len > len_hi {
            continue;
        }

        let prefixes = prefix_lcs_lengths(segment, &reference[test_start..], len_hi);
        let bonus = if is_word_boundary(reference, test_start) {
            config.word_boundary_bonus
        } else {
            0.0
        };

        for test_len in min_len..=len_hi {
            if !budget.try_spend() {
                break 'starts;
            }
            let score = ratio_from_lcs(prefixes[test_len], seg_len, test_len) + bonus;
            if best.map_or(true, |span| score > span.score) {
                best = Some(MatchSpan {
                    start: test_start,
                    end: test_start + test_len,
                    score,
                });
            }
        }
    }

    best.map(|span| MatchSpan {
        score: span.score.min(1.0),
        ..span
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::normalization::normalize;

    fn refine(segment: &str, reference: &str, coarse: usize) -> (String, MatchSpan) {
        let config = AlignmentConfig::default();
        let segment = normalize(segment);
        let reference = normalize(reference);
        let window = SearchWindow {
            start: 0,
            end: reference.len(),
        };
        let mut budget = ComparisonBudget::new(config.comparison_budget);
        let (segment, reference) = (segment.chars(), reference.chars());
        let span = refine_fuzzy_hit(&config, segment, reference, window, coarse, &mut budget)
            .expect("candidates scored");
        let text: String = reference[span.start..span.end].iter().collect();
        (text, span)
    }

    #[test]
    fn test_word_boundary() {
        let text: Vec<char> = "ab cd".chars().collect();
        assert!(is_word_boundary(&text, 0));
        assert!(!is_word_boundary(&text, 1));
        assert!(is_word_boundary(&text, 3));
    }

    #[test]
    fn test_refine_pins_boundaries() {
        let (text, span) = refine("teh quikc brown fox", "the quick brown fox jumps", 0);
        assert_eq!(text, "the quick brown fox");
        assert!(span.score > 0.9);
    }

    #[test]
    fn test_refine_moves_to_true_start() {
        let reference = "filler words go here before the actual spoken line appears now";
        let (text, _) = refine("the actul spoken line apears", reference, 20);
        assert!(text.starts_with("the actual"));
        assert!(text.contains("spoken line"));
    }

    #[test]
    fn test_score_capped() {
        let (_, span) = refine("exact words", "exact words", 0);
        assert_eq!(span.score, 1.0);
        assert_eq!((span.start, span.end), (0, 11));
    }

    #[test]
    fn test_budget_stops_refinement() {
        let config = AlignmentConfig::default();
        let segment = normalize("brown fox");
        let reference = normalize("the quick brown fox jumps");
        let window = SearchWindow {
            start: 0,
            end: reference.len(),
        };
        let mut budget = ComparisonBudget::new(3);
        let (segment, reference) = (segment.chars(), reference.chars());
        let span = refine_fuzzy_hit(&config, segment, reference, window, 10, &mut budget).unwrap();
        assert!(budget.is_exhausted());
        assert!(span.start <= 10);

        let mut spent = ComparisonBudget::new(0);
        assert!(refine_fuzzy_hit(&config, segment, reference, window, 10, &mut spent).is_none());
    }
}
