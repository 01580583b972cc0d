// WHY: leading/trailing word n-grams give a cheap exact localization; the fuzzy tier only runs
// when neither the full nor the shortened start anchor occurs in the search window

use tracing::debug;

use super::normalization::NormalizedText;
use super::similarity::{prefix_lcs_lengths, ratio, ratio_from_lcs};
use super::{scaled, AlignmentConfig, ComparisonBudget, MatchResult, MatchSpan, SearchWindow};

/// Number of words in each anchor: `len(words) / 3` clamped to the configured bounds
pub fn anchor_word_count(word_count: usize, config: &AlignmentConfig) -> usize {
    (word_count / 3).clamp(config.min_anchor_words, config.max_anchor_words)
}

/// Join words back with single spaces
pub fn join_words(words: &[&[char]]) -> Vec<char> {
    let mut out = Vec::new();
    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.extend_from_slice(word);
    }
    out
}

/// Start positions of every (possibly overlapping) occurrence of `needle`
pub fn find_all(haystack: &[char], needle: &[char]) -> Vec<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return Vec::new();
    }
    haystack
        .windows(needle.len())
        .enumerate()
        .filter_map(|(i, w)| (w == needle).then_some(i))
        .collect()
}

/// First occurrence of `needle`
pub fn find_first(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Start and end anchors built from a segment's words
#[derive(Debug, Clone, PartialEq)]
pub struct Anchors {
    pub word_count: usize,
    pub start: Vec<char>,
    pub end: Vec<char>,
    /// Fallback start anchor with `short_anchor_words` words
    pub short: Vec<char>,
}

impl Anchors {
    pub fn build(segment: &NormalizedText, config: &AlignmentConfig) -> Option<Self> {
        let words = segment.words();
        if words.is_empty() {
            return None;
        }
        let k = anchor_word_count(words.len(), config);
        let start = join_words(&words[..k.min(words.len())]);
        let end = if words.len() > k {
            join_words(&words[words.len() - k..])
        } else {
            start.clone()
        };
        let short = join_words(&words[..config.short_anchor_words.min(words.len())]);
        Some(Self {
            word_count: k,
            start,
            end,
            short,
        })
    }
}

/// Pick among several occurrences by similarity of the text that follows each one
///
/// Scores within `tie_epsilon` of the best are ties and go to the occurrence closest to the
/// hint. `positions` are window-relative; the result is too.
fn disambiguate(
    config: &AlignmentConfig,
    segment: &[char],
    reference: &[char],
    window: SearchWindow,
    hint: usize,
    positions: &[usize],
) -> Option<usize> {
    let (&first, rest) = positions.split_first()?;
    if rest.is_empty() {
        return Some(first);
    }

    let compare_len = if segment.len() < config.compare_floor_below {
        segment.len().max(config.compare_floor)
    } else {
        segment.len()
    };

    let mut best_score = 0.0;
    let mut best_pos = first;
    for &pos in positions {
        let test_start = window.start + pos;
        let test_end = (test_start + compare_len).min(reference.len());
        let score = ratio(segment, &reference[test_start..test_end]);

        if score > best_score + config.tie_epsilon {
            best_score = score;
            best_pos = pos;
        } else if (score - best_score).abs() <= config.tie_epsilon {
            let current_distance = test_start.abs_diff(hint);
            let best_distance = (window.start + best_pos).abs_diff(hint);
            if current_distance < best_distance {
                best_score = score;
                best_pos = pos;
            }
        }
    }

    debug!(
        occurrences = positions.len(),
        chosen = window.start + best_pos,
        score = best_score,
        "Disambiguated anchor occurrences"
    );
    Some(best_pos)
}

/// End of the match starting at `abs_start`: the end anchor if it occurs close enough,
/// otherwise the length in `[0.8L, 1.5L)` that maximizes similarity
fn resolve_end(
    config: &AlignmentConfig,
    segment: &[char],
    reference: &[char],
    abs_start: usize,
    end_anchor: &[char],
    budget: &mut ComparisonBudget,
) -> usize {
    let seg_len = segment.len();
    let search_end = (abs_start + seg_len * config.end_search_factor).min(reference.len());
    if let Some(pos) = find_first(&reference[abs_start..search_end], end_anchor) {
        return abs_start + pos + end_anchor.len();
    }

    let available = reference.len() - abs_start;
    let min_len = scaled(seg_len, config.end_refine_min_factor);
    let max_len = scaled(seg_len, config.end_refine_max_factor).min(available);
    let mut best_end = (abs_start + seg_len).min(reference.len());
    if min_len >= max_len {
        return best_end;
    }

    let prefixes = prefix_lcs_lengths(segment, &reference[abs_start..], max_len);
    let mut best_ratio = 0.0;
    for test_len in min_len..max_len {
        if !budget.try_spend() {
            break;
        }
        let score = ratio_from_lcs(prefixes[test_len], seg_len, test_len);
        if score > best_ratio {
            best_ratio = score;
            best_end = abs_start + test_len;
        }
    }
    best_end
}

/// Exact and short-anchor tiers
///
/// Returns `MatchResult::Exact` or `MatchResult::ShortAnchor` with the span scored against the
/// whole segment, or `MatchResult::None` when neither start anchor occurs in `window`.
pub fn find_anchor_match(
    config: &AlignmentConfig,
    segment: &NormalizedText,
    reference: &[char],
    window: SearchWindow,
    hint: usize,
    budget: &mut ComparisonBudget,
) -> MatchResult {
    let Some(anchors) = Anchors::build(segment, config) else {
        return MatchResult::None;
    };
    let seg = segment.chars();
    let region = &reference[window.start..window.end];

    let exact_pos = if anchors.word_count <= config.ambiguous_anchor_words {
        let positions = find_all(region, &anchors.start);
        disambiguate(config, seg, reference, window, hint, &positions)
    } else {
        find_first(region, &anchors.start)
    };

    let (start_pos, short) = match exact_pos {
        Some(pos) => (pos, false),
        None => {
            let positions = find_all(region, &anchors.short);
            match disambiguate(config, seg, reference, window, hint, &positions) {
                Some(pos) => (pos, true),
                None => return MatchResult::None,
            }
        }
    };

    let abs_start = window.start + start_pos;
    let abs_end = resolve_end(config, seg, reference, abs_start, &anchors.end, budget);
    let score = ratio(seg, &reference[abs_start..abs_end]);
    let span = MatchSpan {
        start: abs_start,
        end: abs_end,
        score,
    };

    debug!(start = abs_start, end = abs_end, score, short, "Anchor match");
    if short {
        MatchResult::ShortAnchor(span)
    } else {
        MatchResult::Exact(span)
    }
}
