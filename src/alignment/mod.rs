// WHY: single parameterized alignment engine; every constant that used to be re-derived per
// variant lives in AlignmentConfig so callers can tune windows, thresholds and anchor sizes

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod anchor;
pub mod fuzzy;
pub mod normalization;
pub mod position_map;
pub mod reference;
pub mod refine;
pub mod similarity;

// Re-export core types
pub use normalization::{normalize, normalize_text, NormalizedText};
pub use position_map::{extract_corrected_text, OriginalSpan, PositionMapper, PunctuationRules};
pub use reference::ReferenceText;
pub use similarity::{ratio, ratio_str};

/// Which tier produced a match
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    Exact,
    ShortAnchor,
    Fuzzy,
    None,
}

impl std::fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MatchMethod::Exact => "exact",
            MatchMethod::ShortAnchor => "short_anchor",
            MatchMethod::Fuzzy => "fuzzy",
            MatchMethod::None => "none",
        };
        f.write_str(name)
    }
}

/// Half-open span in normalized-reference coordinates with its similarity score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchSpan {
    pub start: usize,
    pub end: usize,
    pub score: f64,
}

/// Outcome of locating one segment in the reference
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchResult {
    None,
    Exact(MatchSpan),
    ShortAnchor(MatchSpan),
    Fuzzy(MatchSpan),
}

impl MatchResult {
    pub fn method(&self) -> MatchMethod {
        match self {
            MatchResult::None => MatchMethod::None,
            MatchResult::Exact(_) => MatchMethod::Exact,
            MatchResult::ShortAnchor(_) => MatchMethod::ShortAnchor,
            MatchResult::Fuzzy(_) => MatchMethod::Fuzzy,
        }
    }

    pub fn span(&self) -> Option<&MatchSpan> {
        match self {
            MatchResult::None => None,
            MatchResult::Exact(span)
            | MatchResult::ShortAnchor(span)
            | MatchResult::Fuzzy(span) => Some(span),
        }
    }

    /// Similarity score, 0.0 when nothing matched
    pub fn score(&self) -> f64 {
        self.span().map_or(0.0, |span| span.score)
    }

    pub fn is_none(&self) -> bool {
        matches!(self, MatchResult::None)
    }
}

/// Search reach around the position hint, in normalized chars
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub back: usize,
    pub forward: usize,
}

/// Bounded slice `[start, end)` of the normalized reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchWindow {
    pub start: usize,
    pub end: usize,
}

impl SearchWindow {
    /// Window `[hint - back, hint + forward)` clamped to `[0, reference_len]`
    pub fn around(hint: usize, size: WindowSize, reference_len: usize) -> Self {
        let start = hint.saturating_sub(size.back).min(reference_len);
        let end = hint.saturating_add(size.forward).min(reference_len);
        Self { start, end: end.max(start) }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// How the position hint is carried across segments
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum HintStrategy {
    /// One hint threaded through every segment in input order
    #[default]
    Sequential,
    /// Segments split into contiguous chunks processed on separate threads; each chunk starts
    /// from a proportional estimate and searches a widened window until its first match
    Chunked { chunks: usize },
}

/// Tunable constants of the alignment engine
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AlignmentConfig {
    /// Minimum score for a match to replace segment text
    pub confidence_threshold: f64,
    /// Enable the sliding-window fuzzy tier
    pub use_fuzzy: bool,
    /// Segments with fewer normalized chars than this use `short_window`
    pub short_segment_len: usize,
    pub short_window: WindowSize,
    pub wide_window: WindowSize,
    /// Window used while the hint is only an estimate (start of a chunk)
    pub unanchored_window: WindowSize,
    pub min_anchor_words: usize,
    pub max_anchor_words: usize,
    /// Start anchors with at most this many words are disambiguated over all occurrences
    pub ambiguous_anchor_words: usize,
    /// Word count of the fallback start anchor
    pub short_anchor_words: usize,
    /// Occurrence scores within this distance are ties, broken by distance to the hint
    pub tie_epsilon: f64,
    /// Comparison length used for segments shorter than `compare_floor_below`
    pub compare_floor: usize,
    pub compare_floor_below: usize,
    /// End anchor is searched within `end_search_factor × segment length` of the start
    pub end_search_factor: usize,
    pub end_refine_min_factor: f64,
    pub end_refine_max_factor: f64,
    pub fuzzy_threshold: f64,
    pub fuzzy_early_exit: f64,
    pub fuzzy_step_divisor: usize,
    /// Segments shorter than this use `fuzzy_short_window_factor`
    pub fuzzy_short_len: usize,
    pub fuzzy_short_window_factor: f64,
    pub fuzzy_long_window_factor: f64,
    pub refine_back: usize,
    pub refine_forward: usize,
    pub refine_min_factor: f64,
    pub refine_max_factor: f64,
    /// Added to a refinement candidate that starts on a word boundary
    pub word_boundary_bonus: f64,
    /// Similarity evaluations allowed per segment across fuzzy and refinement loops
    pub comparison_budget: usize,
    pub punctuation: PunctuationRules,
    pub hint_strategy: HintStrategy,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.65,
            use_fuzzy: true,
            short_segment_len: 20,
            short_window: WindowSize {
                back: 50,
                forward: 200,
            },
            wide_window: WindowSize {
                back: 100,
                forward: 500,
            },
            unanchored_window: WindowSize {
                back: 1000,
                forward: 6000,
            },
            min_anchor_words: 2,
            max_anchor_words: 5,
            ambiguous_anchor_words: 3,
            short_anchor_words: 2,
            tie_epsilon: 0.01,
            compare_floor: 50,
            compare_floor_below: 10,
            end_search_factor: 3,
            end_refine_min_factor: 0.8,
            end_refine_max_factor: 1.5,
            fuzzy_threshold: 0.80,
            fuzzy_early_exit: 0.95,
            fuzzy_step_divisor: 10,
            fuzzy_short_len: 50,
            fuzzy_short_window_factor: 1.2,
            fuzzy_long_window_factor: 1.15,
            refine_back: 30,
            refine_forward: 60,
            refine_min_factor: 0.9,
            refine_max_factor: 1.1,
            word_boundary_bonus: 0.02,
            comparison_budget: 200_000,
            punctuation: PunctuationRules::Complete,
            hint_strategy: HintStrategy::Sequential,
        }
    }
}

impl AlignmentConfig {
    /// Reject values that would make the search degenerate
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("confidence_threshold", self.confidence_threshold),
            ("fuzzy_threshold", self.fuzzy_threshold),
            ("fuzzy_early_exit", self.fuzzy_early_exit),
            ("tie_epsilon", self.tie_epsilon),
        ] {
            if !(0.0..=1.0).contains(&value) {
                bail!("{name} must be within [0, 1], got {value}");
            }
        }
        if self.min_anchor_words == 0 || self.min_anchor_words > self.max_anchor_words {
            bail!(
                "anchor word bounds must satisfy 0 < min <= max, got {}..={}",
                self.min_anchor_words,
                self.max_anchor_words
            );
        }
        if self.short_anchor_words == 0 {
            bail!("short_anchor_words must be positive");
        }
        if self.fuzzy_step_divisor == 0 {
            bail!("fuzzy_step_divisor must be positive");
        }
        if self.end_search_factor == 0 {
            bail!("end_search_factor must be positive");
        }
        for (name, value) in [
            ("end_refine_min_factor", self.end_refine_min_factor),
            ("end_refine_max_factor", self.end_refine_max_factor),
            ("fuzzy_short_window_factor", self.fuzzy_short_window_factor),
            ("fuzzy_long_window_factor", self.fuzzy_long_window_factor),
            ("refine_min_factor", self.refine_min_factor),
            ("refine_max_factor", self.refine_max_factor),
        ] {
            if value.is_nan() || value <= 0.0 {
                bail!("{name} must be positive, got {value}");
            }
        }
        if self.end_refine_min_factor > self.end_refine_max_factor
            || self.refine_min_factor > self.refine_max_factor
        {
            bail!("refinement length factors must satisfy min <= max");
        }
        if let HintStrategy::Chunked { chunks } = self.hint_strategy {
            if chunks == 0 {
                bail!("chunked hint strategy needs at least one chunk");
            }
        }
        Ok(())
    }
}

/// Per-segment cap on similarity evaluations
#[derive(Debug, Clone)]
pub struct ComparisonBudget {
    remaining: usize,
    exhausted: bool,
}

impl ComparisonBudget {
    pub fn new(limit: usize) -> Self {
        Self {
            remaining: limit,
            exhausted: false,
        }
    }

    /// Take one comparison; false once the budget is used up
    pub fn try_spend(&mut self) -> bool {
        if self.remaining == 0 {
            if !self.exhausted {
                debug!("Comparison budget exhausted");
            }
            self.exhausted = true;
            return false;
        }
        self.remaining -= 1;
        true
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

/// `floor(len × factor)`
pub(crate) fn scaled(len: usize, factor: f64) -> usize {
    (len as f64 * factor) as usize
}

/// Tiered locator: exact anchor, short anchor, then fuzzy scan plus refinement
#[derive(Debug, Clone)]
pub struct Aligner {
    config: AlignmentConfig,
}

impl Aligner {
    /// Create aligner with custom configuration
    pub fn new(config: AlignmentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create aligner with default configuration
    pub fn with_default_config() -> Self {
        Self {
            config: AlignmentConfig::default(),
        }
    }

    pub fn config(&self) -> &AlignmentConfig {
        &self.config
    }

    /// Window around the hint; short segments get a tighter one to avoid spurious hits
    pub fn search_window(
        &self,
        segment_len: usize,
        hint: usize,
        reference_len: usize,
    ) -> SearchWindow {
        let size = if segment_len < self.config.short_segment_len {
            self.config.short_window
        } else {
            self.config.wide_window
        };
        SearchWindow::around(hint, size, reference_len)
    }

    /// Run the matching tiers for an already normalized segment inside `window`
    pub fn find_match(
        &self,
        segment: &NormalizedText,
        reference: &NormalizedText,
        window: SearchWindow,
        hint: usize,
        budget: &mut ComparisonBudget,
    ) -> MatchResult {
        if segment.is_empty() {
            return MatchResult::None;
        }

        let anchored = anchor::find_anchor_match(
            &self.config,
            segment,
            reference.chars(),
            window,
            hint,
            budget,
        );
        if !anchored.is_none() {
            return anchored;
        }

        if !self.config.use_fuzzy {
            return MatchResult::None;
        }

        let reference_chars = reference.chars();
        let region = &reference_chars[window.start..window.end];
        let Some(hit) =
            fuzzy::sliding_window_search(&self.config, segment.chars(), region, budget)
        else {
            return MatchResult::None;
        };

        let Some(span) = refine::refine_fuzzy_hit(
            &self.config,
            segment.chars(),
            reference_chars,
            window,
            window.start + hit.position,
            budget,
        ) else {
            debug!(coarse = window.start + hit.position, "Budget ran out before refinement");
            return MatchResult::None;
        };
        debug!(
            coarse = window.start + hit.position,
            coarse_score = hit.score,
            start = span.start,
            end = span.end,
            score = span.score,
            "Fuzzy match refined"
        );
        MatchResult::Fuzzy(span)
    }

    /// Normalize `segment_text` and locate it around `hint` with the default window rules
    pub fn locate(
        &self,
        segment_text: &str,
        reference: &ReferenceText,
        hint: usize,
    ) -> MatchResult {
        let segment = normalize(segment_text);
        let window = self.search_window(segment.len(), hint, reference.normalized_len());
        let mut budget = ComparisonBudget::new(self.config.comparison_budget);
        self.find_match(&segment, reference.normalized(), window, hint, &mut budget)
    }
}
