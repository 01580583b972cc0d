// WHY: per-segment correction driver; the position hint is explicit pipeline state so segment i
// bounds the search for segment i+1 without any global mutable state

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::alignment::{
    normalize, Aligner, AlignmentConfig, ComparisonBudget, HintStrategy, MatchMethod,
    PositionMapper, ReferenceText, SearchWindow,
};

/// One timed subtitle record
///
/// Only `text` is ever rewritten; `original_text` is the snapshot taken at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub sequence_index: u64,
    /// Timing line, kept verbatim
    pub timing: String,
    pub text: String,
    original_text: String,
}

impl Segment {
    pub fn new(sequence_index: u64, timing: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            sequence_index,
            timing: timing.into(),
            original_text: text.clone(),
            text,
        }
    }

    pub fn original_text(&self) -> &str {
        &self.original_text
    }

    pub fn is_changed(&self) -> bool {
        self.text != self.original_text
    }
}

/// Normalized-reference offset right after the last accepted match
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct PositionHint(pub usize);

impl PositionHint {
    pub fn get(self) -> usize {
        self.0
    }
}

/// What happened to one segment; none of these abort a run
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SegmentOutcome {
    /// Text replaced with the reference span
    Corrected,
    /// No tier located a candidate region
    NoMatch,
    /// Candidate found but scored below the confidence threshold
    LowConfidence,
    /// Candidate accepted but the mapped text was empty
    EmptyExtraction,
    /// Normalized offsets fell outside the reference index map
    MappingOutOfRange,
}

/// Per-segment result for reporting layers
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SegmentReport {
    pub sequence_index: u64,
    pub method: MatchMethod,
    pub score: f64,
    pub outcome: SegmentOutcome,
    /// Text differs from the original after this segment was processed
    pub changed: bool,
    pub hint_before: usize,
    pub hint_after: usize,
    pub budget_exhausted: bool,
}

/// Sequential corrector over one reference
pub struct CorrectionPipeline<'r> {
    reference: &'r ReferenceText,
    aligner: Aligner,
    hint: PositionHint,
    /// False while the hint is only an estimate; widens the search window
    anchored: bool,
}

impl<'r> CorrectionPipeline<'r> {
    /// Create pipeline starting at the beginning of the reference
    pub fn new(reference: &'r ReferenceText, config: AlignmentConfig) -> Result<Self> {
        Ok(Self {
            reference,
            aligner: Aligner::new(config)?,
            hint: PositionHint::default(),
            anchored: true,
        })
    }

    /// Start from an estimated hint; searches use the unanchored window until the first match
    pub fn with_estimated_hint(mut self, hint: PositionHint) -> Self {
        self.hint = hint;
        self.anchored = false;
        self
    }

    pub fn hint(&self) -> PositionHint {
        self.hint
    }

    pub fn config(&self) -> &AlignmentConfig {
        self.aligner.config()
    }

    fn window_for(&self, segment_len: usize) -> SearchWindow {
        let reference_len = self.reference.normalized_len();
        if self.anchored {
            self.aligner.search_window(segment_len, self.hint.get(), reference_len)
        } else {
            SearchWindow::around(self.hint.get(), self.config().unanchored_window, reference_len)
        }
    }

    /// Locate, accept or reject, and extract the corrected text for one segment
    pub fn correct_segment(&mut self, segment: &mut Segment) -> SegmentReport {
        let hint_before = self.hint;
        let normalized = normalize(&segment.text);
        let window = self.window_for(normalized.len());
        let mut budget = ComparisonBudget::new(self.config().comparison_budget);

        let result = self.aligner.find_match(
            &normalized,
            self.reference.normalized(),
            window,
            self.hint.get(),
            &mut budget,
        );

        let threshold = self.config().confidence_threshold;
        let outcome = match result.span() {
            None => SegmentOutcome::NoMatch,
            Some(span) if span.score < threshold => SegmentOutcome::LowConfidence,
            Some(span) => {
                let mapper = PositionMapper::new(self.reference, self.config().punctuation);
                match mapper.extract(span.start, span.end) {
                    None => SegmentOutcome::MappingOutOfRange,
                    Some(text) if text.is_empty() => SegmentOutcome::EmptyExtraction,
                    Some(text) => {
                        segment.text = text;
                        self.hint = PositionHint(span.end);
                        self.anchored = true;
                        SegmentOutcome::Corrected
                    }
                }
            }
        };

        debug!(
            index = segment.sequence_index,
            method = %result.method(),
            score = result.score(),
            ?outcome,
            window_start = window.start,
            window_end = window.end,
            "Segment processed"
        );

        SegmentReport {
            sequence_index: segment.sequence_index,
            method: result.method(),
            score: result.score(),
            outcome,
            changed: segment.is_changed(),
            hint_before: hint_before.get(),
            hint_after: self.hint.get(),
            budget_exhausted: budget.is_exhausted(),
        }
    }

    /// Correct segments in order, threading the hint, calling `observer` after each one
    pub fn correct_all<F>(
        &mut self,
        segments: &mut [Segment],
        mut observer: F,
    ) -> Vec<SegmentReport>
    where
        F: FnMut(&SegmentReport),
    {
        let mut reports = Vec::with_capacity(segments.len());
        for segment in segments.iter_mut() {
            let report = self.correct_segment(segment);
            observer(&report);
            reports.push(report);
        }
        reports
    }
}

/// Proportional hint estimate for the segment at `position` of `total`
pub fn proportional_hint(reference_len: usize, position: usize, total: usize) -> PositionHint {
    if total == 0 {
        return PositionHint(0);
    }
    PositionHint(((reference_len as u128 * position as u128) / total as u128) as usize)
}

/// Correct every segment according to `config.hint_strategy`
///
/// `Sequential` threads one hint through all segments. `Chunked` splits the input into
/// contiguous chunks run on scoped threads; the first chunk starts at offset 0 like the
/// sequential path, the others start from a proportional estimate with a widened window.
/// Reports come back in input order.
pub fn correct_segments(
    reference: &ReferenceText,
    segments: &mut [Segment],
    config: &AlignmentConfig,
    observer: &(dyn Fn(&SegmentReport) + Sync),
) -> Result<Vec<SegmentReport>> {
    config.validate()?;
    let chunks = match config.hint_strategy {
        HintStrategy::Sequential => 1,
        HintStrategy::Chunked { chunks } => chunks.min(segments.len()).max(1),
    };

    if chunks == 1 {
        let mut pipeline = CorrectionPipeline::new(reference, config.clone())?;
        return Ok(pipeline.correct_all(segments, observer));
    }

    let total = segments.len();
    let chunk_len = total.div_ceil(chunks);
    info!(chunks, chunk_len, "Correcting segments in parallel chunks");

    let results: Vec<Result<Vec<SegmentReport>>> = std::thread::scope(|scope| {
        let handles: Vec<_> = segments
            .chunks_mut(chunk_len)
            .enumerate()
            .map(|(chunk_index, chunk)| {
                let config = config.clone();
                scope.spawn(move || -> Result<Vec<SegmentReport>> {
                    let first = chunk_index * chunk_len;
                    let mut pipeline = CorrectionPipeline::new(reference, config)?;
                    if first > 0 {
                        let estimate = proportional_hint(reference.normalized_len(), first, total);
                        pipeline = pipeline.with_estimated_hint(estimate);
                    }
                    Ok(pipeline.correct_all(chunk, observer))
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|_| Err(anyhow::anyhow!("correction worker panicked")))
            })
            .collect()
    });

    let mut reports = Vec::with_capacity(total);
    for chunk_reports in results {
        reports.extend(chunk_reports?);
    }
    Ok(reports)
}
