pub mod alignment;
pub mod output;
pub mod pipeline;
pub mod reader;
pub mod srt;
pub mod stats;

// Re-export main types for convenient access
pub use alignment::{
    normalize, normalize_text, Aligner, AlignmentConfig, HintStrategy, MatchMethod, MatchResult,
    MatchSpan, NormalizedText, PositionMapper, PunctuationRules, ReferenceText,
};

pub use pipeline::{
    correct_segments, CorrectionPipeline, PositionHint, Segment, SegmentOutcome, SegmentReport,
};

pub use srt::{parse_srt, write_srt, LineEnding, SrtDocument};

pub use stats::{comparison_examples, render_summary, RunStats};
