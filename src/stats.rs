// WHY: the core only emits per-segment reports; aggregation, JSON output and console text are
// a reporting layer on top so the engine never assumes an output sink

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::Path;
use tokio::fs;

use crate::alignment::{AlignmentConfig, MatchMethod};
use crate::pipeline::{Segment, SegmentOutcome, SegmentReport};
use crate::reader::ReadStats;

/// Segments per matching tier
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodCounts {
    pub exact: u64,
    pub short_anchor: u64,
    pub fuzzy: u64,
    pub none: u64,
}

impl MethodCounts {
    fn record(&mut self, method: MatchMethod) {
        match method {
            MatchMethod::Exact => self.exact += 1,
            MatchMethod::ShortAnchor => self.short_anchor += 1,
            MatchMethod::Fuzzy => self.fuzzy += 1,
            MatchMethod::None => self.none += 1,
        }
    }
}

/// Segments per outcome
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub corrected: u64,
    pub no_match: u64,
    pub low_confidence: u64,
    pub empty_extraction: u64,
    pub mapping_out_of_range: u64,
}

impl OutcomeCounts {
    fn record(&mut self, outcome: SegmentOutcome) {
        match outcome {
            SegmentOutcome::Corrected => self.corrected += 1,
            SegmentOutcome::NoMatch => self.no_match += 1,
            SegmentOutcome::LowConfidence => self.low_confidence += 1,
            SegmentOutcome::EmptyExtraction => self.empty_extraction += 1,
            SegmentOutcome::MappingOutOfRange => self.mapping_out_of_range += 1,
        }
    }
}

/// Whole-run statistics written to `--stats-out`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunStats {
    /// Unix timestamp (seconds) when the run started
    pub run_start: u64,
    pub total_processing_time_ms: u64,
    pub segments_total: u64,
    /// Segments whose text differs from the original
    pub segments_changed: u64,
    pub segments_unchanged: u64,
    /// Changed segments as a percentage of all segments
    pub correction_rate: f64,
    /// Mean score over accepted corrections
    pub mean_accepted_score: f64,
    pub segments_budget_exhausted: u64,
    pub methods: MethodCounts,
    pub outcomes: OutcomeCounts,
    pub srt_file: Option<ReadStats>,
    pub reference_file: Option<ReadStats>,
    pub config: AlignmentConfig,
}

impl RunStats {
    /// Aggregate per-segment reports
    pub fn from_reports(reports: &[SegmentReport], config: &AlignmentConfig) -> Self {
        let mut methods = MethodCounts::default();
        let mut outcomes = OutcomeCounts::default();
        let mut changed = 0u64;
        let mut exhausted = 0u64;
        let mut accepted_score_sum = 0.0;

        for report in reports {
            methods.record(report.method);
            outcomes.record(report.outcome);
            if report.changed {
                changed += 1;
            }
            if report.budget_exhausted {
                exhausted += 1;
            }
            if report.outcome == SegmentOutcome::Corrected {
                accepted_score_sum += report.score;
            }
        }

        let total = reports.len() as u64;
        Self {
            run_start: 0,
            total_processing_time_ms: 0,
            segments_total: total,
            segments_changed: changed,
            segments_unchanged: total - changed,
            correction_rate: if total > 0 {
                100.0 * changed as f64 / total as f64
            } else {
                0.0
            },
            mean_accepted_score: if outcomes.corrected > 0 {
                accepted_score_sum / outcomes.corrected as f64
            } else {
                0.0
            },
            segments_budget_exhausted: exhausted,
            methods,
            outcomes,
            srt_file: None,
            reference_file: None,
            config: config.clone(),
        }
    }

    /// Write as pretty JSON, creating parent directories as needed
    pub async fn write_json(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write stats file {}", path.display()))?;
        Ok(())
    }
}

/// Original and corrected text of one changed segment
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ComparisonExample {
    pub sequence_index: u64,
    pub original: String,
    pub corrected: String,
}

/// First `limit` segments whose text changed, in input order
pub fn comparison_examples(segments: &[Segment], limit: usize) -> Vec<ComparisonExample> {
    segments
        .iter()
        .filter(|segment| segment.is_changed())
        .take(limit)
        .map(|segment| ComparisonExample {
            sequence_index: segment.sequence_index,
            original: segment.original_text().to_string(),
            corrected: segment.text.clone(),
        })
        .collect()
}

/// Console summary of a run
pub fn render_summary(stats: &RunStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Statistics:");
    let _ = writeln!(out, "  Total segments: {}", stats.segments_total);
    let _ = writeln!(out, "  Corrected: {}", stats.segments_changed);
    let _ = writeln!(out, "  Unchanged: {}", stats.segments_unchanged);
    let _ = writeln!(out, "  Correction rate: {:.1}%", stats.correction_rate);
    let _ = writeln!(
        out,
        "  Matched by: exact {}, short anchor {}, fuzzy {}, none {}",
        stats.methods.exact, stats.methods.short_anchor, stats.methods.fuzzy, stats.methods.none
    );
    let outcomes = &stats.outcomes;
    let rejected =
        outcomes.low_confidence + outcomes.empty_extraction + outcomes.mapping_out_of_range;
    if rejected > 0 {
        let _ = writeln!(
            out,
            "  Rejected: {} low confidence, {} empty extraction, {} out of range",
            outcomes.low_confidence, outcomes.empty_extraction, outcomes.mapping_out_of_range
        );
    }
    if stats.segments_budget_exhausted > 0 {
        let _ = writeln!(out, "  Comparison budget exhausted: {}", stats.segments_budget_exhausted);
    }
    let _ = writeln!(out, "  Processing time: {}ms", stats.total_processing_time_ms);
    out
}

/// Console listing of comparison examples
pub fn render_examples(examples: &[ComparisonExample]) -> String {
    let rule = "-".repeat(80);
    let mut out = String::new();
    let _ = writeln!(out, "Correction examples (first {} changed segments):", examples.len());
    let _ = writeln!(out, "{}", "=".repeat(80));
    for example in examples {
        let _ = writeln!(out, "[#{}]", example.sequence_index);
        let _ = writeln!(out, "Original:  {}", example.original);
        let _ = writeln!(out, "Corrected: {}", example.corrected);
        let _ = writeln!(out, "{rule}");
    }
    out
}
