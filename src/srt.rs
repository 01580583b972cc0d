// WHY: the alignment core only sees segments; this module owns the SRT container so timing lines
// survive verbatim and the output keeps the input's line-break convention

use anyhow::Result;
use regex_automata::meta::Regex;
use tracing::{debug, warn};

use crate::pipeline::Segment;

const TIMING_PATTERN: &str = r"^\d{2}:\d{2}:\d{2},\d{3}\s*-->\s*\d{2}:\d{2}:\d{2},\d{3}";

/// Line-break convention of an SRT file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// `CrLf` if the content contains any `\r\n`
    pub fn detect(content: &str) -> Self {
        if content.contains("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// Parsed SRT file
#[derive(Debug, Clone, PartialEq)]
pub struct SrtDocument {
    pub segments: Vec<Segment>,
    pub line_ending: LineEnding,
    /// Non-blank lines that did not belong to any valid block
    pub skipped_lines: usize,
}

/// Block parser holding the compiled timing pattern
pub struct SrtParser {
    timing: Regex,
}

impl SrtParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            timing: Regex::new(TIMING_PATTERN)?,
        })
    }

    pub fn is_timing_line(&self, line: &str) -> bool {
        self.timing.is_match(line.trim())
    }

    fn is_index_line(line: &str) -> bool {
        let line = line.trim();
        !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit())
    }

    /// A block starts at `i` when an index line is followed by a timing line
    fn block_starts_at(&self, lines: &[&str], i: usize) -> bool {
        i + 1 < lines.len() && Self::is_index_line(lines[i]) && self.is_timing_line(lines[i + 1])
    }

    /// Parse SRT content into segments
    ///
    /// A blank line ends a segment's text only when the next non-blank line starts a new block
    /// (or the input ends), so text with embedded blank lines survives. Lines that do not begin a
    /// valid block are skipped with a warning.
    pub fn parse(&self, content: &str) -> SrtDocument {
        let content = content.strip_prefix('\u{FEFF}').unwrap_or(content);
        let line_ending = LineEnding::detect(content);
        let lines: Vec<&str> = content.lines().collect();

        let mut segments = Vec::new();
        let mut skipped_lines = 0;
        let mut i = 0;
        while i < lines.len() {
            if lines[i].trim().is_empty() {
                i += 1;
                continue;
            }
            if !self.block_starts_at(&lines, i) {
                warn!(line = i + 1, content = lines[i], "Skipping line outside a subtitle block");
                skipped_lines += 1;
                i += 1;
                continue;
            }

            let index_line = lines[i].trim();
            let Ok(sequence_index) = index_line.parse::<u64>() else {
                warn!(line = i + 1, index = index_line, "Subtitle index out of range");
                skipped_lines += 2;
                i += 2;
                continue;
            };
            let timing = lines[i + 1].to_string();
            i += 2;

            let text_start = i;
            while i < lines.len() {
                if lines[i].trim().is_empty() {
                    let mut next = i;
                    while next < lines.len() && lines[next].trim().is_empty() {
                        next += 1;
                    }
                    if next == lines.len() || self.block_starts_at(&lines, next) {
                        break;
                    }
                }
                i += 1;
            }

            let text = lines[text_start..i].join("\n").trim().to_string();
            segments.push(Segment::new(sequence_index, timing, text));
        }

        debug!(segments = segments.len(), skipped_lines, ?line_ending, "Parsed SRT content");
        SrtDocument {
            segments,
            line_ending,
            skipped_lines,
        }
    }
}

/// Parse SRT content with a fresh parser
pub fn parse_srt(content: &str) -> Result<SrtDocument> {
    Ok(SrtParser::new()?.parse(content))
}

/// Serialize segments as `index`, timing, text and a blank line each
///
/// Line breaks inside the text are rewritten to `line_ending`.
pub fn write_srt(segments: &[Segment], line_ending: LineEnding) -> String {
    let eol = line_ending.as_str();
    let mut out = String::new();
    for segment in segments {
        out.push_str(&segment.sequence_index.to_string());
        out.push_str(eol);
        out.push_str(&segment.timing);
        out.push_str(eol);
        for (n, line) in segment.text.lines().enumerate() {
            if n > 0 {
                out.push_str(eol);
            }
            out.push_str(line);
        }
        out.push_str(eol);
        out.push_str(eol);
    }
    out
}
