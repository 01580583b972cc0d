// WHY: matching happens in normalized space, but the corrected subtitle must be the verbatim
// reference text including the punctuation and quotes around the matched words

use std::str::FromStr;

use anyhow::bail;
use serde::{Deserialize, Serialize};

use super::reference::ReferenceText;

/// Sentence terminators; absorbing one ends expansion
const SENTENCE_TERMINATORS: &[char] = &['.', '!', '?', ':', ';'];
/// Closing quotes; absorbing one ends expansion
const CLOSING_QUOTES: &[char] = &['"', '\u{201D}', '\u{2019}'];
/// Absorbed without ending expansion
const CONTINUING_PUNCTUATION: &[char] =
    &[',', '\u{2014}', '\u{2013}', '-', '\u{201C}', '\u{2018}', '\''];
/// Every quote style, absorbed backwards from the start
const QUOTE_CHARS: &[char] = &['"', '\'', '\u{201C}', '\u{201D}', '\u{2018}', '\u{2019}'];
/// Greedy trailing set of the simple rule set
const SIMPLE_TRAILING: &[char] = &[
    '.', ',', ';', ':', '!', '?', '\'', '"', '\u{2014}', '\u{2013}', '-', '\u{201C}', '\u{201D}',
    '\u{2018}', '\u{2019}',
];

/// Boundary expansion rule set
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PunctuationRules {
    /// Retract trailing whitespace, then absorb punctuation with terminator/quote short-circuit
    #[default]
    Complete,
    /// Absorb any run of trailing punctuation and quotes greedily
    Simple,
}

impl FromStr for PunctuationRules {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "complete" => Ok(PunctuationRules::Complete),
            "simple" => Ok(PunctuationRules::Simple),
            other => bail!("unknown punctuation rule set: {other} (expected complete or simple)"),
        }
    }
}

/// Half-open char range in the original reference text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OriginalSpan {
    pub start: usize,
    pub end: usize,
}

/// Maps normalized spans back onto the original reference
#[derive(Debug, Clone, Copy)]
pub struct PositionMapper<'a> {
    reference: &'a ReferenceText,
    rules: PunctuationRules,
}

impl<'a> PositionMapper<'a> {
    pub fn new(reference: &'a ReferenceText, rules: PunctuationRules) -> Self {
        Self { reference, rules }
    }

    /// Original span for normalized `[norm_start, norm_end)`, expanded over partial words,
    /// trailing punctuation and leading quotes
    ///
    /// `None` when either offset falls outside the index map or the range is empty.
    pub fn to_original_span(&self, norm_start: usize, norm_end: usize) -> Option<OriginalSpan> {
        let map = self.reference.normalized().index_map();
        if norm_start >= map.len() || norm_end > map.len() || norm_end <= norm_start {
            return None;
        }

        let text = self.reference.chars();
        let last = text.len() - 1;
        let mut start = map[norm_start];
        let mut end = map[norm_end - 1];

        while start > 0 && text[start - 1].is_alphanumeric() {
            start -= 1;
        }

        match self.rules {
            PunctuationRules::Complete => {
                while end > start && text[end].is_whitespace() {
                    end -= 1;
                }
                if text[end].is_alphanumeric() {
                    while end < last && text[end + 1].is_alphanumeric() {
                        end += 1;
                    }
                }
                end = absorb_trailing_punctuation(text, end);
            }
            PunctuationRules::Simple => {
                while end < last && text[end + 1].is_alphanumeric() {
                    end += 1;
                }
                while end < last && SIMPLE_TRAILING.contains(&text[end + 1]) {
                    end += 1;
                }
            }
        }

        while start > 0 && QUOTE_CHARS.contains(&text[start - 1]) {
            start -= 1;
        }

        Some(OriginalSpan { start, end: end + 1 })
    }

    /// Corrected text for a normalized span: mapped, trimmed, with blank-line runs collapsed
    pub fn extract(&self, norm_start: usize, norm_end: usize) -> Option<String> {
        let span = self.to_original_span(norm_start, norm_end)?;
        let raw = self.reference.slice_chars(span.start, span.end)?;
        Some(extract_corrected_text(raw))
    }
}

/// Extend `end` over trailing punctuation
///
/// A terminator is absorbed together with one closing quote right after it; a closing quote
/// together with one terminator right after it. Either ends expansion. Other punctuation is
/// absorbed and expansion continues.
fn absorb_trailing_punctuation(text: &[char], mut end: usize) -> usize {
    let last = text.len() - 1;
    while end < last {
        let next = text[end + 1];
        if SENTENCE_TERMINATORS.contains(&next) {
            end += 1;
            if end < last && CLOSING_QUOTES.contains(&text[end + 1]) {
                end += 1;
            }
            break;
        } else if CLOSING_QUOTES.contains(&next) {
            end += 1;
            if end < last && SENTENCE_TERMINATORS.contains(&text[end + 1]) {
                end += 1;
            }
            break;
        } else if CONTINUING_PUNCTUATION.contains(&next) {
            end += 1;
        } else {
            break;
        }
    }
    end
}

/// Trim, strip trailing whitespace from every line and collapse runs of line breaks
///
/// Lines holding only whitespace count as part of the run, so a paragraph break never leaves a
/// blank line inside the subtitle. The run becomes one break in the text's own convention.
pub fn extract_corrected_text(raw: &str) -> String {
    let line_break = if raw.contains("\r\n") { "\r\n" } else { "\n" };
    raw.trim()
        .split('\n')
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(line_break)
}
