// WHY: the reference is fixed for a whole run, so its char view and normalized index map are
// built once here and shared by every segment instead of being recomputed per lookup

use super::normalization::{normalize, NormalizedText};

/// Reference document with its precomputed normalized projection
#[derive(Debug, Clone)]
pub struct ReferenceText {
    source: String,
    chars: Vec<char>,
    /// Byte offset of every char, plus a trailing entry for `source.len()`
    byte_offsets: Vec<usize>,
    normalized: NormalizedText,
}

impl ReferenceText {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let mut chars = Vec::with_capacity(source.len());
        let mut byte_offsets = Vec::with_capacity(source.len() + 1);
        for (offset, ch) in source.char_indices() {
            chars.push(ch);
            byte_offsets.push(offset);
        }
        byte_offsets.push(source.len());
        let normalized = normalize(&source);

        Self {
            source,
            chars,
            byte_offsets,
            normalized,
        }
    }

    /// Original text, verbatim
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Original text as chars; offsets in `NormalizedText::index_map` index into this
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn normalized(&self) -> &NormalizedText {
        &self.normalized
    }

    /// Number of chars in the normalized projection
    pub fn normalized_len(&self) -> usize {
        self.normalized.len()
    }

    /// Slice of the original text by half-open char range
    pub fn slice_chars(&self, start: usize, end: usize) -> Option<&str> {
        if start > end || end > self.chars.len() {
            return None;
        }
        Some(&self.source[self.byte_offsets[start]..self.byte_offsets[end]])
    }
}
