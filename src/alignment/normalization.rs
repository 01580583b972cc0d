// WHY: matching runs on a lowercase alphanumeric projection of the text, but corrected output
// must come from the untouched source, so the projection carries a map back to source offsets

use std::fmt;

/// Lowercase, alphanumeric-and-single-space projection of a source string
///
/// `index_map[i]` is the char offset in the source that produced `chars[i]`.
/// Invariants: `index_map.len() == chars.len()` and `index_map` is strictly increasing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedText {
    chars: Vec<char>,
    index_map: Vec<usize>,
}

impl NormalizedText {
    /// Normalized characters
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Normalized position -> source char offset
    pub fn index_map(&self) -> &[usize] {
        &self.index_map
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Whitespace-delimited words of the normalized text
    pub fn words(&self) -> Vec<&[char]> {
        if self.chars.is_empty() {
            return Vec::new();
        }
        self.chars.split(|c| *c == ' ').collect()
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in &self.chars {
            write!(f, "{ch}")?;
        }
        Ok(())
    }
}

/// Lowercase a single alphanumeric char, keeping a one-to-one char mapping
fn fold_case(ch: char) -> char {
    ch.to_lowercase().next().unwrap_or(ch)
}

/// Normalize text and build the normalized -> source index map in one pass
///
/// Non-alphanumeric, non-whitespace chars are dropped. A whitespace run (including runs that
/// only become adjacent after punctuation is dropped) becomes one space, mapped to the first
/// whitespace char seen after the previous kept char. Leading and trailing space is trimmed.
pub fn normalize(text: &str) -> NormalizedText {
    let mut chars = Vec::with_capacity(text.len());
    let mut index_map = Vec::with_capacity(text.len());
    let mut pending_space: Option<usize> = None;

    for (offset, ch) in text.chars().enumerate() {
        if ch.is_alphanumeric() {
            if let Some(space_offset) = pending_space.take() {
                chars.push(' ');
                index_map.push(space_offset);
            }
            chars.push(fold_case(ch));
            index_map.push(offset);
        } else if ch.is_whitespace() && !chars.is_empty() && pending_space.is_none() {
            pending_space = Some(offset);
        }
    }

    NormalizedText { chars, index_map }
}

/// Normalized projection as a plain string
pub fn normalize_text(text: &str) -> String {
    normalize(text).to_string()
}
