// WHY: one symmetric ratio-of-matches score drives every tier, so all thresholds and
// tie-breaks are comparable across anchor, fuzzy and refinement stages

/// Length of the longest common subsequence of `a` and `b`
///
/// Two-row dynamic programming, O(|a|·|b|) time and O(min(|a|,|b|)) space.
pub fn lcs_len(a: &[char], b: &[char]) -> usize {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return 0;
    }

    let mut prev = vec![0u32; short.len() + 1];
    let mut curr = vec![0u32; short.len() + 1];

    for &lc in long {
        for (j, &sc) in short.iter().enumerate() {
            curr[j + 1] = if lc == sc {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[short.len()] as usize
}

/// Similarity ratio in `[0, 1]`: `2·M / (|a| + |b|)` with `M` the LCS length
///
/// `ratio(a, a) == 1.0`, `ratio(a, "") == 0.0` for non-empty `a`, and two empty inputs are
/// considered identical.
pub fn ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    if a == b {
        return 1.0;
    }
    (2 * lcs_len(a, b)) as f64 / total as f64
}

/// LCS of `needle` against every prefix of `text` up to `max_len` chars
///
/// `out[n] == lcs_len(needle, &text[..n])`, so scoring all candidate lengths from one start
/// costs a single DP pass instead of one per length.
pub fn prefix_lcs_lengths(needle: &[char], text: &[char], max_len: usize) -> Vec<usize> {
    let max_len = max_len.min(text.len());
    let mut out = Vec::with_capacity(max_len + 1);
    out.push(0);

    let mut prev = vec![0u32; needle.len() + 1];
    let mut curr = vec![0u32; needle.len() + 1];
    for &tc in &text[..max_len] {
        for (j, &nc) in needle.iter().enumerate() {
            curr[j + 1] = if tc == nc {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
        out.push(prev[needle.len()] as usize);
    }
    out
}

/// Ratio from a precomputed LCS length
pub fn ratio_from_lcs(lcs: usize, a_len: usize, b_len: usize) -> f64 {
    let total = a_len + b_len;
    if total == 0 {
        return 1.0;
    }
    (2 * lcs) as f64 / total as f64
}

/// Convenience wrapper over `&str`
pub fn ratio_str(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    ratio(&a, &b)
}
