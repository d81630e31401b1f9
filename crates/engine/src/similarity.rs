//! Sequence similarity scoring for fuzzy SKU matching.
//!
//! The score is the matched-run ratio 2·M / (len(a) + len(b)), where M is
//! the total length of the common runs found by repeatedly taking the
//! longest common contiguous run and recursing into the regions on either
//! side of it (Ratcliff/Obershelp). Symmetric, character-based, and
//! case-sensitive; callers normalize beforehand if they want otherwise.

/// Upper bound on `sequence_ratio` knowable from lengths alone.
///
/// At most min(len_a, len_b) characters can participate in common runs,
/// so candidates whose bound falls below the threshold can be skipped
/// without scoring.
pub fn upper_bound(len_a: usize, len_b: usize) -> f64 {
    if len_a + len_b == 0 {
        return 1.0;
    }
    2.0 * len_a.min(len_b) as f64 / (len_a + len_b) as f64
}

/// Matched-run ratio between two strings, in [0, 1].
///
/// 1.0 means identical, 0.0 means no character of one appears in a
/// common run with the other. Two empty strings score 1.0.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    // Canonical argument order: greedy run extraction could otherwise
    // pick different runs per direction when equal-length runs cross,
    // and the score must be symmetric.
    let (a, b) = if a <= b { (a, b) } else { (b, a) };
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

/// Total characters covered by common runs: take the longest common run,
/// then recurse into the unmatched regions before and after it.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (a_start, b_start, len) = longest_run(a, b);
    if len == 0 {
        return 0;
    }
    len + matching_chars(&a[..a_start], &b[..b_start])
        + matching_chars(&a[a_start + len..], &b[b_start + len..])
}

/// Longest common contiguous run of `a` and `b` as
/// (start in a, start in b, length). On equal lengths the earliest start
/// in `a`, then in `b`, wins.
fn longest_run(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    // prev[j+1] = length of the common run ending at a[i-1], b[j]
    let mut prev = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        let mut cur = vec![0usize; b.len() + 1];
        for (j, &cb) in b.iter().enumerate() {
            if ca == cb {
                let len = prev[j] + 1;
                cur[j + 1] = len;
                if len > best.2 {
                    best = (i + 1 - len, j + 1 - len, len);
                }
            }
        }
        prev = cur;
    }

    best
}
