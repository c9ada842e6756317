//! Uniform-cost Levenshtein distance
//!
//! Insertions, deletions and substitutions all cost 1. Comparison is exact,
//! so callers that want case-insensitive matching lowercase both sides first.

/// Minimum number of single-character edits turning `s1` into `s2`.
///
/// Classic full dynamic-programming table, `O(len1 * len2)` in time and space.
/// Inputs are map names capped at a few dozen characters so no banding or
/// early exit is attempted.
pub fn distance(s1: &str, s2: &str) -> usize {
    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();
    let len1 = s1_chars.len();
    let len2 = s2_chars.len();

    let mut matrix = vec![vec![0usize; len2 + 1]; len1 + 1];

    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, cell) in matrix[0].iter_mut().enumerate() {
        *cell = j;
    }

    for i in 1..=len1 {
        for j in 1..=len2 {
            matrix[i][j] = if s1_chars[i - 1] == s2_chars[j - 1] {
                matrix[i - 1][j - 1]
            } else {
                1 + matrix[i - 1][j]
                    .min(matrix[i][j - 1])
                    .min(matrix[i - 1][j - 1])
            };
        }
    }

    matrix[len1][len2]
}
