//! Edit-distance based string similarity.
//!
//! The ratio is the normalized Indel similarity: insertions and deletions cost
//! one, substitutions are not allowed (they cost two). It is symmetric and
//! ranges from 0 (nothing in common) to 100 (identical).

/// Similarity ratio between two strings, 0.0 to 100.0.
///
/// `100 * (1 - indel_distance / (len(a) + len(b)))`, over characters.
/// Two empty strings are identical.
///
/// # Examples
///
/// ```
/// use scripture_ref::matching::similarity::ratio;
///
/// assert_eq!(ratio("kejadian", "kejadian"), 100.0);
/// assert_eq!(ratio("abc", "xyz"), 0.0);
/// assert!((ratio("kej", "kel") - 66.666).abs() < 0.01);
/// ```
#[must_use]
pub fn ratio(a: &str, b: &str) -> f64 {
    if a == b {
        return 100.0;
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let total = a_chars.len() + b_chars.len();

    if total == 0 {
        return 100.0;
    }

    let distance = indel_distance(&a_chars, &b_chars);

    #[allow(clippy::cast_precision_loss)] // Alias lengths are tiny
    {
        100.0 * (1.0 - distance as f64 / total as f64)
    }
}

/// Minimum number of insertions and deletions turning `a` into `b`
fn indel_distance(a: &[char], b: &[char]) -> usize {
    a.len() + b.len() - 2 * lcs_len(a, b)
}

/// Length of the longest common subsequence, two-row dynamic programming
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lcs_len() {
        let chars = |s: &str| s.chars().collect::<Vec<_>>();
        assert_eq!(lcs_len(&chars(""), &chars("abc")), 0);
        assert_eq!(lcs_len(&chars("abc"), &chars("abc")), 3);
        assert_eq!(lcs_len(&chars("kejadain"), &chars("kejadian")), 7);
    }

    #[test]
    fn test_ratio_is_symmetric() {
        let pairs = [("kejadiaan", "kejadian"), ("mat", "matius"), ("xyz", "ezra")];
        for (a, b) in pairs {
            assert!((ratio(a, b) - ratio(b, a)).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_ratio_known_values() {
        // one inserted char over 17 total
        assert!((ratio("kejadiaan", "kejadian") - 100.0 * 16.0 / 17.0).abs() < 1e-9);
        // transposition costs two
        assert!((ratio("kejadain", "kejadian") - 87.5).abs() < 1e-9);
        assert!((ratio("", "abc")).abs() < f64::EPSILON);
        assert!((ratio("", "") - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_ratio_counts_chars_not_bytes() {
        assert!((ratio("é", "e")).abs() < f64::EPSILON);
        assert!((ratio("yésaya", "yesaya") - 100.0 * 10.0 / 12.0).abs() < 1e-9);
    }
}
