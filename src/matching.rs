//! Name-similarity matching shared by anime detection and candidate ranking.

/// Normalized edit-distance similarity in `[0, 1]`.
///
/// `1 - levenshtein(a, b) / max(len(a), len(b))`. Comparison is
/// case-sensitive; callers are expected to lowercase both sides first.
/// Two empty strings are an exact match.
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let max_len = a.len().max(b.len());

    let distance = levenshtein(&a, &b);

    #[allow(clippy::cast_precision_loss)]
    {
        1.0 - distance as f64 / max_len as f64
    }
}

/// Similarity with the length-difference short-circuit used for candidate
/// scans: strings whose lengths differ by more than 5 cannot plausibly name
/// the same character and score 0 without running the full comparison.
#[must_use]
pub fn bounded_similarity(a: &str, b: &str) -> f64 {
    if a.chars().count().abs_diff(b.chars().count()) > 5 {
        return 0.0;
    }
    similarity(a, b)
}

/// Picks the candidate whose key is most similar to `query`, both sides
/// lowercased. Returns the candidate and its score; `None` for an empty slice.
pub fn best_match<'a, T>(
    query: &str,
    candidates: &'a [T],
    key: impl Fn(&T) -> &str,
) -> Option<(&'a T, f64)> {
    let query = query.to_lowercase();
    let mut best: Option<(&T, f64)> = None;

    for candidate in candidates {
        let score = bounded_similarity(&query, &key(candidate).to_lowercase());
        if best.is_none_or(|(_, s)| score > s) {
            best = Some((candidate, score));
        }
    }

    best
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    // Single-row DP; `prev` holds the previous row's values.
    let mut prev: Vec<usize> = (0..=a.len()).collect();

    for (j, bc) in b.iter().enumerate() {
        let mut diagonal = prev[0];
        prev[0] = j + 1;

        for (i, ac) in a.iter().enumerate() {
            let substitution = diagonal + usize::from(ac != bc);
            diagonal = prev[i + 1];
            prev[i + 1] = substitution.min(prev[i] + 1).min(prev[i + 1] + 1);
        }
    }

    prev[a.len()]
}
