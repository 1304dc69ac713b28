//! String similarity metrics for the fuzzy matching layer
//!
//! All metrics return a percentage in 0..=100 over lowercase input.

/// Levenshtein edit distance
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut curr = vec![0usize; b_len + 1];

    for i in 1..=a_len {
        curr[0] = i;
        for j in 1..=b_len {
            let cost = if a_chars[i - 1] == b_chars[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_len]
}

/// Normalized similarity: 100 means identical
pub fn ratio(a: &str, b: &str) -> u32 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 100;
    }
    let dist = levenshtein(&a, &b);
    (100.0 * (1.0 - dist as f64 / max_len as f64)).round() as u32
}

/// Best ratio of the shorter string against every same-length window of the longer
///
/// Catches "nice" inside "nice france" style matches the plain ratio misses.
pub fn partial_ratio(a: &str, b: &str) -> u32 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let (short, long) = if a.chars().count() <= b.chars().count() { (&a, &b) } else { (&b, &a) };

    let short_len = short.chars().count();
    let long_chars: Vec<char> = long.chars().collect();

    if short_len == 0 {
        return 100;
    }
    if short_len == long_chars.len() {
        return ratio(short, long);
    }

    let mut best = 0;
    for window in long_chars.windows(short_len) {
        let window: String = window.iter().collect();
        best = best.max(ratio(short, &window));
        if best == 100 {
            break;
        }
    }
    best
}

/// Ratio over alphabetically sorted whitespace tokens
///
/// Makes "riviera french" score like "french riviera".
pub fn token_sort_ratio(a: &str, b: &str) -> u32 {
    ratio(&sort_tokens(a), &sort_tokens(b))
}

fn sort_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("test", "test"), 0);
        assert_eq!(levenshtein("test", "tests"), 1);
        assert_eq!(levenshtein("map", "mpa"), 2);
        assert_eq!(levenshtein("", "abc"), 3);
    }

    #[test]
    fn test_ratio_identity() {
        assert_eq!(ratio("paris", "paris"), 100);
        assert_eq!(ratio("Paris", "paris"), 100);
        assert_eq!(ratio("", ""), 100);
    }

    #[test]
    fn test_ratio_symmetric() {
        assert_eq!(ratio("barcelona", "barclona"), ratio("barclona", "barcelona"));
        assert_eq!(partial_ratio("nice", "nice france"), partial_ratio("nice france", "nice"));
    }

    #[test]
    fn test_ratio_typo() {
        // Single-character typo in a medium-length city name stays high
        assert!(ratio("barcelona", "barcelone") >= 85);
        assert!(ratio("tokyo", "berlin") < 40);
    }

    #[test]
    fn test_partial_ratio_substring() {
        assert_eq!(partial_ratio("nice", "nice france"), 100);
        assert_eq!(partial_ratio("york", "new york"), 100);
    }

    #[test]
    fn test_token_sort_ratio_order_independent() {
        assert_eq!(token_sort_ratio("french riviera", "riviera french"), 100);
        assert_eq!(
            token_sort_ratio("new york city", "city new york"),
            token_sort_ratio("city new york", "new york city")
        );
    }
}
