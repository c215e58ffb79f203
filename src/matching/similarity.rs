// src/matching/similarity.rs - Fuzzy scoring of normalized keys

use strsim::normalized_levenshtein;

/// Full-string similarity ratio in [0, 100]: normalized Levenshtein
/// similarity scaled to an integer score. Symmetric; 100 only for equal
/// strings (or two empty strings); 0 when every position differs.
pub fn ratio(a: &str, b: &str) -> u32 {
    (normalized_levenshtein(a, b) * 100.0).round() as u32
}

/// Best `ratio` of the shorter string against every equal-length window of
/// the longer one. Tolerates one side carrying extra qualifying words
/// ("abalak fachi" vs "abalak fachi tabalack").
pub fn partial_ratio(a: &str, b: &str) -> u32 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    if a_chars.is_empty() || b_chars.is_empty() {
        return if a_chars.len() == b_chars.len() { 100 } else { 0 };
    }

    let (short, long) = if a_chars.len() <= b_chars.len() {
        (&a_chars, &b_chars)
    } else {
        (&b_chars, &a_chars)
    };
    let short_str: String = short.iter().collect();
    let window = short.len();

    let mut best = 0;
    for start in 0..=(long.len() - window) {
        let slice: String = long[start..start + window].iter().collect();
        best = best.max(ratio(&short_str, &slice));
        if best == 100 {
            break;
        }
    }
    best
}

/// Combined score used by the candidate generator: the maximum of the full
/// and partial ratios.
pub fn similarity(a: &str, b: &str) -> u32 {
    ratio(a, b).max(partial_ratio(a, b))
}
