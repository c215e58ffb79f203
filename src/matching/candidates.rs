// src/matching/candidates.rs - Per-target candidate generation

use log::debug;

use crate::matching::similarity::similarity;
use crate::models::core::CandidatePair;

/// Score every non-empty target key against every non-empty reference key
/// and keep, per target, the top `limit` candidates scoring at least
/// `min_score`. O(T x R) comparisons; both sets stay small enough that no
/// blocking index is needed.
///
/// Empty target keys produce no candidates; those rows can only be rescued
/// by an override rule.
pub fn generate_candidates(
    target_keys: &[String],
    reference_keys: &[String],
    limit: usize,
    min_score: u32,
) -> Vec<CandidatePair> {
    let mut candidates = Vec::new();

    for (target_idx, target_key) in target_keys.iter().enumerate() {
        if target_key.is_empty() {
            continue;
        }

        let mut scored: Vec<CandidatePair> = reference_keys
            .iter()
            .enumerate()
            .filter(|(_, reference_key)| !reference_key.is_empty())
            .map(|(reference_idx, reference_key)| CandidatePair {
                target_idx,
                reference_idx,
                score: similarity(target_key, reference_key),
            })
            .filter(|candidate| candidate.score >= min_score)
            .collect();

        // Stable sort: equal scores keep reference order for reproducibility.
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(limit);
        candidates.extend(scored);
    }

    debug!(
        "Generated {} candidate pairs for {} target keys against {} reference keys",
        candidates.len(),
        target_keys.len(),
        reference_keys.len()
    );
    candidates
}
