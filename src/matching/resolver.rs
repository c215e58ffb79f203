// src/matching/resolver.rs - Global greedy assignment of candidate pairs

use std::collections::{HashMap, HashSet};

use crate::models::core::{CandidatePair, ResolvedPair};

/// Partial injective mapping from target key index to its winning reference
/// row. Unassigned targets are simply absent.
pub type Assignment = HashMap<usize, ResolvedPair>;

/// Resolve all candidate pairs into a 1:1 assignment: stable-sort by score
/// descending, walk once, accept a pair iff neither side is taken yet.
///
/// This is a greedy approximation of maximum-weight bipartite matching, not
/// an optimal one: once a reference unit is claimed by a higher-scoring
/// target there is no backtracking, and the losing target stays unmatched.
/// Ties keep their encounter order (target order, then per-target score
/// order), which makes the whole pass deterministic.
pub fn resolve(mut candidates: Vec<CandidatePair>) -> Assignment {
    candidates.sort_by(|a, b| b.score.cmp(&a.score));

    let mut assigned_targets: HashSet<usize> = HashSet::new();
    let mut assigned_references: HashSet<usize> = HashSet::new();
    let mut assignment: Assignment = HashMap::new();

    for candidate in candidates {
        if assigned_targets.contains(&candidate.target_idx)
            || assigned_references.contains(&candidate.reference_idx)
        {
            continue;
        }
        assigned_targets.insert(candidate.target_idx);
        assigned_references.insert(candidate.reference_idx);
        assignment.insert(
            candidate.target_idx,
            ResolvedPair {
                reference_idx: candidate.reference_idx,
                score: candidate.score,
            },
        );
    }

    assignment
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(target_idx: usize, reference_idx: usize, score: u32) -> CandidatePair {
        CandidatePair {
            target_idx,
            reference_idx,
            score,
        }
    }

    #[test]
    fn test_highest_score_wins_shared_reference() {
        // Two targets compete for reference 0 at 95 vs 80: the 95 takes it
        // and the 80 is left unmatched rather than falling back elsewhere.
        let assignment = resolve(vec![pair(0, 0, 80), pair(1, 0, 95)]);
        assert_eq!(assignment.len(), 1);
        let resolved = assignment.get(&1).unwrap();
        assert_eq!(resolved.reference_idx, 0);
        assert_eq!(resolved.score, 95);
        assert!(!assignment.contains_key(&0));
    }

    #[test]
    fn test_assignment_is_injective() {
        let assignment = resolve(vec![
            pair(0, 0, 90),
            pair(0, 1, 85),
            pair(1, 0, 88),
            pair(1, 1, 70),
            pair(2, 1, 60),
        ]);
        let mut used_references: Vec<usize> =
            assignment.values().map(|r| r.reference_idx).collect();
        used_references.sort_unstable();
        used_references.dedup();
        assert_eq!(used_references.len(), assignment.len());
    }

    #[test]
    fn test_each_target_assigned_at_most_once() {
        let assignment = resolve(vec![pair(0, 0, 90), pair(0, 1, 90), pair(0, 2, 90)]);
        assert_eq!(assignment.len(), 1);
        // First encountered pair wins the tie.
        assert_eq!(assignment.get(&0).unwrap().reference_idx, 0);
    }

    #[test]
    fn test_ties_are_deterministic_by_encounter_order() {
        let candidates = vec![pair(0, 5, 75), pair(1, 5, 75), pair(1, 6, 75)];
        let assignment = resolve(candidates.clone());
        assert_eq!(assignment.get(&0).unwrap().reference_idx, 5);
        assert_eq!(assignment.get(&1).unwrap().reference_idx, 6);
        // Re-running on the same input produces the identical assignment.
        assert_eq!(resolve(candidates), assignment);
    }

    #[test]
    fn test_empty_candidates() {
        assert!(resolve(Vec::new()).is_empty());
    }
}
