// src/matching/manager.rs - End-to-end reconciliation pass

use anyhow::Result;
use log::{debug, info};
use std::collections::{HashMap, HashSet};

use crate::config::MatcherConfig;
use crate::matching::assemble::assemble;
use crate::matching::candidates::generate_candidates;
use crate::matching::normalize::matching_key;
use crate::matching::overrides::{apply_overrides, OverrideTable};
use crate::matching::resolver::resolve;
use crate::models::core::{KeyResolution, MatchedTarget, ReferenceUnit, TargetRecord};
use crate::models::stats_models::MatchReport;

/// Run one full reconciliation pass:
/// normalize -> generate candidates -> resolve -> override -> assemble.
///
/// Matching is performed once per distinct normalized target key and the
/// outcome is fanned back out over every row sharing that key. The whole
/// pass is pure batch computation over the inputs; callers own all I/O.
pub fn run_reconciliation(
    targets: &[TargetRecord],
    references: &[ReferenceUnit],
    config: &MatcherConfig,
    overrides: &OverrideTable,
) -> Result<(Vec<MatchedTarget>, MatchReport)> {
    config.validate()?;
    info!(
        "Reconciling {} target rows against {} reference units ({} override rules)",
        targets.len(),
        references.len(),
        overrides.len()
    );

    // Distinct target keys in first-seen row order.
    let mut distinct_keys: Vec<String> = Vec::new();
    let mut target_key_set: HashSet<String> = HashSet::new();
    for target in targets {
        let key = matching_key(target.district_name.as_deref(), target.facility_name.as_deref());
        if target_key_set.insert(key.clone()) {
            distinct_keys.push(key);
        }
    }
    debug!(
        "{} distinct target keys from {} rows",
        distinct_keys.len(),
        targets.len()
    );

    let reference_keys: Vec<String> = references
        .iter()
        .map(|unit| matching_key(Some(&unit.district_name), unit.facility_name.as_deref()))
        .collect();

    // First row wins when several reference rows share a normalized key;
    // redirect overrides look up through this index.
    let mut reference_key_index: HashMap<String, usize> = HashMap::new();
    for (idx, key) in reference_keys.iter().enumerate() {
        if !key.is_empty() {
            reference_key_index.entry(key.clone()).or_insert(idx);
        }
    }

    let candidates = generate_candidates(
        &distinct_keys,
        &reference_keys,
        config.candidate_limit,
        config.min_score,
    );

    let assignment = resolve(candidates);
    info!(
        "Resolver assigned {} of {} distinct keys",
        assignment.len(),
        distinct_keys.len()
    );

    let mut resolutions: HashMap<String, KeyResolution> = assignment
        .into_iter()
        .map(|(target_idx, pair)| {
            (
                distinct_keys[target_idx].clone(),
                KeyResolution::Matched {
                    reference_idx: pair.reference_idx,
                    score: Some(pair.score),
                    via_override: false,
                },
            )
        })
        .collect();

    let override_outcome = apply_overrides(
        &mut resolutions,
        overrides,
        &reference_key_index,
        &target_key_set,
        config.strict_redirects,
    )?;

    assemble(targets, &resolutions, references, &reference_keys, &override_outcome)
}
