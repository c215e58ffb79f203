// src/matching/assemble.rs - Merge-back onto the full target rows

use anyhow::{ensure, Result};
use log::info;
use std::collections::{HashMap, HashSet};

use crate::matching::normalize::matching_key;
use crate::models::core::{KeyResolution, MatchedTarget, ReferenceUnit, TargetRecord};
use crate::models::stats_models::{MatchReport, OverrideOutcome};

/// Join the per-key resolution back onto the full, non-deduplicated target
/// rows. One administrative name can appear on many data rows; each of them
/// gets the same outcome. Row count is preserved exactly: a mismatch means
/// the merge itself is broken and the run must fail rather than hand a
/// corrupted dataset downstream.
///
/// Unmatched rows keep a null identifier; their canonical facility-name
/// column falls back to the original free text so the operator report stays
/// readable. Dropping them is the caller's decision, not the assembler's.
pub fn assemble(
    targets: &[TargetRecord],
    resolutions: &HashMap<String, KeyResolution>,
    references: &[ReferenceUnit],
    reference_keys: &[String],
    override_outcome: &OverrideOutcome,
) -> Result<(Vec<MatchedTarget>, MatchReport)> {
    let mut enriched: Vec<MatchedTarget> = Vec::with_capacity(targets.len());
    let mut unmatched_rows = 0usize;
    let mut unmatched_names: Vec<String> = Vec::new();
    let mut unmatched_seen: HashSet<String> = HashSet::new();

    for target in targets {
        let key = matching_key(target.district_name.as_deref(), target.facility_name.as_deref());

        let row = match resolutions.get(&key) {
            Some(KeyResolution::Matched {
                reference_idx,
                score,
                via_override: _,
            }) => {
                let reference = &references[*reference_idx];
                MatchedTarget {
                    org_unit_id: Some(reference.org_unit_id),
                    district_name: Some(reference.district_name.clone()),
                    facility_name: reference.facility_name.clone(),
                    match_score: *score,
                    target_key: Some(key),
                    matched_key: Some(reference_keys[*reference_idx].clone()),
                    values: target.values.clone(),
                }
            }
            Some(KeyResolution::Rejected) | None => {
                unmatched_rows += 1;
                let display_name = target
                    .facility_name
                    .clone()
                    .or_else(|| target.district_name.clone())
                    .unwrap_or_else(|| "(blank)".to_string());
                if unmatched_seen.insert(display_name.clone()) {
                    unmatched_names.push(display_name);
                }
                MatchedTarget {
                    org_unit_id: None,
                    district_name: None,
                    facility_name: target.facility_name.clone(),
                    match_score: None,
                    target_key: Some(key),
                    matched_key: None,
                    values: target.values.clone(),
                }
            }
        };
        enriched.push(row);
    }

    ensure!(
        enriched.len() == targets.len(),
        "Row count mismatch after merging resolution back onto target rows: {} vs {}",
        targets.len(),
        enriched.len()
    );

    let total_rows = targets.len();
    let report = MatchReport {
        total_rows,
        matched_rows: total_rows - unmatched_rows,
        unmatched_rows,
        unmatched_fraction: if total_rows > 0 {
            unmatched_rows as f64 / total_rows as f64
        } else {
            0.0
        },
        unmatched_names,
        redirects_applied: override_outcome.redirects_applied,
        rejects_applied: override_outcome.rejects_applied,
        missing_redirect_keys: override_outcome.missing_redirect_keys.clone(),
    };

    Ok((enriched, report))
}

/// Caller-opt-in policy: discard rows that ended up without an identifier.
pub fn drop_unmatched(rows: Vec<MatchedTarget>) -> (Vec<MatchedTarget>, usize) {
    let before = rows.len();
    let kept: Vec<MatchedTarget> = rows
        .into_iter()
        .filter(|row| row.org_unit_id.is_some())
        .collect();
    let dropped = before - kept.len();
    if dropped > 0 {
        info!("Dropped {} unmatched rows out of {}", dropped, before);
    }
    (kept, dropped)
}
