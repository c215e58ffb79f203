// src/matching/overrides.rs - Manually curated correction table

use anyhow::{bail, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::models::core::KeyResolution;
use crate::models::stats_models::OverrideOutcome;

/// Curated corrections keyed by normalized target key.
///
/// `Some(corrected)` re-points the match to the reference row whose
/// normalized key equals `corrected`; `None` rejects the key outright
/// (names confirmed unresolvable, ambiguous or duplicated in the source).
/// The table is maintained by hand from the diagnostic report of previous
/// runs and loaded as plain JSON, e.g.
/// `{"tibiri tibiri urbain": "tibiri tibiri doutchi", "dogon doutchi 2361": null}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverrideTable {
    rules: BTreeMap<String, Option<String>>,
}

impl OverrideTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-point `original` (a normalized target key) at the reference row
    /// carrying the normalized key `corrected`.
    pub fn redirect(&mut self, original: &str, corrected: &str) {
        self.rules
            .insert(original.to_string(), Some(corrected.to_string()));
    }

    /// Mark `original` as explicitly unmatched.
    pub fn reject(&mut self, original: &str) {
        self.rules.insert(original.to_string(), None);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Option<String>)> {
        self.rules.iter()
    }
}

/// Apply the override table on top of the automatic resolution.
///
/// Runs strictly after the resolver and is keyed by normalized key, so a
/// rule covers every duplicate target row sharing that text. Rules whose
/// key does not occur in this run's target set are ignored. A redirect
/// whose corrected key matches no reference row is a logged no-op unless
/// `strict_redirects` turns it into a validation error.
pub fn apply_overrides(
    resolutions: &mut HashMap<String, KeyResolution>,
    overrides: &OverrideTable,
    reference_key_index: &HashMap<String, usize>,
    target_keys: &HashSet<String>,
    strict_redirects: bool,
) -> Result<OverrideOutcome> {
    let mut outcome = OverrideOutcome::default();

    for (original_key, rule) in overrides.iter() {
        if !target_keys.contains(original_key) {
            continue;
        }

        match rule {
            None => {
                resolutions.insert(original_key.clone(), KeyResolution::Rejected);
                outcome.rejects_applied += 1;
                debug!("Override reject applied for '{}'", original_key);
            }
            Some(corrected_key) => match reference_key_index.get(corrected_key) {
                Some(&reference_idx) => {
                    resolutions.insert(
                        original_key.clone(),
                        KeyResolution::Matched {
                            reference_idx,
                            score: None,
                            via_override: true,
                        },
                    );
                    outcome.redirects_applied += 1;
                    debug!(
                        "Override redirect applied: '{}' -> '{}'",
                        original_key, corrected_key
                    );
                }
                None => {
                    if strict_redirects {
                        bail!(
                            "Override redirect for '{}' targets reference key '{}' which does not exist",
                            original_key,
                            corrected_key
                        );
                    }
                    warn!(
                        "Override redirect for '{}' targets reference key '{}' which does not exist; skipping",
                        original_key, corrected_key
                    );
                    outcome.missing_redirect_keys.push(corrected_key.clone());
                }
            },
        }
    }

    if outcome.redirects_applied + outcome.rejects_applied > 0 {
        info!(
            "Overrides applied: {} redirects, {} rejects",
            outcome.redirects_applied, outcome.rejects_applied
        );
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (
        HashMap<String, KeyResolution>,
        HashMap<String, usize>,
        HashSet<String>,
    ) {
        let mut resolutions = HashMap::new();
        resolutions.insert(
            "dogon doutchi 2361".to_string(),
            KeyResolution::Matched {
                reference_idx: 7,
                score: Some(88),
                via_override: false,
            },
        );

        let mut reference_key_index = HashMap::new();
        reference_key_index.insert("tibiri tibiri doutchi".to_string(), 3);

        let target_keys: HashSet<String> = ["dogon doutchi 2361", "tibiri tibiri urbain"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        (resolutions, reference_key_index, target_keys)
    }

    #[test]
    fn test_reject_overrides_automatic_match() {
        let (mut resolutions, reference_key_index, target_keys) = setup();
        let mut overrides = OverrideTable::new();
        overrides.reject("dogon doutchi 2361");

        let outcome = apply_overrides(
            &mut resolutions,
            &overrides,
            &reference_key_index,
            &target_keys,
            false,
        )
        .unwrap();

        assert_eq!(outcome.rejects_applied, 1);
        assert_eq!(
            resolutions.get("dogon doutchi 2361"),
            Some(&KeyResolution::Rejected)
        );
    }

    #[test]
    fn test_redirect_points_at_reference_row() {
        let (mut resolutions, reference_key_index, target_keys) = setup();
        let mut overrides = OverrideTable::new();
        overrides.redirect("tibiri tibiri urbain", "tibiri tibiri doutchi");

        let outcome = apply_overrides(
            &mut resolutions,
            &overrides,
            &reference_key_index,
            &target_keys,
            false,
        )
        .unwrap();

        assert_eq!(outcome.redirects_applied, 1);
        assert_eq!(
            resolutions.get("tibiri tibiri urbain"),
            Some(&KeyResolution::Matched {
                reference_idx: 3,
                score: None,
                via_override: true,
            })
        );
    }

    #[test]
    fn test_missing_redirect_target_is_noop_by_default() {
        let (mut resolutions, reference_key_index, target_keys) = setup();
        let mut overrides = OverrideTable::new();
        overrides.redirect("tibiri tibiri urbain", "no such key");

        let outcome = apply_overrides(
            &mut resolutions,
            &overrides,
            &reference_key_index,
            &target_keys,
            false,
        )
        .unwrap();

        assert_eq!(outcome.redirects_applied, 0);
        assert_eq!(outcome.missing_redirect_keys, vec!["no such key"]);
        assert!(!resolutions.contains_key("tibiri tibiri urbain"));
    }

    #[test]
    fn test_missing_redirect_target_fails_under_strict() {
        let (mut resolutions, reference_key_index, target_keys) = setup();
        let mut overrides = OverrideTable::new();
        overrides.redirect("tibiri tibiri urbain", "no such key");

        let result = apply_overrides(
            &mut resolutions,
            &overrides,
            &reference_key_index,
            &target_keys,
            true,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rules_for_absent_keys_are_ignored() {
        let (mut resolutions, reference_key_index, target_keys) = setup();
        let mut overrides = OverrideTable::new();
        overrides.reject("gazaoua gangara");

        let outcome = apply_overrides(
            &mut resolutions,
            &overrides,
            &reference_key_index,
            &target_keys,
            false,
        )
        .unwrap();

        assert_eq!(outcome.rejects_applied, 0);
        assert!(!resolutions.contains_key("gazaoua gangara"));
    }

    #[test]
    fn test_table_deserializes_from_plain_json_map() {
        let table: OverrideTable = serde_json::from_str(
            r#"{"tibiri tibiri urbain": "tibiri tibiri doutchi", "dogon doutchi 2361": null}"#,
        )
        .unwrap();
        assert_eq!(table.len(), 2);
    }
}
