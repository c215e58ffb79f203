// src/utils/pyramid.rs - Curation of the raw spatial hierarchy extract

use chrono::NaiveDate;
use log::info;
use std::collections::HashMap;
use std::collections::HashSet;

use crate::models::core::ReferenceUnit;

/// Curate a raw spatial-hierarchy extract into the reference set the
/// matcher runs against:
/// - drop rejected units;
/// - when `required_source` is given, keep only rows from that source;
/// - deduplicate by unit UID, keeping the most recently updated row. Rows
///   stamped with `excluded_snapshot` (a known-bad bulk import date) are
///   skipped when picking the latest, unless they are all a UID has.
///
/// Rows without a UID pass through untouched. Output preserves first-seen
/// order, so repeated runs over the same extract are identical.
pub fn prepare_reference_units(
    units: Vec<ReferenceUnit>,
    required_source: Option<&str>,
    excluded_snapshot: Option<NaiveDate>,
) -> Vec<ReferenceUnit> {
    let before = units.len();

    let filtered: Vec<ReferenceUnit> = units
        .into_iter()
        .filter(|unit| unit.validation_status.as_deref() != Some("REJECTED"))
        .filter(|unit| match required_source {
            Some(source) => unit.source.as_deref() == Some(source),
            None => true,
        })
        .collect();

    // Latest row per UID; first-seen position anchors output order.
    let mut uid_order: Vec<String> = Vec::new();
    let mut best_per_uid: HashMap<String, ReferenceUnit> = HashMap::new();
    let mut fallback_per_uid: HashMap<String, ReferenceUnit> = HashMap::new();
    let mut without_uid: Vec<ReferenceUnit> = Vec::new();

    for unit in filtered {
        let uid = match &unit.unit_uid {
            Some(uid) => uid.clone(),
            None => {
                without_uid.push(unit);
                continue;
            }
        };
        if !best_per_uid.contains_key(&uid) && !fallback_per_uid.contains_key(&uid) {
            uid_order.push(uid.clone());
        }

        let excluded = match (unit.updated_at, excluded_snapshot) {
            (Some(date), Some(bad)) => date == bad,
            _ => false,
        };
        let slot = if excluded {
            &mut fallback_per_uid
        } else {
            &mut best_per_uid
        };
        let newer = match slot.get(&uid) {
            Some(current) => unit.updated_at > current.updated_at,
            None => true,
        };
        if newer {
            slot.insert(uid, unit);
        }
    }

    let mut curated: Vec<ReferenceUnit> = uid_order
        .into_iter()
        .filter_map(|uid| best_per_uid.remove(&uid).or_else(|| fallback_per_uid.remove(&uid)))
        .collect();
    curated.extend(without_uid);

    info!(
        "Reference preparation kept {} of {} rows",
        curated.len(),
        before
    );
    curated
}

/// Collapse the reference set to one row per district for district-only
/// matching; the first row of each district wins.
pub fn dedupe_by_district(units: &[ReferenceUnit]) -> Vec<ReferenceUnit> {
    let mut seen: HashSet<&str> = HashSet::new();
    units
        .iter()
        .filter(|unit| seen.insert(unit.district_name.as_str()))
        .map(|unit| ReferenceUnit {
            facility_name: None,
            ..unit.clone()
        })
        .collect()
}
