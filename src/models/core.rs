// src/models/core.rs - Record types crossing the matcher boundary

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of target-population data needing a canonical location.
///
/// The two name columns are free text as found in the source spreadsheet;
/// every other column rides along untouched in `values` and is handed back
/// verbatim on the enriched output row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetRecord {
    pub district_name: Option<String>,
    pub facility_name: Option<String>,
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

impl TargetRecord {
    pub fn new(district_name: Option<&str>, facility_name: Option<&str>) -> Self {
        Self {
            district_name: district_name.map(|s| s.to_string()),
            facility_name: facility_name.map(|s| s.to_string()),
            values: Map::new(),
        }
    }
}

/// One row of the canonical spatial hierarchy.
///
/// `org_unit_id` is the stable identifier the whole pipeline exists to
/// attach. The curation fields (`unit_uid`, `validation_status`, `source`,
/// `updated_at`) are only consulted by reference preparation and may be
/// absent on already-curated inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceUnit {
    pub org_unit_id: i64,
    pub district_name: String,
    #[serde(default)]
    pub facility_name: Option<String>,
    #[serde(default)]
    pub unit_uid: Option<String>,
    #[serde(default)]
    pub validation_status: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub updated_at: Option<NaiveDate>,
}

impl ReferenceUnit {
    pub fn new(org_unit_id: i64, district_name: &str, facility_name: Option<&str>) -> Self {
        Self {
            org_unit_id,
            district_name: district_name.to_string(),
            facility_name: facility_name.map(|s| s.to_string()),
            unit_uid: None,
            validation_status: None,
            source: None,
            updated_at: None,
        }
    }
}

/// A scored (target key, reference row) pairing produced in bulk by the
/// candidate generator and consumed once by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidatePair {
    pub target_idx: usize,
    pub reference_idx: usize,
    pub score: u32,
}

/// The winning reference row for one distinct target key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPair {
    pub reference_idx: usize,
    pub score: u32,
}

/// Final per-key outcome after the override layer has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResolution {
    Matched {
        reference_idx: usize,
        /// Raw similarity score; absent when the match was forced by an
        /// override rule rather than won by the resolver.
        score: Option<u32>,
        via_override: bool,
    },
    /// Explicitly rejected by an override rule; stays unmatched no matter
    /// what the resolver found.
    Rejected,
}

/// One enriched output row: the original payload plus the reconciled
/// identifier and canonical names, and the bookkeeping columns exposed for
/// the diagnostic path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedTarget {
    pub org_unit_id: Option<i64>,
    pub district_name: Option<String>,
    pub facility_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_key: Option<String>,
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

impl MatchedTarget {
    /// Remove the bookkeeping columns before handing rows downstream.
    pub fn strip_diagnostics(&mut self) {
        self.match_score = None;
        self.target_key = None;
        self.matched_key = None;
    }
}
