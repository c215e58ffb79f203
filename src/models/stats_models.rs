// src/models/stats_models.rs - Reporting structures for operator review

use log::{info, warn};
use serde::{Deserialize, Serialize};

/// Outcome of one override-application pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverrideOutcome {
    pub redirects_applied: usize,
    pub rejects_applied: usize,
    /// Redirect targets that matched no reference key this run (no-op'd).
    pub missing_redirect_keys: Vec<String>,
}

/// Human-review summary of one reconciliation run.
///
/// This is a report, not a control-flow signal: unmatched rows are retained
/// with a null identifier unless the caller decides to drop them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchReport {
    pub total_rows: usize,
    pub matched_rows: usize,
    pub unmatched_rows: usize,
    pub unmatched_fraction: f64,
    /// Distinct names of unmatched rows, in first-seen row order.
    pub unmatched_names: Vec<String>,
    pub redirects_applied: usize,
    pub rejects_applied: usize,
    pub missing_redirect_keys: Vec<String>,
}

impl MatchReport {
    pub fn log_summary(&self) {
        info!(
            "Reconciliation complete: {}/{} rows matched ({} via override redirect, {} rejected by override)",
            self.matched_rows, self.total_rows, self.redirects_applied, self.rejects_applied
        );
        if self.unmatched_rows > 0 {
            warn!(
                "{} out of {} rows ({:.2}%) could not be matched to an org_unit_id. Unmatched names: {}",
                self.unmatched_rows,
                self.total_rows,
                self.unmatched_fraction * 100.0,
                self.unmatched_names.join(", ")
            );
        }
        for key in &self.missing_redirect_keys {
            warn!("Override redirect target '{}' matches no reference unit", key);
        }
    }
}
