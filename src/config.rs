// src/config.rs - Matcher configuration

use anyhow::{ensure, Result};
use log::{debug, info};
use std::env;

/// Tuning knobs for one reconciliation run.
///
/// Loaded once at startup and passed by reference into each component; the
/// matcher itself keeps no ambient state.
#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// Minimum similarity score (0-100) a candidate must reach to be kept.
    pub min_score: u32,
    /// Candidates retained per target key before global resolution.
    pub candidate_limit: usize,
    /// When true, an override redirect pointing at a reference key that
    /// does not exist fails the run instead of being skipped with a warning.
    pub strict_redirects: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            min_score: 50,
            candidate_limit: 5,
            strict_redirects: false,
        }
    }
}

impl MatcherConfig {
    /// Create configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let min_score = env::var("MATCH_MIN_SCORE")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(defaults.min_score);

        let candidate_limit = env::var("MATCH_CANDIDATE_LIMIT")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults.candidate_limit);

        let strict_redirects = env::var("MATCH_STRICT_REDIRECTS")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(defaults.strict_redirects);

        let config = Self {
            min_score,
            candidate_limit,
            strict_redirects,
        };
        debug!("Matcher config from env: {:?}", config);
        config
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.min_score <= 100,
            "min_score must be within 0-100, got {}",
            self.min_score
        );
        ensure!(
            self.candidate_limit >= 1,
            "candidate_limit must be at least 1"
        );
        Ok(())
    }

    pub fn log_config(&self) {
        info!(
            "Matcher config: min_score={}, candidate_limit={}, strict_redirects={}",
            self.min_score, self.candidate_limit, self.strict_redirects
        );
    }
}
