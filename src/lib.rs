pub mod config;
pub mod matching;
pub mod models;
pub mod utils;

pub use config::MatcherConfig;
pub use matching::manager::run_reconciliation;
pub use matching::overrides::OverrideTable;
pub use models::core::{MatchedTarget, ReferenceUnit, TargetRecord};
pub use models::stats_models::MatchReport;
