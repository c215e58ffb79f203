use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use uuid::Uuid;

use reconcile_lib::config::MatcherConfig;
use reconcile_lib::matching::assemble::drop_unmatched;
use reconcile_lib::matching::manager::run_reconciliation;
use reconcile_lib::matching::overrides::OverrideTable;
use reconcile_lib::models::core::{ReferenceUnit, TargetRecord};
use reconcile_lib::utils::env::load_env;
use reconcile_lib::utils::pyramid::{dedupe_by_district, prepare_reference_units};

/// Reconcile free-text district/facility names in campaign target data
/// against the canonical spatial hierarchy.
#[derive(Parser, Debug)]
#[command(name = "reconcile")]
struct Args {
    /// Target rows (JSON array)
    #[arg(long)]
    targets: PathBuf,

    /// Reference units (JSON array)
    #[arg(long)]
    references: PathBuf,

    /// Override table (JSON object: normalized key -> corrected key or null)
    #[arg(long)]
    overrides: Option<PathBuf>,

    /// Enriched output rows (JSON array)
    #[arg(long)]
    output: PathBuf,

    /// Diagnostic report destination (JSON)
    #[arg(long)]
    report: Option<PathBuf>,

    /// Minimum similarity score (0-100) a candidate must reach
    #[arg(long)]
    min_score: Option<u32>,

    /// Candidates retained per target key
    #[arg(long)]
    candidate_limit: Option<usize>,

    /// Fail the run when an override redirect targets a missing reference key
    #[arg(long)]
    strict_redirects: bool,

    /// Match on district names only, ignoring facility names
    #[arg(long)]
    district_level: bool,

    /// Keep only reference rows from this source (e.g. SNIS)
    #[arg(long)]
    reference_source: Option<String>,

    /// Skip reference rows stamped with this bulk-import date (YYYY-MM-DD)
    /// when picking the latest row per unit UID
    #[arg(long)]
    exclude_snapshot: Option<NaiveDate>,

    /// Drop rows that end up without an identifier
    #[arg(long)]
    drop_unmatched: bool,

    /// Keep normalized keys and raw scores on the output rows
    #[arg(long)]
    keep_diagnostics: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    load_env();
    let args = Args::parse();

    let run_id = Uuid::new_v4();
    let started = Instant::now();
    info!(
        "Starting reconciliation run {} at {}",
        run_id,
        Utc::now().naive_utc()
    );

    let mut config = MatcherConfig::from_env();
    if let Some(min_score) = args.min_score {
        config.min_score = min_score;
    }
    if let Some(candidate_limit) = args.candidate_limit {
        config.candidate_limit = candidate_limit;
    }
    if args.strict_redirects {
        config.strict_redirects = true;
    }
    config.validate()?;
    config.log_config();

    let main_pb = ProgressBar::new(4);
    main_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("█▉▊▋▌▍▎▏  "),
    );

    // Phase 1: load inputs
    main_pb.set_message("Loading input tables...");
    let mut targets: Vec<TargetRecord> = read_json(&args.targets)
        .with_context(|| format!("Failed to load target rows from {}", args.targets.display()))?;
    let references: Vec<ReferenceUnit> = read_json(&args.references).with_context(|| {
        format!(
            "Failed to load reference units from {}",
            args.references.display()
        )
    })?;
    let overrides: OverrideTable = match &args.overrides {
        Some(path) => read_json(path)
            .with_context(|| format!("Failed to load override table from {}", path.display()))?,
        None => OverrideTable::new(),
    };
    info!(
        "Loaded {} target rows, {} reference units, {} override rules",
        targets.len(),
        references.len(),
        overrides.len()
    );
    main_pb.inc(1);

    // Phase 2: curate the reference set
    main_pb.set_message("Preparing reference units...");
    let mut references = prepare_reference_units(
        references,
        args.reference_source.as_deref(),
        args.exclude_snapshot,
    );
    if args.district_level {
        references = dedupe_by_district(&references);
        for target in &mut targets {
            target.facility_name = None;
        }
        info!(
            "District-level matching: {} reference districts",
            references.len()
        );
    }
    main_pb.inc(1);

    // Phase 3: reconcile
    main_pb.set_message("Reconciling names...");
    let (mut enriched, report) = run_reconciliation(&targets, &references, &config, &overrides)
        .context("Reconciliation failed")?;
    report.log_summary();
    main_pb.inc(1);

    // Phase 4: write outputs
    main_pb.set_message("Writing outputs...");
    if args.drop_unmatched {
        let (kept, _dropped) = drop_unmatched(enriched);
        enriched = kept;
    }
    if !args.keep_diagnostics {
        for row in &mut enriched {
            row.strip_diagnostics();
        }
    }
    let payload =
        serde_json::to_string_pretty(&enriched).context("Failed to serialize enriched rows")?;
    fs::write(&args.output, payload)
        .with_context(|| format!("Failed to write output to {}", args.output.display()))?;

    if let Some(report_path) = &args.report {
        let payload =
            serde_json::to_string_pretty(&report).context("Failed to serialize match report")?;
        fs::write(report_path, payload)
            .with_context(|| format!("Failed to write report to {}", report_path.display()))?;
    }
    main_pb.inc(1);
    main_pb.finish_with_message("Reconciliation complete");

    info!(
        "Run {} finished in {:.2}s: {} rows written ({} matched, {} unmatched)",
        run_id,
        started.elapsed().as_secs_f64(),
        enriched.len(),
        report.matched_rows,
        report.unmatched_rows
    );
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Result<T> {
    let content = fs::read_to_string(path)?;
    let value = serde_json::from_str(&content)?;
    Ok(value)
}
