// src/pipeline.rs

use anyhow::Result;
use reqwest::Client;
use tracing::{error, info, instrument};

use crate::{
    annotate::{self, Finding},
    config::Config,
    fetch, metrics, report, tracts,
};

/// How a run ended when nothing failed outright.
#[derive(Debug)]
pub enum Outcome {
    /// Output written; `missing` tracts had no census data.
    Passed { rows: usize, missing: usize },
    /// Sanity checks failed; nothing was written.
    Failed(Vec<Finding>),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Passed { .. })
    }
}

/// load → fetch → derive → merge → validate → report → write.
#[instrument(level = "info", skip_all, fields(input = %cfg.input.display()))]
pub async fn run(cfg: &Config, client: &Client) -> Result<Outcome> {
    cfg.validate()?;
    let base = cfg.api_url()?;

    // ─── 1) tract table ──────────────────────────────────────────────
    info!("Reading {}...", cfg.input.display());
    let tracts = tracts::load_tracts(&cfg.input, &cfg.id_column, &cfg.name_column)?;
    let geoids = tracts.geoids();
    info!("Found {} tracts", tracts.len());
    info!("Tracts: {:?}", geoids);

    // ─── 2) census estimates ─────────────────────────────────────────
    info!("Fetching Census B18105 data...");
    let estimates = fetch::fetch_b18105(client, &base, &geoids).await?;

    // ─── 3) derive + merge ───────────────────────────────────────────
    info!("Calculating metrics...");
    let derived = metrics::calculate_metrics(&estimates);
    info!("Merging data...");
    let table = annotate::merge(tracts, derived);
    let missing = annotate::warn_missing(&table);

    // ─── 4) quality checks ───────────────────────────────────────────
    info!("Running data quality checks");
    let findings = annotate::validate(&table);
    if !findings.is_empty() {
        for f in &findings {
            error!(tracts = ?f.geoids, "{}", f.violation);
            println!("ERROR: {} ({} tracts: {})", f.violation, f.geoids.len(), f.geoids.join(", "));
        }
        return Ok(Outcome::Failed(findings));
    }
    println!("✓ All data quality checks passed!");

    // ─── 5) report, then persist ─────────────────────────────────────
    println!("{}", report::render_summary(&table));
    println!("{}", report::render_preview(&table, cfg.preview_rows));

    report::write_annotated(&cfg.output, &table)?;
    println!("✓ Saved annotated data to {}", cfg.output.display());

    Ok(Outcome::Passed {
        rows: table.len(),
        missing,
    })
}
