// src/config.rs

use anyhow::{ensure, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_INPUT: &str = "generated/tracts_within_1mile.csv";
pub const DEFAULT_OUTPUT: &str = "generated/tracts_within_1mile_annotated.csv";
pub const DEFAULT_API_BASE: &str = "https://api.census.gov/data/2023/acs/acs5";

/// Annotate a tract table with ACS B18105 ambulatory-difficulty metrics.
#[derive(Debug, Clone, Parser)]
#[command(name = "tractscraper", version)]
pub struct Config {
    /// Tract table to annotate (must contain the identifier column).
    #[arg(long, env = "TRACTS_INPUT", default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Where the annotated table is written; parent directories are created.
    #[arg(long, env = "TRACTS_OUTPUT", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// ACS dataset endpoint.
    #[arg(long, env = "CENSUS_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    #[arg(long, default_value = "GEOID")]
    pub id_column: String,

    /// Column shown next to the GEOID when a tract has no census data.
    #[arg(long, default_value = "NAMELSAD")]
    pub name_column: String,

    #[arg(long, default_value_t = 3)]
    pub preview_rows: usize,
}

impl Config {
    /// Parsed API base; fails before any I/O happens.
    pub fn api_url(&self) -> Result<Url> {
        Url::parse(&self.api_base).with_context(|| format!("parsing API base {}", self.api_base))
    }

    pub fn validate(&self) -> Result<()> {
        self.api_url()?;
        ensure!(
            !self.id_column.trim().is_empty(),
            "identifier column name must not be empty"
        );
        Ok(())
    }
}
