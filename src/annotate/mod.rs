// src/annotate/mod.rs
use std::collections::HashMap;
use tracing::{info, warn};

use crate::metrics::{AmbulatoryMetrics, DerivedRow};
use crate::tracts::TractTable;

pub mod validate;

pub use validate::{validate, Finding, Violation};

/// The tract table left-joined with its derived metrics on GEOID.
/// `metrics[i]` belongs to `tracts.rows[i]`; `None` is a join miss.
#[derive(Debug, Clone)]
pub struct AnnotatedTable {
    pub tracts: TractTable,
    pub metrics: Vec<Option<AmbulatoryMetrics>>,
}

impl AnnotatedTable {
    pub fn len(&self) -> usize {
        self.tracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracts.is_empty()
    }

    /// `(geoid, name)` of every tract without census data.
    pub fn missing(&self) -> Vec<(&str, &str)> {
        self.metrics
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_none())
            .map(|(i, _)| (self.tracts.geoid(i), self.tracts.name(i)))
            .collect()
    }

    /// Rows that joined, with their GEOIDs.
    pub fn joined(&self) -> impl Iterator<Item = (&str, &AmbulatoryMetrics)> {
        self.metrics
            .iter()
            .enumerate()
            .filter_map(move |(i, m)| m.as_ref().map(|m| (self.tracts.geoid(i), m)))
    }
}

/// Left join: every tract row is kept exactly once, in input order.
pub fn merge(tracts: TractTable, derived: Vec<DerivedRow>) -> AnnotatedTable {
    let by_geoid: HashMap<String, AmbulatoryMetrics> = derived
        .into_iter()
        .map(|d| (d.geoid, d.metrics))
        .collect();
    let metrics = (0..tracts.len())
        .map(|i| by_geoid.get(tracts.geoid(i)).copied())
        .collect();
    AnnotatedTable { tracts, metrics }
}

/// Log each join miss. Never fatal.
pub fn warn_missing(table: &AnnotatedTable) -> usize {
    let missing = table.missing();
    if missing.is_empty() {
        info!("all {} tracts have census data", table.len());
        return 0;
    }
    warn!("{} tracts missing Census data", missing.len());
    for (geoid, name) in &missing {
        warn!(geoid = %geoid, name = %name, "no census data for tract");
    }
    missing.len()
}
