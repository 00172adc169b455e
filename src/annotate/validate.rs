// src/annotate/validate.rs
use thiserror::Error;
use tracing::debug;

use super::AnnotatedTable;
use crate::metrics::AmbulatoryMetrics;

/// A failed sanity check. The message is what gets reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("negative values found in {0}")]
    Negative(&'static str),
    #[error("total ambulatory difficulty exceeds total population")]
    DifficultyExceedsPopulation,
    #[error("senior ambulatory difficulty exceeds senior population")]
    SeniorDifficultyExceedsSeniorPopulation,
    #[error("senior population exceeds total population")]
    SeniorExceedsPopulation,
    #[error("total ambulatory difficulty percentage exceeds 100%")]
    DifficultyPercentOver100,
    #[error("senior ambulatory difficulty percentage exceeds 100%")]
    SeniorDifficultyPercentOver100,
}

const COUNT_COLUMNS: [&str; 4] = [
    "total_pop_5plus",
    "total_amb_diff",
    "pop_65plus",
    "pop_65plus_amb_diff",
];

impl Violation {
    /// Report order: negatives by column, then the containment checks.
    fn rank(&self) -> usize {
        match self {
            Violation::Negative(col) => COUNT_COLUMNS
                .iter()
                .position(|c| c == col)
                .unwrap_or(COUNT_COLUMNS.len()),
            Violation::DifficultyExceedsPopulation => 10,
            Violation::SeniorDifficultyExceedsSeniorPopulation => 11,
            Violation::SeniorExceedsPopulation => 12,
            Violation::DifficultyPercentOver100 => 13,
            Violation::SeniorDifficultyPercentOver100 => 14,
        }
    }
}

/// One violated check and every tract that violates it.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub violation: Violation,
    pub geoids: Vec<String>,
}

/// `a > b`, false when either side is undefined.
fn exceeds(a: Option<i64>, b: Option<i64>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a > b)
}

/// Every check `m` fails, in report order.
pub fn check_row(m: &AmbulatoryMetrics) -> Vec<Violation> {
    let counts = [
        m.total_pop_5plus,
        m.total_amb_diff,
        m.pop_65plus,
        m.pop_65plus_amb_diff,
    ];
    let mut out: Vec<Violation> = COUNT_COLUMNS
        .iter()
        .zip(counts)
        .filter(|(_, v)| matches!(v, Some(v) if *v < 0))
        .map(|(col, _)| Violation::Negative(*col))
        .collect();

    if exceeds(m.total_amb_diff, m.total_pop_5plus) {
        out.push(Violation::DifficultyExceedsPopulation);
    }
    if exceeds(m.pop_65plus_amb_diff, m.pop_65plus) {
        out.push(Violation::SeniorDifficultyExceedsSeniorPopulation);
    }
    if exceeds(m.pop_65plus, m.total_pop_5plus) {
        out.push(Violation::SeniorExceedsPopulation);
    }
    if m.total_amb_diff_pct > 100.0 {
        out.push(Violation::DifficultyPercentOver100);
    }
    if m.pop_65plus_amb_diff_pct > 100.0 {
        out.push(Violation::SeniorDifficultyPercentOver100);
    }
    out
}

/// Check every joined row; nothing short-circuits. Each violated check
/// appears once, carrying all offending GEOIDs. Empty means the data passed.
pub fn validate(table: &AnnotatedTable) -> Vec<Finding> {
    let mut findings: Vec<Finding> = Vec::new();
    let mut checked = 0usize;

    for (geoid, m) in table.joined() {
        checked += 1;
        for violation in check_row(m) {
            match findings.iter_mut().find(|f| f.violation == violation) {
                Some(f) => f.geoids.push(geoid.to_string()),
                None => findings.push(Finding {
                    violation,
                    geoids: vec![geoid.to_string()],
                }),
            }
        }
    }

    findings.sort_by_key(|f| f.violation.rank());
    debug!(checked, failed_checks = findings.len(), "validation finished");
    findings
}
