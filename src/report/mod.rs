// src/report/mod.rs
use anyhow::{Context, Result};
use csv::Writer;
use std::{fmt::Write as _, fs, path::Path};
use tracing::{info, instrument};

use crate::acs::DERIVED_COLUMNS;
use crate::annotate::AnnotatedTable;
use crate::metrics::AmbulatoryMetrics;

/// Min, max and mean over the defined values of one column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl ColumnStats {
    pub fn from_values<I: IntoIterator<Item = f64>>(values: I) -> Option<Self> {
        let mut n = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values {
            n += 1;
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }
        (n > 0).then(|| Self {
            min,
            max,
            mean: sum / n as f64,
        })
    }
}

enum Kind {
    Count,
    Percent,
}

const SUMMARY_COLUMNS: [(&str, Kind); 6] = [
    ("Total Population 5+", Kind::Count),
    ("Total with Ambulatory Difficulty", Kind::Count),
    ("Percentage with Ambulatory Difficulty", Kind::Percent),
    ("Population 65+", Kind::Count),
    ("Population 65+ with Ambulatory Difficulty", Kind::Count),
    ("Percentage 65+ with Ambulatory Difficulty", Kind::Percent),
];

/// Values in [`SUMMARY_COLUMNS`] order.
fn summary_values(m: &AmbulatoryMetrics) -> [Option<f64>; 6] {
    let count = |v: Option<i64>| v.map(|v| v as f64);
    [
        count(m.total_pop_5plus),
        count(m.total_amb_diff),
        Some(m.total_amb_diff_pct),
        count(m.pop_65plus),
        count(m.pop_65plus_amb_diff),
        Some(m.pop_65plus_amb_diff_pct),
    ]
}

/// Summary block: Min/Max/Mean for each derived column over joined rows.
pub fn render_summary(table: &AnnotatedTable) -> String {
    let mut out = String::from("=== Summary Statistics ===\n");
    for (col, (title, kind)) in SUMMARY_COLUMNS.into_iter().enumerate() {
        let stats = ColumnStats::from_values(
            table
                .metrics
                .iter()
                .flatten()
                .filter_map(|m| summary_values(m)[col]),
        );
        let _ = writeln!(out, "\n{}:", title);
        match (stats, kind) {
            (None, _) => {
                let _ = writeln!(out, "  n/a");
            }
            (Some(s), Kind::Count) => {
                let _ = writeln!(out, "  Min: {:.0}", s.min);
                let _ = writeln!(out, "  Max: {:.0}", s.max);
                let _ = writeln!(out, "  Mean: {:.1}", s.mean);
            }
            (Some(s), Kind::Percent) => {
                let _ = writeln!(out, "  Min: {:.2}%", s.min);
                let _ = writeln!(out, "  Max: {:.2}%", s.max);
                let _ = writeln!(out, "  Mean: {:.2}%", s.mean);
            }
        }
    }
    out
}

/// The six derived cells for one row; undefined values are empty.
pub fn metric_cells(m: Option<&AmbulatoryMetrics>) -> [String; 6] {
    let count = |v: Option<i64>| v.map(|v| v.to_string()).unwrap_or_default();
    match m {
        None => Default::default(),
        Some(m) => [
            count(m.total_pop_5plus),
            count(m.total_amb_diff),
            format!("{:.2}", m.total_amb_diff_pct),
            count(m.pop_65plus),
            count(m.pop_65plus_amb_diff),
            format!("{:.2}", m.pop_65plus_amb_diff_pct),
        ],
    }
}

fn header_row(table: &AnnotatedTable) -> Vec<&str> {
    table
        .tracts
        .headers
        .iter()
        .map(String::as_str)
        .chain(DERIVED_COLUMNS)
        .collect()
}

fn output_row(table: &AnnotatedTable, idx: usize) -> Vec<String> {
    let mut row = table.tracts.rows[idx].clone();
    row.extend(metric_cells(table.metrics[idx].as_ref()));
    row
}

fn pad_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, w)| format!("{:<w$}", cell, w = *w))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

/// First `n` output rows as a left-aligned text table.
pub fn render_preview(table: &AnnotatedTable, n: usize) -> String {
    let header = header_row(table);
    let rows: Vec<Vec<String>> = (0..n.min(table.len()))
        .map(|i| output_row(table, i))
        .collect();

    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(c, h)| {
            rows.iter()
                .map(|r| r[c].chars().count())
                .chain(std::iter::once(h.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = format!("=== First {} rows of annotated data ===\n", rows.len());
    out.push_str(&pad_line(header.iter().copied(), &widths));
    out.push('\n');
    for r in &rows {
        out.push_str(&pad_line(r.iter().map(String::as_str), &widths));
        out.push('\n');
    }
    out
}

/// Write the annotated table as CSV, replacing any existing file and
/// creating parent directories.
#[instrument(level = "info", skip(path, table), fields(path = %path.as_ref().display()))]
pub fn write_annotated<P: AsRef<Path>>(path: P, table: &AnnotatedTable) -> Result<()> {
    let path = path.as_ref();
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("creating {:?}", dir))?;
    }

    let mut wtr =
        Writer::from_path(path).with_context(|| format!("creating output CSV {:?}", path))?;
    wtr.write_record(header_row(table))?;
    for i in 0..table.len() {
        wtr.write_record(output_row(table, i))
            .with_context(|| format!("writing row {} to {:?}", i, path))?;
    }
    wtr.flush().with_context(|| format!("flushing {:?}", path))?;

    info!(rows = table.len(), "Saved annotated data to {}", path.display());
    Ok(())
}
