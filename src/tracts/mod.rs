// src/tracts/mod.rs
use anyhow::{anyhow, Context, Result};
use csv::ReaderBuilder;
use std::{fs::File, io::Read, path::Path};
use tracing::{debug, info};

/// The tract table as read from disk. Every cell stays text, so zero-padded
/// GEOIDs such as `06075010800` keep their leading zeros.
#[derive(Debug, Clone)]
pub struct TractTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    id_index: usize,
    name_index: Option<usize>,
}

impl TractTable {
    /// GEOID of the row at `idx`.
    pub fn geoid(&self, idx: usize) -> &str {
        self.rows[idx][self.id_index].as_str()
    }

    /// Display name of the row at `idx`, empty when the table has no name column.
    pub fn name(&self, idx: usize) -> &str {
        self.name_index
            .map(|i| self.rows[idx][i].as_str())
            .unwrap_or("")
    }

    pub fn geoids(&self) -> Vec<String> {
        (0..self.rows.len()).map(|i| self.geoid(i).to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read the tract table at `path`. A missing or unreadable file is an error.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_tracts<P: AsRef<Path>>(
    path: P,
    id_column: &str,
    name_column: &str,
) -> Result<TractTable> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open tract table: {:?}", path.as_ref()))?;
    read_tracts(file, id_column, name_column)
        .with_context(|| format!("Failed to read tract table: {:?}", path.as_ref()))
}

pub fn read_tracts<R: Read>(reader: R, id_column: &str, name_column: &str) -> Result<TractTable> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .context("reading header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let id_index = headers
        .iter()
        .position(|h| h == id_column)
        .ok_or_else(|| anyhow!("identifier column {:?} not found in {:?}", id_column, headers))?;
    let name_index = headers.iter().position(|h| h == name_column);
    if name_index.is_none() {
        debug!(column = name_column, "name column absent");
    }

    let mut rows = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", idx))?;
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row[id_index] = row[id_index].trim().to_string();
        rows.push(row);
    }

    info!(tracts = rows.len(), "loaded tract table");
    Ok(TractTable {
        headers,
        rows,
        id_index,
        name_index,
    })
}
