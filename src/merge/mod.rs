// src/merge/mod.rs
//! Series merger: unions schemas across all normalized source tables, tags
//! rows with provenance, concatenates and stably sorts by date.
//!
//! This stage is the pipeline's single synchronization point; it needs every
//! source's canonical column set before the union schema exists.

use crate::table::{MergeStats, MergedRow, MergedTable, NormalizedTable};
use std::collections::HashMap;
use tracing::{info, instrument};

/// Merge all sources into one table. Source order in `tables` is the
/// processing order and decides both the first-seen schema union and the
/// tie-break order of rows sharing a date. The sort is stable, so rows with
/// equal dates keep (source order, in-source row order); sentinel-dated rows
/// collect at the tail.
#[instrument(level = "info", skip(tables), fields(sources = tables.len()))]
pub fn merge_tables(tables: &[NormalizedTable]) -> MergedTable {
    // Ordered union of canonical columns, first-seen across sources. The
    // date column lives outside `headers` and always serializes first.
    let mut headers: Vec<String> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();
    for table in tables {
        for name in &table.headers {
            if !positions.contains_key(name) {
                positions.insert(name.clone(), headers.len());
                headers.push(name.clone());
            }
        }
    }

    let mut rows: Vec<MergedRow> = Vec::new();
    for table in tables {
        let dest: Vec<usize> = table.headers.iter().map(|h| positions[h]).collect();
        for row in &table.rows {
            let mut values: Vec<Option<String>> = vec![None; headers.len()];
            for (value, &slot) in row.values.iter().zip(&dest) {
                values[slot] = value.clone();
            }
            rows.push(MergedRow {
                date: row.date,
                source: table.source.clone(),
                values,
            });
        }
    }

    rows.sort_by_key(|r| r.date.sort_key());

    let valid = rows.iter().filter_map(|r| r.date.valid());
    let stats = MergeStats {
        rows: rows.len(),
        min_date: valid.clone().min(),
        max_date: valid.max(),
    };
    info!(
        rows = stats.rows,
        min = ?stats.min_date.map(|d| d.to_string()),
        max = ?stats.max_date.map(|d| d.to_string()),
        "merged"
    );

    MergedTable {
        headers,
        rows,
        stats,
    }
}
