// src/report.rs
//! Structured end-of-run report. Per-token and per-column events are
//! absorbed where they happen and aggregated here; nothing recoverable ever
//! aborts the run.

use serde::Serialize;

/// A later column was merged into the base column claiming the same
/// canonical name. `discarded_values` counts rows where both held non-null
/// values and the later value was dropped — a known data-loss limitation of
/// the fill-forward rule, reported rather than silently absorbed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollisionResolved {
    pub source: String,
    pub base_column: String,
    pub dropped_column: String,
    pub filled_rows: usize,
    pub discarded_values: usize,
}

/// A column that matched no canonicalization grammar. Informational only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnrecognizedColumn {
    pub source: String,
    pub column: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Total tokens that became the invalid-date sentinel.
    pub date_errors: usize,
    /// Up to `PipelineConfig::max_error_examples` sample failures,
    /// `source: message` form.
    pub date_error_examples: Vec<String>,
    pub collisions: Vec<CollisionResolved>,
    pub unrecognized_columns: Vec<UnrecognizedColumn>,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.date_errors == 0 && self.collisions.is_empty()
    }
}
