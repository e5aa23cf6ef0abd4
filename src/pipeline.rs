// src/pipeline.rs
//! Pipeline orchestration: run normalization and reconciliation per source
//! in parallel, then merge behind the barrier and fold the per-source
//! observations into one run report.

use crate::{
    merge::merge_tables,
    normalize::{normalize_dates, DEFAULT_FALLBACK_YEAR},
    reconcile::reconcile_columns,
    report::{CollisionResolved, RunReport, UnrecognizedColumn},
    table::{DateValue, MergedTable, NormalizedRow, NormalizedTable, SourceTable},
};
use rayon::prelude::*;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    /// Year assumed for a bare month token before any explicit year suffix
    /// has been seen in that source.
    pub fallback_year: i32,
    /// Cap on retained date-parse failure examples in the run report.
    pub max_error_examples: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            fallback_year: DEFAULT_FALLBACK_YEAR,
            max_error_examples: 5,
        }
    }
}

/// Per-source observations, carried across the barrier alongside the
/// normalized table.
#[derive(Debug, Default)]
struct SourceLog {
    date_errors: Vec<String>,
    collisions: Vec<CollisionResolved>,
    unrecognized: Vec<UnrecognizedColumn>,
}

/// Normalize and reconcile every source in parallel, then merge. Each worker
/// owns its source's parse state exclusively; `collect` keeps source
/// processing order, which the merge relies on for its tie-breaks.
#[instrument(level = "info", skip_all, fields(sources = sources.len()))]
pub fn run_pipeline(sources: &[SourceTable], config: &PipelineConfig) -> (MergedTable, RunReport) {
    let prepared: Vec<(NormalizedTable, SourceLog)> = sources
        .par_iter()
        .map(|source| prepare_source(source, config))
        .collect();

    let mut report = RunReport::default();
    for (_, log) in &prepared {
        report.date_errors += log.date_errors.len();
        for example in &log.date_errors {
            if report.date_error_examples.len() < config.max_error_examples {
                report.date_error_examples.push(example.clone());
            }
        }
        report.collisions.extend(log.collisions.iter().cloned());
        report
            .unrecognized_columns
            .extend(log.unrecognized.iter().cloned());
    }

    let tables: Vec<NormalizedTable> = prepared.into_iter().map(|(t, _)| t).collect();
    let merged = merge_tables(&tables);

    if report.date_errors > 0 {
        warn!(
            count = report.date_errors,
            examples = ?report.date_error_examples,
            "some dates could not be parsed"
        );
    }
    info!(rows = merged.stats.rows, "pipeline complete");
    (merged, report)
}

/// The per-source half of the pipeline: date normalization then column
/// reconciliation. Fresh parse state per call; nothing leaks across sources.
#[instrument(level = "debug", skip(source, config), fields(source = %source.source))]
fn prepare_source(source: &SourceTable, config: &PipelineConfig) -> (NormalizedTable, SourceLog) {
    let mut log = SourceLog::default();

    let tokens: Vec<String> = source.rows.iter().map(|r| r.date_raw.clone()).collect();
    let (parsed, _state) = normalize_dates(&tokens, config.fallback_year);

    let dates: Vec<DateValue> = parsed
        .into_iter()
        .map(|result| match result {
            Ok(ym) => DateValue::Month(ym),
            Err(err) => {
                log.date_errors.push(format!("{}: {}", source.source, err));
                DateValue::Invalid
            }
        })
        .collect();

    let values: Vec<Vec<Option<String>>> = source.rows.iter().map(|r| r.values.clone()).collect();
    let (headers, rows, reconcile_log) = reconcile_columns(&source.headers, values);

    for c in reconcile_log.collisions {
        log.collisions.push(CollisionResolved {
            source: source.source.clone(),
            base_column: c.base_column,
            dropped_column: c.dropped_column,
            filled_rows: c.filled_rows,
            discarded_values: c.discarded_values,
        });
    }
    for column in reconcile_log.unrecognized {
        log.unrecognized.push(UnrecognizedColumn {
            source: source.source.clone(),
            column,
        });
    }

    let rows: Vec<NormalizedRow> = dates
        .into_iter()
        .zip(rows)
        .map(|(date, values)| NormalizedRow { date, values })
        .collect();

    (
        NormalizedTable {
            source: source.source.clone(),
            headers,
            rows,
        },
        log,
    )
}
