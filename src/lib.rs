//! Combine per-file chart-digitizer CSV exports into one chronologically
//! ordered, schema-unified table.
//!
//! The pipeline has three stages: per-source date normalization
//! ([`normalize`]), per-source column reconciliation ([`reconcile`]), and a
//! final merge across all sources ([`merge`]). The first two stages have no
//! cross-source dependencies and run in parallel; the merge is the single
//! synchronization point ([`pipeline`]).

pub mod error;
pub mod io;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod reconcile;
pub mod report;
pub mod table;

pub use error::{CombineError, DateParseError};
pub use pipeline::{run_pipeline, PipelineConfig};
pub use report::RunReport;
pub use table::{DateValue, MergedTable, RawRow, SourceTable, YearMonth};
