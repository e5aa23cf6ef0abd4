// src/io/mod.rs
//! CSV collaborators around the core: read a directory of per-source
//! exports into `SourceTable`s and write the merged result back out.
//!
//! Whatever the first column of an export is headed, it is the date column;
//! the digitizer tool was not consistent about naming it. Empty cells read
//! as null and write back as empty fields.

use crate::error::CombineError;
use crate::table::{MergedTable, RawRow, SourceTable};
use anyhow::{Context, Result};
use csv::{ReaderBuilder, WriterBuilder};
use glob::glob;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Column headers the writer emits around the union schema.
pub const DATE_COLUMN: &str = "Date";
pub const PROVENANCE_COLUMN: &str = "Source_File";

/// Read every `*.csv` under `dir` into a `SourceTable`, in sorted path order
/// so source processing order is reproducible. Any unreadable file is fatal
/// to the whole run; an empty directory is too.
#[instrument(level = "info", skip(dir), fields(dir = %dir.as_ref().display()))]
pub fn read_source_dir<P: AsRef<Path>>(dir: P) -> Result<Vec<SourceTable>, CombineError> {
    let pattern = format!("{}/*.csv", dir.as_ref().display());
    let mut paths: Vec<PathBuf> = glob(&pattern)
        .map_err(anyhow::Error::from)
        .and_then(|entries| {
            entries
                .map(|entry| entry.map_err(anyhow::Error::from))
                .collect::<Result<Vec<_>>>()
        })
        .map_err(|e| CombineError::FileRead {
            source_id: dir.as_ref().display().to_string(),
            source: e.into(),
        })?;
    paths.sort();

    if paths.is_empty() {
        return Err(CombineError::NoSources {
            dir: dir.as_ref().display().to_string(),
        });
    }
    info!(count = paths.len(), "found CSV sources");

    paths
        .into_iter()
        .map(|path| {
            let source_id = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            read_source(&path, &source_id).map_err(|e| CombineError::FileRead {
                source_id: source_id.clone(),
                source: e.into(),
            })
        })
        .collect()
}

fn read_source(path: &Path, source_id: &str) -> Result<SourceTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers: Vec<String> = rdr
        .headers()
        .with_context(|| format!("reading headers of {}", path.display()))?
        .iter()
        .skip(1) // column 0 is the date column, whatever it is called
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let record =
            record.with_context(|| format!("CSV parse error in {} at row {}", source_id, idx))?;
        let date_raw = record.get(0).unwrap_or("").to_string();
        let values = (1..=headers.len())
            .map(|i| {
                record
                    .get(i)
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
            })
            .collect();
        rows.push(RawRow { date_raw, values });
    }

    info!(source = %source_id, rows = rows.len(), columns = headers.len(), "read source");
    Ok(SourceTable {
        source: source_id.to_string(),
        headers,
        rows,
    })
}

/// Write the merged table as `Date, <union columns...>, Source_File`. Dates
/// render as `YYYY-MM`; sentinel dates and null cells render as empty
/// fields.
#[instrument(level = "info", skip(path, table), fields(path = %path.as_ref().display(), rows = table.rows.len()))]
pub fn write_merged<P: AsRef<Path>>(path: P, table: &MergedTable) -> Result<()> {
    let mut wtr = WriterBuilder::new()
        .from_path(path.as_ref())
        .with_context(|| format!("creating {}", path.as_ref().display()))?;

    let mut header_row: Vec<&str> = vec![DATE_COLUMN];
    header_row.extend(table.headers.iter().map(String::as_str));
    header_row.push(PROVENANCE_COLUMN);
    wtr.write_record(&header_row)?;

    for row in &table.rows {
        let date = row
            .date
            .valid()
            .map(|ym| ym.to_string())
            .unwrap_or_default();
        let mut record: Vec<&str> = Vec::with_capacity(table.headers.len() + 2);
        record.push(&date);
        for value in &row.values {
            record.push(value.as_deref().unwrap_or(""));
        }
        record.push(&row.source);
        wtr.write_record(&record)?;
    }
    wtr.flush()?;
    info!("wrote merged table");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{run_pipeline, PipelineConfig};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn reads_sources_in_sorted_path_order() -> Result<()> {
        let dir = tempdir()?;
        fs::write(dir.path().join("b.csv"), "Month,6YO Slpr.\nJan-17,2\n")?;
        fs::write(dir.path().join("a.csv"), "Date,5YO Slpr.\nJan-16,1\nFeb,\n")?;

        let sources = read_source_dir(dir.path())?;
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].source, "a.csv");
        assert_eq!(sources[1].source, "b.csv");

        // First column is the date whatever its header says.
        assert_eq!(sources[0].headers, vec!["5YO Slpr."]);
        assert_eq!(sources[0].rows[0].date_raw, "Jan-16");
        assert_eq!(sources[0].rows[0].values, vec![Some("1".to_string())]);
        // Empty cell reads as null.
        assert_eq!(sources[0].rows[1].values, vec![None]);
        Ok(())
    }

    #[test]
    fn empty_directory_is_fatal() {
        let dir = tempdir().unwrap();
        let err = read_source_dir(dir.path()).unwrap_err();
        assert!(matches!(err, CombineError::NoSources { .. }));
    }

    #[test]
    fn round_trip_through_the_pipeline() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("east.csv"),
            "Date,5YO Slpr.,5YO Slpr\nJan-16,,42\nFeb,7,9\n",
        )?;
        fs::write(dir.path().join("west.csv"), "Date,6YO Slpr.\nDec-15,3\n")?;

        let sources = read_source_dir(dir.path())?;
        let (merged, report) = run_pipeline(&sources, &PipelineConfig::default());
        assert_eq!(report.collisions.len(), 1);

        let out = dir.path().join("combined.csv");
        write_merged(&out, &merged)?;

        let text = fs::read_to_string(&out)?;
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("Date,5YO,6YO,Source_File"));
        assert_eq!(lines.next(), Some("2015-12,,3,west.csv"));
        assert_eq!(lines.next(), Some("2016-01,42,,east.csv"));
        assert_eq!(lines.next(), Some("2016-02,7,,east.csv"));
        Ok(())
    }

    #[test]
    fn sentinel_dates_write_as_empty_fields_at_the_tail() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("a.csv"),
            "Date,5YO Slpr.\nJan-16,1\nnot a month,2\n",
        )?;

        let sources = read_source_dir(dir.path())?;
        let (merged, report) = run_pipeline(&sources, &PipelineConfig::default());
        assert_eq!(report.date_errors, 1);

        let out = dir.path().join("combined.csv");
        write_merged(&out, &merged)?;
        let text = fs::read_to_string(&out)?;
        let last = text.lines().last().unwrap();
        assert_eq!(last, ",2,a.csv");
        Ok(())
    }
}
