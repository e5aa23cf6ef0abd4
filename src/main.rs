use anyhow::Result;
use chartcombine::{
    io::{read_source_dir, write_merged},
    pipeline::{run_pipeline, PipelineConfig},
};
use std::{env, path::PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,chartcombine=info"));
    fmt::Subscriber::builder().with_env_filter(env_filter).init();
    info!("startup");

    // ─── 2) resolve paths and config ─────────────────────────────────
    let mut args = env::args().skip(1);
    let input_dir = PathBuf::from(args.next().unwrap_or_else(|| "data".to_string()));
    let output_path = PathBuf::from(args.next().unwrap_or_else(|| "combined_data.csv".to_string()));
    let config = match env::var("FALLBACK_YEAR").ok().and_then(|y| y.parse().ok()) {
        Some(year) => PipelineConfig {
            fallback_year: year,
            ..Default::default()
        },
        None => PipelineConfig::default(),
    };
    info!(
        input = %input_dir.display(),
        output = %output_path.display(),
        fallback_year = config.fallback_year,
        "configured"
    );

    // ─── 3) read sources (fatal on any unreadable file) ──────────────
    let sources = read_source_dir(&input_dir)?;

    // ─── 4) normalize + reconcile in parallel, then merge ────────────
    let (merged, report) = run_pipeline(&sources, &config);

    // ─── 5) write output and the end-of-run report ───────────────────
    write_merged(&output_path, &merged)?;
    info!(
        rows = merged.stats.rows,
        min_date = ?merged.stats.min_date.map(|d| d.to_string()),
        max_date = ?merged.stats.max_date.map(|d| d.to_string()),
        "combined data saved to {}",
        output_path.display()
    );

    if report.is_clean() {
        info!("no parse errors or column collisions");
    } else {
        warn!(report = %serde_json::to_string_pretty(&report)?, "run report");
    }

    Ok(())
}
