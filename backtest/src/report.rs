// Report output
// Per-day CSV for charting and JSON for the scalar summary

use anyhow::{Context, Result};
use csv::Writer;
use std::io::Write;
use std::path::Path;

use crate::engine::BacktestRun;

const DAILY_HEADER: [&str; 14] = [
    "date",
    "target",
    "reference",
    "alpha",
    "beta",
    "fair_value",
    "spread",
    "z_score",
    "position",
    "trade",
    "pnl",
    "pnl_net",
    "cumulative_gross",
    "cumulative_net",
];

fn optional(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Write one row per trading day; undefined values are empty cells
pub fn write_daily_csv<W: Write>(run: &BacktestRun, writer: W) -> Result<()> {
    let mut writer = Writer::from_writer(writer);
    writer.write_record(DAILY_HEADER)?;

    for record in &run.records {
        let signal = &record.signal;
        let pnl = &record.pnl;
        writer.write_record([
            signal.date.format("%Y-%m-%d").to_string(),
            signal.target_price.to_string(),
            signal.reference_price.to_string(),
            signal.alpha.to_string(),
            signal.beta.to_string(),
            signal.fair_value.to_string(),
            signal.spread.to_string(),
            optional(signal.z_score),
            signal.position.to_string(),
            pnl.trade.to_string(),
            optional(pnl.pnl),
            optional(pnl.pnl_net),
            pnl.cumulative_gross.to_string(),
            pnl.cumulative_net.to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write the per-day CSV to a file
pub fn save_daily_csv(run: &BacktestRun, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_daily_csv(run, file)
}

/// Summary plus run metadata as pretty JSON
pub fn summary_json(run: &BacktestRun) -> Result<String> {
    let value = serde_json::json!({
        "run_id": run.id,
        "target": run.target_symbol,
        "reference": run.reference_symbol,
        "completed_at": run.completed_at,
        "config": run.config,
        "summary": run.summary,
    });
    serde_json::to_string_pretty(&value).context("Failed to serialize summary")
}
