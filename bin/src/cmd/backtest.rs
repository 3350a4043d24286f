//! Backtest command implementation.

use crate::OutputFormat;
use crate::data::{self, InputPaths};
use anyhow::{Context, Result};
use lectura_portfolio::{Backtest, BacktestReport, TrackSummary, write_buckets, write_values};
use lectura_traits::BacktestSettings;
use serde_json::json;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

/// File name of the bucket membership dump.
pub(crate) const BUCKETS_FILE: &str = "buckets.csv";

/// File name of the portfolio value table.
pub(crate) const VALUES_FILE: &str = "portfolio_values.csv";

/// Run a backtest over the given inputs.
pub(crate) fn run_backtest(
    inputs: &InputPaths,
    config: Option<&Path>,
    out: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let settings = data::load_settings(config)?;

    if format == OutputFormat::Text {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                       Backtesting                            ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        print_settings(&settings);
    }

    let loaded = data::load_inputs(inputs, &settings)?;
    if format == OutputFormat::Text {
        let universe = &loaded.universe;
        println!(
            "Universe: {} of {} scored companies priced ({} unmapped, {} tickers without prices)",
            universe.retained_companies,
            universe.scored_companies,
            universe.unmapped_companies,
            universe.unpriced_tickers
        );
        println!();
    }

    let backtest = Backtest::new(&settings, &loaded.resolver);
    let buckets = backtest.bucket(&loaded.scores)?;

    if let Some(dir) = out {
        fs::create_dir_all(dir)
            .with_context(|| format!("cannot create output directory {}", dir.display()))?;
        let path = dir.join(BUCKETS_FILE);
        let file = File::create(&path)
            .with_context(|| format!("cannot create {}", path.display()))?;
        write_buckets(&buckets, BufWriter::new(file))?;
        info!(path = %path.display(), "Wrote bucket membership");
    }

    let report = backtest.run_bucketed(buckets, loaded.index.as_ref())?;

    if let Some(dir) = out {
        let path = dir.join(VALUES_FILE);
        let file = File::create(&path)
            .with_context(|| format!("cannot create {}", path.display()))?;
        write_values(&report.simulation, BufWriter::new(file))?;
        info!(path = %path.display(), "Wrote portfolio values");
    }

    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => print_report(&report),
    }

    Ok(())
}

fn print_settings(settings: &BacktestSettings) {
    let metrics: Vec<&str> = settings.traded_metrics().iter().map(|m| m.as_str()).collect();
    println!("Period:    {} to {}", settings.start, settings.end);
    println!(
        "Buckets:   {} ({})",
        settings.bucket_scheme.count(),
        settings.bucket_scheme.prefix()
    );
    println!("Lag:       {} quarter(s)", settings.lag());
    println!("Metrics:   {}", metrics.join(", "));
    println!("Capital:   {:.0}", settings.initial_capital);
    println!("Tax rate:  {:.2}%", settings.tax_rate * 100.0);
    println!();
}

fn print_json(report: &BacktestReport) -> Result<()> {
    let document = json!({
        "quarters": report.simulation.quarters,
        "seed": report.horizon.seed(),
        "coverage": {
            "removed": report.coverage.removed,
            "retained": report.coverage.retained,
            "fragile_cells": report
                .coverage
                .fragile_cells
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
        },
        "benchmark": report.benchmark,
        "summaries": report.summaries,
    });
    let json = serde_json::to_string_pretty(&document)
        .map_err(|e| anyhow::anyhow!("JSON serialization error: {}", e))?;
    println!("{}", json);
    Ok(())
}

fn print_report(report: &BacktestReport) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("BACKTEST RESULTS");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    let quarters = &report.simulation.quarters;
    if let (Some(first), Some(last)) = (quarters.first(), quarters.last()) {
        println!("Simulated: {} to {} ({} quarters)", first, last, quarters.len());
    }
    println!(
        "Coverage:  {} holdings kept, {} removed, {} fragile cells",
        report.coverage.retained,
        report.coverage.removed,
        report.coverage.fragile_cells.len()
    );
    if let Some(benchmark) = &report.benchmark {
        println!(
            "Benchmark: {} {:>+.2}%",
            benchmark.name,
            benchmark.total_return() * 100.0
        );
    }
    println!();

    println!(
        "  {:<24} {:>6} {:>14} {:>9} {:>9} {:>9} {:>7} {:>9} {:>9}",
        "Metric", "Bucket", "Final Value", "Total", "Annual", "Vol", "Sharpe", "Max DD", "Excess"
    );
    println!("  {}", "-".repeat(104));
    for summary in &report.summaries {
        print_summary(summary);
    }
    println!();
}

fn print_summary(summary: &TrackSummary) {
    let excess = summary
        .excess_return
        .map_or_else(|| "N/A".to_string(), |e| format!("{:.2}%", e * 100.0));
    println!(
        "  {:<24} {:>6} {:>14.2} {:>8.2}% {:>8.2}% {:>8.2}% {:>7.2} {:>8.2}% {:>9}",
        summary.metric.as_str(),
        summary.bucket.to_string(),
        summary.final_value,
        summary.total_return * 100.0,
        summary.annualized_return * 100.0,
        summary.annualized_volatility * 100.0,
        summary.sharpe_ratio,
        summary.max_drawdown * 100.0,
        excess
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    /// Five companies over 2010; company `i` trades at `10 * i` on the first
    /// business day of each quarter.
    fn write_inputs(dir: &Path) -> InputPaths {
        let scores = dir.join("scores.csv");
        let prices = dir.join("prices.csv");
        let lookup = dir.join("lookup.csv");

        let mut s = File::create(&scores).unwrap();
        let mut p = File::create(&prices).unwrap();
        let mut l = File::create(&lookup).unwrap();
        writeln!(s, "cik,quarter,metric,score").unwrap();
        writeln!(p, "ticker,date,price,market_cap").unwrap();
        writeln!(l, "cik,ticker").unwrap();

        for cik in 1..=5u32 {
            writeln!(l, "{cik},T{cik}").unwrap();
            for (quarter, date) in [
                ("2010Q1", "2010-01-04"),
                ("2010Q2", "2010-04-01"),
                ("2010Q3", "2010-07-01"),
                ("2010Q4", "2010-10-01"),
            ] {
                writeln!(s, "{cik},{quarter},diff_jaccard,0.{cik}").unwrap();
                let price = 10 * cik;
                writeln!(p, "T{cik},{date},{price},{}", price * 1000).unwrap();
            }
        }

        InputPaths {
            scores,
            prices,
            lookup,
            index: None,
        }
    }

    fn write_config(dir: &Path) -> PathBuf {
        let path = dir.join("settings.json");
        fs::write(
            &path,
            r#"{"start": "2010Q1", "end": "2010Q4", "metrics": ["diff_jaccard", "sing_LoughranMcDonald"]}"#,
        )
        .unwrap();
        path
    }

    #[test]
    fn test_backtest_writes_both_tables() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = write_inputs(dir.path());
        let config = write_config(dir.path());
        let out = dir.path().join("results");

        run_backtest(&inputs, Some(&config), Some(&out), OutputFormat::Json).unwrap();

        let buckets = fs::read_to_string(out.join(BUCKETS_FILE)).unwrap();
        // One metric, five buckets, three simulated quarters, one member each.
        assert_eq!(buckets.lines().count(), 1 + 15);

        let values = fs::read_to_string(out.join(VALUES_FILE)).unwrap();
        assert_eq!(values.lines().count(), 1 + 15);
        assert!(values.lines().nth(1).unwrap().starts_with("diff_jaccard;Q1;2010Q2;"));
    }

    #[test]
    fn test_backtest_reports_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let mut inputs = write_inputs(dir.path());
        inputs.prices = dir.path().join("missing.csv");

        let err = run_backtest(&inputs, None, None, OutputFormat::Text).unwrap_err();
        assert!(err.to_string().contains("cannot load prices"));
    }
}
