//! Buckets command implementation.

use crate::data;
use anyhow::{Context, Result};
use lectura_portfolio::QuantileBucketer;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Bucket the scores of every traded metric and write the membership table.
///
/// No prices are read; membership is the raw partition before any coverage
/// filtering.
pub(crate) fn write_buckets(scores: &Path, config: Option<&Path>, out: &Path) -> Result<()> {
    let settings = data::load_settings(config)?;
    let horizon = settings.horizon()?;
    let scores = data::load_scores(scores, &horizon)?;

    let book = QuantileBucketer::new(settings.bucket_scheme).bucket_book(
        &scores,
        settings.traded_metrics(),
        &horizon,
    )?;

    let file = File::create(out).with_context(|| format!("cannot create {}", out.display()))?;
    lectura_portfolio::write_buckets(&book, BufWriter::new(file))?;

    println!(
        "Wrote {} holdings in {} cells to {}",
        book.holding_count(),
        book.len(),
        out.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    #[test]
    fn test_writes_membership_table() {
        let dir = tempfile::tempdir().unwrap();
        let scores_path = dir.path().join("scores.csv");
        let mut scores = File::create(&scores_path).unwrap();
        writeln!(scores, "cik,quarter,metric,score").unwrap();
        for quarter in ["2010Q1", "2010Q2"] {
            for cik in 1..=5 {
                writeln!(scores, "{cik},{quarter},diff_jaccard,0.{cik}").unwrap();
            }
        }
        drop(scores);

        let config_path = dir.path().join("settings.json");
        fs::write(
            &config_path,
            r#"{"start": "2010Q1", "end": "2010Q2", "metrics": ["diff_jaccard", "sing_LoughranMcDonald"]}"#,
        )
        .unwrap();

        let out = dir.path().join("buckets.csv");
        write_buckets(&scores_path, Some(&config_path), &out).unwrap();

        let text = fs::read_to_string(&out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("METRIC;QUARTER;BUCKET;CIK;SCORE"));
        // Only 2010Q2 is simulated with a lag of one quarter.
        let rows: Vec<&str> = lines.collect();
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r.contains(";2010Q2;")));
        assert!(rows[0].starts_with("diff_jaccard;2010Q2;Q1;1;"));
    }
}
