//! Loading of run settings and input tables.

use anyhow::{Context, Result};
use lectura_data::{
    IndexSeries, MarketResolver, PriceTable, ScoreBook, TickerLookup, UniverseReport,
    intersect_universe,
};
use lectura_traits::{BacktestSettings, Horizon};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Paths of the tables a backtest reads.
#[derive(Debug, Clone)]
pub(crate) struct InputPaths {
    pub(crate) scores: PathBuf,
    pub(crate) prices: PathBuf,
    pub(crate) lookup: PathBuf,
    pub(crate) index: Option<PathBuf>,
}

/// Everything loaded for a backtest, after universe intersection.
#[derive(Debug)]
pub(crate) struct LoadedInputs {
    pub(crate) scores: ScoreBook,
    pub(crate) resolver: MarketResolver,
    pub(crate) index: Option<IndexSeries>,
    pub(crate) universe: UniverseReport,
}

/// Reads settings from a JSON file, or returns the defaults.
pub(crate) fn load_settings(path: Option<&Path>) -> Result<BacktestSettings> {
    let settings = match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("cannot open settings {}", path.display()))?;
            BacktestSettings::from_json_reader(BufReader::new(file))
                .with_context(|| format!("invalid settings in {}", path.display()))?
        }
        None => {
            let settings = BacktestSettings::default();
            settings.validate()?;
            settings
        }
    };
    Ok(settings)
}

/// Reads scores and keeps only the quarters of `horizon`.
pub(crate) fn load_scores(path: &Path, horizon: &Horizon) -> Result<ScoreBook> {
    let scores = ScoreBook::from_path(path)
        .with_context(|| format!("cannot load scores from {}", path.display()))?;
    Ok(scores.restricted_to(horizon))
}

/// Loads every input table and narrows the universe to priced companies.
pub(crate) fn load_inputs(paths: &InputPaths, settings: &BacktestSettings) -> Result<LoadedInputs> {
    let horizon = settings.horizon()?;
    let mut scores = load_scores(&paths.scores, &horizon)?;
    let mut lookup = TickerLookup::from_path(&paths.lookup)
        .with_context(|| format!("cannot load lookup from {}", paths.lookup.display()))?;
    let prices = PriceTable::from_path(&paths.prices)
        .with_context(|| format!("cannot load prices from {}", paths.prices.display()))?;
    let index = paths
        .index
        .as_deref()
        .map(|path| {
            IndexSeries::from_path(path)
                .with_context(|| format!("cannot load index from {}", path.display()))
        })
        .transpose()?;

    let universe = intersect_universe(&mut scores, &mut lookup, &prices);
    let resolver = MarketResolver::new(lookup, prices, settings.price_search_days);

    Ok(LoadedInputs {
        scores,
        resolver,
        index,
        universe,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings_without_file() {
        let settings = load_settings(None).unwrap();
        assert_eq!(settings, BacktestSettings::default());
    }

    #[test]
    fn test_settings_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"start": "2011Q1", "end": "2011Q4", "tax_rate": 0.01}}"#).unwrap();

        let settings = load_settings(Some(file.path())).unwrap();
        assert_eq!(settings.start.to_string(), "2011Q1");
        assert_eq!(settings.tax_rate, 0.01);
        assert_eq!(settings.initial_capital, 1_000_000.0);
    }

    #[test]
    fn test_missing_settings_file() {
        let err = load_settings(Some(Path::new("/nonexistent/settings.json"))).unwrap_err();
        assert!(err.to_string().contains("cannot open settings"));
    }
}
