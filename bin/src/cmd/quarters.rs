//! Quarters command implementation.

use crate::data;
use anyhow::Result;
use lectura_traits::{Horizon, Quarter};
use std::path::Path;

/// Print the configured horizon, marking lagged and seed quarters.
pub(crate) fn show_quarters(config: Option<&Path>) -> Result<()> {
    let settings = data::load_settings(config)?;
    let horizon = settings.horizon()?;

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                         Horizon                              ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Mode:      {:?}", settings.differentiation_mode);
    println!("Lag:       {} quarter(s)", horizon.lag());
    println!("Seed:      {}", horizon.seed());
    println!();

    for &quarter in horizon.quarters() {
        println!(
            "  {}  {} .. {}  {}",
            quarter,
            quarter.start_date(),
            quarter.end_date(),
            role(&horizon, quarter)
        );
    }
    println!();

    Ok(())
}

fn role(horizon: &Horizon, quarter: Quarter) -> &'static str {
    if quarter == horizon.seed() {
        "seed"
    } else if horizon.is_simulated(quarter) {
        "simulated"
    } else {
        "lag"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles() {
        let start = Quarter::new(2010, 1).unwrap();
        let end = Quarter::new(2011, 2).unwrap();
        let horizon = Horizon::new(start, end, 4).unwrap();

        let roles: Vec<&str> = horizon.quarters().iter().map(|&q| role(&horizon, q)).collect();
        assert_eq!(roles, vec!["lag", "lag", "lag", "lag", "seed", "simulated"]);
    }
}
