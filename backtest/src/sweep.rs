//! Parallel parameter sweep over entry threshold and rolling window

use common::{PairsError, PricePair, StrategyConfig};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::engine::run_backtest;
use crate::metrics::PerformanceSummary;

/// Parameter combinations to evaluate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepGrid {
    pub entry_thresholds: Vec<f64>,
    pub window_sizes: Vec<usize>,
}

impl Default for SweepGrid {
    fn default() -> Self {
        Self {
            entry_thresholds: vec![1.0, 1.5, 2.0, 2.5, 3.0],
            window_sizes: vec![10, 20, 30, 45, 60],
        }
    }
}

impl SweepGrid {
    /// Every (threshold, window) pair in row-major order
    pub fn combinations(&self) -> Vec<(f64, usize)> {
        self.entry_thresholds
            .iter()
            .flat_map(|threshold| {
                self.window_sizes
                    .iter()
                    .map(move |window| (*threshold, *window))
            })
            .collect()
    }
}

/// Outcome of one grid point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    pub entry_threshold: f64,
    pub window_size: usize,
    pub summary: PerformanceSummary,
}

/// Evaluate the grid in parallel, best Sharpe first (ties by net profit).
///
/// Each grid point runs its own pipeline and filter state.
pub fn run_grid(
    pair: &PricePair,
    base: &StrategyConfig,
    grid: &SweepGrid,
) -> Result<Vec<SweepResult>, PairsError> {
    let combinations = grid.combinations();

    let mut results = combinations
        .par_iter()
        .map(|(entry_threshold, window_size)| {
            let mut config = base.clone();
            config.signal.entry_threshold = *entry_threshold;
            config.signal.window_size = *window_size;
            // Keep the exit inside the band when sweeping low entry thresholds
            config.signal.exit_threshold = config.signal.exit_threshold.min(*entry_threshold);

            run_backtest(pair, &config).map(|run| SweepResult {
                entry_threshold: *entry_threshold,
                window_size: *window_size,
                summary: run.summary,
            })
        })
        .collect::<Result<Vec<_>, PairsError>>()?;

    results.sort_by(|a, b| {
        b.summary
            .sharpe_ratio
            .total_cmp(&a.summary.sharpe_ratio)
            .then(b.summary.net_profit.total_cmp(&a.summary.net_profit))
    });

    if let Some(best) = results.first() {
        info!(
            target_symbol = pair.target_symbol(),
            reference_symbol = pair.reference_symbol(),
            grid_points = results.len(),
            best_threshold = best.entry_threshold,
            best_window = best.window_size,
            best_sharpe = best.summary.sharpe_ratio,
            "Parameter sweep complete"
        );
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_pair() -> PricePair {
        let n = 250;
        let start = NaiveDate::from_ymd_opt(2021, 1, 1).unwrap();
        let dates = (0..n as i64).map(|d| start + chrono::Duration::days(d)).collect();
        let reference: Vec<f64> = (0..n).map(|t| 45.0 + 6.0 * (t as f64 * 0.07).sin()).collect();
        let target: Vec<f64> = reference
            .iter()
            .enumerate()
            .map(|(t, x)| 5.0 + 1.2 * x + 0.8 * ((t * 11) % 9) as f64 / 9.0)
            .collect();
        PricePair::new("PEP", "KO", dates, target, reference).unwrap()
    }

    #[test]
    fn test_default_grid_mirrors_dashboard_ranges() {
        let grid = SweepGrid::default();
        assert_eq!(grid.combinations().len(), 25);
        assert_eq!(grid.combinations()[0], (1.0, 10));
        assert_eq!(grid.combinations()[24], (3.0, 60));
    }

    #[test]
    fn test_run_grid_returns_sorted_results() {
        let grid = SweepGrid {
            entry_thresholds: vec![0.4, 1.5, 2.5],
            window_sizes: vec![10, 30],
        };
        let results = run_grid(&sample_pair(), &StrategyConfig::default(), &grid).unwrap();

        assert_eq!(results.len(), 6);
        for pair in results.windows(2) {
            assert!(pair[0].summary.sharpe_ratio >= pair[1].summary.sharpe_ratio);
        }
        assert!(results.iter().any(|r| r.entry_threshold == 0.4));
    }

    #[test]
    fn test_run_grid_matches_single_run() {
        let pair = sample_pair();
        let grid = SweepGrid {
            entry_thresholds: vec![2.0],
            window_sizes: vec![30],
        };
        let results = run_grid(&pair, &StrategyConfig::default(), &grid).unwrap();
        let single = run_backtest(&pair, &StrategyConfig::default()).unwrap();

        assert_eq!(results[0].summary, single.summary);
    }
}
