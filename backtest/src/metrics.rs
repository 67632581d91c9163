//! Performance metrics for a spread backtest

use serde::{Deserialize, Serialize};
use statrs::statistics::{Data, Distribution};

/// Scalar outcome of one backtest run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// Final cumulative PnL after transaction costs
    pub net_profit: f64,

    /// Final cumulative PnL before transaction costs
    pub gross_profit: f64,

    /// Total transaction costs paid
    pub total_costs: f64,

    /// Annualized Sharpe ratio of daily net PnL (0 when volatility is zero)
    pub sharpe_ratio: f64,

    /// Units of position change over the run
    pub total_trades: u64,

    /// Largest peak-to-trough decline of cumulative net PnL (absolute)
    pub max_drawdown: f64,

    /// Number of trading days processed
    pub trading_days: usize,

    /// Fraction of days holding a non-flat position (0.0 to 1.0)
    pub time_in_market: f64,
}

impl PerformanceSummary {
    /// Create empty summary
    pub fn empty() -> Self {
        Self {
            net_profit: 0.0,
            gross_profit: 0.0,
            total_costs: 0.0,
            sharpe_ratio: 0.0,
            total_trades: 0,
            max_drawdown: 0.0,
            trading_days: 0,
            time_in_market: 0.0,
        }
    }

    pub fn is_profitable(&self) -> bool {
        self.net_profit > 0.0
    }

    /// Profitable with a Sharpe ratio above 1
    pub fn is_risk_adjusted_profitable(&self) -> bool {
        self.sharpe_ratio > 1.0 && self.net_profit > 0.0
    }
}

impl Default for PerformanceSummary {
    fn default() -> Self {
        Self::empty()
    }
}

/// Annualized Sharpe ratio of a daily PnL series.
///
/// Uses the sample standard deviation. Returns 0 when fewer than two values
/// exist, when every value is identical, or when the deviation is zero or
/// not finite.
pub fn sharpe_ratio(daily_pnl: &[f64], periods_per_year: f64) -> f64 {
    if daily_pnl.len() < 2 {
        return 0.0;
    }

    let first = daily_pnl[0];
    if daily_pnl.iter().all(|v| *v == first) {
        return 0.0;
    }

    let data = Data::new(daily_pnl.to_vec());
    let mean = data.mean().unwrap_or(0.0);
    let std_dev = data.std_dev().unwrap_or(0.0);

    if std_dev == 0.0 || !std_dev.is_finite() {
        return 0.0;
    }

    (mean / std_dev) * periods_per_year.sqrt()
}

/// Drawdown tracking over a cumulative PnL curve that starts at zero
#[derive(Debug, Clone)]
pub struct DrawdownCalculator {
    peak: f64,
    max_drawdown: f64,
    current_value: f64,
}

impl DrawdownCalculator {
    pub fn new() -> Self {
        Self {
            peak: 0.0,
            max_drawdown: 0.0,
            current_value: 0.0,
        }
    }

    /// Update with the latest cumulative value
    pub fn update(&mut self, value: f64) {
        self.current_value = value;

        if value > self.peak {
            self.peak = value;
        }

        let drawdown = self.peak - value;
        if drawdown > self.max_drawdown {
            self.max_drawdown = drawdown;
        }
    }

    pub fn max_drawdown(&self) -> f64 {
        self.max_drawdown
    }

    pub fn current_drawdown(&self) -> f64 {
        self.peak - self.current_value
    }
}

impl Default for DrawdownCalculator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sharpe_constant_series_is_zero() {
        assert_eq!(sharpe_ratio(&[0.0; 50], 252.0), 0.0);
        assert_eq!(sharpe_ratio(&[0.1; 50], 252.0), 0.0);
        assert_eq!(sharpe_ratio(&[-0.005; 3], 252.0), 0.0);
    }

    #[test]
    fn test_sharpe_short_series_is_zero() {
        assert_eq!(sharpe_ratio(&[], 252.0), 0.0);
        assert_eq!(sharpe_ratio(&[1.5], 252.0), 0.0);
    }

    #[test]
    fn test_sharpe_matches_hand_calculation() {
        let pnl = [1.0, 2.0, 3.0, 4.0];
        // mean 2.5, sample std sqrt(5/3)
        let expected = 2.5 / (5.0_f64 / 3.0).sqrt() * 252.0_f64.sqrt();
        assert!((sharpe_ratio(&pnl, 252.0) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_sharpe_sign_follows_mean() {
        assert!(sharpe_ratio(&[-1.0, -2.0, 0.5], 252.0) < 0.0);
        assert!(sharpe_ratio(&[1.0, 2.0, -0.5], 252.0) > 0.0);
    }

    #[test]
    fn test_drawdown_calculator() {
        let mut calc = DrawdownCalculator::new();

        calc.update(1.0);
        assert_eq!(calc.max_drawdown(), 0.0);

        calc.update(0.25);
        assert_eq!(calc.current_drawdown(), 0.75);
        assert_eq!(calc.max_drawdown(), 0.75);

        calc.update(0.5);
        assert_eq!(calc.current_drawdown(), 0.5);
        assert_eq!(calc.max_drawdown(), 0.75); // Max stays

        calc.update(2.0);
        assert_eq!(calc.current_drawdown(), 0.0);
    }

    #[test]
    fn test_drawdown_from_initial_losses() {
        let mut calc = DrawdownCalculator::new();
        calc.update(-0.5);
        calc.update(-1.0);
        assert_eq!(calc.max_drawdown(), 1.0);
    }
}
