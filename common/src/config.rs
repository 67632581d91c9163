//! Strategy configuration

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::{PairsError, Result};

/// Overall configuration for one pairs-trading run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Hedge-ratio filter hyperparameters
    #[serde(default)]
    pub filter: FilterConfig,

    /// Spread / z-score / position rules
    #[serde(default)]
    pub signal: SignalConfig,

    /// PnL accounting
    #[serde(default)]
    pub backtest: BacktestConfig,
}

impl StrategyConfig {
    /// Reject parameter combinations the engine cannot interpret
    pub fn validate(&self) -> Result<()> {
        self.filter.validate()?;
        self.signal.validate()?;
        self.backtest.validate()?;
        Ok(())
    }
}

/// Kalman filter hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Q scale: per-step drift variance of alpha and beta (Q = q·I)
    #[serde(default = "default_process_noise")]
    pub process_noise: f64,

    /// R: observation noise variance of the price relationship
    #[serde(default = "default_observation_noise")]
    pub observation_noise: f64,

    /// Diagonal of the initial covariance (uninformative prior)
    #[serde(default = "default_initial_covariance")]
    pub initial_covariance: f64,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            process_noise: 1e-4,
            observation_noise: 0.01,
            initial_covariance: 1000.0,
        }
    }
}

impl FilterConfig {
    fn validate(&self) -> Result<()> {
        if !self.process_noise.is_finite() || self.process_noise < 0.0 {
            return Err(invalid(format!(
                "filter.process_noise must be >= 0, got {}",
                self.process_noise
            )));
        }
        if !self.observation_noise.is_finite() || self.observation_noise <= 0.0 {
            return Err(invalid(format!(
                "filter.observation_noise must be > 0, got {}",
                self.observation_noise
            )));
        }
        if !self.initial_covariance.is_finite() || self.initial_covariance <= 0.0 {
            return Err(invalid(format!(
                "filter.initial_covariance must be > 0, got {}",
                self.initial_covariance
            )));
        }
        Ok(())
    }
}

fn default_process_noise() -> f64 {
    1e-4
}

fn default_observation_noise() -> f64 {
    0.01
}

fn default_initial_covariance() -> f64 {
    1000.0
}

/// Signal generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalConfig {
    /// |z| above this opens a position
    #[serde(default = "default_entry_threshold")]
    pub entry_threshold: f64,

    /// |z| below this closes the position
    #[serde(default = "default_exit_threshold")]
    pub exit_threshold: f64,

    /// Rolling window (trading days) for spread mean and std
    #[serde(default = "default_window_size")]
    pub window_size: usize,

    /// Rolling std at or below this fraction of the target price is treated
    /// as zero; `0` means only an exactly flat spread is degenerate
    #[serde(default = "default_min_relative_spread_std")]
    pub min_relative_spread_std: f64,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            entry_threshold: 2.0,
            exit_threshold: 0.5,
            window_size: 30,
            min_relative_spread_std: 1e-6,
        }
    }
}

impl SignalConfig {
    fn validate(&self) -> Result<()> {
        if self.window_size < 2 {
            return Err(invalid(format!(
                "signal.window_size must be >= 2, got {}",
                self.window_size
            )));
        }
        if !self.entry_threshold.is_finite() || self.entry_threshold <= 0.0 {
            return Err(invalid(format!(
                "signal.entry_threshold must be > 0, got {}",
                self.entry_threshold
            )));
        }
        if !self.exit_threshold.is_finite()
            || self.exit_threshold < 0.0
            || self.exit_threshold > self.entry_threshold
        {
            return Err(invalid(format!(
                "signal.exit_threshold must be within [0, {}], got {}",
                self.entry_threshold, self.exit_threshold
            )));
        }
        if !self.min_relative_spread_std.is_finite() || self.min_relative_spread_std < 0.0 {
            return Err(invalid(format!(
                "signal.min_relative_spread_std must be >= 0, got {}",
                self.min_relative_spread_std
            )));
        }
        Ok(())
    }
}

fn default_entry_threshold() -> f64 {
    2.0
}

fn default_exit_threshold() -> f64 {
    0.5
}

fn default_window_size() -> usize {
    30
}

fn default_min_relative_spread_std() -> f64 {
    1e-6
}

/// Backtest accounting settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Cost charged per unit of position change
    #[serde(default = "default_cost_per_trade")]
    pub cost_per_trade: f64,

    /// Annualization factor for the Sharpe ratio
    #[serde(default = "default_trading_days_per_year")]
    pub trading_days_per_year: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            cost_per_trade: 0.005,
            trading_days_per_year: 252.0,
        }
    }
}

impl BacktestConfig {
    fn validate(&self) -> Result<()> {
        if !self.cost_per_trade.is_finite() || self.cost_per_trade < 0.0 {
            return Err(invalid(format!(
                "backtest.cost_per_trade must be >= 0, got {}",
                self.cost_per_trade
            )));
        }
        if !self.trading_days_per_year.is_finite() || self.trading_days_per_year <= 0.0 {
            return Err(invalid(format!(
                "backtest.trading_days_per_year must be > 0, got {}",
                self.trading_days_per_year
            )));
        }
        Ok(())
    }
}

fn default_cost_per_trade() -> f64 {
    0.005
}

fn default_trading_days_per_year() -> f64 {
    252.0
}

fn invalid(message: String) -> PairsError {
    PairsError::InvalidConfig(message)
}

/// Load and validate configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<StrategyConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let config: StrategyConfig = toml::from_str(&content)?;
    config.validate()?;
    info!(path = %path.display(), "Loaded strategy configuration");
    Ok(config)
}

/// Save configuration to a TOML file
pub fn save_config(config: &StrategyConfig, path: impl AsRef<Path>) -> Result<()> {
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Create a default configuration file template
pub fn create_config_template(path: impl AsRef<Path>) -> Result<()> {
    let template = "# Pairs Trading Strategy Configuration
# Kalman hedge ratio -> spread z-score -> mean-reversion backtest

[filter]
# Per-step drift variance of intercept and slope (Q = process_noise * I)
process_noise = 0.0001

# Observation noise variance (R)
observation_noise = 0.01

# Initial covariance diagonal (large = uninformative prior)
initial_covariance = 1000.0

[signal]
# Open a position when |z| exceeds this
entry_threshold = 2.0

# Close the position when |z| falls below this
exit_threshold = 0.5

# Rolling window for spread mean/std (trading days)
window_size = 30

# Rolling std at or below this fraction of the target price counts as zero
# variance (0 = only an exactly flat spread)
min_relative_spread_std = 1e-6

[backtest]
# Cost per unit of position change
cost_per_trade = 0.005

# Annualization factor for the Sharpe ratio
trading_days_per_year = 252.0
";

    std::fs::write(path, template)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("{}-{}.toml", name, uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_default_config() {
        let config = StrategyConfig::default();
        assert_eq!(config.signal.entry_threshold, 2.0);
        assert_eq!(config.signal.window_size, 30);
        assert_eq!(config.backtest.cost_per_trade, 0.005);
        assert_eq!(config.filter.initial_covariance, 1000.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let mut config = StrategyConfig::default();
        config.signal.window_size = 45;
        config.backtest.cost_per_trade = 0.01;

        let serialized = toml::to_string(&config).unwrap();
        let deserialized: StrategyConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: StrategyConfig = toml::from_str("[signal]\nentry_threshold = 1.5\n").unwrap();
        assert_eq!(config.signal.entry_threshold, 1.5);
        assert_eq!(config.signal.exit_threshold, 0.5);
        assert_eq!(config.filter, FilterConfig::default());
        assert_eq!(config.backtest, BacktestConfig::default());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = StrategyConfig::default();
        config.signal.window_size = 1;
        assert!(matches!(config.validate(), Err(PairsError::InvalidConfig(_))));

        let mut config = StrategyConfig::default();
        config.signal.exit_threshold = 3.0;
        assert!(config.validate().is_err());

        let mut config = StrategyConfig::default();
        config.filter.observation_noise = 0.0;
        assert!(config.validate().is_err());

        let mut config = StrategyConfig::default();
        config.backtest.cost_per_trade = -0.01;
        assert!(config.validate().is_err());

        let mut config = StrategyConfig::default();
        config.signal.min_relative_spread_std = -1e-6;
        assert!(config.validate().is_err());

        let mut config = StrategyConfig::default();
        config.signal.min_relative_spread_std = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_template_loads_as_default() {
        let path = temp_path("pairs-template");
        create_config_template(&path).unwrap();
        let loaded = load_config(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, StrategyConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("pairs-saved");
        let mut config = StrategyConfig::default();
        config.signal.entry_threshold = 2.5;

        save_config(&config, &path).unwrap();
        let loaded = load_config(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.signal.entry_threshold, 2.5);
    }
}
