//! Shared types for the pairs research workspace
//!
//! Holds the aligned price model, the position alphabet, the error
//! taxonomy and the TOML strategy configuration used by every layer.

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    create_config_template, load_config, save_config, BacktestConfig, FilterConfig,
    SignalConfig, StrategyConfig,
};
pub use error::{PairsError, Result};
pub use types::{is_valid_price, Position, PricePair};

// Re-exported so downstream crates share one calendar type
pub use chrono::NaiveDate;
