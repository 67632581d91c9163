//! Error taxonomy shared by every crate in the workspace

use chrono::NaiveDate;
use thiserror::Error;

/// Fatal errors. Numeric edge cases inside the engine (short history,
/// zero rolling variance, flat PnL) are recovered locally and never show up here.
#[derive(Error, Debug)]
pub enum PairsError {
    #[error("No price data available for {symbol}")]
    DataUnavailable { symbol: String },

    #[error("Series are misaligned: {left} has {left_len} entries, {right} has {right_len}")]
    MisalignedSeries {
        left: &'static str,
        left_len: usize,
        right: &'static str,
        right_len: usize,
    },

    #[error("Dates must be strictly increasing: {previous} is followed by {current}")]
    UnorderedDates {
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("Invalid {leg} price {value} on {date}")]
    InvalidPrice {
        leg: &'static str,
        date: NaiveDate,
        value: f64,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, PairsError>;
