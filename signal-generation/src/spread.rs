use chrono::NaiveDate;
use common::{PairsError, Position, PricePair, SignalConfig};
use serde::{Deserialize, Serialize};

use crate::kalman::HedgeEstimate;
use crate::rolling::{RollingStats, RollingWindow};

/// Threshold rule with a hysteresis band between exit and entry.
///
/// Checks run in a fixed order: short, long, flat, hold. An undefined
/// z-score fails every comparison and therefore holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionRule {
    pub entry_threshold: f64,
    pub exit_threshold: f64,
}

impl PositionRule {
    pub fn new(entry_threshold: f64, exit_threshold: f64) -> Self {
        Self {
            entry_threshold,
            exit_threshold,
        }
    }

    pub fn next(&self, current: Position, z_score: Option<f64>) -> Position {
        let Some(z) = z_score else {
            return current;
        };

        if z > self.entry_threshold {
            Position::Short
        } else if z < -self.entry_threshold {
            Position::Long
        } else if z.abs() < self.exit_threshold {
            Position::Flat
        } else {
            current
        }
    }
}

impl From<&SignalConfig> for PositionRule {
    fn from(config: &SignalConfig) -> Self {
        Self::new(config.entry_threshold, config.exit_threshold)
    }
}

/// Standardize the spread; `None` when the window is not full or its std is degenerate
pub fn z_score(spread: f64, stats: Option<RollingStats>, min_std: f64) -> Option<f64> {
    let stats = stats?;
    if !stats.std_dev.is_finite() || stats.std_dev <= min_std {
        return None;
    }
    Some((spread - stats.mean) / stats.std_dev)
}

/// One trading day of signal output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalPoint {
    pub date: NaiveDate,
    pub target_price: f64,
    pub reference_price: f64,
    pub alpha: f64,
    pub beta: f64,
    pub fair_value: f64,
    pub spread: f64,
    pub rolling_mean: Option<f64>,
    pub rolling_std: Option<f64>,
    pub z_score: Option<f64>,
    pub position: Position,
}

/// Stateful spread → z-score → position scan.
///
/// Consumes the estimator's `(alpha, beta)` one day at a time alongside the raw
/// prices. Carries the rolling window and the current position between calls.
#[derive(Debug, Clone)]
pub struct SpreadSignalGenerator {
    window: RollingWindow,
    rule: PositionRule,
    min_relative_spread_std: f64,
    current_position: Position,
    observations: usize,
    degenerate_steps: usize,
}

impl SpreadSignalGenerator {
    pub fn new(config: &SignalConfig) -> Self {
        Self {
            window: RollingWindow::new(config.window_size),
            rule: PositionRule::from(config),
            min_relative_spread_std: config.min_relative_spread_std,
            current_position: Position::Flat,
            observations: 0,
            degenerate_steps: 0,
        }
    }

    pub fn on_estimate(
        &mut self,
        date: NaiveDate,
        target_price: f64,
        reference_price: f64,
        estimate: HedgeEstimate,
    ) -> SignalPoint {
        let fair_value = estimate.fair_value(reference_price);
        let spread = target_price - fair_value;

        let stats = self.window.push(spread);
        // Filter residue on a perfect hedge scales with price, not with zero
        let min_std = self.min_relative_spread_std * target_price.abs();
        let z = z_score(spread, stats, min_std);
        if stats.is_some() && z.is_none() {
            self.degenerate_steps += 1;
        }

        self.current_position = self.rule.next(self.current_position, z);
        self.observations += 1;

        SignalPoint {
            date,
            target_price,
            reference_price,
            alpha: estimate.alpha,
            beta: estimate.beta,
            fair_value,
            spread,
            rolling_mean: stats.map(|s| s.mean),
            rolling_std: stats.map(|s| s.std_dev),
            z_score: z,
            position: self.current_position,
        }
    }

    pub fn position(&self) -> Position {
        self.current_position
    }

    pub fn observations(&self) -> usize {
        self.observations
    }

    /// Days with a full window whose std was at or below the price-scaled floor
    pub fn degenerate_steps(&self) -> usize {
        self.degenerate_steps
    }

    pub fn window_size(&self) -> usize {
        self.window.capacity()
    }
}

/// Batch form: replay a whole pair with its precomputed estimates
pub fn generate(
    pair: &PricePair,
    estimates: &[HedgeEstimate],
    config: &SignalConfig,
) -> Result<Vec<SignalPoint>, PairsError> {
    if estimates.len() != pair.len() {
        return Err(PairsError::MisalignedSeries {
            left: "prices",
            left_len: pair.len(),
            right: "estimates",
            right_len: estimates.len(),
        });
    }

    let mut generator = SpreadSignalGenerator::new(config);
    Ok(pair
        .observations()
        .zip(estimates)
        .map(|((date, y, x), estimate)| generator.on_estimate(date, y, x, *estimate))
        .collect())
}
