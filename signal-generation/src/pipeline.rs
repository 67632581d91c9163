// Signal Generation Pipeline
// Chains the hedge-ratio filter into the spread signal, one trading day at a time

use chrono::NaiveDate;
use common::{Position, PricePair, StrategyConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::kalman::FilterState;
use crate::spread::{SignalPoint, SpreadSignalGenerator};

/// Estimator → signal generator for a single run.
///
/// Owns its filter state; create one pipeline per instrument pair and
/// parameter set.
#[derive(Debug, Clone)]
pub struct SignalPipeline {
    filter: FilterState,
    generator: SpreadSignalGenerator,
}

impl SignalPipeline {
    pub fn new(config: &StrategyConfig) -> Self {
        Self {
            filter: FilterState::initialize(&config.filter),
            generator: SpreadSignalGenerator::new(&config.signal),
        }
    }

    /// Process the next observation in chronological order
    pub fn step(&mut self, date: NaiveDate, target_price: f64, reference_price: f64) -> SignalPoint {
        let (filter, estimate) = self.filter.update(target_price, reference_price);
        self.filter = filter;
        self.generator
            .on_estimate(date, target_price, reference_price, estimate)
    }

    /// Run the full pair through a fresh pipeline
    pub fn run(pair: &PricePair, config: &StrategyConfig) -> SignalSeries {
        let mut pipeline = Self::new(config);
        let window_size = config.signal.window_size;

        if pair.len() < window_size {
            warn!(
                target_symbol = pair.target_symbol(),
                reference_symbol = pair.reference_symbol(),
                observations = pair.len(),
                window_size,
                "Fewer observations than the rolling window; z-scores stay undefined"
            );
        }

        let points: Vec<SignalPoint> = pair
            .observations()
            .map(|(date, y, x)| pipeline.step(date, y, x))
            .collect();

        debug!(
            target_symbol = pair.target_symbol(),
            reference_symbol = pair.reference_symbol(),
            observations = points.len(),
            degenerate_steps = pipeline.generator.degenerate_steps(),
            final_alpha = pipeline.filter.alpha(),
            final_beta = pipeline.filter.beta(),
            "Signal generation complete"
        );

        SignalSeries {
            window_size,
            points,
        }
    }

    pub fn filter_state(&self) -> &FilterState {
        &self.filter
    }

    pub fn position(&self) -> Position {
        self.generator.position()
    }
}

/// Per-day signal output for a whole run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSeries {
    pub window_size: usize,
    pub points: Vec<SignalPoint>,
}

impl SignalSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn alphas(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.alpha).collect()
    }

    pub fn betas(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.beta).collect()
    }

    pub fn spreads(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.spread).collect()
    }

    pub fn z_scores(&self) -> Vec<Option<f64>> {
        self.points.iter().map(|p| p.z_score).collect()
    }

    pub fn positions(&self) -> Vec<Position> {
        self.points.iter().map(|p| p.position).collect()
    }
}
