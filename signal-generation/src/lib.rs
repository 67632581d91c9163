// Signal Generation Framework (Layer 2)
// Turns an aligned price pair into hedge ratios, spread z-scores and positions

pub mod kalman;
pub mod pipeline;
pub mod rolling;
pub mod spread;

pub use kalman::{estimate_hedge_ratios, FilterState, HedgeEstimate};
pub use pipeline::{SignalPipeline, SignalSeries};
pub use rolling::{RollingStats, RollingWindow};
pub use spread::{generate, z_score, PositionRule, SignalPoint, SpreadSignalGenerator};
