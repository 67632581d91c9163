//! Position / PnL backtest engine.
//!
//! Daily accounting for a spread position:
//!
//! ```text
//! pnl[t]     = position[t-1] * (spread[t] - spread[t-1])     undefined at t = 0
//! trade[t]   = |position[t] - position[t-1]|                 0 at t = 0
//! pnl_net[t] = pnl[t] - cost_per_trade * trade[t]
//! ```
//!
//! The position held going into a day earns that day's move, so a change of
//! `position[t]` can only affect PnL from `t + 1` onwards.

use chrono::{DateTime, Utc};
use common::{BacktestConfig, PairsError, Position, PricePair, StrategyConfig};
use serde::{Deserialize, Serialize};
use signal_generation::{SignalPipeline, SignalPoint};
use tracing::{debug, info};
use uuid::Uuid;

use crate::metrics::{sharpe_ratio, DrawdownCalculator, PerformanceSummary};

/// Accounting for one trading day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PnlStep {
    pub position: Position,
    pub spread: f64,
    /// Spread change since the previous day
    pub spread_change: Option<f64>,
    /// Units of position change (0, 1 or 2)
    pub trade: u8,
    /// Gross PnL from the position carried into the day
    pub pnl: Option<f64>,
    /// PnL after transaction costs
    pub pnl_net: Option<f64>,
    pub cumulative_gross: f64,
    pub cumulative_net: f64,
}

/// Streaming backtester: feed `(position, spread)` once per day in order
#[derive(Debug, Clone)]
pub struct Backtester {
    cost_per_trade: f64,
    periods_per_year: f64,
    previous: Option<(Position, f64)>,
    cumulative_gross: f64,
    cumulative_net: f64,
    total_trades: u64,
    total_costs: f64,
    days: usize,
    days_in_market: usize,
    net_pnl: Vec<f64>,
    drawdown: DrawdownCalculator,
}

impl Backtester {
    pub fn new(config: &BacktestConfig) -> Self {
        Self {
            cost_per_trade: config.cost_per_trade,
            periods_per_year: config.trading_days_per_year,
            previous: None,
            cumulative_gross: 0.0,
            cumulative_net: 0.0,
            total_trades: 0,
            total_costs: 0.0,
            days: 0,
            days_in_market: 0,
            net_pnl: Vec::new(),
            drawdown: DrawdownCalculator::new(),
        }
    }

    pub fn step(&mut self, position: Position, spread: f64) -> PnlStep {
        let (spread_change, trade, pnl, pnl_net) = match self.previous {
            None => (None, 0, None, None),
            Some((previous_position, previous_spread)) => {
                let change = spread - previous_spread;
                let trade = position.units_traded_from(previous_position);
                let pnl = previous_position.as_f64() * change;
                let cost = self.cost_per_trade * f64::from(trade);
                (Some(change), trade, Some(pnl), Some(pnl - cost))
            }
        };

        if let (Some(gross), Some(net)) = (pnl, pnl_net) {
            self.cumulative_gross += gross;
            self.cumulative_net += net;
            self.total_costs += gross - net;
            self.net_pnl.push(net);
        }

        self.total_trades += u64::from(trade);
        self.days += 1;
        if !position.is_flat() {
            self.days_in_market += 1;
        }
        self.drawdown.update(self.cumulative_net);
        self.previous = Some((position, spread));

        PnlStep {
            position,
            spread,
            spread_change,
            trade,
            pnl,
            pnl_net,
            cumulative_gross: self.cumulative_gross,
            cumulative_net: self.cumulative_net,
        }
    }

    /// Summary of everything processed so far
    pub fn summary(&self) -> PerformanceSummary {
        PerformanceSummary {
            net_profit: self.cumulative_net,
            gross_profit: self.cumulative_gross,
            total_costs: self.total_costs,
            sharpe_ratio: sharpe_ratio(&self.net_pnl, self.periods_per_year),
            total_trades: self.total_trades,
            max_drawdown: self.drawdown.max_drawdown(),
            trading_days: self.days,
            time_in_market: if self.days > 0 {
                self.days_in_market as f64 / self.days as f64
            } else {
                0.0
            },
        }
    }

    /// Batch form over aligned position and spread series
    pub fn run(
        config: &BacktestConfig,
        positions: &[Position],
        spreads: &[f64],
    ) -> Result<BacktestReport, PairsError> {
        if positions.len() != spreads.len() {
            return Err(PairsError::MisalignedSeries {
                left: "positions",
                left_len: positions.len(),
                right: "spreads",
                right_len: spreads.len(),
            });
        }

        let mut backtester = Self::new(config);
        let steps = positions
            .iter()
            .zip(spreads.iter())
            .map(|(position, spread)| backtester.step(*position, *spread))
            .collect();

        Ok(BacktestReport {
            steps,
            summary: backtester.summary(),
        })
    }
}

/// Per-day PnL plus the summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub steps: Vec<PnlStep>,
    pub summary: PerformanceSummary,
}

impl BacktestReport {
    pub fn daily_pnl(&self) -> Vec<Option<f64>> {
        self.steps.iter().map(|s| s.pnl).collect()
    }

    pub fn daily_pnl_net(&self) -> Vec<Option<f64>> {
        self.steps.iter().map(|s| s.pnl_net).collect()
    }

    pub fn cumulative_pnl(&self) -> Vec<f64> {
        self.steps.iter().map(|s| s.cumulative_net).collect()
    }

    pub fn trades(&self) -> Vec<u8> {
        self.steps.iter().map(|s| s.trade).collect()
    }
}

/// One row of a full run: signal output joined with its PnL accounting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub signal: SignalPoint,
    pub pnl: PnlStep,
}

/// Complete result of one estimator → signal → backtest run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestRun {
    pub id: Uuid,
    pub target_symbol: String,
    pub reference_symbol: String,
    pub config: StrategyConfig,
    pub completed_at: DateTime<Utc>,
    pub records: Vec<DailyRecord>,
    pub summary: PerformanceSummary,
}

/// Run the whole chain over one price pair
pub fn run_backtest(pair: &PricePair, config: &StrategyConfig) -> Result<BacktestRun, PairsError> {
    config.validate()?;

    let id = Uuid::new_v4();
    debug!(
        run_id = %id,
        target_symbol = pair.target_symbol(),
        reference_symbol = pair.reference_symbol(),
        observations = pair.len(),
        entry_threshold = config.signal.entry_threshold,
        window_size = config.signal.window_size,
        "Starting backtest"
    );

    let signals = SignalPipeline::run(pair, config);
    let mut backtester = Backtester::new(&config.backtest);

    let records: Vec<DailyRecord> = signals
        .points
        .into_iter()
        .map(|signal| {
            let pnl = backtester.step(signal.position, signal.spread);
            DailyRecord { signal, pnl }
        })
        .collect();

    let summary = backtester.summary();

    info!(
        run_id = %id,
        target_symbol = pair.target_symbol(),
        reference_symbol = pair.reference_symbol(),
        net_profit = summary.net_profit,
        sharpe = summary.sharpe_ratio,
        trades = summary.total_trades,
        "Backtest complete"
    );

    Ok(BacktestRun {
        id,
        target_symbol: pair.target_symbol().to_string(),
        reference_symbol: pair.reference_symbol().to_string(),
        config: config.clone(),
        completed_at: Utc::now(),
        records,
        summary,
    })
}
