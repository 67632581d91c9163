pub mod engine;
pub mod metrics;
pub mod report;
pub mod sweep;

pub use engine::{run_backtest, BacktestReport, BacktestRun, Backtester, DailyRecord, PnlStep};
pub use metrics::{sharpe_ratio, DrawdownCalculator, PerformanceSummary};
pub use report::{save_daily_csv, summary_json, write_daily_csv};
pub use sweep::{run_grid, SweepGrid, SweepResult};
