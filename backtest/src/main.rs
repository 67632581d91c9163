// Pairs Backtest CLI
// Kalman hedge ratio -> spread z-score -> mean-reversion PnL over daily closes

use anyhow::{Context, Result};
use backtest::{run_backtest, run_grid, save_daily_csv, summary_json, BacktestRun, SweepGrid};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use common::{create_config_template, load_config, PricePair, StrategyConfig};
use data_ingestion::{fetch_pair, CsvPriceSource, DateRange};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "pairs-backtest")]
#[command(about = "Kalman-filter pairs trading backtester", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest one parameter set
    Run(RunArgs),

    /// Rank a grid of entry thresholds and rolling windows
    Sweep(SweepArgs),

    /// Write a commented configuration template
    InitConfig {
        #[arg(default_value = "pairs.toml")]
        path: PathBuf,
    },
}

#[derive(Args, Debug, Clone)]
struct DataArgs {
    /// Dependent leg
    #[arg(long, default_value = "PEP")]
    target: String,

    /// Hedge leg
    #[arg(long, default_value = "KO")]
    reference: String,

    /// Directory holding <SYMBOL>.csv price files
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// First date (inclusive)
    #[arg(long, default_value = "2020-01-01")]
    start: NaiveDate,

    /// Last date (exclusive)
    #[arg(long, default_value = "2024-01-01")]
    end: NaiveDate,

    /// TOML strategy configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    data: DataArgs,

    /// Override the z-score entry threshold
    #[arg(long)]
    entry_threshold: Option<f64>,

    /// Override the rolling window size
    #[arg(long)]
    window: Option<usize>,

    /// Override the cost per unit of position change
    #[arg(long)]
    cost: Option<f64>,

    /// Write per-day results to this CSV file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct SweepArgs {
    #[command(flatten)]
    data: DataArgs,

    /// Rows to show
    #[arg(long, default_value_t = 10)]
    top: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    match cli.command {
        Commands::Run(args) => run(args).await,
        Commands::Sweep(args) => sweep(args).await,
        Commands::InitConfig { path } => {
            create_config_template(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("✅ Configuration template written to {}", path.display());
            Ok(())
        }
    }
}

fn strategy_config(data: &DataArgs) -> Result<StrategyConfig> {
    match &data.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Ok(StrategyConfig::default()),
    }
}

/// Fetch both legs; `None` when interrupted
async fn fetch(data: &DataArgs) -> Result<Option<PricePair>> {
    let range = DateRange::new(data.start, data.end)?;
    let source = CsvPriceSource::new(&data.data_dir);

    info!(
        "📥 Loading {} / {} from {}",
        data.target.to_uppercase(),
        data.reference.to_uppercase(),
        source.dir().display()
    );

    tokio::select! {
        result = fetch_pair(&source, &data.target, &data.reference, range) => {
            let pair = result.context("Failed to load price data")?;
            Ok(Some(pair))
        }
        _ = tokio::signal::ctrl_c() => {
            info!("👋 Interrupted, shutting down...");
            Ok(None)
        }
    }
}

async fn run(args: RunArgs) -> Result<()> {
    let mut config = strategy_config(&args.data)?;
    if let Some(threshold) = args.entry_threshold {
        config.signal.entry_threshold = threshold;
    }
    if let Some(window) = args.window {
        config.signal.window_size = window;
    }
    if let Some(cost) = args.cost {
        config.backtest.cost_per_trade = cost;
    }

    let Some(pair) = fetch(&args.data).await? else {
        return Ok(());
    };

    let started = Instant::now();
    let run = run_backtest(&pair, &config)?;

    if let Some(path) = &args.output {
        save_daily_csv(&run, path)?;
        info!("💾 Daily results written to {}", path.display());
    }

    if args.json {
        println!("{}", summary_json(&run)?);
    } else {
        print_summary(&run, started.elapsed().as_secs_f32());
    }

    Ok(())
}

async fn sweep(args: SweepArgs) -> Result<()> {
    let config = strategy_config(&args.data)?;

    let Some(pair) = fetch(&args.data).await? else {
        return Ok(());
    };

    let started = Instant::now();
    let results = run_grid(&pair, &config, &SweepGrid::default())?;

    println!("\n{}", "═".repeat(68));
    println!(
        "🔍 PARAMETER SWEEP: {} / {} ({} days)",
        pair.target_symbol(),
        pair.reference_symbol(),
        pair.len()
    );
    println!("{}", "═".repeat(68));
    println!(
        "   {:>9} {:>7} {:>12} {:>8} {:>8} {:>12}",
        "Threshold", "Window", "Net Profit", "Sharpe", "Trades", "Max DD"
    );
    for result in results.iter().take(args.top) {
        println!(
            "   {:>9.2} {:>7} {:>12.4} {:>8.2} {:>8} {:>12.4}",
            result.entry_threshold,
            result.window_size,
            result.summary.net_profit,
            result.summary.sharpe_ratio,
            result.summary.total_trades,
            result.summary.max_drawdown
        );
    }
    println!("\n⏱️  COMPLETED IN: {:.2}s", started.elapsed().as_secs_f32());

    Ok(())
}

fn print_summary(run: &BacktestRun, elapsed: f32) {
    let summary = &run.summary;
    let first = run.records.first().map(|r| r.signal.date);
    let last = run.records.last().map(|r| r.signal.date);

    println!("\n{}", "═".repeat(68));
    println!("🎯 PAIRS BACKTEST: {} / {}", run.target_symbol, run.reference_symbol);
    println!("{}", "═".repeat(68));

    println!("\n⚙️  Configuration:");
    if let (Some(first), Some(last)) = (first, last) {
        println!("   Period:          {} .. {}", first, last);
    }
    println!("   Entry Threshold: {:.2}", run.config.signal.entry_threshold);
    println!("   Exit Threshold:  {:.2}", run.config.signal.exit_threshold);
    println!("   Window:          {} days", run.config.signal.window_size);
    println!("   Cost per Trade:  {}", run.config.backtest.cost_per_trade);

    println!("\n📊 PERFORMANCE:");
    println!("   ┌──────────────────────────────────────────┐");
    println!("   │ Net Profit:          {:>14.4}      │", summary.net_profit);
    println!("   │ Gross Profit:        {:>14.4}      │", summary.gross_profit);
    println!("   │ Transaction Costs:   {:>14.4}      │", summary.total_costs);
    println!("   │ Sharpe Ratio:        {:>14.2}      │", summary.sharpe_ratio);
    println!("   │ Max Drawdown:        {:>14.4}      │", summary.max_drawdown);
    println!("   └──────────────────────────────────────────┘");

    println!("\n📈 TRADING STATISTICS:");
    println!("   ┌──────────────────────────────────────────┐");
    println!("   │ Total Trades:        {:>14}      │", summary.total_trades);
    println!("   │ Trading Days:        {:>14}      │", summary.trading_days);
    println!("   │ Time in Market:      {:>13.1}%      │", summary.time_in_market * 100.0);
    println!("   └──────────────────────────────────────────┘");

    let verdict = if summary.is_risk_adjusted_profitable() {
        "✅ Profitable with Sharpe above 1"
    } else if summary.is_profitable() {
        "⚠️  Profitable, weak risk-adjusted return"
    } else {
        "❌ Not profitable"
    };
    println!("\n{}", verdict);

    println!("\n{}", "═".repeat(68));
    println!("⏱️  COMPLETED IN: {:.2}s (run {})", elapsed, run.id);
}
