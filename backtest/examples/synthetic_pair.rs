// Example: Synthetic cointegrated pair
// Generates a pair with a mean-reverting residual, serves it from memory and
// runs both a single backtest and the parameter sweep

use backtest::{run_backtest, run_grid, SweepGrid};
use chrono::{Duration, NaiveDate};
use common::StrategyConfig;
use data_ingestion::{fetch_pair, DateRange, InMemoryPriceSource, PriceHistory};

fn noise(rng: &mut fastrand::Rng) -> f64 {
    (0..12).map(|_| rng.f64()).sum::<f64>() - 6.0
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let mut rng = fastrand::Rng::with_seed(42);
    let start = NaiveDate::from_ymd_opt(2020, 1, 1).ok_or_else(|| anyhow::anyhow!("bad date"))?;

    let mut x = 55.0;
    let mut residual = 0.0;
    let mut reference = Vec::new();
    let mut target = Vec::new();

    for t in 0..1000 {
        let date = start + Duration::days(t);
        x = (x + 0.5 * noise(&mut rng)).max(5.0);
        // Ornstein-Uhlenbeck residual around the hedge line
        residual = 0.9 * residual + 0.8 * noise(&mut rng);
        reference.push((date, x));
        target.push((date, 10.0 + 1.3 * x + residual));
    }

    let source = InMemoryPriceSource::new()
        .with_history(PriceHistory::new("SYN_Y", target))
        .with_history(PriceHistory::new("SYN_X", reference));

    let range = DateRange::new(start, start + Duration::days(1000))?;
    let pair = fetch_pair(&source, "SYN_Y", "SYN_X", range).await?;

    let run = run_backtest(&pair, &StrategyConfig::default())?;
    println!("Net Profit:   {:.4}", run.summary.net_profit);
    println!("Sharpe Ratio: {:.2}", run.summary.sharpe_ratio);
    println!("Total Trades: {}", run.summary.total_trades);

    println!("\nTop sweep results:");
    for result in run_grid(&pair, &StrategyConfig::default(), &SweepGrid::default())?
        .iter()
        .take(5)
    {
        println!(
            "  threshold {:.1} window {:>2}: sharpe {:>6.2} net {:>9.4} trades {}",
            result.entry_threshold,
            result.window_size,
            result.summary.sharpe_ratio,
            result.summary.net_profit,
            result.summary.total_trades
        );
    }

    Ok(())
}
