// Example: Hedge ratio tracking
// Feeds a pair whose true slope drifts mid-sample and prints how the
// filter estimate and the spread z-score follow it

use chrono::{Duration, NaiveDate};
use common::{PricePair, StrategyConfig};
use signal_generation::SignalPipeline;

fn noise(rng: &mut fastrand::Rng) -> f64 {
    // Roughly standard normal
    (0..12).map(|_| rng.f64()).sum::<f64>() - 6.0
}

fn main() -> anyhow::Result<()> {
    println!("=== Kalman Hedge Ratio Tracking ===\n");

    let mut rng = fastrand::Rng::with_seed(7);
    let start = NaiveDate::from_ymd_opt(2021, 1, 4).ok_or_else(|| anyhow::anyhow!("bad date"))?;

    let n = 400;
    let mut dates = Vec::with_capacity(n);
    let mut target = Vec::with_capacity(n);
    let mut reference = Vec::with_capacity(n);
    let mut x = 60.0;

    for t in 0..n {
        x += 0.4 * noise(&mut rng);
        x = x.max(10.0);
        let true_beta = if t < n / 2 { 1.5 } else { 2.0 };
        dates.push(start + Duration::days(t as i64));
        reference.push(x);
        target.push(4.0 + true_beta * x + 0.3 * noise(&mut rng));
    }

    let pair = PricePair::new("SYN_Y", "SYN_X", dates, target, reference)?;
    let config = StrategyConfig::default();
    let series = SignalPipeline::run(&pair, &config);

    println!("{:>12} {:>8} {:>8} {:>9} {:>8}", "date", "alpha", "beta", "z", "pos");
    for point in series.points.iter().step_by(25) {
        let z = point
            .z_score
            .map(|z| format!("{:>9.3}", z))
            .unwrap_or_else(|| format!("{:>9}", "-"));
        println!(
            "{:>12} {:>8.3} {:>8.3} {} {:>8}",
            point.date, point.alpha, point.beta, z, point.position
        );
    }

    Ok(())
}
