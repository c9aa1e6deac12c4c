use anyhow::{Context, Result};
use env_logger;
use log::{info, warn};

use inflation_equity::services::pipeline;
use inflation_equity::AnalysisConfig;

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();
    info!("Logger initialized. Starting inflation/equity analysis...");

    let config = AnalysisConfig::from_env().context("Failed to read configuration")?;
    let (report, files) = pipeline::run(&config).context("Analysis run failed")?;

    for summary in &report.regimes {
        match (summary.mean_nominal_return, summary.mean_real_return) {
            (Some(nominal), Some(real)) => info!(
                "{:<16} n={:<4} nominal {:>7.3}%  real {:>7.3}%  vol {}",
                summary.regime.description(),
                summary.sample_count,
                nominal * 100.0,
                real * 100.0,
                summary
                    .return_volatility
                    .map(|v| format!("{:.3}%", v * 100.0))
                    .unwrap_or_else(|| "n/a".to_string())
            ),
            _ => warn!("{:<16} no months in window", summary.regime.description()),
        }
    }

    for (window, points) in &report.correlations {
        match points.iter().rev().find_map(|p| p.correlation.map(|c| (p.month, c))) {
            Some((month, c)) => info!("Latest {}-month correlation ({}): {:.3}", window, month, c),
            None => warn!("Not enough history for a {}-month correlation", window),
        }
    }

    if let Some(metrics) = report.nominal_metrics {
        info!(
            "Annualized nominal return {:.2}%, volatility {:.2}%, Sharpe {:.2}",
            metrics.annualized_return * 100.0,
            metrics.annualized_volatility * 100.0,
            metrics.sharpe_ratio
        );
    }

    info!("Combined records written to {}", files.combined.display());
    Ok(())
}
