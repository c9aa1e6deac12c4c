// src/services/pipeline.rs
use log::info;
use std::collections::BTreeMap;

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::models::{
    AnnualizedMetrics, CombinedRecord, CumulativePoint, MonthlyObservation, Observation,
    RegimeLabel, RegimeSummary, ReturnRecord, RollingCorrelationPoint, WealthPoint, YearMonth,
};
use crate::services::export::{export_all, ExportedFiles};
use crate::services::{aggregator, correlation, loader, regime, returns};

#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub observations: Vec<MonthlyObservation>,
    pub returns: Vec<ReturnRecord>,
    pub combined: Vec<CombinedRecord>,
    /// Keyed by window size.
    pub correlations: BTreeMap<usize, Vec<RollingCorrelationPoint>>,
    pub regimes: Vec<RegimeSummary>,
    pub wealth_paths: BTreeMap<RegimeLabel, Vec<WealthPoint>>,
    pub cumulative: Vec<CumulativePoint>,
    pub nominal_metrics: Option<AnnualizedMetrics>,
    pub real_metrics: Option<AnnualizedMetrics>,
}

/// Every stage after file reading: resample, align, returns, regimes,
/// rolling correlations and per-regime statistics.
pub fn analyze(
    cpi: &[Observation],
    prices: &[Observation],
    start: Option<YearMonth>,
    end: Option<YearMonth>,
    windows: &[usize],
) -> Result<AnalysisReport> {
    let monthly_cpi = loader::monthly_cpi(cpi)?;
    let monthly_prices = loader::resample_to_month_end(prices)?;
    let observations = loader::align(&monthly_cpi, &monthly_prices, start, end)?;

    let returns = returns::calculate_returns(&observations)?;
    let combined = regime::classify_records(&returns);

    let mut correlations = BTreeMap::new();
    for &window in windows {
        correlations.insert(window, correlation::rolling_correlation(&returns, window)?);
    }

    let regimes = aggregator::analyze_by_regime(&combined);
    let wealth_paths = aggregator::regime_wealth_paths(&combined);
    let cumulative = aggregator::cumulative_returns(&returns);

    let nominal: Vec<f64> = returns.iter().map(|r| r.nominal_return).collect();
    let real: Vec<f64> = returns.iter().map(|r| r.real_return).collect();

    Ok(AnalysisReport {
        observations,
        returns,
        combined,
        correlations,
        regimes,
        wealth_paths,
        cumulative,
        nominal_metrics: aggregator::annualized_metrics(&nominal),
        real_metrics: aggregator::annualized_metrics(&real),
    })
}

/// Load both input files, analyze them and write every output artifact.
pub fn run(config: &AnalysisConfig) -> Result<(AnalysisReport, ExportedFiles)> {
    info!("Loading CPI from {}", config.cpi_path().display());
    let cpi = loader::load_cpi(&config.cpi_path())?;
    info!("Loading S&P 500 from {}", config.sp500_path().display());
    let prices = loader::load_prices(&config.sp500_path())?;

    let report = analyze(&cpi, &prices, config.start, config.end, &config.correlation_windows)?;

    let files = export_all(&config.output_dir, &report)?;

    info!(
        "Analysis complete: {} months, {} return records",
        report.observations.len(),
        report.returns.len()
    );
    Ok((report, files))
}
