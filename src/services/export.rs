// src/services/export.rs
use csv::Writer;
use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::{
    AnnualizedMetrics, MonthlyObservation, RegimeLabel, RegimeSummary, ReturnRecord,
    RollingCorrelationPoint, WealthPoint, YearMonth,
};
use crate::services::pipeline::AnalysisReport;

pub const INFLATION_FILE: &str = "monthly_inflation.csv";
pub const RETURNS_FILE: &str = "monthly_returns.csv";
pub const COMBINED_FILE: &str = "combined.csv";
pub const CORRELATION_FILE: &str = "rolling_correlation.csv";
pub const CUMULATIVE_FILE: &str = "cumulative_returns.csv";
pub const WEALTH_FILE: &str = "regime_wealth.csv";
pub const SUMMARY_FILE: &str = "regime_summary.json";

#[derive(Serialize)]
struct InflationRow {
    month: YearMonth,
    inflation_rate: f64,
}

#[derive(Serialize)]
struct MarketRow {
    month: YearMonth,
    close: f64,
    nominal_return: Option<f64>,
}

#[derive(Serialize)]
struct WealthRow {
    month: YearMonth,
    regime: RegimeLabel,
    wealth: f64,
}

#[derive(Serialize)]
pub struct SummaryReport<'a> {
    pub regimes: &'a [RegimeSummary],
    pub nominal: Option<AnnualizedMetrics>,
    pub real: Option<AnnualizedMetrics>,
}

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    info!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

pub fn write_monthly_inflation(path: &Path, observations: &[MonthlyObservation]) -> Result<()> {
    let rows: Vec<InflationRow> = observations
        .iter()
        .map(|o| InflationRow { month: o.month, inflation_rate: o.inflation_rate })
        .collect();
    write_csv(path, &rows)
}

/// Every month of the window. Returns are taken from `returns`, keyed by
/// month; the first month has none.
pub fn write_monthly_returns(
    path: &Path,
    observations: &[MonthlyObservation],
    returns: &[ReturnRecord],
) -> Result<()> {
    let by_month: BTreeMap<YearMonth, f64> =
        returns.iter().map(|r| (r.month, r.nominal_return)).collect();
    let rows: Vec<MarketRow> = observations
        .iter()
        .map(|o| MarketRow {
            month: o.month,
            close: o.sp500_close,
            nominal_return: by_month.get(&o.month).copied(),
        })
        .collect();
    write_csv(path, &rows)
}

/// One row per regime month, grouped Low to High.
pub fn write_regime_wealth(
    path: &Path,
    paths: &BTreeMap<RegimeLabel, Vec<WealthPoint>>,
) -> Result<()> {
    let rows: Vec<WealthRow> = paths
        .iter()
        .flat_map(|(&regime, points)| {
            points.iter().map(move |p| WealthRow { month: p.month, regime, wealth: p.wealth })
        })
        .collect();
    write_csv(path, &rows)
}

pub fn write_summary(path: &Path, report: &SummaryReport) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json)?;
    info!("Wrote regime summary to {}", path.display());
    Ok(())
}

/// Paths of every artifact written by [`export_all`].
#[derive(Debug, Clone)]
pub struct ExportedFiles {
    pub inflation: PathBuf,
    pub returns: PathBuf,
    pub combined: PathBuf,
    pub correlation: PathBuf,
    pub cumulative: PathBuf,
    pub wealth: PathBuf,
    pub summary: PathBuf,
}

pub fn export_all(output_dir: &Path, report: &AnalysisReport) -> Result<ExportedFiles> {
    fs::create_dir_all(output_dir)?;

    let files = ExportedFiles {
        inflation: output_dir.join(INFLATION_FILE),
        returns: output_dir.join(RETURNS_FILE),
        combined: output_dir.join(COMBINED_FILE),
        correlation: output_dir.join(CORRELATION_FILE),
        cumulative: output_dir.join(CUMULATIVE_FILE),
        wealth: output_dir.join(WEALTH_FILE),
        summary: output_dir.join(SUMMARY_FILE),
    };

    let correlations: Vec<RollingCorrelationPoint> =
        report.correlations.values().flatten().copied().collect();
    let summary = SummaryReport {
        regimes: &report.regimes,
        nominal: report.nominal_metrics,
        real: report.real_metrics,
    };

    write_monthly_inflation(&files.inflation, &report.observations)?;
    write_monthly_returns(&files.returns, &report.observations, &report.returns)?;
    write_csv(&files.combined, &report.combined)?;
    write_csv(&files.correlation, &correlations)?;
    write_csv(&files.cumulative, &report.cumulative)?;
    write_regime_wealth(&files.wealth, &report.wealth_paths)?;
    write_summary(&files.summary, &summary)?;

    Ok(files)
}
