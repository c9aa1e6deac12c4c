// src/services/aggregator.rs
use log::{info, warn};
use std::collections::BTreeMap;

use crate::models::{
    AnnualizedMetrics, CombinedRecord, CumulativePoint, RegimeLabel, RegimeSummary, ReturnRecord,
    WealthPoint,
};

const MONTHS_PER_YEAR: f64 = 12.0;

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (divisor n - 1).
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

fn summarize(regime: RegimeLabel, members: &[&CombinedRecord]) -> RegimeSummary {
    let nominal: Vec<f64> = members.iter().map(|r| r.nominal_return).collect();
    let real: Vec<f64> = members.iter().map(|r| r.real_return).collect();
    let inflation: Vec<f64> = members.iter().map(|r| r.inflation_rate).collect();

    RegimeSummary {
        regime,
        sample_count: members.len(),
        mean_nominal_return: mean(&nominal),
        mean_real_return: mean(&real),
        return_volatility: sample_std(&nominal),
        real_volatility: sample_std(&real),
        min_nominal_return: min(&nominal),
        max_nominal_return: max(&nominal),
        min_real_return: min(&real),
        max_real_return: max(&real),
        mean_inflation_rate: mean(&inflation),
        min_inflation_rate: min(&inflation),
        max_inflation_rate: max(&inflation),
    }
}

/// One summary per regime, Low to High, including empty regimes.
pub fn analyze_by_regime(records: &[CombinedRecord]) -> Vec<RegimeSummary> {
    RegimeLabel::ALL
        .iter()
        .map(|&regime| {
            let members: Vec<&CombinedRecord> =
                records.iter().filter(|r| r.regime == regime).collect();
            let summary = summarize(regime, &members);
            match summary.mean_nominal_return {
                Some(m) => info!(
                    "{}: {} months, mean nominal {:.4}, mean real {:.4}",
                    regime,
                    summary.sample_count,
                    m,
                    summary.mean_real_return.unwrap_or_default()
                ),
                None => warn!("{}: no months in this regime", regime),
            }
            summary
        })
        .collect()
}

/// Running wealth index per regime over that regime's months only.
/// Paths skip the months of other regimes, so they are not comparable
/// with each other.
pub fn regime_wealth_paths(records: &[CombinedRecord]) -> BTreeMap<RegimeLabel, Vec<WealthPoint>> {
    let mut paths: BTreeMap<RegimeLabel, Vec<WealthPoint>> = BTreeMap::new();
    for record in records {
        let path = paths.entry(record.regime).or_default();
        let prior = path.last().map(|p| p.wealth).unwrap_or(1.0);
        path.push(WealthPoint {
            month: record.month,
            wealth: prior * (1.0 + record.nominal_return),
        });
    }
    paths
}

/// Compounded nominal and real return since the start of the series.
pub fn cumulative_returns(records: &[ReturnRecord]) -> Vec<CumulativePoint> {
    let mut nominal_growth = 1.0;
    let mut real_growth = 1.0;
    records
        .iter()
        .map(|r| {
            nominal_growth *= 1.0 + r.nominal_return;
            real_growth *= 1.0 + r.real_return;
            CumulativePoint {
                month: r.month,
                cumulative_nominal: nominal_growth - 1.0,
                cumulative_real: real_growth - 1.0,
            }
        })
        .collect()
}

/// Annualized from monthly returns: `(1 + mean)^12 - 1` and `std * sqrt(12)`.
pub fn annualized_metrics(monthly_returns: &[f64]) -> Option<AnnualizedMetrics> {
    let m = mean(monthly_returns)?;
    let std = sample_std(monthly_returns)?;

    let annualized_return = (1.0 + m).powf(MONTHS_PER_YEAR) - 1.0;
    let annualized_volatility = std * MONTHS_PER_YEAR.sqrt();
    let sharpe_ratio = if annualized_volatility != 0.0 {
        annualized_return / annualized_volatility
    } else {
        0.0
    };

    Some(AnnualizedMetrics { annualized_return, annualized_volatility, sharpe_ratio })
}
