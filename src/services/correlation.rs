// src/services/correlation.rs
use log::{debug, warn};

use crate::error::{AnalysisError, Result};
use crate::models::{ReturnRecord, RollingCorrelationPoint};

/// Sample Pearson correlation. `None` when the inputs differ in length,
/// hold fewer than two points, or one side has no variation.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    // Compare values, not the sums: the mean of a constant series can
    // round away from that constant.
    let constant = |v: &[f64]| v.iter().all(|e| *e == v[0]);
    if constant(x) || constant(y) {
        return None;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    // Same n - 1 divisor throughout
    let cov = cov / (n - 1.0);
    let denominator = (var_x / (n - 1.0)).sqrt() * (var_y / (n - 1.0)).sqrt();
    Some((cov / denominator).clamp(-1.0, 1.0))
}

/// Trailing correlation of inflation rate against nominal return, one
/// point per record. The first `window - 1` points are undefined.
pub fn rolling_correlation(
    records: &[ReturnRecord],
    window: usize,
) -> Result<Vec<RollingCorrelationPoint>> {
    if window < 2 {
        return Err(AnalysisError::InvalidWindow { window });
    }
    if records.len() < window {
        warn!(
            "Only {} months available, {}-month correlation is undefined throughout",
            records.len(),
            window
        );
    }

    let inflation: Vec<f64> = records.iter().map(|r| r.inflation_rate).collect();
    let nominal: Vec<f64> = records.iter().map(|r| r.nominal_return).collect();

    let points: Vec<RollingCorrelationPoint> = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let correlation = if i + 1 >= window {
                let start = i + 1 - window;
                pearson(&inflation[start..=i], &nominal[start..=i])
            } else {
                None
            };
            RollingCorrelationPoint { month: record.month, window_size: window, correlation }
        })
        .collect();

    debug!(
        "{}-month rolling correlation: {} defined of {}",
        window,
        points.iter().filter(|p| p.correlation.is_some()).count(),
        points.len()
    );
    Ok(points)
}

pub fn defined_points(points: &[RollingCorrelationPoint]) -> Vec<RollingCorrelationPoint> {
    points.iter().filter(|p| p.correlation.is_some()).copied().collect()
}
