// src/services/returns.rs
use log::debug;

use crate::error::{AnalysisError, Result};
use crate::models::{MonthlyObservation, ReturnRecord, YearMonth};

fn simple_return(month: YearMonth, prior: f64, current: f64) -> Result<f64> {
    if !prior.is_finite() || prior <= 0.0 {
        return Err(AnalysisError::DivisionUndefined { month });
    }
    Ok((current - prior) / prior)
}

/// Month-over-month change of the close. The first month has no prior
/// close and yields nothing.
pub fn nominal_returns(observations: &[MonthlyObservation]) -> Result<Vec<(YearMonth, f64)>> {
    observations
        .windows(2)
        .map(|pair| {
            let r = simple_return(pair[1].month, pair[0].sp500_close, pair[1].sp500_close)?;
            Ok((pair[1].month, r))
        })
        .collect()
}

/// Nominal and real returns for every month after the first.
///
/// Real return uses the linear approximation `nominal - inflation`, not
/// the Fisher relation `(1 + nominal) / (1 + inflation) - 1`. The linear
/// form overstates the magnitude of real returns when rates are large.
pub fn calculate_returns(observations: &[MonthlyObservation]) -> Result<Vec<ReturnRecord>> {
    let nominal = nominal_returns(observations)?;

    let records: Vec<ReturnRecord> = nominal
        .into_iter()
        .zip(observations.iter().skip(1))
        .map(|((month, nominal_return), obs)| ReturnRecord {
            month,
            nominal_return,
            inflation_rate: obs.inflation_rate,
            real_return: nominal_return - obs.inflation_rate,
        })
        .collect();

    debug!("Computed {} return records from {} months", records.len(), observations.len());
    Ok(records)
}
