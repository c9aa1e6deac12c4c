// src/services/regime.rs
use log::debug;

use crate::models::{CombinedRecord, RegimeLabel, ReturnRecord};

pub const LOW_THRESHOLD: f64 = 0.01;
pub const HIGH_THRESHOLD: f64 = 0.03;

/// Both thresholds belong to Moderate.
pub fn classify_inflation_regime(inflation_rate: f64) -> RegimeLabel {
    if inflation_rate < LOW_THRESHOLD {
        RegimeLabel::Low
    } else if inflation_rate <= HIGH_THRESHOLD {
        RegimeLabel::Moderate
    } else {
        RegimeLabel::High
    }
}

pub fn classify_records(records: &[ReturnRecord]) -> Vec<CombinedRecord> {
    let combined: Vec<CombinedRecord> = records
        .iter()
        .map(|r| CombinedRecord {
            month: r.month,
            nominal_return: r.nominal_return,
            real_return: r.real_return,
            inflation_rate: r.inflation_rate,
            regime: classify_inflation_regime(r.inflation_rate),
        })
        .collect();

    for regime in RegimeLabel::ALL {
        debug!(
            "{}: {} months",
            regime,
            combined.iter().filter(|c| c.regime == regime).count()
        );
    }
    combined
}
