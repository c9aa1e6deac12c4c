// src/models.rs
use serde::{Serialize, Deserialize};
use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// Calendar month key shared by every derived series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(YearMonth { year, month })
        } else {
            None
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        YearMonth { year: date.year(), month: date.month() }
    }

    pub fn next(self) -> Self {
        if self.month == 12 {
            YearMonth { year: self.year + 1, month: 1 }
        } else {
            YearMonth { year: self.year, month: self.month + 1 }
        }
    }

    /// Inclusive range of months from `self` to `end`; empty when `end < self`.
    pub fn through(self, end: YearMonth) -> impl Iterator<Item = YearMonth> {
        std::iter::successors(Some(self), |m| Some(m.next()))
            .take_while(move |m| *m <= end)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got '{}'", s))?;
        let year = year.parse::<i32>().map_err(|e| format!("bad year in '{}': {}", s, e))?;
        let month = month.parse::<u32>().map_err(|e| format!("bad month in '{}': {}", s, e))?;
        YearMonth::new(year, month).ok_or_else(|| format!("month out of range in '{}'", s))
    }
}

impl From<YearMonth> for String {
    fn from(m: YearMonth) -> Self {
        m.to_string()
    }
}

impl TryFrom<String> for YearMonth {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// One raw row from an input file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyValue {
    pub month: YearMonth,
    pub value: f64,
}

/// Aligned CPI rate and month-end close for one month of the window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyObservation {
    pub month: YearMonth,
    pub inflation_rate: f64,
    pub sp500_close: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnRecord {
    pub month: YearMonth,
    pub nominal_return: f64,
    pub inflation_rate: f64,
    pub real_return: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RegimeLabel {
    Low,
    Moderate,
    High,
}

impl RegimeLabel {
    pub const ALL: [RegimeLabel; 3] = [RegimeLabel::Low, RegimeLabel::Moderate, RegimeLabel::High];

    /// Label used on the regime charts.
    pub fn description(&self) -> &'static str {
        match self {
            RegimeLabel::Low => "Low (<1%)",
            RegimeLabel::Moderate => "Moderate (1-3%)",
            RegimeLabel::High => "High (>3%)",
        }
    }
}

impl fmt::Display for RegimeLabel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Row of the combined output table. Field order is the column order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombinedRecord {
    pub month: YearMonth,
    pub nominal_return: f64,
    pub real_return: f64,
    pub inflation_rate: f64,
    pub regime: RegimeLabel,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollingCorrelationPoint {
    pub month: YearMonth,
    pub window_size: usize,
    pub correlation: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegimeSummary {
    pub regime: RegimeLabel,
    pub sample_count: usize,
    pub mean_nominal_return: Option<f64>,
    pub mean_real_return: Option<f64>,
    pub return_volatility: Option<f64>,
    pub real_volatility: Option<f64>,
    pub min_nominal_return: Option<f64>,
    pub max_nominal_return: Option<f64>,
    pub min_real_return: Option<f64>,
    pub max_real_return: Option<f64>,
    pub mean_inflation_rate: Option<f64>,
    pub min_inflation_rate: Option<f64>,
    pub max_inflation_rate: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WealthPoint {
    pub month: YearMonth,
    pub wealth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CumulativePoint {
    pub month: YearMonth,
    pub cumulative_nominal: f64,
    pub cumulative_real: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnnualizedMetrics {
    pub annualized_return: f64,
    pub annualized_volatility: f64,
    pub sharpe_ratio: f64,
}
