// src/config.rs
use dotenv::dotenv;
use log::{debug, info};
use std::env;
use std::path::PathBuf;

use crate::error::{AnalysisError, Result};
use crate::models::YearMonth;

pub const DEFAULT_WINDOWS: [usize; 2] = [36, 60];

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub data_dir: PathBuf,
    pub cpi_file: String,
    pub sp500_file: String,
    pub output_dir: PathBuf,
    /// Explicit analysis window; the overlap of both inputs when unset.
    pub start: Option<YearMonth>,
    pub end: Option<YearMonth>,
    pub correlation_windows: Vec<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            data_dir: PathBuf::from("data/raw"),
            cpi_file: "CPI.csv".to_string(),
            sp500_file: "SP500.csv".to_string(),
            output_dir: PathBuf::from("data/processed"),
            start: None,
            end: None,
            correlation_windows: DEFAULT_WINDOWS.to_vec(),
        }
    }
}

impl AnalysisConfig {
    /// Defaults overridden by any `ANALYSIS_*` variables set in the
    /// environment or a `.env` file.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = AnalysisConfig::default();

        if let Some(dir) = lookup("ANALYSIS_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(file) = lookup("ANALYSIS_CPI_FILE") {
            config.cpi_file = file;
        }
        if let Some(file) = lookup("ANALYSIS_SP500_FILE") {
            config.sp500_file = file;
        }
        if let Some(dir) = lookup("ANALYSIS_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(dir);
        }
        if let Some(start) = lookup("ANALYSIS_START") {
            config.start = Some(parse_month("ANALYSIS_START", &start)?);
        }
        if let Some(end) = lookup("ANALYSIS_END") {
            config.end = Some(parse_month("ANALYSIS_END", &end)?);
        }
        if let Some(windows) = lookup("ANALYSIS_WINDOWS") {
            config.correlation_windows = parse_windows(&windows)?;
        }

        if let (Some(start), Some(end)) = (config.start, config.end) {
            if end < start {
                return Err(AnalysisError::Config(format!(
                    "ANALYSIS_END {} precedes ANALYSIS_START {}", end, start
                )));
            }
        }

        debug!("Resolved configuration: {:?}", config);
        info!(
            "Inputs from {}, outputs to {}",
            config.data_dir.display(),
            config.output_dir.display()
        );
        Ok(config)
    }

    pub fn cpi_path(&self) -> PathBuf {
        self.data_dir.join(&self.cpi_file)
    }

    pub fn sp500_path(&self) -> PathBuf {
        self.data_dir.join(&self.sp500_file)
    }
}

fn parse_month(key: &str, value: &str) -> Result<YearMonth> {
    value
        .parse()
        .map_err(|e| AnalysisError::Config(format!("{}: {}", key, e)))
}

fn parse_windows(value: &str) -> Result<Vec<usize>> {
    let windows = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<usize>()
                .map_err(|e| AnalysisError::Config(format!("ANALYSIS_WINDOWS '{}': {}", s, e)))
        })
        .collect::<Result<Vec<_>>>()?;

    if windows.is_empty() {
        return Err(AnalysisError::Config("ANALYSIS_WINDOWS is empty".to_string()));
    }
    Ok(windows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn unset_variables_keep_defaults() {
        let config = AnalysisConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, AnalysisConfig::default());
        assert_eq!(config.correlation_windows, vec![36, 60]);
        assert_eq!(config.cpi_path(), PathBuf::from("data/raw/CPI.csv"));
    }

    #[test]
    fn overrides_are_applied() {
        let config = AnalysisConfig::from_lookup(lookup_from(&[
            ("ANALYSIS_DATA_DIR", "/tmp/in"),
            ("ANALYSIS_START", "2014-01"),
            ("ANALYSIS_END", "2024-12"),
            ("ANALYSIS_WINDOWS", "12, 24"),
        ]))
        .unwrap();
        assert_eq!(config.sp500_path(), PathBuf::from("/tmp/in/SP500.csv"));
        assert_eq!(config.start, YearMonth::new(2014, 1));
        assert_eq!(config.end, YearMonth::new(2024, 12));
        assert_eq!(config.correlation_windows, vec![12, 24]);
    }

    #[test]
    fn malformed_values_are_rejected() {
        let bad_month = AnalysisConfig::from_lookup(lookup_from(&[("ANALYSIS_START", "Jan 2014")]));
        assert!(matches!(bad_month, Err(AnalysisError::Config(_))));

        let bad_windows = AnalysisConfig::from_lookup(lookup_from(&[("ANALYSIS_WINDOWS", "36,x")]));
        assert!(matches!(bad_windows, Err(AnalysisError::Config(_))));

        let reversed = AnalysisConfig::from_lookup(lookup_from(&[
            ("ANALYSIS_START", "2020-01"),
            ("ANALYSIS_END", "2019-01"),
        ]));
        assert!(matches!(reversed, Err(AnalysisError::Config(_))));
    }
}
