// src/services/loader.rs
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{AnalysisError, Result};
use crate::models::{MonthlyObservation, MonthlyValue, Observation, YearMonth};

pub const CPI_SERIES: &str = "CPI";
pub const PRICE_SERIES: &str = "S&P 500";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y", "%Y/%m/%d"];
const RATE_COLUMNS: &[&str] = &["rate", "actual", "inflation_rate"];

/// Parse a date in any of the accepted formats. Date-time values keep
/// only their date part.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.split(|c| c == 'T' || c == ' ').next().unwrap_or(raw);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}

fn find_column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
}

fn require_column(headers: &StringRecord, names: &[&'static str], source: &str) -> Result<usize> {
    find_column(headers, names).ok_or_else(|| AnalysisError::MissingColumn {
        file: source.to_string(),
        column: names[0],
    })
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

fn field<'r>(record: &'r StringRecord, idx: usize) -> &'r str {
    record.get(idx).unwrap_or("").trim()
}

fn parse_value(raw: &str, line: u64) -> Result<f64> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(AnalysisError::InvalidValue { line, value: raw.to_string() }),
    }
}

fn parse_date_field(raw: &str, line: u64) -> Result<NaiveDate> {
    parse_date(raw).ok_or_else(|| AnalysisError::InvalidDate { line, value: raw.to_string() })
}

#[derive(Clone, Copy)]
enum CpiDateColumns {
    Single(usize),
    Split { year: usize, month: usize, day: usize },
}

/// Read CPI rows. Dates come from a `date` column or from split
/// `Year`/`Month`/`Day` columns.
pub fn read_cpi<R: Read>(reader: R, source: &str) -> Result<Vec<Observation>> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let dates = match find_column(&headers, &["date"]) {
        Some(idx) => CpiDateColumns::Single(idx),
        None => CpiDateColumns::Split {
            year: require_column(&headers, &["year"], source)?,
            month: require_column(&headers, &["month"], source)?,
            day: require_column(&headers, &["day"], source)?,
        },
    };
    let idx_rate = require_column(&headers, RATE_COLUMNS, source)?;

    let mut observations = Vec::new();
    for record in rdr.records() {
        let row = record?;
        if row.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let line = line_of(&row);

        let date = match dates {
            CpiDateColumns::Single(idx) => parse_date_field(field(&row, idx), line)?,
            CpiDateColumns::Split { year, month, day } => {
                let (y, m, d) = (field(&row, year), field(&row, month), field(&row, day));
                let raw = format!("{}-{}-{}", y, m, d);
                let parsed = match (y.parse::<i32>(), m.parse::<u32>(), d.parse::<u32>()) {
                    (Ok(y), Ok(m), Ok(d)) => NaiveDate::from_ymd_opt(y, m, d),
                    _ => None,
                };
                parsed.ok_or(AnalysisError::InvalidDate { line, value: raw })?
            }
        };
        let value = parse_value(field(&row, idx_rate), line)?;
        observations.push(Observation { date, value });
    }

    info!("Read {} CPI rows from {}", observations.len(), source);
    Ok(observations)
}

pub fn read_prices<R: Read>(reader: R, source: &str) -> Result<Vec<Observation>> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let headers = rdr.headers()?.clone();
    let idx_date = require_column(&headers, &["date"], source)?;
    let idx_close = require_column(&headers, &["close"], source)?;

    let mut observations = Vec::new();
    for record in rdr.records() {
        let row = record?;
        if row.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let line = line_of(&row);
        let date = parse_date_field(field(&row, idx_date), line)?;
        let value = parse_value(field(&row, idx_close), line)?;
        observations.push(Observation { date, value });
    }

    info!("Read {} price rows from {}", observations.len(), source);
    Ok(observations)
}

pub fn load_cpi(path: &Path) -> Result<Vec<Observation>> {
    let file = File::open(path)?;
    read_cpi(file, &path.display().to_string())
}

pub fn load_prices(path: &Path) -> Result<Vec<Observation>> {
    let file = File::open(path)?;
    read_prices(file, &path.display().to_string())
}

/// Input order is never repaired here; out-of-order rows are an error.
fn ensure_increasing(observations: &[Observation]) -> Result<()> {
    for pair in observations.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(AnalysisError::UnsortedInput {
                previous: pair[0].date,
                found: pair[1].date,
            });
        }
    }
    Ok(())
}

/// Last observed close of each calendar month.
pub fn resample_to_month_end(daily: &[Observation]) -> Result<Vec<MonthlyValue>> {
    ensure_increasing(daily)?;

    let mut monthly: Vec<MonthlyValue> = Vec::new();
    for obs in daily {
        let month = YearMonth::from_date(obs.date);
        match monthly.last_mut() {
            Some(last) if last.month == month => last.value = obs.value,
            _ => monthly.push(MonthlyValue { month, value: obs.value }),
        }
    }

    debug!("Resampled {} daily rows into {} months", daily.len(), monthly.len());
    Ok(monthly)
}

/// Key CPI rows by calendar month, whatever day of the month they carry.
pub fn monthly_cpi(observations: &[Observation]) -> Result<Vec<MonthlyValue>> {
    ensure_increasing(observations)?;

    let mut monthly: Vec<MonthlyValue> = Vec::with_capacity(observations.len());
    for obs in observations {
        let month = YearMonth::from_date(obs.date);
        if monthly.last().map(|m| m.month) == Some(month) {
            return Err(AnalysisError::DuplicateMonth { month });
        }
        monthly.push(MonthlyValue { month, value: obs.value });
    }
    Ok(monthly)
}

/// Join both monthly series over the analysis window. `start`/`end`
/// default to the overlap of the two series; every month inside the
/// window must be present on both sides.
pub fn align(
    cpi: &[MonthlyValue],
    prices: &[MonthlyValue],
    start: Option<YearMonth>,
    end: Option<YearMonth>,
) -> Result<Vec<MonthlyObservation>> {
    let bounds = |series: &[MonthlyValue], name: &'static str| -> Result<(YearMonth, YearMonth)> {
        match (series.first(), series.last()) {
            (Some(first), Some(last)) => Ok((first.month, last.month)),
            _ => match start {
                Some(month) => Err(AnalysisError::MissingData { month, series: name }),
                None => Err(AnalysisError::EmptySeries { series: name }),
            },
        }
    };
    let (cpi_first, cpi_last) = bounds(cpi, CPI_SERIES)?;
    let (price_first, price_last) = bounds(prices, PRICE_SERIES)?;

    let first = start.unwrap_or_else(|| cpi_first.max(price_first));
    let last = end.unwrap_or_else(|| cpi_last.min(price_last));

    let cpi_by_month: BTreeMap<YearMonth, f64> = cpi.iter().map(|m| (m.month, m.value)).collect();
    let price_by_month: BTreeMap<YearMonth, f64> =
        prices.iter().map(|m| (m.month, m.value)).collect();
    let missing = |month: YearMonth| {
        let series = if cpi_by_month.contains_key(&month) { PRICE_SERIES } else { CPI_SERIES };
        AnalysisError::MissingData { month, series }
    };

    if last < first {
        return Err(match (start, end) {
            (Some(_), Some(_)) => AnalysisError::Config(format!(
                "window end {} precedes start {}", last, first
            )),
            // A single explicit bound lies outside the data
            (Some(month), None) | (None, Some(month)) => missing(month),
            // Disjoint inputs: the later series starts where the other has nothing
            (None, None) => missing(first),
        });
    }

    let mut aligned = Vec::new();
    for month in first.through(last) {
        let (inflation_rate, sp500_close) =
            match (cpi_by_month.get(&month), price_by_month.get(&month)) {
                (Some(&rate), Some(&close)) => (rate, close),
                _ => return Err(missing(month)),
            };
        aligned.push(MonthlyObservation { month, inflation_rate, sp500_close });
    }

    info!("Aligned {} months from {} to {}", aligned.len(), first, last);
    Ok(aligned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn ym(s: &str) -> YearMonth {
        s.parse().unwrap()
    }

    fn obs(date: &str, value: f64) -> Observation {
        Observation { date: parse_date(date).unwrap(), value }
    }

    fn monthly(pairs: &[(&str, f64)]) -> Vec<MonthlyValue> {
        pairs.iter().map(|(m, v)| MonthlyValue { month: ym(m), value: *v }).collect()
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2015, 1, 2).unwrap();
        assert_eq!(parse_date("2015-01-02"), Some(expected));
        assert_eq!(parse_date("01/02/2015"), Some(expected));
        assert_eq!(parse_date("01-02-2015"), Some(expected));
        assert_eq!(parse_date("2015/01/02"), Some(expected));
        assert_eq!(parse_date("2015-01-02 00:00:00"), Some(expected));
        assert_eq!(parse_date("2015-01-02T16:00:00"), Some(expected));
        assert_eq!(parse_date("Jan 2 2015"), None);
    }

    #[test]
    fn test_read_cpi_split_columns() {
        let csv = "Year,Month,Day,Actual,Forecast\n2015,1,15,0.005,0.004\n2015,2,13,0.008,\n";
        let rows = read_cpi(csv.as_bytes(), "CPI.csv").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2015, 1, 15).unwrap());
        assert!((rows[1].value - 0.008).abs() < 1e-12);
    }

    #[test]
    fn test_read_cpi_date_column() {
        let csv = "date,rate\n2015-01-01,0.005\n2015-02-01,0.008\n";
        let rows = read_cpi(csv.as_bytes(), "cpi").unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_read_cpi_missing_rate_column() {
        let csv = "date,value\n2015-01-01,0.005\n";
        let err = read_cpi(csv.as_bytes(), "cpi").unwrap_err();
        assert!(matches!(err, AnalysisError::MissingColumn { column: "rate", .. }));
    }

    #[test]
    fn test_read_prices_case_insensitive_headers() {
        let csv = "Date,Open,High,Low,Close\n01/02/2015,2058.9,2072.4,2046.0,2058.2\n";
        let rows = read_prices(csv.as_bytes(), "SP500.csv").unwrap();
        assert_eq!(rows.len(), 1);
        assert!((rows[0].value - 2058.2).abs() < 1e-9);
    }

    #[test]
    fn test_read_prices_reports_bad_rows() {
        let bad_value = "date,close\n2015-01-02,abc\n";
        assert!(matches!(
            read_prices(bad_value.as_bytes(), "p"),
            Err(AnalysisError::InvalidValue { line: 2, .. })
        ));

        let bad_date = "date,close\n2015-01-02,100\nyesterday,101\n";
        assert!(matches!(
            read_prices(bad_date.as_bytes(), "p"),
            Err(AnalysisError::InvalidDate { line: 3, .. })
        ));
    }

    #[test]
    fn test_load_prices_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "date,close").unwrap();
        writeln!(file, "2015-01-02,2058.20").unwrap();
        writeln!(file, "2015-01-05,2020.58").unwrap();
        let rows = load_prices(file.path()).unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_resample_keeps_last_trading_day() {
        let daily = vec![
            obs("2015-01-02", 100.0),
            obs("2015-01-30", 102.0),
            obs("2015-02-02", 103.0),
            obs("2015-02-27", 101.0),
        ];
        let monthly = resample_to_month_end(&daily).unwrap();
        assert_eq!(monthly, self::monthly(&[("2015-01", 102.0), ("2015-02", 101.0)]));
    }

    #[test]
    fn test_unsorted_input_is_rejected() {
        let daily = vec![obs("2015-01-05", 100.0), obs("2015-01-02", 101.0)];
        assert!(matches!(
            resample_to_month_end(&daily),
            Err(AnalysisError::UnsortedInput { .. })
        ));

        let repeated = vec![obs("2015-01-05", 100.0), obs("2015-01-05", 101.0)];
        assert!(matches!(monthly_cpi(&repeated), Err(AnalysisError::UnsortedInput { .. })));
    }

    #[test]
    fn test_duplicate_cpi_month() {
        let rows = vec![obs("2015-01-01", 0.01), obs("2015-01-15", 0.02)];
        assert!(matches!(monthly_cpi(&rows), Err(AnalysisError::DuplicateMonth { .. })));
    }

    #[test]
    fn test_align_defaults_to_overlap() {
        let cpi = monthly(&[("2015-01", 0.01), ("2015-02", 0.02), ("2015-03", 0.03)]);
        let prices = monthly(&[("2015-02", 100.0), ("2015-03", 101.0), ("2015-04", 102.0)]);
        let aligned = align(&cpi, &prices, None, None).unwrap();
        assert_eq!(aligned.len(), 2);
        assert_eq!(aligned[0].month, ym("2015-02"));
        assert!((aligned[1].sp500_close - 101.0).abs() < 1e-12);
    }

    #[test]
    fn test_align_gap_is_missing_data() {
        let cpi = monthly(&[("2015-01", 0.01), ("2015-03", 0.03)]);
        let prices = monthly(&[("2015-01", 100.0), ("2015-02", 101.0), ("2015-03", 102.0)]);
        match align(&cpi, &prices, None, None) {
            Err(AnalysisError::MissingData { month, series }) => {
                assert_eq!(month, ym("2015-02"));
                assert_eq!(series, CPI_SERIES);
            }
            other => panic!("expected MissingData, got {:?}", other),
        }
    }

    #[test]
    fn test_align_explicit_window_outside_data() {
        let cpi = monthly(&[("2015-01", 0.01), ("2015-02", 0.02)]);
        let prices = monthly(&[("2015-01", 100.0), ("2015-02", 101.0)]);
        let err = align(&cpi, &prices, Some(ym("2015-01")), Some(ym("2015-03"))).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingData { .. }));

        let inside = align(&cpi, &prices, Some(ym("2015-02")), Some(ym("2015-02"))).unwrap();
        assert_eq!(inside.len(), 1);
    }

    #[test]
    fn test_align_disjoint_and_empty_series() {
        let cpi = monthly(&[("2015-01", 0.01)]);
        let prices = monthly(&[("2016-01", 100.0)]);
        assert!(matches!(
            align(&cpi, &prices, None, None),
            Err(AnalysisError::MissingData { series: CPI_SERIES, .. })
        ));
        assert!(matches!(
            align(&[], &prices, None, None),
            Err(AnalysisError::EmptySeries { series: CPI_SERIES })
        ));
    }

    #[test]
    fn test_align_only_end_bound() {
        let cpi = monthly(&[("2015-01", 0.01), ("2015-02", 0.02), ("2015-03", 0.03)]);
        let prices = monthly(&[("2015-01", 100.0), ("2015-02", 101.0), ("2015-03", 102.0)]);

        match align(&cpi, &prices, None, Some(ym("2014-06"))) {
            Err(AnalysisError::MissingData { month, .. }) => assert_eq!(month, ym("2014-06")),
            other => panic!("expected MissingData, got {:?}", other),
        }

        let head = align(&cpi, &prices, None, Some(ym("2015-02"))).unwrap();
        assert_eq!(head.len(), 2);
        assert_eq!(head[0].month, ym("2015-01"));
        assert_eq!(head[1].month, ym("2015-02"));
    }

    #[test]
    fn test_align_only_start_bound() {
        let cpi = monthly(&[("2015-01", 0.01), ("2015-02", 0.02), ("2015-03", 0.03)]);
        let prices = monthly(&[("2015-01", 100.0), ("2015-02", 101.0), ("2015-03", 102.0)]);

        match align(&cpi, &prices, Some(ym("2016-01")), None) {
            Err(AnalysisError::MissingData { month, .. }) => assert_eq!(month, ym("2016-01")),
            other => panic!("expected MissingData, got {:?}", other),
        }

        let tail = align(&cpi, &prices, Some(ym("2015-02")), None).unwrap();
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[1].month, ym("2015-03"));
    }

    #[test]
    fn test_align_inverted_window() {
        let cpi = monthly(&[("2015-01", 0.01), ("2015-02", 0.02)]);
        let prices = monthly(&[("2015-01", 100.0), ("2015-02", 101.0)]);
        assert!(matches!(
            align(&cpi, &prices, Some(ym("2015-02")), Some(ym("2015-01"))),
            Err(AnalysisError::Config(_))
        ));
    }
}
