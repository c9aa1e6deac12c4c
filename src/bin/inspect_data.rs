// src/bin/inspect_data.rs
use anyhow::{Context, Result};
use inflation_equity::models::Observation;
use inflation_equity::services::loader::{load_cpi, load_prices, monthly_cpi, resample_to_month_end};
use inflation_equity::AnalysisConfig;
use log::info;

fn describe(name: &str, rows: &[Observation]) {
    println!("{} rows: {}", name, rows.len());
    if let (Some(first), Some(last)) = (rows.first(), rows.last()) {
        println!("  Date range: {} to {}", first.date, last.date);
    }
    for row in rows.iter().take(5) {
        println!("  {}  {}", row.date, row.value);
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let config = AnalysisConfig::from_env()?;

    let cpi_path = config.cpi_path();
    let cpi = load_cpi(&cpi_path)
        .with_context(|| format!("Failed to read {}", cpi_path.display()))?;
    describe("CPI", &cpi);

    let price_path = config.sp500_path();
    let daily = load_prices(&price_path)
        .with_context(|| format!("Failed to read {}", price_path.display()))?;
    describe("S&P 500 daily", &daily);

    let cpi_months = monthly_cpi(&cpi)?;
    let price_months = resample_to_month_end(&daily)?;
    info!("{} CPI months, {} price months", cpi_months.len(), price_months.len());

    println!("{}", "=".repeat(50));
    println!("Monthly closes: {}", price_months.len());
    if let (Some(first), Some(last)) = (price_months.first(), price_months.last()) {
        println!("  Month range: {} to {}", first.month, last.month);
    }
    for m in price_months.iter().take(5) {
        println!("  {}  {:.2}", m.month, m.value);
    }
    Ok(())
}
