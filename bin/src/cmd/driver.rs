//! Driver Index command implementation.

use anyhow::Result;
use macrocorr::combine::DriverRange;
use macrocorr::pipeline::{FactorSource, Orchestrator};

use super::{OutputFormat, fmt_opt, print_banner, print_json};

/// Fetch sources and print Driver Index records for `range`.
pub(crate) async fn show_driver_index<S: FactorSource>(
    orchestrator: &Orchestrator<S>,
    range: DriverRange,
    format: OutputFormat,
) -> Result<()> {
    let records = orchestrator.driver_index(range).await?;

    if format == OutputFormat::Json {
        return print_json(&serde_json::to_value(&records)?);
    }

    print_banner(&format!("Driver Index ({range})"));
    if records.is_empty() {
        println!("No data.\n");
        return Ok(());
    }

    println!(
        "{:<10} {:>6} {:>7} {:>6} {:>10} {:>5} {:>9} {:>7} {:>6} {:>6}",
        "Date", "Rate", "CPI YoY", "Unemp", "BTC", "F&G", "ETF flow", "Driver", "z BTC", "z F&G"
    );
    println!("{}", "-".repeat(84));
    for r in &records {
        println!(
            "{:<10} {:>6} {:>7} {:>6} {:>10} {:>5} {:>9} {:>7.2} {:>6.2} {:>6.2}",
            r.date.to_string(),
            fmt_opt(r.rate, 2),
            fmt_opt(r.cpi_yoy, 2),
            fmt_opt(r.unemp, 1),
            fmt_opt(r.btc_price, 0),
            fmt_opt(r.fng, 0),
            fmt_opt(r.etf_flow, 1),
            r.driver_index,
            r.z_btc,
            r.z_fng
        );
    }
    println!();

    Ok(())
}
