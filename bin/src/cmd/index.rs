//! Composite factor index command implementation.

use anyhow::Result;
use macrocorr::pipeline::{FactorSource, IndexOrigin, Orchestrator};

use super::{OutputFormat, fmt_opt, print_banner, print_json};

/// Rows of history shown in text mode.
const TAIL: usize = 10;

/// Fetch or derive the composite index and print it.
pub(crate) async fn show_factor_index<S: FactorSource>(
    orchestrator: &Orchestrator<S>,
    days: usize,
    alpha: f64,
    format: OutputFormat,
) -> Result<()> {
    let report = orchestrator.factor_index(days, alpha).await;

    if format == OutputFormat::Json {
        return print_json(&serde_json::to_value(&report)?);
    }

    print_banner("Composite Factor Index");
    let origin = match report.origin {
        IndexOrigin::Server => "backend",
        IndexOrigin::History => "derived from dimension history",
        IndexOrigin::Unavailable => "unavailable",
    };
    println!("Source: {origin}");
    if let Some(as_of) = &report.as_of {
        println!("As of:  {as_of}");
    }
    println!("Alpha:  {}", report.index.alpha);
    println!("Latest: {}", fmt_opt(report.index.latest(), 1));
    println!();

    if report.index.index.is_empty() {
        return Ok(());
    }

    println!("{:<26} {:>8} {:>9}", "Timestamp", "Raw", "Smoothed");
    println!("{}", "-".repeat(45));
    let skip = report.index.index.len().saturating_sub(TAIL);
    for point in report.index.index.iter().skip(skip) {
        println!(
            "{:<26} {:>8} {:>9}",
            point.ts,
            fmt_opt(point.raw, 1),
            fmt_opt(point.smoothed, 1)
        );
    }

    println!("\nLatest contributions (index points):");
    for c in &report.index.contrib {
        let latest = c.points.iter().rev().find_map(|p| p.smoothed);
        println!("  {:<12} {:>7}", c.key.to_string(), fmt_opt(latest, 2));
    }
    println!();

    Ok(())
}
