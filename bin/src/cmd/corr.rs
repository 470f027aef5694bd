//! Correlation view command implementation.

use anyhow::Result;
use macrocorr::FactorGroup;
use macrocorr::pipeline::{FactorSource, Orchestrator, PipelineEvent};
use serde_json::json;

use super::{OutputFormat, fmt_opt, print_banner, print_json};

/// Compute and print the group correlation view.
pub(crate) async fn show_correlations<S: FactorSource>(
    orchestrator: &Orchestrator<S>,
    verbose: bool,
    format: OutputFormat,
) -> Result<()> {
    let mut events = orchestrator.subscribe();
    let view = orchestrator.correlation_view().await;
    let mut trail = Vec::new();
    while let Ok(event) = events.try_recv() {
        trail.push(event);
    }

    if format == OutputFormat::Json {
        let summaries: serde_json::Map<String, serde_json::Value> = view
            .rho
            .keys()
            .filter_map(|g| Some((g.to_string(), serde_json::to_value(view.summary(*g)?).ok()?)))
            .collect();
        return print_json(&json!({
            "view": view,
            "summary": summaries,
            "energy": view.energy(),
            "events": trail,
        }));
    }

    let config = orchestrator.config();
    print_banner(&format!("{} vs macro factors ({}D window)", config.asset, config.window));

    println!("Source:    {}", view.source);
    if view.is_placeholder() {
        println!("           (placeholder: no real data was available)");
    }
    if let (Some(first), Some(last)) = (view.dates.first(), view.dates.last()) {
        println!("Range:     {first} .. {last} ({} days)", view.dates.len());
    }
    println!("Generated: {}", view.generated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!();

    println!("{:<12} {:>8} {:>8} {:>8} {:>8}", "Group", "Latest", "P10", "Median", "P90");
    println!("{}", "-".repeat(48));
    for group in FactorGroup::ALL {
        let Some(summary) = view.summary(group) else {
            continue;
        };
        println!(
            "{:<12} {:>8} {:>8} {:>8} {:>8}",
            group,
            fmt_opt(summary.latest, 1),
            fmt_opt(summary.p10, 1),
            fmt_opt(summary.p50, 1),
            fmt_opt(summary.p90, 1)
        );
    }

    if let Some(energy) = view.energy().last() {
        println!("\nNegative-correlation energy (latest): {energy:.3}");
    }

    if verbose && !view.factors.is_empty() {
        println!("\nFactors:");
        for (key, rho) in &view.factors {
            let latest = rho.iter().rev().find_map(|v| *v);
            println!("  {:<10} {:>8}", key.to_string(), fmt_opt(latest, 1));
        }
    }

    if !trail.is_empty() {
        println!("\nPipeline:");
        for event in &trail {
            match event {
                PipelineEvent::CacheHit { .. } => println!("  served from cache"),
                PipelineEvent::TierFailed { tier, reason } => println!("  {tier} failed: {reason}"),
                PipelineEvent::Escalated { from, to } => println!("  {from} -> {to}"),
                PipelineEvent::ViewReady { source, groups } => {
                    println!("  {source} produced {groups} groups");
                }
            }
        }
    }
    println!();

    Ok(())
}
