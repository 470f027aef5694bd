//! Factor listing command implementation.

use anyhow::Result;
use macrocorr::FactorGroup;
use macrocorr::series::available_factors;
use serde_json::json;

use super::{OutputFormat, print_banner, print_json};

/// List registered factors grouped by composite.
pub(crate) fn list_factors(verbose: bool, format: OutputFormat) -> Result<()> {
    let factors = available_factors();

    if format == OutputFormat::Json {
        let groups: serde_json::Map<String, serde_json::Value> = FactorGroup::ALL
            .into_iter()
            .map(|g| {
                let members: Vec<_> = g
                    .members()
                    .iter()
                    .map(|(key, sign)| json!({ "key": key, "sign": sign }))
                    .collect();
                (g.to_string(), json!(members))
            })
            .collect();
        return print_json(&json!({ "factors": factors, "groups": groups }));
    }

    print_banner("Available Factors");

    for group in FactorGroup::ALL {
        let members = group.members();
        println!("{group}:");
        println!("{}", "-".repeat(60));
        if members.is_empty() {
            println!("  (dimension only; no registered factors)\n");
            continue;
        }
        for (key, sign) in members {
            let sign = if *sign < 0.0 { "-" } else { "+" };
            match factors.iter().find(|f| f.key == *key) {
                Some(info) if verbose => println!(
                    "  {sign}{:<10} {:<10} {}\n              aliases: {}",
                    key.to_string(),
                    info.transform.as_str(),
                    info.description,
                    info.aliases.join(", ")
                ),
                _ => println!("  {sign}{key}"),
            }
        }
        println!();
    }

    if !verbose {
        println!("Use --verbose for transforms and accepted column aliases.\n");
    }

    Ok(())
}
