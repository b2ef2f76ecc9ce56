use std::fs;

use anyhow::{Context, Result};
use regionwx::RulesConfig;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::RulesArgs) -> Result<()> {
    let json = serde_json::to_string_pretty(&RulesConfig::weather_defaults())?;

    match &args.output {
        Some(path) => fs::write(path, json + "\n")
            .with_context(|| format!("[rules] Failed to write {}", path.display()))?,
        None => println!("{json}"),
    }

    Ok(())
}
