use std::{fs, path::Path};

use anyhow::{Context, Result};
use regionwx::{
    read_cwb_observations, read_regions_geojson, reproject, ChoroplethOptions, ColorRamp, CoordinateFrame,
    GeometryIndex, IndexOptions, Pipeline, ReductionRules, RulesConfig,
};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::AggregateArgs) -> Result<()> {
    log::info!("[aggregate] loading regions from {}", args.regions.display());
    let mut sources = read_regions_geojson(&read(&args.regions)?, &args.name_property, None)?;

    if let Some(code) = args.reproject {
        log::info!("[aggregate] reprojecting regions to EPSG:{code}");
        reproject(&mut sources, CoordinateFrame::Epsg(code))?;
    }

    let index = GeometryIndex::with_options(sources, IndexOptions { strict: args.strict })
        .context("[aggregate] Invalid region partition")?;
    for region in index.flagged() {
        if let Some(issue) = region.issue() { log::warn!("[aggregate] {issue}") }
    }

    let rules = match &args.rules {
        Some(path) => {
            let config: RulesConfig = serde_json::from_slice(&read(path)?)
                .with_context(|| format!("[aggregate] Failed to parse rules file {}", path.display()))?;
            ReductionRules::from_config(&config)?
        }
        None => ReductionRules::weather_defaults(),
    };

    log::info!("[aggregate] loading observations from {}", args.observations.display());
    let observations = read_cwb_observations(&read(&args.observations)?)?;

    let pipeline = Pipeline::new(index, rules);
    let aggregation = pipeline.run(&observations);

    match &args.output {
        Some(path) => {
            log::info!("[aggregate] writing {} records to {}", aggregation.len(), path.display());
            aggregation.write_csv(path)?;
        }
        None => print!("{}", aggregation.to_csv_string()?),
    }

    if let Some(path) = &args.audit {
        let json = serde_json::to_string_pretty(aggregation.audit())?;
        fs::write(path, json)
            .with_context(|| format!("[aggregate] Failed to write audit to {}", path.display()))?;
    }

    if let Some(path) = &args.svg {
        let mut options = ChoroplethOptions::new(args.field.as_str());
        if let Some((low, high)) = args.range { options = options.with_range(low, high) }
        if args.field.starts_with("TEMP") || args.field.starts_with("D_T") {
            options = options.with_ramp(ColorRamp::heat());
        }
        log::info!("[aggregate] drawing {} to {}", args.field, path.display());
        aggregation.write_choropleth_svg(path, pipeline.index(), &options)?;
    }

    let audit = aggregation.audit();
    log::info!(
        "[aggregate] {} regions, {} observations dropped ({} unattributed, {} malformed, {} mismatched)",
        aggregation.len(),
        audit.dropped(),
        audit.unattributed.len(),
        audit.malformed.len(),
        audit.mismatched.len(),
    );

    Ok(())
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("[aggregate] Failed to read {}", path.display()))
}
