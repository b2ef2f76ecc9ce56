use std::path::PathBuf;

/// Per-region weather statistics from station observations
#[derive(clap::Parser, Debug)]
#[command(name = "regionwx", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Attribute observations to regions and reduce them per region
    Aggregate(AggregateArgs),

    /// Print the default reduction rules as JSON
    Rules(RulesArgs),
}

#[derive(clap::Args, Debug)]
pub struct AggregateArgs {
    /// Region boundaries (GeoJSON FeatureCollection)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub regions: PathBuf,

    /// Station observations (O-A0001-001 JSON)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub observations: PathBuf,

    /// Feature property holding the region name
    #[arg(long, default_value = "T_Name")]
    pub name_property: String,

    /// Reduction rules file (JSON), defaults to the built-in weather rules
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub rules: Option<PathBuf>,

    /// Output CSV file, defaults to stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Write the attribution audit (JSON) here
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub audit: Option<PathBuf>,

    /// Write a choropleth map (SVG) here
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub svg: Option<PathBuf>,

    /// Field to color the map by
    #[arg(long, default_value = "TEMP")]
    pub field: String,

    /// Color range for the map, e.g. "0,40"; defaults to the data range
    #[arg(long, value_parser = parse_range, allow_hyphen_values = true, requires = "svg")]
    pub range: Option<(f64, f64)>,

    /// Reproject regions to this EPSG code before indexing
    #[arg(long)]
    pub reproject: Option<u32>,

    /// Reject self-intersecting region boundaries
    #[arg(long)]
    pub strict: bool,
}

#[derive(clap::Args, Debug)]
pub struct RulesArgs {
    /// Output file, defaults to stdout
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

/// Parse "low,high".
fn parse_range(text: &str) -> Result<(f64, f64), String> {
    let (low, high) = text.split_once(',')
        .ok_or_else(|| format!("expected LOW,HIGH, got {text:?}"))?;
    let parse = |s: &str| s.trim().parse::<f64>().map_err(|e| format!("{s:?}: {e}"));
    let (low, high) = (parse(low)?, parse(high)?);
    if !(low < high) { return Err(format!("range {low},{high} is empty")) }
    Ok((low, high))
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn parses_aggregate_flags() {
        let cli = Cli::parse_from([
            "regionwx", "-vv", "aggregate", "towns.geojson", "obs.json",
            "--svg", "map.svg", "--range", "-10,40", "--strict",
        ]);
        assert_eq!(cli.verbose, 2);
        let Commands::Aggregate(args) = cli.command else { panic!("expected aggregate") };
        assert_eq!(args.name_property, "T_Name");
        assert_eq!(args.field, "TEMP");
        assert_eq!(args.range, Some((-10.0, 40.0)));
        assert!(args.strict);
        assert!(args.output.is_none());
    }

    #[test]
    fn rejects_bad_ranges() {
        assert!(parse_range("40").is_err());
        assert!(parse_range("40,0").is_err());
        assert!(parse_range("a,b").is_err());
        assert_eq!(parse_range(" 0 , 40 "), Ok((0.0, 40.0)));
    }
}
