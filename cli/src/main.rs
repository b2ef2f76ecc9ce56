mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{aggregate, rules};

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Aggregate(args) => aggregate::run(&cli, args),
        Commands::Rules(args) => rules::run(&cli, args),
    }
}

/// Warnings by default, `-v` for info, `-vv` for debug. `RUST_LOG` wins when set.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn main() -> anyhow::Result<()> { run() }
