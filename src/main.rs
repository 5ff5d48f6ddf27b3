pub mod types;
pub mod config;
pub mod error;
pub mod data;
pub mod join;
pub mod indicators;
pub mod classify;
pub mod processing;
pub mod overlay;
pub mod render;
pub mod report;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one recommendation map per theme
    Generate {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Write the per-region indicators and recommendations as CSV
    Report {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        /// Output file; stdout when omitted
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn assess(app_config: &config::AppConfig) -> anyhow::Result<Vec<types::AssessedRegion>> {
    let input = &app_config.input;
    let columns = indicators::IndicatorColumns::from_config(&input.population, &input.land);

    // Boundaries first: an unreadable boundary file fails before any join.
    let regions = data::load_boundaries(input)?;
    let population = data::load_attribute_table(
        "population",
        &input.population.table,
        &columns.required(types::Dataset::Population),
    )?;
    let land = data::load_attribute_table(
        "land",
        &input.land.table,
        &columns.required(types::Dataset::Land),
    )?;

    Ok(processing::evaluate(regions, &population, &land, &columns)?)
}

fn load_config(path: &Path) -> anyhow::Result<config::AppConfig> {
    info!("Using config: {:?}", path);
    config::AppConfig::load_from_file(path)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Generate { config } => {
            let app_config = load_config(config)?;
            let assessed = assess(&app_config)?;

            let written = render::generate_maps(&app_config.output, &assessed)?;

            info!("Generation complete: {} files in {:?}", written.len(), app_config.output.dir);
        }
        Commands::Report { config, output } => {
            let app_config = load_config(config)?;
            let assessed = assess(&app_config)?;

            match output {
                Some(path) => {
                    let file = std::fs::File::create(path)
                        .with_context(|| format!("Failed to create report file: {:?}", path))?;
                    report::write_report(file, &assessed)?;
                    info!("Wrote report for {} regions to {:?}", assessed.len(), path);
                }
                None => report::write_report(std::io::stdout().lock(), &assessed)?,
            }
        }
    }

    Ok(())
}
