
// USAGE cargo run --release -- -c storm_coefficientlist.csv [-l storm_vortexSummary.csv] -o storm.nc

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use vortex_to_netcdf::{
    assemble_files,
    config::AXIS_EPSILON,
    dump::{dump_slice, SliceQuery},
    init_logging, timeit, ConvertConfig, GridSink, NetCdfSink, TrackPolicy, FILL_VALUE,
};

// ─────────────────────────────────────────────────────────────────────
// Command line
// ─────────────────────────────────────────────────────────────────────
#[derive(Parser, Debug)]
#[command(author, version, about = "Convert a vortex coefficient listing (and track log) to NetCDF", long_about = None)]
struct Cli {
    /// Coefficient listing (`*_coefficientlist.csv`)
    #[arg(short = 'c', long = "coeff", visible_alias = "input", short_alias = 'i')]
    coeff: PathBuf,

    /// Track-summary log (`*_vortexSummary.csv`)
    #[arg(short, long)]
    log: Option<PathBuf>,

    /// NetCDF file to write; replaced if it exists
    #[arg(short, long)]
    output: PathBuf,

    /// Print one slice before writing
    #[arg(short, long, value_name = "COEFF,TIME,LEVEL")]
    debug: Option<SliceQuery>,

    #[arg(long, env = "VO2NC_FILL_VALUE", default_value_t = FILL_VALUE, allow_negative_numbers = true)]
    fill_value: f32,

    /// Relative spacing under which distinct axis values are reported
    #[arg(long, env = "VO2NC_AXIS_EPSILON", default_value_t = AXIS_EPSILON)]
    axis_epsilon: f64,

    /// How to treat track series whose length differs from the time axis
    #[arg(long, value_enum, default_value_t = TrackPolicy::Align)]
    track_policy: TrackPolicy,
}

// ─────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────
fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = ConvertConfig {
        fill_value:   cli.fill_value,
        axis_epsilon: cli.axis_epsilon,
        track_policy: cli.track_policy,
    };

    // 1. parse listing and log, fill and reorder
    let assembly = timeit("assemble", || assemble_files(&cli.coeff, cli.log.as_deref(), config))
        .with_context(|| format!("converting {}", cli.coeff.display()))?;

    // 2. optional slice dump
    if let Some(q) = &cli.debug {
        dump_slice(&assembly, q, std::io::stdout().lock())?;
    }

    // 3. write NetCDF
    let source = cli
        .coeff
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut sink = NetCdfSink::new(&cli.output).with_source(source);
    timeit("write_netcdf", || sink.emit(&assembly))
        .with_context(|| format!("writing {}", cli.output.display()))?;

    eprintln!(
        "Finished OK, wrote {} coefficients x {} times → {}",
        assembly.coefficients.len(),
        assembly.times.len(),
        cli.output.display()
    );
    Ok(())
}
