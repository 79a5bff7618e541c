
// USAGE cargo run --bin nc_extract -- -i storm.nc -c VTC0 -t 0 -l 4

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use vortex_to_netcdf::{extract::read_slice, init_logging};

/// Print a coefficient at one time index and level index, for every radius.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long)]
    input: PathBuf,
    #[arg(short, long)]
    coeff: String,
    /// Level index (position on the sorted level axis)
    #[arg(short, long)]
    level: usize,
    /// Time index
    #[arg(short, long)]
    time: usize,
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    log::info!("extracting '{}' at level {}, time {}", cli.coeff, cli.level, cli.time);

    let rows = read_slice(&cli.input, &cli.coeff, cli.time, cli.level)
        .with_context(|| format!("reading {}", cli.input.display()))?;

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(std::io::stdout().lock());
    wtr.write_record(["time", "level", "radius_index", "radius", "value"])?;
    for row in &rows {
        wtr.write_record([
            cli.time.to_string(),
            cli.level.to_string(),
            row.radius_index.to_string(),
            row.radius.to_string(),
            row.value.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}
