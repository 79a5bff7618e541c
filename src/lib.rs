//! Convert vortex-analysis coefficient listings (and optional track logs) into
//! NetCDF arrays indexed by sorted time, level and radius.

use std::sync::Once;
use std::time::Instant;

pub mod assembler;
pub mod axis;
pub mod config;
pub mod dump;
pub mod emit;
pub mod error;
pub mod extract;
pub mod grid;
pub mod parser;
pub mod track;

pub use assembler::{assemble_files, Assembler, Assembly, CoefficientArray};
pub use config::{ConvertConfig, TrackPolicy, FILL_VALUE};
pub use emit::{GridSink, NetCdfSink};
pub use error::{ConvertError, Result};


static INIT: Once = Once::new();

/// Start `pretty_env_logger`, defaulting to `info` when `RUST_LOG` is unset.
pub fn init_logging() {
    INIT.call_once(|| {
        if std::env::var_os("RUST_LOG").is_none() {
            pretty_env_logger::formatted_builder()
                .filter_level(log::LevelFilter::Info)
                .init();
        } else {
            pretty_env_logger::init();
        }
    });
}

/// Run `f`, logging how long it took under `label`.
pub fn timeit<T, F: FnOnce() -> T>(label: &str, f: F) -> T {
    let t0 = Instant::now();
    let out = f();
    log::info!("{label:<20}{:?}", t0.elapsed());
    out
}
