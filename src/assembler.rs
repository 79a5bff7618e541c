//! One conversion run: stream the listing, then finalise every coefficient.
//!
//! [`Assembler`] is the parsing state. [`Assembler::finish`] consumes it, so no
//! line can be fed once the axes are frozen; the returned [`Assembly`] is the
//! dense, sorted result handed to a [`crate::emit::GridSink`].

use crate::axis::{bounds, AxisIndexer};
use crate::config::ConvertConfig;
use crate::emit::name_problem;
use crate::error::{ConvertError, Result};
use crate::grid::{DenseGrid, GridExtent, GridStore};
use crate::parser::{Parsed, TupleParser};
use crate::track::{read_track_log, TrackSeries};
use log::{debug, info};
use rayon::prelude::*;
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

// ─────────────────────────────────────────────────────────────────────
// Parsing state
// ─────────────────────────────────────────────────────────────────────
#[derive(Debug)]
pub struct Assembler {
    config:     ConvertConfig,
    parser:     TupleParser,
    times:      Vec<i64>,
    levels:     AxisIndexer,
    radii:      AxisIndexer,
    store:      GridStore,
    overwrites: usize,
}

impl Assembler {
    pub fn new(config: ConvertConfig) -> Self {
        Self {
            parser: TupleParser::new(config.fill_value),
            config,
            times: Vec::new(),
            levels: AxisIndexer::new("level"),
            radii: AxisIndexer::new("radius"),
            store: GridStore::default(),
            overwrites: 0,
        }
    }

    pub fn feed(&mut self, line: &str) -> Result<()> {
        match self.parser.parse(line)? {
            Parsed::TimeMarker { index, epoch } => {
                self.times.push(epoch);
                debug_assert_eq!(self.times.len(), index + 1);
            }
            Parsed::Tuple(t) => {
                // Data ahead of the first marker gets a slot with no real time.
                if self.times.len() <= t.time {
                    self.times.resize(t.time + 1, 0);
                }
                if self.store.get(&t.name).is_none() {
                    if let Some(reason) = name_problem(&t.name) {
                        return Err(ConvertError::InvalidName {
                            line: self.parser.line_no(),
                            name: t.name,
                            reason,
                        });
                    }
                }
                let l = self.levels.push(t.level);
                let r = self.radii.push(t.radius);
                if let Some(old) = self.store.store(&t.name, t.time, l, r, t.value) {
                    self.overwrites += 1;
                    debug!(
                        "line {}: {} at time {}, level {}, radius {} overwrites {old}",
                        self.parser.line_no(),
                        t.name,
                        t.time,
                        t.level,
                        t.radius
                    );
                }
            }
            Parsed::Ignore => {}
        }
        Ok(())
    }

    /// Feed every line of `reader`.
    pub fn read<R: BufRead>(&mut self, reader: R) -> Result<()> {
        for line in reader.lines() {
            self.feed(&line?)?;
        }
        Ok(())
    }

    pub fn times(&self) -> &[i64] {
        &self.times
    }

    pub fn levels(&self) -> &AxisIndexer {
        &self.levels
    }

    pub fn radii(&self) -> &AxisIndexer {
        &self.radii
    }

    pub fn extent(&self) -> GridExtent {
        GridExtent {
            times:  self.times.len(),
            levels: self.levels.len(),
            radii:  self.radii.len(),
        }
    }

    /// Freeze the axes and produce dense, sorted arrays for every coefficient.
    pub fn finish(self) -> Result<Assembly> {
        self.finish_with_track(None)
    }

    /// As [`Assembler::finish`], aligning a track series to the time axis.
    pub fn finish_with_track(self, track: Option<TrackSeries>) -> Result<Assembly> {
        let extent = self.extent();
        let fill = self.config.fill_value;
        info!(
            "dimensions: time: {}, level: {}, radii: {}, coefficients: {}",
            extent.times,
            extent.levels,
            extent.radii,
            self.store.len()
        );
        if self.overwrites > 0 {
            info!("{} values overwritten by later lines", self.overwrites);
        }
        self.levels.warn_near_duplicates(self.config.axis_epsilon);
        self.radii.warn_near_duplicates(self.config.axis_epsilon);

        let level_order = self.levels.sorted_order();
        let radius_order = self.radii.sorted_order();

        let coefficients = self
            .store
            .into_grids()
            .into_par_iter()
            .map(|(name, mut grid)| -> Result<CoefficientArray> {
                let added = grid.fill(extent, fill);
                debug!("{name}: {added} of {} cells filled", extent.cells());
                let grid = grid.reorder(extent.times, &level_order, &radius_order)?;
                Ok(CoefficientArray { name, grid })
            })
            .collect::<Result<Vec<_>>>()?;

        let track = match track {
            Some(mut t) => {
                t.align(extent.times, fill, self.config.track_policy)?;
                Some(t)
            }
            None => None,
        };

        Ok(Assembly {
            times: self.times,
            levels: self.levels.sorted_values(),
            radii: self.radii.sorted_values(),
            coefficients,
            fill_value: fill,
            track,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────
// Finalised run
// ─────────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientArray {
    pub name: String,
    pub grid: DenseGrid,
}

/// Finalised run: sorted axes and one dense array per coefficient.
#[derive(Debug, Clone, PartialEq)]
pub struct Assembly {
    /// Seconds since the epoch, in arrival order.
    pub times:        Vec<i64>,
    /// Ascending.
    pub levels:       Vec<f64>,
    /// Ascending.
    pub radii:        Vec<f64>,
    /// In the order each name first appeared.
    pub coefficients: Vec<CoefficientArray>,
    pub fill_value:   f32,
    pub track:        Option<TrackSeries>,
}

impl Assembly {
    pub fn coefficient(&self, name: &str) -> Option<&DenseGrid> {
        self.coefficients.iter().find(|c| c.name == name).map(|c| &c.grid)
    }

    pub fn level_bounds(&self) -> Option<(f64, f64)> {
        bounds(&self.levels)
    }

    pub fn radius_bounds(&self) -> Option<(f64, f64)> {
        bounds(&self.radii)
    }

    /// Look a value up by time index and axis values rather than positions.
    pub fn value_at(&self, name: &str, time: usize, level: f64, radius: f64) -> Option<f32> {
        let l = self.levels.iter().position(|&v| v == level)?;
        let r = self.radii.iter().position(|&v| v == radius)?;
        self.coefficient(name)?.get(time, l, r)
    }
}

// ─────────────────────────────────────────────────────────────────────
// File entry point
// ─────────────────────────────────────────────────────────────────────
fn open_input(path: &Path) -> Result<File> {
    if !path.is_file() {
        return Err(ConvertError::MissingInput(path.to_path_buf()));
    }
    Ok(File::open(path)?)
}

/// Convert a coefficient listing, and optionally its track log, into an [`Assembly`].
/// Both paths are checked before anything is parsed.
pub fn assemble_files(coeff: &Path, log: Option<&Path>, config: ConvertConfig) -> Result<Assembly> {
    let coeff_file = open_input(coeff)?;
    let log_file = log.map(open_input).transpose()?;

    let mut asm = Assembler::new(config);
    asm.read(BufReader::new(coeff_file))?;

    let track = match log_file {
        Some(f) => Some(read_track_log(f, asm.times(), config.fill_value)?),
        None => None,
    };
    asm.finish_with_track(track)
}
