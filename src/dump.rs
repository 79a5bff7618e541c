//! Tab-separated dump of one (coefficient, time, level) slice, for eyeballing a run.

use crate::assembler::Assembly;
use crate::error::{ConvertError, Result};
use log::warn;
use std::io::Write;
use std::str::FromStr;

/// `coeff,time,level`, where `time` and `level` are positions on the sorted axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceQuery {
    pub coeff: String,
    pub time:  usize,
    pub level: usize,
}

impl FromStr for SliceQuery {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self> {
        let bad = || ConvertError::SliceQuery(s.to_string());
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(bad());
        }
        Ok(SliceQuery {
            coeff: parts[0].to_string(),
            time:  parts[1].parse().map_err(|_| bad())?,
            level: parts[2].parse().map_err(|_| bad())?,
        })
    }
}

/// Write `radius_index, radius, value` rows for every radius. Returns the row count;
/// an unknown coefficient or out-of-range index writes nothing.
pub fn dump_slice<W: Write>(a: &Assembly, q: &SliceQuery, out: W) -> Result<usize> {
    let Some(grid) = a.coefficient(&q.coeff) else {
        warn!("no coefficient named '{}'", q.coeff);
        return Ok(0);
    };
    let [_, levels, times] = grid.shape();
    if q.time >= times || q.level >= levels {
        warn!(
            "{}: time {} / level {} out of range ({times} times, {levels} levels)",
            q.coeff, q.time, q.level
        );
        return Ok(0);
    }

    let mut wtr = csv::WriterBuilder::new().delimiter(b'\t').from_writer(out);
    wtr.write_record(["radius_index", "radius", "value"])?;
    let mut rows = 0;
    for (r, radius) in a.radii.iter().enumerate() {
        if let Some(v) = grid.get(q.time, q.level, r) {
            wtr.write_record([r.to_string(), radius.to_string(), v.to_string()])?;
            rows += 1;
        }
    }
    wtr.flush()?;
    Ok(rows)
}
