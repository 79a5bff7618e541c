//! Read one slice back out of a file written by [`crate::emit::NetCdfSink`].

use crate::error::{ConvertError, Result};
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct SliceRow {
    pub radius_index: usize,
    pub radius:       f32,
    pub value:        f32,
}

/// Values of `coeff` at `time` and `level` (sorted positions) for every radius.
pub fn read_slice(path: &Path, coeff: &str, time: usize, level: usize) -> Result<Vec<SliceRow>> {
    if !path.is_file() {
        return Err(ConvertError::MissingInput(path.to_path_buf()));
    }
    let nc = netcdf::open(path)?;
    let var = nc
        .variable(coeff)
        .ok_or_else(|| ConvertError::MissingVariable(coeff.to_string()))?;

    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
    if shape.len() != 3 {
        return Err(ConvertError::BadShape { name: coeff.to_string(), shape });
    }
    let (radii, levels, times) = (shape[0], shape[1], shape[2]);
    if time >= times {
        return Err(ConvertError::OutOfRange { axis: "time", index: time, len: times });
    }
    if level >= levels {
        return Err(ConvertError::OutOfRange { axis: "level", index: level, len: levels });
    }

    let values: Vec<f32> = var.get_values::<f32, _>(..)?;
    let radius_values: Vec<f32> = match nc.variable("radii") {
        Some(v) if radii > 0 => v.get_values::<f32, _>(..)?,
        _ => Vec::new(),
    };

    Ok((0..radii)
        .map(|r| SliceRow {
            radius_index: r,
            radius: radius_values.get(r).copied().unwrap_or(f32::NAN),
            value: values[(r * levels + level) * times + time],
        })
        .collect())
}
