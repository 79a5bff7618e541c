//! Writing an [`Assembly`] to a rectangular array file.

use crate::assembler::Assembly;
use crate::error::Result;
use crate::track::TRACK_VARIABLES;
use log::info;
use std::path::PathBuf;

pub const TIME_DIM:   &str = "ntimes";
pub const LEVEL_DIM:  &str = "nlevels";
pub const RADIUS_DIM: &str = "nradii";

/// Axis variables written alongside the coefficients.
const AXIS_VARIABLES: [&str; 3] = ["times", "levels", "radii"];

/// Why `name` cannot be a coefficient variable, or `None` if it can.
pub fn name_problem(name: &str) -> Option<&'static str> {
    let Some(first) = name.chars().next() else {
        return Some("is empty");
    };
    if AXIS_VARIABLES.contains(&name) || TRACK_VARIABLES.iter().any(|(v, _)| *v == name) {
        Some("is reserved for an axis or track variable")
    } else if !(first.is_alphanumeric() || first == '_') {
        Some("must start with a letter, digit or '_'")
    } else if name.contains('/') || name.chars().any(char::is_control) {
        Some("contains '/' or a control character")
    } else {
        None
    }
}

/// Consumer of a finished run. Receives sorted axes and `[radius][level][time]` arrays.
pub trait GridSink {
    fn emit(&mut self, assembly: &Assembly) -> Result<()>;
}

/// Writes a NetCDF-4 file, replacing any existing file at `path`.
#[derive(Debug, Clone)]
pub struct NetCdfSink {
    path:   PathBuf,
    source: Option<String>,
}

impl NetCdfSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), source: None }
    }

    /// Record the input file name in the `source` global attribute.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl GridSink for NetCdfSink {
    fn emit(&mut self, a: &Assembly) -> Result<()> {
        let _ = std::fs::remove_file(&self.path);
        let mut nc = netcdf::create(&self.path)?;

        let history = format!("vo2nc {}", env!("CARGO_PKG_VERSION"));
        nc.add_attribute("history", history.as_str())?;
        if let Some(src) = &self.source {
            nc.add_attribute("source", src.as_str())?;
        }

        let dims = [
            (TIME_DIM,   a.times.len()),
            (LEVEL_DIM,  a.levels.len()),
            (RADIUS_DIM, a.radii.len()),
        ];
        for (dim, len) in dims {
            // netCDF has no fixed zero-length dimension.
            if len == 0 {
                info!("{dim} is empty, declaring it unlimited");
                nc.add_unlimited_dimension(dim)?;
            } else {
                nc.add_dimension(dim, len)?;
            }
        }

        {
            let mut v = nc.add_variable::<i64>(AXIS_VARIABLES[0], &[TIME_DIM])?;
            v.put_attribute("standard_name", "time")?;
            v.put_attribute("long_name", "Data time")?;
            v.put_attribute("units", "seconds since 1970-01-01T00:00:00Z")?;
            if !a.times.is_empty() {
                v.put_values(&a.times, ..)?;
            }
        }
        {
            let mut v = nc.add_variable::<f32>(AXIS_VARIABLES[1], &[LEVEL_DIM])?;
            v.put_attribute("long_name", "analysis level")?;
            v.put_attribute("units", "km")?;
            if let Some((min, max)) = a.level_bounds() {
                v.put_attribute("min", min)?;
                v.put_attribute("max", max)?;
                let levels: Vec<f32> = a.levels.iter().map(|&x| x as f32).collect();
                v.put_values(&levels, ..)?;
            }
        }
        {
            let mut v = nc.add_variable::<f32>(AXIS_VARIABLES[2], &[RADIUS_DIM])?;
            v.put_attribute("long_name", "ring radius")?;
            v.put_attribute("units", "km")?;
            if let Some((min, max)) = a.radius_bounds() {
                v.put_attribute("min", min)?;
                v.put_attribute("max", max)?;
                let radii: Vec<f32> = a.radii.iter().map(|&x| x as f32).collect();
                v.put_values(&radii, ..)?;
            }
        }

        for c in &a.coefficients {
            let mut v = nc.add_variable::<f32>(&c.name, &[RADIUS_DIM, LEVEL_DIM, TIME_DIM])?;
            v.set_fill_value(a.fill_value)?;
            v.put_attribute("missing_value", a.fill_value)?;
            v.put_attribute("layout", "[radius][level][time]")?;
            if !c.grid.values().is_empty() {
                v.put_values(c.grid.values(), ..)?;
            }
        }

        if let Some(track) = &a.track {
            for ((name, long_name), values) in TRACK_VARIABLES.into_iter().zip(track.series()) {
                let mut v = nc.add_variable::<f32>(name, &[TIME_DIM])?;
                v.set_fill_value(a.fill_value)?;
                v.put_attribute("long_name", long_name)?;
                if !values.is_empty() {
                    v.put_values(values, ..)?;
                }
            }
        }

        info!(
            "wrote {} coefficients{} to {}",
            a.coefficients.len(),
            if a.track.is_some() { " and track series" } else { "" },
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_problem() {
        assert_eq!(name_problem("VTC0"), None);
        assert_eq!(name_problem("_x"), None);
        assert!(name_problem("").is_some());
        assert!(name_problem("radii").is_some());
        assert!(name_problem("vortex_rmw").is_some());
        assert!(name_problem("-VTC0").is_some());
        assert!(name_problem("VT/C0").is_some());
        assert!(name_problem("VT\u{7}C0").is_some());
    }
}
