use clap::ValueEnum;

/// Sentinel for "no observation", written as `_FillValue` and `missing_value`.
pub const FILL_VALUE: f32 = -999.0;

/// Default relative spacing below which two axis values are reported as near-duplicates.
pub const AXIS_EPSILON: f64 = 1e-4;

/// What to do when a track series length differs from the time axis length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TrackPolicy {
    /// Pad with the fill value or truncate to the time axis length, with a warning.
    #[default]
    Align,
    /// Fail the run.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvertConfig {
    pub fill_value:   f32,
    pub axis_epsilon: f64,
    pub track_policy: TrackPolicy,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            fill_value:   FILL_VALUE,
            axis_epsilon: AXIS_EPSILON,
            track_policy: TrackPolicy::Align,
        }
    }
}
