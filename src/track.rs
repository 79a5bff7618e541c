//! Track-summary log parsing.
//!
//! The analysis log is free text. A handful of line shapes carry the per-volume
//! track estimates; each one appends to its own series. Series are aligned to
//! the coefficient time axis by position, not by time stamp.

use crate::config::TrackPolicy;
use crate::error::{ConvertError, Result};
use crate::parser::{compact_datetime, parse_number};
use log::{debug, info, warn};
use std::io::Read;

/// Output variable name and long name of each track series, in [`TrackSeries::series`] order.
pub const TRACK_VARIABLES: [(&str, &str); 7] = [
    ("vortex_lats",     "vortex latitude (N)"),
    ("vortex_lons",     "vortex longitude (E)"),
    ("vortex_pressure", "vortex pressure (hPa)"),
    ("vortex_rmw",      "vortex RMW (nm)"),
    ("vortex_max_in",   "vortex max approaching wind (kt)"),
    ("vortex_max_out",  "vortex max receding wind (kt)"),
    ("vortex_wind",     "vortex max surface wind (kt)"),
];

/// Columns of a `VORTRAC ATCF` summary line: tag, time, latitude, longitude,
/// pressure, pressure uncertainty, RMW, RMW uncertainty. No wind column.
const ATCF_FIELDS: usize = 8;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackSeries {
    /// Volume times found in the log, seconds since the epoch.
    pub times:    Vec<i64>,
    pub lats:     Vec<f32>,
    pub lons:     Vec<f32>,
    pub pressure: Vec<f32>,
    pub rmw:      Vec<f32>,
    pub max_in:   Vec<f32>,
    pub max_out:  Vec<f32>,
    pub max_wind: Vec<f32>,
}

impl TrackSeries {
    /// Series in [`TRACK_VARIABLES`] order.
    pub fn series(&self) -> [&[f32]; 7] {
        [
            &self.lats,
            &self.lons,
            &self.pressure,
            &self.rmw,
            &self.max_in,
            &self.max_out,
            &self.max_wind,
        ]
    }

    fn series_mut(&mut self) -> [&mut Vec<f32>; 7] {
        [
            &mut self.lats,
            &mut self.lons,
            &mut self.pressure,
            &mut self.rmw,
            &mut self.max_in,
            &mut self.max_out,
            &mut self.max_wind,
        ]
    }

    /// Bring every series to `expected` entries, or fail, depending on `policy`.
    pub fn align(&mut self, expected: usize, fill_value: f32, policy: TrackPolicy) -> Result<()> {
        for ((name, _), series) in TRACK_VARIABLES.into_iter().zip(self.series_mut()) {
            if series.len() == expected {
                continue;
            }
            match policy {
                TrackPolicy::Reject => {
                    return Err(ConvertError::TrackMismatch {
                        series: name,
                        expected,
                        found: series.len(),
                    });
                }
                TrackPolicy::Align => {
                    warn!(
                        "{name}: {} entries for {expected} times, {}",
                        series.len(),
                        if series.len() < expected { "padding with fill" } else { "truncating" }
                    );
                    series.resize(expected, fill_value);
                }
            }
        }
        Ok(())
    }
}

/// Time stamp of the last `_YYYYMMDD_HHMM` group in a radar file name.
fn volume_time(name: &str) -> Option<i64> {
    let parts: Vec<&str> = name.split('_').collect();
    (1..parts.len().saturating_sub(1)).rev().find_map(|i| {
        let date = parts[i];
        let time = parts[i + 1];
        let digits = time.bytes().take_while(u8::is_ascii_digit).count();
        if date.is_empty() || !date.bytes().all(|b| b.is_ascii_digit()) || digits == 0 {
            return None;
        }
        compact_datetime(date, &time[..digits]).map(|dt| dt.and_utc().timestamp())
    })
}

fn first_token<'a>(rest: &'a str) -> &'a str {
    rest.split_whitespace().next().unwrap_or("")
}

/// Line-at-a-time accumulator for the track log.
#[derive(Debug)]
pub struct TrackLogParser<'a> {
    fill_value:   f32,
    primary:      &'a [i64],
    found_center: bool,
    line_no:      usize,
    series:       TrackSeries,
}

impl<'a> TrackLogParser<'a> {
    /// `primary` is the coefficient time axis, used only to report disagreements.
    pub fn new(primary: &'a [i64], fill_value: f32) -> Self {
        Self {
            fill_value,
            primary,
            found_center: false,
            line_no: 0,
            series: TrackSeries::default(),
        }
    }

    pub fn parse_line(&mut self, line: &str) -> Result<()> {
        self.line_no += 1;
        let n = self.line_no;
        let line = line.trim_end();
        if line.trim_start().starts_with('#') {
            return Ok(());
        }
        let s = &mut self.series;

        if let Some(pos) = line.find("Found file:") {
            let name = &line[pos + "Found file:".len()..];
            match volume_time(name) {
                Some(t) => {
                    let idx = s.times.len();
                    match self.primary.get(idx) {
                        Some(&p) if p == t => {}
                        Some(&p) => warn!("line {n}: time mismatch at volume {idx}: log {t}, coefficients {p}"),
                        None => warn!("line {n}: volume {idx} at {t} has no coefficient time"),
                    }
                    s.times.push(t);
                }
                None => debug!("line {n}: no time stamp in '{}'", name.trim()),
            }
        }

        if line.contains("Finding center") {
            self.found_center = false;
        }

        if let Some(pos) = line.find("Position estimate ") {
            let mut tok = line[pos + "Position estimate ".len()..].split_whitespace();
            if let (Some(lat), Some(_), Some(lon)) = (tok.next(), tok.next(), tok.next()) {
                s.lats.push(parse_number(lat, "latitude", n)?);
                s.lons.push(parse_number(lon, "longitude", n)?);
                self.found_center = true;
            }
        }

        if let Some(rest) = line.strip_prefix("Maximum inbound velocity of ") {
            s.max_in.push(parse_number(first_token(rest), "inbound velocity", n)?);
            if !self.found_center {
                s.lats.push(self.fill_value);
                s.lons.push(self.fill_value);
                s.rmw.push(self.fill_value);
            }
        }
        if let Some(rest) = line.strip_prefix("Maximum outbound velocity of ") {
            s.max_out.push(parse_number(first_token(rest), "outbound velocity", n)?);
        }
        if let Some(rest) = line.strip_prefix("Central Pressure estimate ") {
            s.pressure.push(parse_number(first_token(rest), "central pressure", n)?);
        }
        // The summary line carries no surface wind; it only marks one volume's entry.
        if line.starts_with("VORTRAC ATCF") {
            let fields = line.split(',').count();
            if fields < ATCF_FIELDS {
                return Err(ConvertError::Format {
                    line: n,
                    field: "ATCF summary",
                    text: line.to_string(),
                });
            }
            s.max_wind.push(self.fill_value);
        }
        if let Some(rest) = line.strip_prefix("RMW estimate ") {
            s.rmw.push(parse_number(first_token(rest), "RMW", n)?);
        }
        Ok(())
    }

    pub fn finish(self) -> TrackSeries {
        let s = self.series;
        info!("end of track log: {} volumes", s.times.len());
        if s.times.len() != self.primary.len() {
            warn!(
                "track log has {} volumes, coefficient listing has {} times",
                s.times.len(),
                self.primary.len()
            );
        }
        s
    }
}

/// Parse a whole track log. Invalid UTF-8 is replaced rather than rejected.
pub fn read_track_log<R: Read>(mut reader: R, primary: &[i64], fill_value: f32) -> Result<TrackSeries> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let text = String::from_utf8_lossy(&bytes);
    let mut parser = TrackLogParser::new(primary, fill_value);
    for line in text.lines() {
        parser.parse_line(line)?;
    }
    Ok(parser.finish())
}
