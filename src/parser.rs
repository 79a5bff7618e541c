//! Line parser for coefficient listings.
//!
//! A listing is a sequence of blocks, each opened by a time marker:
//!
//! ```text
//! # Vortex time: 2017-09-10:12:00
//! # level,radius,coefficient,value
//! 1,20,VTC0,35.21
//! 1,21,VTC0,-0.00
//! ```

use crate::error::{ConvertError, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use log::{debug, warn};

/// Prefix of the line that opens a new observation time.
pub const TIME_MARKER: &str = "# Vortex time:";

/// Textual layouts a time stamp can take, depending on which file it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    /// `YYYY-MM-DD:HH:MM`, written by the coefficient listing.
    Dashed,
    /// `YYYYMMDD_HHMM`, embedded in radar volume file names.
    Compact,
}

/// Turn a time stamp into seconds since the Unix epoch, fields taken as UTC.
pub fn parse_timestamp(text: &str, format: TimeFormat) -> Option<i64> {
    let text = text.trim();
    let naive = match format {
        TimeFormat::Dashed => {
            let token = text.split_whitespace().next()?;
            NaiveDateTime::parse_from_str(token, "%Y-%m-%d:%H:%M")
                .or_else(|_| NaiveDateTime::parse_from_str(token, "%Y-%m-%d:%H:%M:%S"))
                .ok()?
        }
        TimeFormat::Compact => {
            let (date, time) = text.split_once('_')?;
            compact_datetime(date, time)?
        }
    };
    Some(naive.and_utc().timestamp())
}

/// `date` must start with 8 digits and `time` with 4; anything after is ignored.
pub(crate) fn compact_datetime(date: &str, time: &str) -> Option<NaiveDateTime> {
    let date = date.get(..8)?;
    let time = time.get(..4)?;
    let d = NaiveDate::parse_from_str(date, "%Y%m%d").ok()?;
    let t = NaiveTime::parse_from_str(time, "%H%M").ok()?;
    Some(NaiveDateTime::new(d, t))
}

/// True when `text` is an optional sign, zeros and at most one decimal point
/// (`0`, `-0.00`, `+.0`, `00.`). Such values are upstream's "invalid" flag.
pub fn is_zero_like(text: &str) -> bool {
    let body = text
        .strip_prefix(|c: char| c == '+' || c == '-')
        .unwrap_or(text);
    let mut zeros = 0;
    let mut dot = false;
    for c in body.chars() {
        match c {
            '0' => zeros += 1,
            '.' if !dot => dot = true,
            _ => return false,
        }
    }
    zeros > 0
}

/// One observed coefficient value, addressed by time index and axis values.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientTuple {
    pub time:   usize,
    pub level:  f64,
    pub radius: f64,
    pub name:   String,
    pub value:  f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    /// A new time slot was opened at `index`.
    TimeMarker { index: usize, epoch: i64 },
    Tuple(CoefficientTuple),
    Ignore,
}

/// Stateful line classifier; tracks the line number and the current time index.
#[derive(Debug)]
pub struct TupleParser {
    fill_value: f32,
    line_no:    usize,
    time_index: Option<usize>,
}

impl TupleParser {
    pub fn new(fill_value: f32) -> Self {
        Self { fill_value, line_no: 0, time_index: None }
    }

    /// Number of lines consumed so far.
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    pub fn parse(&mut self, line: &str) -> Result<Parsed> {
        self.line_no += 1;
        let line_no = self.line_no;

        if let Some(rest) = line.strip_prefix(TIME_MARKER) {
            let epoch = parse_timestamp(rest, TimeFormat::Dashed)
                .or_else(|| parse_timestamp(rest, TimeFormat::Compact))
                .ok_or_else(|| ConvertError::TimeMarker {
                    line: line_no,
                    text: rest.trim().to_string(),
                })?;
            let index = self.time_index.map_or(0, |t| t + 1);
            self.time_index = Some(index);
            return Ok(Parsed::TimeMarker { index, epoch });
        }

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(Parsed::Ignore);
        }

        let fields: Vec<&str> = trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();
        if fields.len() != 4 {
            debug!("line {line_no}: skipping '{trimmed}'");
            return Ok(Parsed::Ignore);
        }

        let level  = parse_field(fields[0], "level", line_no)?;
        let radius = parse_field(fields[1], "radius", line_no)?;
        let value  = if is_zero_like(fields[3]) {
            self.fill_value
        } else {
            parse_number(fields[3], "value", line_no)?
        };

        let time = match self.time_index {
            Some(t) => t,
            None => {
                warn!("line {line_no}: data before the first time marker, using an implicit time slot");
                self.time_index = Some(0);
                0
            }
        };

        Ok(Parsed::Tuple(CoefficientTuple {
            time,
            level,
            radius,
            name: fields[2].to_string(),
            value,
        }))
    }
}

fn parse_field(text: &str, field: &'static str, line: usize) -> Result<f64> {
    match text.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ConvertError::Format { line, field, text: text.to_string() }),
    }
}

/// Parse a value destined for an `f32` variable, rejecting text that overflows it.
pub(crate) fn parse_number(text: &str, field: &'static str, line: usize) -> Result<f32> {
    let v = parse_field(text, field, line)? as f32;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(ConvertError::Format { line, field, text: text.to_string() })
    }
}
