//! Serial telemetry ingestor.
//!
//! A thermostat on the other end of a serial link sends one JSON object per
//! line. Each accepted object is lowercased, stamped with the local time it
//! arrived under a `datetime` key, and appended to an in-memory log that is
//! dumped as pretty JSON when ingestion ends.
//!
//! ```text
//!   {"state":"HEAT","temp":21.5}\n  ──▶  {"state":"heat","temp":21.5,
//!                                         "datetime":"2024-03-04 13:02:03.000250"}
//! ```
//!
//! Fields keep their arrival order and the stamp goes last. A stamp that
//! falls on a whole second carries no fractional part.
//!
//! Malformed lines are logged and skipped; a noisy link must not end the
//! session.

use core::fmt;
use std::io::{self, BufRead};

use chrono::{NaiveDateTime, Timelike};
use log::{info, warn};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

use crate::app::ports::ClockPort;

/// Key the arrival stamp is stored under.
pub const STAMP_KEY: &str = "datetime";

/// Arrival stamp layout, microsecond precision.
const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
/// Layout for stamps with no sub-second part.
const STAMP_FORMAT_WHOLE: &str = "%Y-%m-%d %H:%M:%S";

/// Render an arrival stamp; the fraction is dropped when it is zero.
pub fn format_stamp(now: NaiveDateTime) -> String {
    let layout = if now.nanosecond() / 1_000 == 0 {
        STAMP_FORMAT_WHOLE
    } else {
        STAMP_FORMAT
    };
    now.format(layout).to_string()
}

#[derive(Debug)]
pub enum TelemetryError {
    /// The line is not valid JSON.
    Json(serde_json::Error),
    /// Valid JSON, but not an object.
    NotAnObject,
    /// Reading the input failed.
    Io(io::Error),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(e) => write!(f, "malformed JSON: {e}"),
            Self::NotAnObject => write!(f, "record is not a JSON object"),
            Self::Io(e) => write!(f, "read failed: {e}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            Self::Io(e) => Some(e),
            Self::NotAnObject => None,
        }
    }
}

impl From<serde_json::Error> for TelemetryError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<io::Error> for TelemetryError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// What happened to one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Stored,
    /// Blank line (a bare terminator or whitespace).
    Blank,
}

/// Ingestion totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub stored: usize,
    pub rejected: usize,
}

#[derive(Debug, Default, Serialize)]
#[serde(transparent)]
pub struct TelemetryLog {
    records: Vec<Map<String, Value>>,
}

impl TelemetryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Map<String, Value>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Parse one line and append it, stamped with `now`.
    pub fn ingest_line(
        &mut self,
        line: &str,
        now: NaiveDateTime,
    ) -> Result<LineOutcome, TelemetryError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(LineOutcome::Blank);
        }
        let Value::Object(mut record) = serde_json::from_str::<Value>(&line.to_lowercase())? else {
            return Err(TelemetryError::NotAnObject);
        };
        record.insert(STAMP_KEY.to_string(), Value::String(format_stamp(now)));
        self.records.push(record);
        Ok(LineOutcome::Stored)
    }

    /// Ingest every line of `reader` until end of input or `stop` returns
    /// true. Bad lines are logged and counted; only a read failure ends
    /// ingestion early.
    pub fn ingest<R, C, S>(
        &mut self,
        reader: R,
        clock: &C,
        stop: S,
    ) -> Result<IngestStats, TelemetryError>
    where
        R: BufRead,
        C: ClockPort,
        S: Fn() -> bool,
    {
        let mut stats = IngestStats::default();
        for line in reader.lines() {
            if stop() {
                break;
            }
            self.accept(&line?, clock.now(), &mut stats);
        }
        Ok(stats)
    }

    /// [`ingest_line`](Self::ingest_line) that logs the outcome and counts
    /// it in `stats` instead of returning it.
    pub fn accept(&mut self, line: &str, now: NaiveDateTime, stats: &mut IngestStats) {
        match self.ingest_line(line, now) {
            Ok(LineOutcome::Stored) => {
                stats.stored += 1;
                info!("RECV  | records={}", self.len());
            }
            Ok(LineOutcome::Blank) => {}
            Err(e) => {
                stats.rejected += 1;
                warn!("SKIP  | {}", e);
            }
        }
    }

    /// The whole log as a JSON array, four-space indented.
    pub fn to_pretty_json(&self) -> Result<String, TelemetryError> {
        let mut out = Vec::new();
        let mut ser =
            serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
        self.serialize(&mut ser)?;
        // serde_json only ever writes valid UTF-8.
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}
