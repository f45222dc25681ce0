//! Fuzz target: telemetry line ingestion
//!
//! Feeds arbitrary bytes to `TelemetryLog::ingest_line` and verifies:
//! - No panics on any input, valid UTF-8 or not
//! - A line is either stored, skipped as blank, or rejected; never more
//!   than one record per line
//! - Every stored record carries the arrival stamp and survives the
//!   pretty dump
//!
//! cargo fuzz run fuzz_telemetry_line

#![no_main]

use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;
use statusboard::telemetry::{LineOutcome, STAMP_KEY, TelemetryLog};

fuzz_target!(|data: &[u8]| {
    let Ok(line) = core::str::from_utf8(data) else {
        return;
    };
    let Some(now) = NaiveDate::from_ymd_opt(2024, 3, 4).and_then(|d| d.and_hms_opt(13, 2, 3))
    else {
        return;
    };

    let mut log = TelemetryLog::new();
    match log.ingest_line(line, now) {
        Ok(LineOutcome::Stored) => {
            assert_eq!(log.len(), 1);
            assert!(log.records()[0].contains_key(STAMP_KEY));
        }
        Ok(LineOutcome::Blank) => assert!(line.trim().is_empty()),
        Err(_) => assert!(log.is_empty()),
    }

    let json = log.to_pretty_json().expect("serializing a parsed log cannot fail");
    let back: serde_json::Value = serde_json::from_str(&json).expect("dump is JSON");
    assert_eq!(back.as_array().map(Vec::len), Some(log.len()));
});
