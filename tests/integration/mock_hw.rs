//! Mock adapters for integration tests.
//!
//! Record every port call so tests can assert on the full history without
//! touching real GPIO or I2C.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};
use embedded_hal::delay::DelayNs;

use statusboard::app::catalog::{MessageCatalog, MessageProvider, fixed};
use statusboard::app::classifier::IndicatorCommand;
use statusboard::app::events::AppEvent;
use statusboard::app::payload::Payload;
use statusboard::app::ports::{ClockPort, DisplayPort, EventSink, IndicatorPort, SensorPort};
use statusboard::app::rotation::RotationHandle;
use statusboard::error::{Result, SensorError};

// ── Display ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum DisplayCall {
    Render(Payload),
    Clear,
}

/// Cloneable: clones share the call log, so a test can keep one while the
/// controller owns the other.
#[derive(Clone, Default)]
pub struct RecordingDisplay {
    pub calls: Arc<Mutex<Vec<DisplayCall>>>,
}

#[allow(dead_code)]
impl RecordingDisplay {
    pub fn rendered_first_lines(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                DisplayCall::Render(p) => Some(p.first().to_string()),
                DisplayCall::Clear => None,
            })
            .collect()
    }

    pub fn last(&self) -> Option<DisplayCall> {
        self.calls.lock().unwrap().last().cloned()
    }
}

impl DisplayPort for RecordingDisplay {
    fn render(&mut self, payload: &Payload) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(DisplayCall::Render(payload.clone()));
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.calls.lock().unwrap().push(DisplayCall::Clear);
        Ok(())
    }
}

// ── Indicator ─────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingIndicator {
    pub commands: Arc<Mutex<Vec<IndicatorCommand>>>,
}

#[allow(dead_code)]
impl RecordingIndicator {
    pub fn last(&self) -> Option<IndicatorCommand> {
        self.commands.lock().unwrap().last().copied()
    }
}

impl IndicatorPort for RecordingIndicator {
    fn set(&mut self, command: &IndicatorCommand) -> Result<()> {
        self.commands.lock().unwrap().push(*command);
        Ok(())
    }
}

// ── Sensor ────────────────────────────────────────────────────

/// Replays queued temperature readings; an empty queue reads as a timeout.
#[derive(Clone, Default)]
pub struct ScriptedSensor {
    pub temperatures: Arc<Mutex<VecDeque<f32>>>,
    pub humidity: f32,
}

#[allow(dead_code)]
impl ScriptedSensor {
    pub fn with_temperatures(temps: &[f32]) -> Self {
        Self {
            temperatures: Arc::new(Mutex::new(temps.iter().copied().collect())),
            humidity: 45.0,
        }
    }
}

impl SensorPort for ScriptedSensor {
    fn read_temperature(&mut self) -> Result<f32> {
        self.temperatures
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(SensorError::Timeout.into())
    }

    fn read_humidity(&mut self) -> Result<f32> {
        Ok(self.humidity)
    }
}

// ── Clock ─────────────────────────────────────────────────────

#[derive(Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

#[allow(dead_code)]
impl FixedClock {
    /// Monday 2024-03-04, 13:02:03.
    pub fn monday_afternoon() -> Self {
        Self(
            NaiveDate::from_ymd_opt(2024, 3, 4)
                .unwrap()
                .and_hms_opt(13, 2, 3)
                .unwrap(),
        )
    }
}

impl ClockPort for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

// ── Delay ─────────────────────────────────────────────────────

/// Instant `DelayNs` that runs `hook(call_index, rotation)` inside each
/// sleep. The handle is attached after the controller exists.
pub struct ScriptedDelay<F> {
    pub calls: usize,
    pub total_ns: u64,
    pub handle: Option<RotationHandle>,
    hook: F,
}

impl<F: FnMut(usize, &RotationHandle)> ScriptedDelay<F> {
    pub fn new(hook: F) -> Self {
        Self {
            calls: 0,
            total_ns: 0,
            handle: None,
            hook,
        }
    }
}

impl<F: FnMut(usize, &RotationHandle)> DelayNs for ScriptedDelay<F> {
    fn delay_ns(&mut self, ns: u32) {
        if let Some(h) = &self.handle {
            (self.hook)(self.calls, h);
        }
        self.calls += 1;
        self.total_ns += u64::from(ns);
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Default)]
pub struct VecSink {
    pub events: Vec<AppEvent>,
}

impl EventSink for VecSink {
    fn emit(&mut self, event: &AppEvent) {
        self.events.push(event.clone());
    }
}

// ── Catalogs ──────────────────────────────────────────────────

/// `n` fixed one-line messages labelled `"0"`, `"1"`, ...
#[allow(dead_code)]
pub fn numbered_catalog(n: usize) -> MessageCatalog {
    const LABELS: [&str; 8] = ["0", "1", "2", "3", "4", "5", "6", "7"];
    MessageCatalog::new(
        LABELS[..n]
            .iter()
            .map(|&l| Box::new(fixed(l, Payload::one_line(l))) as Box<dyn MessageProvider>)
            .collect(),
    )
    .unwrap()
}
