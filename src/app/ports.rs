//! Port traits: the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ RotationController / DisplayService (domain)
//! ```
//!
//! Driven adapters (display, indicator, sensor, clock, event sink) implement
//! these traits. The domain consumes them via generics, so the rotation
//! core never touches hardware directly and every test runs on the host.
//!
//! Adapters that more than one consumer needs (the sensor is read by two
//! providers, the indicator is driven by a provider and cleared at
//! shutdown) are shared as `Arc<Mutex<T>>`; the blanket impls at the bottom
//! let that wrapper stand in wherever the port is expected.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::NaiveDateTime;

use crate::error::Result;

use super::classifier::IndicatorCommand;
use super::events::AppEvent;
use super::payload::Payload;

// ───────────────────────────────────────────────────────────────
// Display port (domain → character display)
// ───────────────────────────────────────────────────────────────

pub trait DisplayPort {
    /// Clear prior content and show `payload`.
    fn render(&mut self, payload: &Payload) -> Result<()>;

    /// Blank the display.
    fn clear(&mut self) -> Result<()>;
}

// ───────────────────────────────────────────────────────────────
// Indicator port (domain → tri-colour LED)
// ───────────────────────────────────────────────────────────────

pub trait IndicatorPort {
    /// Apply every channel instruction in `command`. Idempotent.
    fn set(&mut self, command: &IndicatorCommand) -> Result<()>;

    /// Switch every channel off for a safe shutdown.
    fn all_off(&mut self) -> Result<()> {
        self.set(&IndicatorCommand::all_off())
    }
}

// ───────────────────────────────────────────────────────────────
// Sensor port (hardware → domain)
// ───────────────────────────────────────────────────────────────

pub trait SensorPort {
    /// Ambient temperature in °C.
    fn read_temperature(&mut self) -> Result<f32>;

    /// Relative humidity in %.
    fn read_humidity(&mut self) -> Result<f32>;
}

// ───────────────────────────────────────────────────────────────
// Clock port (wall clock → date/time messages)
// ───────────────────────────────────────────────────────────────

pub trait ClockPort {
    /// Current local date and time.
    fn now(&self) -> NaiveDateTime;
}

// ───────────────────────────────────────────────────────────────
// Button input port (hardware → router)
// ───────────────────────────────────────────────────────────────

/// Callback invoked once per press edge.
pub type PressHandler = Box<dyn FnMut() + Send + 'static>;

/// One physical button. The handler may be called from any thread, at any
/// time, once per press.
pub trait ButtonInput {
    fn on_press(&mut self, handler: PressHandler);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (domain → logging)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`]s through this port. Adapters
/// decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent);
}

// ───────────────────────────────────────────────────────────────
// Shared adapters
// ───────────────────────────────────────────────────────────────

impl<T: DisplayPort> DisplayPort for Arc<Mutex<T>> {
    fn render(&mut self, payload: &Payload) -> Result<()> {
        self.lock().unwrap_or_else(PoisonError::into_inner).render(payload)
    }

    fn clear(&mut self) -> Result<()> {
        self.lock().unwrap_or_else(PoisonError::into_inner).clear()
    }
}

impl<T: IndicatorPort> IndicatorPort for Arc<Mutex<T>> {
    fn set(&mut self, command: &IndicatorCommand) -> Result<()> {
        self.lock().unwrap_or_else(PoisonError::into_inner).set(command)
    }

    fn all_off(&mut self) -> Result<()> {
        self.lock().unwrap_or_else(PoisonError::into_inner).all_off()
    }
}

impl<T: SensorPort> SensorPort for Arc<Mutex<T>> {
    fn read_temperature(&mut self) -> Result<f32> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .read_temperature()
    }

    fn read_humidity(&mut self) -> Result<f32> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .read_humidity()
    }
}
