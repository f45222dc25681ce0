//! Hardware adapter: bridges the real peripheral drivers to domain port
//! traits.
//!
//! | Driver          | Port            |
//! |-----------------|-----------------|
//! | [`Hd44780`]     | [`DisplayPort`] |
//! | [`TriColorLed`] | [`IndicatorPort`] |
//! | [`Aht20`]       | [`SensorPort`]  |
//!
//! The drivers are generic over `embedded_hal`, so these impls serve both
//! the ESP-IDF build and host tests with mock pins.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;

use crate::app::classifier::IndicatorCommand;
use crate::app::payload::Payload;
use crate::app::ports::{DisplayPort, IndicatorPort, SensorPort};
use crate::drivers::hd44780::Hd44780;
use crate::drivers::status_led::TriColorLed;
use crate::error::Result;
use crate::sensors::aht20::Aht20;

// ── DisplayPort implementation ────────────────────────────────

impl<P: OutputPin, D: DelayNs> DisplayPort for Hd44780<P, D> {
    fn render(&mut self, payload: &Payload) -> Result<()> {
        Hd44780::clear(self)?;
        let lines = self.geometry().lines;
        for (row, text) in (0..lines).zip(payload.lines()) {
            self.write_line(row, text)?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        Ok(Hd44780::clear(self)?)
    }
}

// ── IndicatorPort implementation ──────────────────────────────

impl<P: OutputPin> IndicatorPort for TriColorLed<P> {
    fn set(&mut self, command: &IndicatorCommand) -> Result<()> {
        Ok(self.apply(command)?)
    }
}

// ── SensorPort implementation ─────────────────────────────────

impl<I: I2c, D: DelayNs> SensorPort for Aht20<I, D> {
    fn read_temperature(&mut self) -> Result<f32> {
        Ok(Aht20::read_temperature(self)?)
    }

    fn read_humidity(&mut self) -> Result<f32> {
        Ok(Aht20::read_humidity(self)?)
    }
}
