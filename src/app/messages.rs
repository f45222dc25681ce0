//! Built-in message providers and the standard catalog.
//!
//! | # | Provider             | Line 1           | Line 2            |
//! |---|----------------------|------------------|-------------------|
//! | 0 | [`DayGreeting`]      | `Happy`          | `Monday!`         |
//! | 1 | [`CurrentTime`]      | `Current Time:`  | `01:02:03 PM`     |
//! | 2 | [`TemperatureMessage`] | `Temperature:` | `21.5C / 70.7F`   |
//! | 3 | [`HumidityMessage`]  | `Humidity:`      | `40.2%`           |

use log::debug;

use crate::error::{ConfigError, Result};

use super::catalog::{MessageCatalog, MessageProvider};
use super::classifier::{Classification, classify};
use super::payload::Payload;
use super::ports::{ClockPort, IndicatorPort, SensorPort};

pub struct DayGreeting<C> {
    clock: C,
}

impl<C: ClockPort> DayGreeting<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: ClockPort> MessageProvider for DayGreeting<C> {
    fn produce(&mut self) -> Result<Payload> {
        let day = self.clock.now().format("%A").to_string();
        Ok(Payload::two_line("Happy", &format!("{day}!")))
    }

    fn label(&self) -> &'static str {
        "day"
    }
}

pub struct CurrentTime<C> {
    clock: C,
}

impl<C: ClockPort> CurrentTime<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: ClockPort> MessageProvider for CurrentTime<C> {
    fn produce(&mut self) -> Result<Payload> {
        let time = self.clock.now().format("%I:%M:%S %p").to_string();
        Ok(Payload::two_line("Current Time:", &time))
    }

    fn label(&self) -> &'static str {
        "time"
    }
}

/// Temperature reading; drives the indicator to the matching band colour
/// every time it is shown.
pub struct TemperatureMessage<S, I> {
    sensor: S,
    indicator: I,
}

impl<S: SensorPort, I: IndicatorPort> TemperatureMessage<S, I> {
    pub fn new(sensor: S, indicator: I) -> Self {
        Self { sensor, indicator }
    }

    /// Read, classify and update the indicator.
    pub fn refresh(&mut self) -> Result<Classification> {
        let celsius = self.sensor.read_temperature()?;
        let classification = classify(celsius);
        debug!("temperature {:.1}C -> {:?}", celsius, classification.band);
        self.indicator.set(&classification.command)?;
        Ok(classification)
    }
}

impl<S: SensorPort, I: IndicatorPort> MessageProvider for TemperatureMessage<S, I> {
    fn produce(&mut self) -> Result<Payload> {
        Ok(self.refresh()?.payload)
    }

    fn label(&self) -> &'static str {
        "temperature"
    }
}

pub struct HumidityMessage<S> {
    sensor: S,
}

impl<S: SensorPort> HumidityMessage<S> {
    pub fn new(sensor: S) -> Self {
        Self { sensor }
    }
}

impl<S: SensorPort> MessageProvider for HumidityMessage<S> {
    fn produce(&mut self) -> Result<Payload> {
        let humidity = self.sensor.read_humidity()?;
        Ok(Payload::two_line("Humidity:", &format!("{humidity:.1}%")))
    }

    fn label(&self) -> &'static str {
        "humidity"
    }
}

/// The four messages the device ships with, in display order.
pub fn standard_catalog<C, S, I>(
    clock: C,
    sensor: S,
    indicator: I,
) -> core::result::Result<MessageCatalog, ConfigError>
where
    C: ClockPort + Clone + 'static,
    S: SensorPort + Clone + 'static,
    I: IndicatorPort + 'static,
{
    MessageCatalog::new(vec![
        Box::new(DayGreeting::new(clock.clone())),
        Box::new(CurrentTime::new(clock)),
        Box::new(TemperatureMessage::new(sensor.clone(), indicator)),
        Box::new(HumidityMessage::new(sensor)),
    ])
}
