//! Tri-colour indicator LED driver.
//!
//! Three GPIOs drive discrete red, green and blue LEDs (or a common-cathode
//! RGB LED) fully on or fully off. Any combination of channels may be lit;
//! the temperature band logic only ever lights one.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: three `PinDriver<AnyOutputPin, Output>`.
//! On host/test: any `embedded_hal` output pin, or the simulator in
//! `adapters::sim`.

use embedded_hal::digital::{OutputPin, PinState};

use crate::app::classifier::{Channel, IndicatorCommand, Level};
use crate::error::IndicatorError;

pub struct TriColorLed<P> {
    red: P,
    green: P,
    blue: P,
    current: [Level; 3],
}

impl<P: OutputPin> TriColorLed<P> {
    /// Take the pins and switch every channel off.
    pub fn new(red: P, green: P, blue: P) -> Result<Self, IndicatorError> {
        let mut led = Self {
            red,
            green,
            blue,
            current: [Level::Off; 3],
        };
        led.apply(&IndicatorCommand::all_off())?;
        Ok(led)
    }

    /// Drive every channel named in `command`, in order.
    pub fn apply(&mut self, command: &IndicatorCommand) -> Result<(), IndicatorError> {
        for c in command.iter() {
            self.set_channel(c.channel, c.level)?;
        }
        Ok(())
    }

    pub fn set_channel(&mut self, channel: Channel, level: Level) -> Result<(), IndicatorError> {
        let pin = match channel {
            Channel::Red => &mut self.red,
            Channel::Green => &mut self.green,
            Channel::Blue => &mut self.blue,
        };
        pin.set_state(PinState::from(level == Level::On))
            .map_err(|_| IndicatorError::PinWriteFailed)?;
        self.current[channel as usize] = level;
        Ok(())
    }

    pub fn level(&self, channel: Channel) -> Level {
        self.current[channel as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::{ErrorKind, ErrorType};

    #[derive(Default)]
    struct Pin {
        high: bool,
        broken: bool,
    }

    impl ErrorType for Pin {
        type Error = ErrorKind;
    }

    impl OutputPin for Pin {
        fn set_low(&mut self) -> Result<(), ErrorKind> {
            if self.broken {
                return Err(ErrorKind::Other);
            }
            self.high = false;
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), ErrorKind> {
            if self.broken {
                return Err(ErrorKind::Other);
            }
            self.high = true;
            Ok(())
        }
    }

    #[test]
    fn starts_dark_and_lights_one_channel() {
        let mut led = TriColorLed::new(Pin::default(), Pin::default(), Pin::default()).unwrap();
        assert!(Channel::ALL.iter().all(|&c| led.level(c) == Level::Off));

        led.apply(&IndicatorCommand::only(Channel::Blue)).unwrap();
        assert!(led.blue.high);
        assert!(!led.red.high && !led.green.high);

        led.apply(&IndicatorCommand::only(Channel::Green)).unwrap();
        assert!(led.green.high);
        assert!(!led.blue.high);
        assert_eq!(led.level(Channel::Green), Level::On);
    }

    #[test]
    fn broken_pin_reported() {
        let bad = Pin {
            high: false,
            broken: true,
        };
        assert_eq!(
            TriColorLed::new(Pin::default(), bad, Pin::default()).err(),
            Some(IndicatorError::PinWriteFailed)
        );
    }
}
