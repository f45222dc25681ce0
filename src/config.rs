//! System configuration parameters
//!
//! All tunable parameters for the status display. Values are compiled in;
//! `validate()` runs once at startup and any failure is fatal.

use core::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Core display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    // --- Rotation ---
    /// How long each message stays up before the timed advance (milliseconds)
    pub tick_interval_ms: u32,
    /// Polling ticks per interval; a button press is noticed within one tick
    pub poll_divisor: u32,

    // --- LCD ---
    /// Characters per display line
    pub lcd_columns: u8,
    /// Number of display lines
    pub lcd_lines: u8,

    // --- Sensor ---
    /// 7-bit I2C address of the AHTx0 temperature/humidity sensor
    pub sensor_i2c_address: u8,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            // Rotation
            tick_interval_ms: 5000, // 5 s per message
            poll_divisor: 10,       // 500 ms polling tick

            // LCD (16x2 character module)
            lcd_columns: 16,
            lcd_lines: 2,

            // Sensor
            sensor_i2c_address: 0x38,
        }
    }
}

impl DisplayConfig {
    /// Reject values the rotation loop or the LCD driver cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ValidationFailed("tick_interval_ms must be > 0"));
        }
        if self.poll_divisor == 0 {
            return Err(ConfigError::ValidationFailed("poll_divisor must be > 0"));
        }
        if self.poll_tick().is_zero() {
            return Err(ConfigError::ValidationFailed(
                "poll tick (tick_interval_ms / poll_divisor) rounds to zero",
            ));
        }
        if !(1..=40).contains(&self.lcd_columns) {
            return Err(ConfigError::ValidationFailed("lcd_columns must be 1..=40"));
        }
        if !(1..=4).contains(&self.lcd_lines) {
            return Err(ConfigError::ValidationFailed("lcd_lines must be 1..=4"));
        }
        if self.sensor_i2c_address > 0x7F {
            return Err(ConfigError::ValidationFailed(
                "sensor_i2c_address must be a 7-bit address",
            ));
        }
        Ok(())
    }

    /// Full rotation interval.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.tick_interval_ms))
    }

    /// Polling granularity inside one interval.
    pub fn poll_tick(&self) -> Duration {
        self.tick_interval() / self.poll_divisor.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = DisplayConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.tick_interval(), Duration::from_secs(5));
        assert_eq!(c.poll_tick(), Duration::from_millis(500));
    }

    #[test]
    fn zero_interval_rejected() {
        let c = DisplayConfig {
            tick_interval_ms: 0,
            ..DisplayConfig::default()
        };
        assert_eq!(
            c.validate(),
            Err(ConfigError::ValidationFailed("tick_interval_ms must be > 0"))
        );
    }

    #[test]
    fn zero_divisor_rejected() {
        let c = DisplayConfig {
            poll_divisor: 0,
            ..DisplayConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn vanishing_poll_tick_rejected() {
        let c = DisplayConfig {
            tick_interval_ms: 1,
            poll_divisor: 2_000_000,
            ..DisplayConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn long_poll_tick_accepted() {
        let c = DisplayConfig {
            tick_interval_ms: 60_000,
            poll_divisor: 1,
            ..DisplayConfig::default()
        };
        assert!(c.validate().is_ok());
        assert_eq!(c.poll_tick(), Duration::from_secs(60));
    }

    #[test]
    fn lcd_geometry_bounds() {
        let wide = DisplayConfig {
            lcd_columns: 41,
            ..DisplayConfig::default()
        };
        assert!(wide.validate().is_err());
        let tall = DisplayConfig {
            lcd_lines: 5,
            ..DisplayConfig::default()
        };
        assert!(tall.validate().is_err());
        let twenty_by_four = DisplayConfig {
            lcd_columns: 20,
            lcd_lines: 4,
            ..DisplayConfig::default()
        };
        assert!(twenty_by_four.validate().is_ok());
    }

    #[test]
    fn serde_roundtrip() {
        let c = DisplayConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: DisplayConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c, c2);
    }
}
