//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements                   | Connects to                 |
//! |------------|------------------------------|-----------------------------|
//! | `hardware` | DisplayPort                  | HD44780 LCD (GPIO)          |
//! |            | IndicatorPort                | Tri-colour LED (GPIO)       |
//! |            | SensorPort                   | AHTx0 (I2C)                 |
//! | `clock`    | ClockPort                    | System wall clock           |
//! | `log_sink` | EventSink                    | Serial log output           |
//! | `time`     | DelayNs                      | FreeRTOS / host sleep       |
//! | `sim`      | Display/Indicator/SensorPort | Console, stdin (host only)  |

pub mod clock;
pub mod hardware;
pub mod log_sink;
pub mod sim;
pub mod time;
