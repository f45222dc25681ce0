//! Sensor drivers.
//!
//! The board carries a single AHTx0 temperature/humidity sensor on I2C.
//! Drivers here return their own [`SensorError`](crate::error::SensorError);
//! the hardware adapter lifts them into the domain [`SensorPort`](crate::app::ports::SensorPort).

pub mod aht20;
