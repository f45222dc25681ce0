//! Display, indicator and button drivers, plus core-pinned task spawning.

pub mod button;
pub mod hd44780;
pub mod status_led;
pub mod task_pin;
