//! Wall-clock adapter.
//!
//! Local time from the system clock. On the device the clock is whatever
//! SNTP (or the RTC) set and `TZ` decides the offset; on the host it is the
//! workstation's local time.

use chrono::{Local, NaiveDateTime};

use crate::app::ports::ClockPort;

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl ClockPort for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
