//! Time adapters: the blocking delay behind the rotation wait, and the
//! monotonic millisecond counter that stamps button edges.
//!
//! - **`target_os = "espidf"`**: `esp_timer_get_time()` from the ESP-IDF
//!   high-resolution timer (microsecond precision, monotonic, ISR-safe).
//! - **`not(target_os = "espidf")`**: `std::time::Instant` for host-side
//!   testing and simulation.

use std::time::Duration;

use embedded_hal::delay::DelayNs;

/// [`DelayNs`] backed by `std::thread::sleep`. On ESP-IDF this yields to
/// FreeRTOS, so the button threads keep running during the wait.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }
}

/// Milliseconds since boot, truncated to `u32`. Safe to call from an ISR.
#[cfg(target_os = "espidf")]
pub fn uptime_ms() -> u32 {
    // SAFETY: esp_timer_get_time has no preconditions and is ISR-safe.
    ((unsafe { esp_idf_svc::sys::esp_timer_get_time() }) / 1_000) as u32
}

/// Milliseconds since first call, truncated to `u32`.
#[cfg(not(target_os = "espidf"))]
pub fn uptime_ms() -> u32 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_millis() as u32
}
