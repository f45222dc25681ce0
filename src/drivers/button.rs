//! ISR-debounced push-button driver.
//!
//! ## Hardware
//!
//! Active-low momentary switches with pull-ups. Each GPIO fires on the
//! falling edge; the ISR only calls [`PressCounter::record`], which is a
//! handful of lock-free atomic operations. Everything else (invoking the
//! press handler, logging, touching the rotation) happens on the poller
//! thread, never in interrupt context.
//!
//! ```text
//!   GPIO ISR ──record()──▶ PressCounter ◀──poll()── ButtonLine ──▶ PressHandler
//! ```
//!
//! ESP-IDF disables a GPIO interrupt after it fires; the poller's rearm
//! hook turns it back on once the press has been consumed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::{debug, info};

use super::task_pin::spawn_on_core;
use crate::app::ports::{ButtonInput, PressHandler};
use crate::pins::BUTTON_POLL_TASK;

/// Edges closer together than this are contact bounce.
pub const DEBOUNCE_MS: u32 = 50;

/// Interrupt-safe press counter for one button.
#[derive(Debug, Default)]
pub struct PressCounter {
    presses: AtomicU32,
    last_ms: AtomicU32,
    seen_any: AtomicBool,
}

impl PressCounter {
    pub const fn new() -> Self {
        Self {
            presses: AtomicU32::new(0),
            last_ms: AtomicU32::new(0),
            seen_any: AtomicBool::new(false),
        }
    }

    /// Record a falling edge at `now_ms`. Returns `false` if the edge was
    /// discarded as bounce. Safe to call from an ISR.
    pub fn record(&self, now_ms: u32) -> bool {
        let last = self.last_ms.load(Ordering::Acquire);
        if self.seen_any.load(Ordering::Acquire) && now_ms.wrapping_sub(last) < DEBOUNCE_MS {
            return false;
        }
        self.last_ms.store(now_ms, Ordering::Release);
        self.seen_any.store(true, Ordering::Release);
        self.presses.fetch_add(1, Ordering::AcqRel);
        true
    }

    /// Count a press from a source that cannot bounce (console, tests).
    pub fn press(&self) {
        self.presses.fetch_add(1, Ordering::AcqRel);
    }

    /// Total accepted presses since boot (wrapping).
    pub fn count(&self) -> u32 {
        self.presses.load(Ordering::Acquire)
    }
}

/// One button as seen by the application: a counter fed by the ISR and the
/// handler registered through [`ButtonInput`].
pub struct ButtonLine {
    name: &'static str,
    counter: Arc<PressCounter>,
    seen: u32,
    handler: Option<PressHandler>,
}

impl ButtonLine {
    pub fn new(name: &'static str, counter: Arc<PressCounter>) -> Self {
        let seen = counter.count();
        Self {
            name,
            counter,
            seen,
            handler: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn counter(&self) -> Arc<PressCounter> {
        self.counter.clone()
    }

    /// Invoke the handler once for every press recorded since the last
    /// poll. Presses with no handler registered are consumed silently.
    pub fn poll(&mut self) -> u32 {
        let now = self.counter.count();
        let new = now.wrapping_sub(self.seen);
        self.seen = now;
        if new == 0 {
            return 0;
        }
        debug!("Button {}: {} new press(es)", self.name, new);
        if let Some(handler) = self.handler.as_mut() {
            for _ in 0..new {
                handler();
            }
        }
        new
    }
}

impl ButtonInput for ButtonLine {
    fn on_press(&mut self, handler: PressHandler) {
        self.handler = Some(handler);
    }
}

/// Called after each poll round that saw presses, to re-enable interrupts.
pub type RearmHook = Box<dyn FnMut() + Send + 'static>;

/// Poll `lines` every `period` on a dedicated task until `stop` returns
/// true.
pub fn spawn_poller<S>(
    mut lines: Vec<ButtonLine>,
    period: Duration,
    stop: S,
    mut rearm: Option<RearmHook>,
) -> std::io::Result<JoinHandle<()>>
where
    S: Fn() -> bool + Send + 'static,
{
    spawn_on_core(BUTTON_POLL_TASK, move || {
        info!("Button poller started ({} lines)", lines.len());
        while !stop() {
            let fired: u32 = lines.iter_mut().map(ButtonLine::poll).sum();
            if fired > 0 {
                if let Some(rearm) = rearm.as_mut() {
                    rearm();
                }
            }
            thread::sleep(period);
        }
        info!("Button poller stopped");
    })
}
