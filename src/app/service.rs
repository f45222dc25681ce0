//! Display service: the main rendering loop.
//!
//! [`DisplayService`] owns the [`RotationController`] and the event sink
//! and runs the render → wait → advance cycle until shutdown. Render
//! failures are reported and the loop carries on with the next cycle; a
//! flaky sensor must not stop the rotation.
//!
//! ```text
//!  ┌────────────────┐   ┌────────────────────┐   ┌──────────────────┐
//!  │ render_current │──▶│ wait_for_next_tick │──▶│ auto_advance     │──┐
//!  └────────────────┘   └────────────────────┘   │ (elapsed only)   │  │
//!          ▲                                      └──────────────────┘  │
//!          └────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`HardwareGuard`] wraps the display and indicator so both are cleared
//! when the controller is dropped, whether the loop returned normally or a
//! panic is unwinding through it.

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use log::{info, warn};

use crate::error::Result;

use super::events::{AppEvent, RotationCause};
use super::payload::Payload;
use super::ports::{DisplayPort, EventSink, IndicatorPort};
use super::rotation::{Rendered, RenderFailure, RotationController, RotationSnapshot, WaitOutcome};

/// Result of one render/wait/advance cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    pub rendered: core::result::Result<Rendered, RenderFailure>,
    pub outcome: WaitOutcome,
    /// State after the timed advance, when it ran.
    pub advanced: Option<RotationSnapshot>,
}

pub struct DisplayService<D, W, S> {
    controller: RotationController<D, W>,
    sink: S,
    interval: Duration,
    cycles: u64,
}

impl<D: DisplayPort, W: DelayNs, S: EventSink> DisplayService<D, W, S> {
    pub fn new(controller: RotationController<D, W>, sink: S, interval: Duration) -> Self {
        Self {
            controller,
            sink,
            interval,
            cycles: 0,
        }
    }

    pub fn controller(&self) -> &RotationController<D, W> {
        &self.controller
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Completed cycles since startup.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Run one cycle.
    pub fn run_cycle(&mut self) -> CycleReport {
        let rendered = self.controller.render_current();
        match rendered {
            Ok(r) => self.sink.emit(&AppEvent::MessageShown {
                index: r.index,
                label: r.label,
            }),
            Err(f) => self.sink.emit(&AppEvent::RenderFailed {
                index: f.index,
                error: f.error,
            }),
        }

        let outcome = self.controller.wait_for_next_tick(self.interval);
        let mut advanced = None;
        match outcome {
            WaitOutcome::Elapsed { epoch } => {
                advanced = self.controller.auto_advance(epoch);
                match advanced {
                    Some(s) => self.sink.emit(&AppEvent::RotationChanged {
                        cause: RotationCause::Timer,
                        index: s.index,
                        paused: s.paused,
                    }),
                    None => {
                        // A press landed between the end of the wait and the
                        // advance; it owns this cycle.
                        let s = self.controller.snapshot();
                        if let Some(action) = s.last_action {
                            self.sink.emit(&AppEvent::RotationChanged {
                                cause: RotationCause::Button(action),
                                index: s.index,
                                paused: s.paused,
                            });
                        }
                    }
                }
            }
            WaitOutcome::Interrupted(action) => {
                let s = self.controller.snapshot();
                self.sink.emit(&AppEvent::RotationChanged {
                    cause: RotationCause::Button(action),
                    index: s.index,
                    paused: s.paused,
                });
            }
            WaitOutcome::Shutdown => {}
        }

        self.cycles += 1;
        CycleReport {
            rendered,
            outcome,
            advanced,
        }
    }

    /// Cycle until shutdown is requested. Returns the number of cycles run.
    pub fn run(&mut self) -> u64 {
        self.sink.emit(&AppEvent::Started {
            messages: self.controller.len().get(),
            interval_ms: u64::try_from(self.interval.as_millis()).unwrap_or(u64::MAX),
        });
        loop {
            if self.controller.handle().shutdown_requested() {
                break;
            }
            if self.run_cycle().outcome == WaitOutcome::Shutdown {
                break;
            }
        }
        self.sink
            .emit(&AppEvent::ShutdownRequested { cycles: self.cycles });
        self.cycles
    }

    /// Give the controller back, e.g. to drop it (and its guard) explicitly.
    pub fn into_controller(self) -> RotationController<D, W> {
        self.controller
    }
}

/// Owns the display and indicator and returns both to a blank state when
/// dropped.
pub struct HardwareGuard<D: DisplayPort, I: IndicatorPort> {
    display: D,
    indicator: I,
    released: bool,
}

impl<D: DisplayPort, I: IndicatorPort> HardwareGuard<D, I> {
    pub fn new(display: D, indicator: I) -> Self {
        Self {
            display,
            indicator,
            released: false,
        }
    }

    pub fn indicator_mut(&mut self) -> &mut I {
        &mut self.indicator
    }

    /// Clear display and indicator now. Safe to call more than once.
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Err(e) = self.display.clear() {
            warn!("Cleanup: display clear failed: {}", e);
        }
        if let Err(e) = self.indicator.all_off() {
            warn!("Cleanup: indicator off failed: {}", e);
        }
        info!("Cleanup: display cleared, indicator off");
    }
}

impl<D: DisplayPort, I: IndicatorPort> DisplayPort for HardwareGuard<D, I> {
    fn render(&mut self, payload: &Payload) -> Result<()> {
        self.display.render(payload)
    }

    fn clear(&mut self) -> Result<()> {
        self.display.clear()
    }
}

impl<D: DisplayPort, I: IndicatorPort> Drop for HardwareGuard<D, I> {
    fn drop(&mut self) {
        self.release();
    }
}
