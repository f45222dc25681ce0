//! Message-rotation controller.
//!
//! Two activities touch the rotation concurrently:
//!
//! ```text
//! ┌──────────────┐  advance / toggle_pause   ┌──────────────────────┐
//! │ Button       │──────────────────────────▶│                      │
//! │ dispatcher   │                           │  RotationState       │
//! └──────────────┘                           │  (one Mutex)         │
//! ┌──────────────┐  snapshot / auto_advance  │                      │
//! │ Main loop    │◀─────────────────────────▶│                      │
//! └──────────────┘                           └──────────────────────┘
//! ```
//!
//! Every transition takes the same lock, so transitions are linearizable
//! and `render_current` always reads a whole, current `(index, paused)`.
//!
//! ## Interruptible wait
//!
//! Button-driven transitions bump a *manual epoch*. The wait polls the
//! epoch every `interval / poll_divisor`; a change means a press landed and
//! the wait returns [`WaitOutcome::Interrupted`]. The timed advance is a
//! compare-and-advance on the epoch the wait started with, so a press that
//! lands after the wait returned but before the advance still wins the
//! cycle and the index moves exactly once.
//!
//! A wait that starts paused first sleeps one full interval without
//! looking at the state, then polls until the pause is lifted or a manual
//! advance arrives. The up-front hold mirrors how the device has always
//! behaved; it does add up to one interval of latency to the first press
//! after pausing.

use core::num::NonZeroUsize;
use core::time::Duration;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use embedded_hal::delay::DelayNs;
use log::{debug, info};

use crate::config::DisplayConfig;
use crate::error::{ConfigError, Error, Result};

use super::catalog::MessageCatalog;
use super::ports::DisplayPort;

/// Step direction through the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub const fn step(self) -> isize {
        match self {
            Self::Forward => 1,
            Self::Backward => -1,
        }
    }
}

/// A user-initiated transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualAction {
    Next,
    Previous,
    TogglePause,
}

/// `(index + step) mod len`, always in `[0, len)`.
pub fn wrap_index(index: usize, step: isize, len: NonZeroUsize) -> usize {
    let len = len.get() as isize;
    (index as isize + step).rem_euclid(len) as usize
}

/// Consistent copy of the rotation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationSnapshot {
    pub index: usize,
    pub paused: bool,
    /// Number of manual transitions applied so far.
    pub epoch: u64,
    /// Most recent manual transition.
    pub last_action: Option<ManualAction>,
}

#[derive(Debug)]
struct RotationState {
    current_index: usize,
    paused: bool,
    epoch: u64,
    last_action: Option<ManualAction>,
}

impl RotationState {
    fn snapshot(&self) -> RotationSnapshot {
        RotationSnapshot {
            index: self.current_index,
            paused: self.paused,
            epoch: self.epoch,
            last_action: self.last_action,
        }
    }
}

#[derive(Debug)]
struct Shared {
    state: Mutex<RotationState>,
    len: NonZeroUsize,
    shutdown: AtomicBool,
}

/// Cloneable handle to the one shared [`RotationState`].
///
/// Handed to the button dispatcher and the shutdown hook; the main loop
/// reaches the same record through its [`RotationController`].
#[derive(Debug, Clone)]
pub struct RotationHandle {
    shared: Arc<Shared>,
}

impl RotationHandle {
    /// Fresh state: index 0, running.
    pub fn new(len: NonZeroUsize) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(RotationState {
                    current_index: 0,
                    paused: false,
                    epoch: 0,
                    last_action: None,
                }),
                len,
                shutdown: AtomicBool::new(false),
            }),
        }
    }

    /// Catalog length the index wraps around.
    pub fn len(&self) -> NonZeroUsize {
        self.shared.len
    }

    pub fn snapshot(&self) -> RotationSnapshot {
        self.lock().snapshot()
    }

    /// Manual step in `direction`.
    pub fn advance(&self, direction: Direction) -> RotationSnapshot {
        let action = match direction {
            Direction::Forward => ManualAction::Next,
            Direction::Backward => ManualAction::Previous,
        };
        self.apply(action)
    }

    /// Manual pause/resume.
    pub fn toggle_pause(&self) -> RotationSnapshot {
        self.apply(ManualAction::TogglePause)
    }

    /// Apply one manual transition atomically and return the new state.
    pub fn apply(&self, action: ManualAction) -> RotationSnapshot {
        let mut state = self.lock();
        match action {
            ManualAction::Next => {
                state.current_index =
                    wrap_index(state.current_index, Direction::Forward.step(), self.shared.len);
            }
            ManualAction::Previous => {
                state.current_index =
                    wrap_index(state.current_index, Direction::Backward.step(), self.shared.len);
            }
            ManualAction::TogglePause => state.paused = !state.paused,
        }
        state.epoch += 1;
        state.last_action = Some(action);
        state.snapshot()
    }

    /// Timed advance. Applies only if no manual transition happened since
    /// `observed_epoch` and the rotation is running; returns the new state
    /// when it did.
    pub fn auto_advance(&self, observed_epoch: u64) -> Option<RotationSnapshot> {
        let mut state = self.lock();
        if state.epoch != observed_epoch || state.paused {
            return None;
        }
        state.current_index =
            wrap_index(state.current_index, Direction::Forward.step(), self.shared.len);
        Some(state.snapshot())
    }

    /// Ask the main loop to stop. Safe from a signal handler thread.
    pub fn request_shutdown(&self) {
        self.shared.shutdown.store(true, Ordering::Release);
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shared.shutdown.load(Ordering::Acquire)
    }

    // Every critical section leaves the record consistent, so a poisoned
    // lock still holds valid state.
    fn lock(&self) -> MutexGuard<'_, RotationState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// How a [`RotationController::wait_for_next_tick`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The full interval passed with no manual transition. Carries the
    /// epoch observed at the start, for [`RotationHandle::auto_advance`].
    Elapsed { epoch: u64 },
    /// A manual transition landed during the wait; no timed advance this
    /// cycle.
    Interrupted(ManualAction),
    /// Shutdown was requested.
    Shutdown,
}

impl WaitOutcome {
    pub fn is_interrupted(&self) -> bool {
        !matches!(self, Self::Elapsed { .. })
    }
}

/// What `render_current` put on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rendered {
    pub index: usize,
    pub label: &'static str,
}

/// A render that failed, with the index it was attempting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderFailure {
    pub index: usize,
    pub error: Error,
}

/// Owns the catalog and the display, and drives the shared rotation state.
pub struct RotationController<D, W> {
    catalog: MessageCatalog,
    state: RotationHandle,
    display: D,
    delay: W,
    poll_divisor: u32,
}

impl<D: DisplayPort, W: DelayNs> RotationController<D, W> {
    /// Validate `config` and start at index 0, running.
    pub fn new(
        catalog: MessageCatalog,
        display: D,
        delay: W,
        config: &DisplayConfig,
    ) -> core::result::Result<Self, ConfigError> {
        config.validate()?;
        let state = RotationHandle::new(catalog.len());
        info!(
            "Rotation: {} messages, {} ms interval, {} polls/interval",
            catalog.len(),
            config.tick_interval_ms,
            config.poll_divisor
        );
        Ok(Self {
            catalog,
            state,
            display,
            delay,
            poll_divisor: config.poll_divisor,
        })
    }

    /// Handle for the button dispatcher and shutdown hook.
    pub fn handle(&self) -> RotationHandle {
        self.state.clone()
    }

    pub fn snapshot(&self) -> RotationSnapshot {
        self.state.snapshot()
    }

    pub fn len(&self) -> NonZeroUsize {
        self.catalog.len()
    }

    /// Produce the message at the current index and show it. Does not
    /// change the rotation state.
    pub fn render_current(&mut self) -> core::result::Result<Rendered, RenderFailure> {
        let index = self.state.snapshot().index;
        let label = self.catalog.label(index);
        let fail = |error| RenderFailure { index, error };
        let payload = self.catalog.produce(index).map_err(fail)?;
        self.display.render(&payload).map_err(fail)?;
        debug!("Rendered #{} ({}): {:?}", index, label, payload.first());
        Ok(Rendered { index, label })
    }

    pub fn advance(&self, direction: Direction) -> RotationSnapshot {
        self.state.advance(direction)
    }

    pub fn toggle_pause(&self) -> RotationSnapshot {
        self.state.toggle_pause()
    }

    /// Timed advance guarded by the epoch the wait started with.
    pub fn auto_advance(&self, observed_epoch: u64) -> Option<RotationSnapshot> {
        self.state.auto_advance(observed_epoch)
    }

    /// Block for up to `interval`, polling every `interval / poll_divisor`.
    pub fn wait_for_next_tick(&mut self, interval: Duration) -> WaitOutcome {
        let tick = interval / self.poll_divisor;
        let start = self.state.snapshot();

        if start.paused {
            // Full hold before the first observation point; only shutdown
            // is honoured here.
            for _ in 0..self.poll_divisor {
                if self.state.shutdown_requested() {
                    return WaitOutcome::Shutdown;
                }
                self.sleep(tick);
            }
            loop {
                if let Some(outcome) = self.observe(start.epoch) {
                    return outcome;
                }
                self.sleep(tick);
            }
        }

        for _ in 0..self.poll_divisor {
            if let Some(outcome) = self.observe(start.epoch) {
                return outcome;
            }
            self.sleep(tick);
        }
        self.observe(start.epoch)
            .unwrap_or(WaitOutcome::Elapsed { epoch: start.epoch })
    }

    /// Clear the display. Used on the shutdown path.
    pub fn clear_display(&mut self) -> Result<()> {
        self.display.clear()
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn delay(&self) -> &W {
        &self.delay
    }

    pub fn delay_mut(&mut self) -> &mut W {
        &mut self.delay
    }

    fn observe(&self, start_epoch: u64) -> Option<WaitOutcome> {
        if self.state.shutdown_requested() {
            return Some(WaitOutcome::Shutdown);
        }
        let now = self.state.snapshot();
        if now.epoch != start_epoch {
            let action = now.last_action.unwrap_or(ManualAction::TogglePause);
            return Some(WaitOutcome::Interrupted(action));
        }
        None
    }

    /// `delay_ns` takes a `u32`, so ticks past ~4.29 s go in pieces.
    fn sleep(&mut self, tick: Duration) {
        let mut left = tick.as_nanos();
        while left > 0 {
            let step = u32::try_from(left).unwrap_or(u32::MAX);
            self.delay.delay_ns(step);
            left -= u128::from(step);
        }
    }
}
