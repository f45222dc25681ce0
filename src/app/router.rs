//! Button event router.
//!
//! Each physical button maps to exactly one rotation transition:
//!
//! | Button | Cap colour | Transition        |
//! |--------|------------|-------------------|
//! | A      | red        | next message      |
//! | B      | green      | pause / resume    |
//! | C      | blue       | previous message  |
//!
//! Press handlers only enqueue the button onto a bounded FIFO channel.
//! A single dispatcher task drains the channel and applies each press as
//! its own transition, so concurrent presses are serialized in arrival
//! order and none are dropped or merged. When the channel is full the
//! producer waits for room instead of discarding; the ISR counters keep
//! recording in the meantime. The dispatcher takes the same lock as the
//! main loop, which is what makes the main loop's wait observe the change
//! within one polling tick.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering, fence};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};
use log::{debug, info, warn};

use super::ports::ButtonInput;
use super::rotation::{ManualAction, RotationHandle, RotationSnapshot};
use crate::drivers::task_pin::spawn_on_core;
use crate::pins::BUTTON_DISPATCH_TASK;

/// Presses the router holds before producers start waiting.
pub const ROUTER_DEPTH: usize = 16;

/// How long the idle dispatcher sleeps between queue checks.
const DISPATCH_IDLE_POLL: Duration = Duration::from_millis(10);
/// How long a producer waits before retrying a full queue.
const SEND_RETRY: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    A,
    B,
    C,
}

impl Button {
    pub const ALL: [Button; 3] = [Button::A, Button::B, Button::C];

    pub const fn action(self) -> ManualAction {
        match self {
            Self::A => ManualAction::Next,
            Self::B => ManualAction::TogglePause,
            Self::C => ManualAction::Previous,
        }
    }
}

struct PressQueue {
    channel: Channel<CriticalSectionRawMutex, Button, ROUTER_DEPTH>,
    /// Set once the consuming side is gone.
    closed: AtomicBool,
}

/// Cloneable, `Send` producer side of the router queue.
#[derive(Clone)]
pub struct ButtonSender {
    queue: Arc<PressQueue>,
}

impl fmt::Debug for ButtonSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonSender")
            .field("queued", &self.queue.channel.len())
            .finish()
    }
}

impl ButtonSender {
    /// Queue one press, waiting while the queue is full. Returns `false`
    /// once the dispatcher has gone away.
    pub fn press(&self, button: Button) -> bool {
        let mut pending = button;
        let mut waited = false;
        loop {
            if self.queue.closed.load(Ordering::Acquire) {
                return false;
            }
            match self.queue.channel.try_send(pending) {
                Ok(()) => return true,
                Err(TrySendError::Full(b)) => {
                    if !waited {
                        debug!("Router queue full, holding {:?}", b);
                        waited = true;
                    }
                    pending = b;
                    thread::sleep(SEND_RETRY);
                }
            }
        }
    }
}

/// Consuming side; dropping it closes the queue.
struct QueueReader {
    queue: Arc<PressQueue>,
}

impl QueueReader {
    fn try_next(&self) -> Option<Button> {
        self.queue.channel.try_receive().ok()
    }

    /// Every sender is dropped and nothing is left to apply.
    fn orphaned(&self) -> bool {
        let alone = Arc::strong_count(&self.queue) == 1;
        fence(Ordering::Acquire);
        alone && self.queue.channel.is_empty()
    }
}

impl Drop for QueueReader {
    fn drop(&mut self) {
        self.queue.closed.store(true, Ordering::Release);
    }
}

pub struct ButtonEventRouter {
    rotation: RotationHandle,
    reader: QueueReader,
}

impl ButtonEventRouter {
    pub fn new(rotation: RotationHandle) -> Self {
        let queue = Arc::new(PressQueue {
            channel: Channel::new(),
            closed: AtomicBool::new(false),
        });
        Self {
            rotation,
            reader: QueueReader { queue },
        }
    }

    pub fn sender(&self) -> ButtonSender {
        ButtonSender {
            queue: self.reader.queue.clone(),
        }
    }

    /// Register a press handler on `input` that queues `button`.
    pub fn bind(&self, button: Button, input: &mut impl ButtonInput) {
        let sender = self.sender();
        input.on_press(Box::new(move || {
            if !sender.press(button) {
                warn!("Button {:?}: router stopped, press ignored", button);
            }
        }));
        info!("Button {:?} bound to {:?}", button, button.action());
    }

    /// Apply one press synchronously on the caller's thread.
    pub fn dispatch(&self, button: Button) -> RotationSnapshot {
        apply(&self.rotation, button)
    }

    /// Apply every press already queued. Returns how many were applied.
    pub fn drain(&self) -> usize {
        let mut applied = 0;
        while let Some(button) = self.reader.try_next() {
            apply(&self.rotation, button);
            applied += 1;
        }
        applied
    }

    /// Move the dispatcher onto its own task. It runs until shutdown is
    /// requested on the rotation handle or every sender is dropped, and
    /// returns the number of presses it applied.
    pub fn spawn(self) -> std::io::Result<JoinHandle<u64>> {
        let Self { rotation, reader } = self;
        spawn_on_core(BUTTON_DISPATCH_TASK, move || dispatch_loop(&rotation, &reader))
    }
}

fn dispatch_loop(rotation: &RotationHandle, reader: &QueueReader) -> u64 {
    let mut applied = 0u64;
    loop {
        if let Some(button) = reader.try_next() {
            apply(rotation, button);
            applied += 1;
            continue;
        }
        if rotation.shutdown_requested() || reader.orphaned() {
            break;
        }
        thread::sleep(DISPATCH_IDLE_POLL);
    }
    info!("Button dispatcher stopped after {} presses", applied);
    applied
}

fn apply(rotation: &RotationHandle, button: Button) -> RotationSnapshot {
    let snapshot = rotation.apply(button.action());
    info!(
        "Button {:?} -> {:?}: index={} paused={}",
        button,
        button.action(),
        snapshot.index,
        snapshot.paused
    );
    snapshot
}
