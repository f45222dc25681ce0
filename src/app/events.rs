//! Outbound application events.
//!
//! The [`DisplayService`](super::service::DisplayService) emits these
//! through the [`EventSink`](super::ports::EventSink) port. Adapters on the
//! other side decide what to do with them; the firmware logs them to the
//! serial console.

use crate::error::Error;

use super::rotation::ManualAction;

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The rotation loop is about to enter its first cycle.
    Started { messages: usize, interval_ms: u64 },

    /// A message was rendered to the display.
    MessageShown { index: usize, label: &'static str },

    /// A provider or the display failed; the loop carries on.
    RenderFailed { index: usize, error: Error },

    /// The visible message or pause state changed.
    RotationChanged {
        cause: RotationCause,
        index: usize,
        paused: bool,
    },

    /// Operator asked for shutdown; cleanup follows.
    ShutdownRequested { cycles: u64 },
}

/// What moved the rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationCause {
    /// The wait elapsed and the timed advance ran.
    Timer,
    /// A button press landed during the wait.
    Button(ManualAction),
}
