//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the logger (UART / USB-CDC on the device, stderr on the host). Each
//! line leads with a fixed tag so the console can be grepped.

use log::{info, warn};

use crate::app::events::{AppEvent, RotationCause};
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started {
                messages,
                interval_ms,
            } => {
                info!("START | messages={} interval={}ms", messages, interval_ms);
            }
            AppEvent::MessageShown { index, label } => {
                info!("SHOW  | index={} label={}", index, label);
            }
            AppEvent::RenderFailed { index, error } => {
                warn!("FAIL  | index={} error={}", index, error);
            }
            AppEvent::RotationChanged {
                cause,
                index,
                paused,
            } => {
                let cause = match cause {
                    RotationCause::Timer => "timer".to_string(),
                    RotationCause::Button(action) => format!("button:{action:?}"),
                };
                info!("ROTATE| cause={} index={} paused={}", cause, index, paused);
            }
            AppEvent::ShutdownRequested { cycles } => {
                info!("STOP  | cycles={}", cycles);
            }
        }
    }
}
