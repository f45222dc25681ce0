//! Telemetry ingest: host-side companion tool.
//!
//! Reads line-delimited JSON from a serial device (or stdin when no path
//! is given), stamps and stores each record, and prints the whole log as
//! pretty JSON on Ctrl-C or end of input.
//!
//! ```text
//! stty -F /dev/ttyS0 115200 cs8 -parenb -cstopb raw
//! telemetry-ingest /dev/ttyS0 > log.json
//! ```
//!
//! The link settings (115200 baud, 8N1) are applied to the device outside
//! this tool; it only reads bytes.

#[cfg(not(target_os = "espidf"))]
fn main() -> anyhow::Result<()> {
    host::run()
}

#[cfg(target_os = "espidf")]
fn main() {
    log::error!("telemetry-ingest is a host tool");
}

#[cfg(not(target_os = "espidf"))]
mod host {
    use std::fs::File;
    use std::io::{self, BufRead, BufReader};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc::{self, RecvTimeoutError};
    use std::time::Duration;

    use anyhow::{Context, Result};
    use log::{info, warn};
    use tracing_subscriber::EnvFilter;

    use statusboard::adapters::clock::SystemClock;
    use statusboard::app::ports::ClockPort;
    use statusboard::drivers::task_pin::{Core, TaskConfig, spawn_on_core};
    use statusboard::telemetry::{IngestStats, TelemetryLog};

    /// How often the main loop re-checks the interrupt flag.
    const STOP_POLL: Duration = Duration::from_millis(200);

    const READER_TASK: TaskConfig = TaskConfig {
        core: Core::Pro,
        priority: 3,
        stack_kb: 64,
        name: "telemetry-read\0",
    };

    pub fn run() -> Result<()> {
        // Logs go to stderr so stdout carries only the JSON dump.
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(io::stderr)
            .try_init()
            .map_err(|e| anyhow::anyhow!("logger init failed: {e}"))?;

        let input: Box<dyn BufRead + Send> = match std::env::args_os().nth(1) {
            Some(path) => {
                let file = File::open(&path)
                    .with_context(|| format!("opening {}", path.to_string_lossy()))?;
                info!("Reading telemetry from {}", path.to_string_lossy());
                Box::new(BufReader::new(file))
            }
            None => {
                info!("Reading telemetry from stdin");
                Box::new(BufReader::new(io::stdin()))
            }
        };

        let interrupted = Arc::new(AtomicBool::new(false));
        {
            let interrupted = interrupted.clone();
            ctrlc::set_handler(move || interrupted.store(true, Ordering::Release))
                .context("installing Ctrl-C handler")?;
        }

        // Reads block, so they live on their own thread; the main loop
        // stays free to notice Ctrl-C.
        let (tx, rx) = mpsc::channel::<io::Result<String>>();
        spawn_on_core(READER_TASK, move || {
            for line in input.lines() {
                let failed = line.is_err();
                if tx.send(line).is_err() || failed {
                    break;
                }
            }
        })
        .context("spawning reader thread")?;

        let clock = SystemClock;
        let mut log = TelemetryLog::new();
        let mut stats = IngestStats::default();
        while !interrupted.load(Ordering::Acquire) {
            match rx.recv_timeout(STOP_POLL) {
                Ok(Ok(line)) => log.accept(&line, clock.now(), &mut stats),
                Ok(Err(e)) => {
                    warn!("Read failed: {}", e);
                    break;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        info!(
            "Ingestion ended: stored={} rejected={}",
            stats.stored, stats.rejected
        );
        println!("{}", log.to_pretty_json().context("serializing telemetry log")?);
        Ok(())
    }
}
