//! Host simulation adapters.
//!
//! Stand-ins for the board peripherals so the full firmware loop runs on a
//! workstation:
//!
//! | Adapter          | Implements      | Backed by                    |
//! |------------------|-----------------|------------------------------|
//! | `ConsoleDisplay` | DisplayPort     | framed text on stdout        |
//! | `SimIndicator`   | IndicatorPort   | in-memory levels + log line  |
//! | `SimSensor`      | SensorPort      | deterministic temperature sweep |
//! | `StdinButtons`   | (none)          | `a`/`b`/`c` lines on stdin   |

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::thread::JoinHandle;

use log::{debug, info};

use crate::app::classifier::{Channel, IndicatorCommand, Level};
use crate::app::payload::Payload;
use crate::app::ports::{DisplayPort, IndicatorPort, SensorPort};
use crate::drivers::button::PressCounter;
use crate::drivers::task_pin::spawn_on_core;
use crate::error::Result;
use crate::pins::STDIN_BUTTON_TASK;

// ── Display ───────────────────────────────────────────────────

/// Prints each payload inside a frame the width of the configured LCD.
pub struct ConsoleDisplay<W> {
    out: W,
    columns: usize,
    lines: usize,
}

impl ConsoleDisplay<io::Stdout> {
    pub fn stdout(columns: u8, lines: u8) -> Self {
        Self::new(io::stdout(), columns, lines)
    }
}

impl<W: Write> ConsoleDisplay<W> {
    pub fn new(out: W, columns: u8, lines: u8) -> Self {
        Self {
            out,
            columns: usize::from(columns),
            lines: usize::from(lines),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn frame(&mut self, rows: &[&str]) -> io::Result<()> {
        let border = "-".repeat(self.columns);
        writeln!(self.out, "+{border}+")?;
        for row in 0..self.lines {
            let text: String = rows
                .get(row)
                .copied()
                .unwrap_or("")
                .chars()
                .take(self.columns)
                .collect();
            writeln!(self.out, "|{text:<width$}|", width = self.columns)?;
        }
        writeln!(self.out, "+{border}+")?;
        self.out.flush()
    }
}

impl<W: Write> DisplayPort for ConsoleDisplay<W> {
    fn render(&mut self, payload: &Payload) -> Result<()> {
        let rows: Vec<&str> = payload.lines().collect();
        // Console write failures are not display faults worth surfacing.
        if let Err(e) = self.frame(&rows) {
            debug!("console display write failed: {}", e);
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        if let Err(e) = self.frame(&[]) {
            debug!("console display write failed: {}", e);
        }
        Ok(())
    }
}

// ── Indicator ─────────────────────────────────────────────────

#[derive(Debug)]
pub struct SimIndicator {
    levels: [Level; 3],
}

impl Default for SimIndicator {
    fn default() -> Self {
        Self {
            levels: [Level::Off; 3],
        }
    }
}

impl SimIndicator {
    pub fn level(&self, channel: Channel) -> Level {
        self.levels[channel as usize]
    }
}

impl IndicatorPort for SimIndicator {
    fn set(&mut self, command: &IndicatorCommand) -> Result<()> {
        for c in command.iter() {
            self.levels[c.channel as usize] = c.level;
        }
        let lit: Vec<Channel> = command.lit().collect();
        info!("LED   | lit={:?}", lit);
        Ok(())
    }
}

// ── Sensor ────────────────────────────────────────────────────

/// Temperature sweeps between `LOW_C` and `HIGH_C` and back, one step per
/// temperature read, so every indicator band shows up within a few
/// rotations. Humidity follows the same phase.
#[derive(Debug)]
pub struct SimSensor {
    celsius: f32,
    step: f32,
}

impl SimSensor {
    const LOW_C: f32 = -5.0;
    const HIGH_C: f32 = 40.0;
    const STEP_C: f32 = 7.5;

    pub fn new(start_c: f32) -> Self {
        Self {
            celsius: start_c.clamp(Self::LOW_C, Self::HIGH_C),
            step: Self::STEP_C,
        }
    }
}

impl Default for SimSensor {
    fn default() -> Self {
        Self::new(21.5)
    }
}

impl SensorPort for SimSensor {
    fn read_temperature(&mut self) -> Result<f32> {
        let reading = self.celsius;
        let next = self.celsius + self.step;
        if !(Self::LOW_C..=Self::HIGH_C).contains(&next) {
            self.step = -self.step;
        }
        self.celsius += self.step;
        Ok(reading)
    }

    fn read_humidity(&mut self) -> Result<f32> {
        let span = Self::HIGH_C - Self::LOW_C;
        Ok(30.0 + 40.0 * (self.celsius - Self::LOW_C) / span)
    }
}

// ── Buttons ───────────────────────────────────────────────────

/// Feeds the three press counters from stdin, one command per line:
/// `a` (next), `b` (pause/resume), `c` (previous). Several letters on one
/// line are separate presses.
pub struct StdinButtons {
    counters: [Arc<PressCounter>; 3],
}

impl StdinButtons {
    pub fn new(a: Arc<PressCounter>, b: Arc<PressCounter>, c: Arc<PressCounter>) -> Self {
        Self { counters: [a, b, c] }
    }

    /// Route one input line. Returns the number of presses recorded.
    pub fn feed(&self, line: &str) -> usize {
        let mut pressed = 0;
        for ch in line.chars() {
            let counter = match ch.to_ascii_lowercase() {
                'a' => &self.counters[0],
                'b' => &self.counters[1],
                'c' => &self.counters[2],
                _ => continue,
            };
            counter.press();
            pressed += 1;
        }
        pressed
    }

    /// Read stdin until EOF on a background thread.
    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        spawn_on_core(STDIN_BUTTON_TASK, move || {
            info!("Buttons: type a (next), b (pause), c (previous) + Enter");
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        self.feed(&line);
                    }
                    Err(_) => break,
                }
            }
            debug!("stdin closed, button input ended");
        })
    }
}
