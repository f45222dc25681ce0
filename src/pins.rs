//! GPIO / peripheral pin assignments for the status board (ESP32-S3).
//!
//! Single source of truth: the firmware entry point references this module
//! rather than hard-coding pin numbers. Change a pin here and it propagates
//! everywhere.

use crate::drivers::task_pin::{Core, TaskConfig};

// ---------------------------------------------------------------------------
// Character LCD (HD44780, 4-bit mode, R/W tied low)
// ---------------------------------------------------------------------------

pub const LCD_RS_GPIO: i32 = 4;
pub const LCD_E_GPIO: i32 = 5;
pub const LCD_D4_GPIO: i32 = 6;
pub const LCD_D5_GPIO: i32 = 7;
pub const LCD_D6_GPIO: i32 = 1;
pub const LCD_D7_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Tri-colour indicator LED (discrete R/G/B, active high)
// ---------------------------------------------------------------------------

pub const LED_R_GPIO: i32 = 11;
pub const LED_G_GPIO: i32 = 12;
pub const LED_B_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// Buttons (active-low with pull-up, falling-edge interrupt)
// ---------------------------------------------------------------------------

/// Red cap: next message.
pub const BUTTON_A_GPIO: i32 = 8;
/// Green cap: pause / resume.
pub const BUTTON_B_GPIO: i32 = 9;
/// Blue cap: previous message.
pub const BUTTON_C_GPIO: i32 = 10;

// ---------------------------------------------------------------------------
// I²C bus (AHTx0 temperature / humidity sensor)
// ---------------------------------------------------------------------------

pub const I2C_SDA_GPIO: i32 = 14;
pub const I2C_SCL_GPIO: i32 = 21;
pub const I2C_FREQ_HZ: u32 = 100_000;

// ---------------------------------------------------------------------------
// Button poller
// ---------------------------------------------------------------------------

/// How often the poller thread drains the ISR press counters.
pub const BUTTON_POLL_MS: u64 = 20;

// ---------------------------------------------------------------------------
// Worker task placement (core, priority, stack)
// ---------------------------------------------------------------------------

/// Drains the ISR press counters into the router queue.
pub const BUTTON_POLL_TASK: TaskConfig = TaskConfig {
    core: Core::App,
    priority: 6,
    stack_kb: 8,
    name: "button-poll\0",
};

/// Applies queued presses to the shared rotation state.
pub const BUTTON_DISPATCH_TASK: TaskConfig = TaskConfig {
    core: Core::App,
    priority: 6,
    stack_kb: 8,
    name: "buttons\0",
};

/// Host only: reads simulated presses from stdin.
pub const STDIN_BUTTON_TASK: TaskConfig = TaskConfig {
    core: Core::Pro,
    priority: 3,
    stack_kb: 64,
    name: "stdin-buttons\0",
};
