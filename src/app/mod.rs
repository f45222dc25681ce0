//! Application core: pure domain logic, zero I/O.
//!
//! This module holds the rules of the status board: which messages exist,
//! how the rotation moves between them, how temperature maps to an
//! indicator colour, and how button presses reach the rotation. All
//! interaction with hardware happens through **port traits** defined in
//! [`ports`], keeping this layer fully testable without real peripherals.

pub mod catalog;
pub mod classifier;
pub mod events;
pub mod messages;
pub mod payload;
pub mod ports;
pub mod rotation;
pub mod router;
pub mod service;
