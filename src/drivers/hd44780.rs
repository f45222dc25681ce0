//! HD44780 character LCD driver, 4-bit parallel mode.
//!
//! ## Wiring
//!
//! Six GPIOs: RS (register select), E (enable strobe) and D4–D7. R/W is
//! tied to ground, so the driver never reads the busy flag and relies on
//! the datasheet worst-case execution times instead.
//!
//! ## Dual-target design
//!
//! Generic over `embedded_hal` [`OutputPin`] and [`DelayNs`]. On ESP-IDF the
//! pins are `PinDriver<AnyOutputPin, Output>` and the delay is `Ets`; on the
//! host the same code runs against mock pins in tests.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};

use crate::error::DisplayError;

// ── Instruction set ───────────────────────────────────────────

const CMD_CLEAR: u8 = 0x01;
const CMD_ENTRY_MODE_INC: u8 = 0x06;
const CMD_DISPLAY_ON: u8 = 0x0C;
const CMD_FUNCTION_4BIT_2LINE: u8 = 0x28;
const CMD_SET_DDRAM: u8 = 0x80;

// ── Timing (datasheet worst case at 270 kHz) ──────────────────

const POWER_ON_WAIT_US: u32 = 50_000;
const INIT_NIBBLE_WAIT_US: u32 = 4_500;
const CLEAR_WAIT_US: u32 = 2_000;
const COMMAND_WAIT_US: u32 = 50;
const ENABLE_PULSE_US: u32 = 1;

/// Display geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub columns: u8,
    pub lines: u8,
}

impl Geometry {
    /// DDRAM address of the first cell on `line`.
    ///
    /// Lines 2 and 3 of a four-line module continue lines 0 and 1 in
    /// memory, offset by the column count.
    pub fn row_offset(&self, line: u8) -> u8 {
        match line {
            0 => 0x00,
            1 => 0x40,
            2 => self.columns,
            _ => 0x40 + self.columns,
        }
    }
}

pub struct Hd44780<P, D> {
    rs: P,
    en: P,
    data: [P; 4],
    delay: D,
    geometry: Geometry,
}

impl<P: OutputPin, D: DelayNs> Hd44780<P, D> {
    /// Take the pins and run the 4-bit initialisation sequence.
    pub fn new(
        rs: P,
        en: P,
        data: [P; 4],
        delay: D,
        geometry: Geometry,
    ) -> Result<Self, DisplayError> {
        let mut lcd = Self {
            rs,
            en,
            data,
            delay,
            geometry,
        };
        lcd.init()?;
        Ok(lcd)
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    fn init(&mut self) -> Result<(), DisplayError> {
        self.delay.delay_us(POWER_ON_WAIT_US);
        self.rs.set_low().map_err(|_| DisplayError::PinWriteFailed)?;
        self.en.set_low().map_err(|_| DisplayError::PinWriteFailed)?;

        // Force 8-bit mode three times, then drop to 4-bit.
        for _ in 0..3 {
            self.write_nibble(0x03)?;
            self.delay.delay_us(INIT_NIBBLE_WAIT_US);
        }
        self.write_nibble(0x02)?;
        self.delay.delay_us(COMMAND_WAIT_US);

        self.command(CMD_FUNCTION_4BIT_2LINE)?;
        self.command(CMD_DISPLAY_ON)?;
        self.clear()?;
        self.command(CMD_ENTRY_MODE_INC)
    }

    /// Blank every cell and home the cursor.
    pub fn clear(&mut self) -> Result<(), DisplayError> {
        self.command(CMD_CLEAR)?;
        self.delay.delay_us(CLEAR_WAIT_US);
        Ok(())
    }

    pub fn set_cursor(&mut self, column: u8, line: u8) -> Result<(), DisplayError> {
        if column >= self.geometry.columns || line >= self.geometry.lines {
            return Err(DisplayError::OutOfBounds);
        }
        self.command(CMD_SET_DDRAM | (self.geometry.row_offset(line) + column))
    }

    /// Write `text` on `line`, truncated or space-padded to the line width.
    /// Characters outside ASCII are shown as `?`.
    pub fn write_line(&mut self, line: u8, text: &str) -> Result<(), DisplayError> {
        self.set_cursor(0, line)?;
        let width = usize::from(self.geometry.columns);
        let mut chars = text.chars();
        for _ in 0..width {
            let byte = match chars.next() {
                Some(c) if c.is_ascii() && !c.is_ascii_control() => c as u8,
                Some(_) => b'?',
                None => b' ',
            };
            self.data_byte(byte)?;
        }
        Ok(())
    }

    fn command(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.rs.set_low().map_err(|_| DisplayError::PinWriteFailed)?;
        self.write_byte(byte)
    }

    fn data_byte(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.rs.set_high().map_err(|_| DisplayError::PinWriteFailed)?;
        self.write_byte(byte)
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), DisplayError> {
        self.write_nibble(byte >> 4)?;
        self.write_nibble(byte & 0x0F)?;
        self.delay.delay_us(COMMAND_WAIT_US);
        Ok(())
    }

    fn write_nibble(&mut self, nibble: u8) -> Result<(), DisplayError> {
        for (bit, pin) in self.data.iter_mut().enumerate() {
            pin.set_state(PinState::from(nibble & (1 << bit) != 0))
                .map_err(|_| DisplayError::PinWriteFailed)?;
        }
        self.en.set_high().map_err(|_| DisplayError::PinWriteFailed)?;
        self.delay.delay_us(ENABLE_PULSE_US);
        self.en.set_low().map_err(|_| DisplayError::PinWriteFailed)?;
        self.delay.delay_us(ENABLE_PULSE_US);
        Ok(())
    }
}
